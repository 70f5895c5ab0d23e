//! Exchange rate repository.

use chrono::NaiveDate;
use posrecon_core::currency::ExchangeRate;
use posrecon_core::repository::{ExchangeRateStore, StoreError};
use posrecon_shared::{AppError, CurrencyCode};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::currencies;
use crate::error::store_error;

/// Error types for exchange rate updates.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeRateError {
    /// Rate must be positive.
    #[error("Exchange rate for {0} must be positive")]
    NonPositiveRate(CurrencyCode),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ExchangeRateError> for AppError {
    fn from(err: ExchangeRateError) -> Self {
        match err {
            err @ ExchangeRateError::NonPositiveRate(_) => Self::Validation(err.to_string()),
            ExchangeRateError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// New rates for every required currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateUpdate {
    /// Visa rate.
    pub vc: Decimal,
    /// Mastercard rate.
    pub mc: Decimal,
    /// UnionPay rate.
    pub cup: Decimal,
}

impl RateUpdate {
    fn rate(&self, currency: CurrencyCode) -> Decimal {
        match currency {
            CurrencyCode::Vc => self.vc,
            CurrencyCode::Mc => self.mc,
            CurrencyCode::Cup => self.cup,
        }
    }
}

/// Exchange rate store backed by the `currencies` table.
#[derive(Debug, Clone)]
pub struct ExchangeRateRepository {
    db: DatabaseConnection,
}

impl ExchangeRateRepository {
    /// Creates a new exchange rate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Sets all three rates, dated `as_of`, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any rate is not positive or the write fails; no
    /// rate is changed in that case.
    pub async fn update_rates(
        &self,
        update: RateUpdate,
        as_of: NaiveDate,
    ) -> Result<Vec<ExchangeRate>, ExchangeRateError> {
        if let Some(currency) = CurrencyCode::ALL
            .into_iter()
            .find(|c| update.rate(*c) <= Decimal::ZERO)
        {
            return Err(ExchangeRateError::NonPositiveRate(currency));
        }

        let txn = self.db.begin().await?;

        let mut updated = Vec::with_capacity(CurrencyCode::ALL.len());
        for currency in CurrencyCode::ALL {
            let rate = update.rate(currency);
            let model = currencies::ActiveModel {
                code: Set(currency.as_str().to_string()),
                rate: Set(rate),
                last_updated: Set(as_of),
            };
            currencies::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(currencies::Column::Code)
                        .update_columns([currencies::Column::Rate, currencies::Column::LastUpdated])
                        .to_owned(),
                )
                .exec(&txn)
                .await?;
            updated.push(ExchangeRate::new(currency, rate, as_of));
        }

        txn.commit().await?;

        info!(
            vc = %update.vc,
            mc = %update.mc,
            cup = %update.cup,
            %as_of,
            "exchange rates updated"
        );
        Ok(updated)
    }
}

impl ExchangeRateStore for ExchangeRateRepository {
    async fn lookup_rates(&self, codes: &[CurrencyCode]) -> Result<Vec<ExchangeRate>, StoreError> {
        let rows = currencies::Entity::find()
            .filter(currencies::Column::Code.is_in(codes.iter().map(|c| c.as_str())))
            .all(&self.db)
            .await
            .map_err(store_error)?;

        rows.into_iter()
            .map(|row| {
                let currency = row.code.parse::<CurrencyCode>().map_err(StoreError::backend)?;
                Ok(ExchangeRate::new(currency, row.rate, row.last_updated))
            })
            .collect()
    }
}
