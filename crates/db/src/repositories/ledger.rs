//! Transaction history ledger repository.

use std::str::FromStr;

use chrono::NaiveDate;
use posrecon_core::ledger::{
    HomeEquivalents, LedgerBatch, LedgerFilter, ReportKind, SumMetric, TenderBreakdown,
    TenderTotals, TerminalSum, TransactionHistoryRecord,
};
use posrecon_core::repository::{StoreError, TransactionLedger};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::entities::{report_batches, transaction_history};
use crate::error::store_error;

/// Rows per multi-row insert statement, kept well under the bind limit.
const INSERT_CHUNK: usize = 1000;

/// Append-only ledger backed by `report_batches` and `transaction_history`.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn filtered(filter: &LedgerFilter) -> sea_orm::Select<transaction_history::Entity> {
        transaction_history::Entity::find()
            .filter(transaction_history::Column::ReportKind.eq(filter.report_kind.as_str()))
            .apply_if(filter.terminal_code.clone(), |q, code| {
                q.filter(transaction_history::Column::TerminalCode.eq(code))
            })
            .apply_if(filter.from, |q, from| {
                q.filter(transaction_history::Column::TransactionDate.gte(from))
            })
            .apply_if(filter.to, |q, to| {
                q.filter(transaction_history::Column::TransactionDate.lte(to))
            })
    }
}

impl TransactionLedger for LedgerRepository {
    async fn exists_for_date(&self, kind: ReportKind, date: NaiveDate) -> Result<bool, StoreError> {
        let marker = report_batches::Entity::find_by_id((kind.as_str().to_string(), date))
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Ok(marker.is_some())
    }

    async fn bulk_insert(&self, batch: LedgerBatch) -> Result<u64, StoreError> {
        let LedgerBatch {
            batch_id,
            report_kind,
            transaction_date,
            records,
        } = batch;
        let written = records.len();
        let row_count = i32::try_from(written)
            .map_err(|_| StoreError::backend(format!("batch of {written} rows is too large")))?;

        let txn = self.db.begin().await.map_err(store_error)?;

        report_batches::ActiveModel {
            report_kind: Set(report_kind.as_str().to_string()),
            transaction_date: Set(transaction_date),
            batch_id: Set(batch_id),
            row_count: Set(row_count),
            created_at: NotSet,
        }
        .insert(&txn)
        .await
        .map_err(store_error)?;

        let models: Vec<transaction_history::ActiveModel> = records
            .iter()
            .map(|record| to_active_model(batch_id, record))
            .collect();
        for chunk in models.chunks(INSERT_CHUNK) {
            transaction_history::Entity::insert_many(chunk.to_vec())
                .exec(&txn)
                .await
                .map_err(store_error)?;
            debug!(%batch_id, rows = chunk.len(), "history chunk inserted");
        }

        txn.commit().await.map_err(store_error)?;

        info!(
            %batch_id,
            kind = %report_kind,
            date = %transaction_date,
            rows = written,
            "ledger batch stored"
        );
        Ok(written as u64)
    }

    async fn query(
        &self,
        filter: &LedgerFilter,
    ) -> Result<Vec<TransactionHistoryRecord>, StoreError> {
        Self::filtered(filter)
            .order_by_asc(transaction_history::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(to_record)
            .collect()
    }

    async fn group_sum_by_terminal(
        &self,
        filter: &LedgerFilter,
        metric: SumMetric,
    ) -> Result<Vec<TerminalSum>, StoreError> {
        let records = self.query(filter).await?;

        let mut sums: Vec<TerminalSum> = Vec::new();
        for record in &records {
            let value = metric.value_of(record);
            match sums
                .iter_mut()
                .find(|s| s.terminal_code == record.terminal_code)
            {
                Some(entry) => entry.sum += value,
                None => sums.push(TerminalSum {
                    terminal_code: record.terminal_code.clone(),
                    sum: value,
                }),
            }
        }
        Ok(sums)
    }

    async fn recorded_dates(
        &self,
        kind: ReportKind,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StoreError> {
        let filter = LedgerFilter::all(kind).between(from, to);
        Self::filtered(&filter)
            .select_only()
            .column(transaction_history::Column::TransactionDate)
            .distinct()
            .order_by_asc(transaction_history::Column::TransactionDate)
            .into_tuple::<NaiveDate>()
            .all(&self.db)
            .await
            .map_err(store_error)
    }
}

fn to_active_model(
    batch_id: uuid::Uuid,
    record: &TransactionHistoryRecord,
) -> transaction_history::ActiveModel {
    let t = &record.tenders;
    transaction_history::ActiveModel {
        id: NotSet,
        batch_id: Set(batch_id),
        report_kind: Set(record.report_kind.as_str().to_string()),
        terminal_code: Set(record.terminal_code.clone()),
        terminal_name: Set(record.terminal_name.clone()),
        local_txn: Set(t.local.txn_count),
        local_amount: Set(t.local.amount),
        vc_txn: Set(t.vc.txn_count),
        vc_amount: Set(t.vc.amount),
        vc_home: Set(record.home.vc),
        mc_txn: Set(t.mc.txn_count),
        mc_amount: Set(t.mc.amount),
        mc_home: Set(record.home.mc),
        cup_txn: Set(t.cup.txn_count),
        cup_amount: Set(t.cup.amount),
        cup_home: Set(record.home.cup),
        total_txn: Set(record.total_txn),
        total_amount: Set(record.total_amount),
        transaction_date: Set(record.transaction_date),
        created_at: NotSet,
    }
}

fn to_record(model: transaction_history::Model) -> Result<TransactionHistoryRecord, StoreError> {
    let report_kind = ReportKind::from_str(&model.report_kind).map_err(StoreError::backend)?;
    let totals = |txn_count, amount| TenderTotals { txn_count, amount };

    Ok(TransactionHistoryRecord {
        report_kind,
        terminal_code: model.terminal_code,
        terminal_name: model.terminal_name,
        tenders: TenderBreakdown {
            local: totals(model.local_txn, model.local_amount),
            vc: totals(model.vc_txn, model.vc_amount),
            mc: totals(model.mc_txn, model.mc_amount),
            cup: totals(model.cup_txn, model.cup_amount),
        },
        home: HomeEquivalents {
            vc: model.vc_home,
            mc: model.mc_home,
            cup: model.cup_home,
        },
        total_txn: model.total_txn,
        total_amount: model.total_amount,
        transaction_date: model.transaction_date,
    })
}
