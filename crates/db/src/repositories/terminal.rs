//! Terminal registry repository.

use std::collections::HashMap;

use chrono::NaiveDate;
use posrecon_core::registry::TerminalSnapshot;
use posrecon_core::repository::{StoreError, TerminalRegistry};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::debug;

use crate::entities::{branches, districts, terminals};
use crate::error::store_error;

/// Terminal registry backed by the `terminals`, `branches` and `districts`
/// tables.
#[derive(Debug, Clone)]
pub struct TerminalRepository {
    db: DatabaseConnection,
}

impl TerminalRepository {
    /// Creates a new terminal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl TerminalRegistry for TerminalRepository {
    async fn lookup_all(&self) -> Result<Vec<TerminalSnapshot>, StoreError> {
        let districts: HashMap<i32, String> = districts::Entity::find()
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();

        let branches: HashMap<i32, branches::Model> = branches::Entity::find()
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        let terminals = terminals::Entity::find()
            .order_by_asc(terminals::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_error)?;

        Ok(terminals
            .into_iter()
            .map(|t| {
                let branch = t.branch_id.and_then(|id| branches.get(&id));
                let district_name = branch
                    .and_then(|b| b.district_id)
                    .and_then(|id| districts.get(&id))
                    .cloned();
                TerminalSnapshot {
                    code: t.code,
                    display_name: t.display_name,
                    branch_name: branch.map(|b| b.name.clone()),
                    district_name,
                    is_retired: t.is_retired,
                    grand_total: t.grand_total,
                    grand_total_updated_at: t.grand_total_updated_at,
                }
            })
            .collect())
    }

    async fn bump_grand_total(
        &self,
        code: &str,
        new_total: Decimal,
        as_of: NaiveDate,
    ) -> Result<bool, StoreError> {
        let result = terminals::Entity::update_many()
            .col_expr(terminals::Column::GrandTotal, Expr::value(new_total))
            .col_expr(terminals::Column::GrandTotalUpdatedAt, Expr::value(as_of))
            .col_expr(
                terminals::Column::UpdatedAt,
                Expr::current_timestamp().into(),
            )
            .filter(terminals::Column::Code.eq(code))
            .filter(
                Condition::any()
                    .add(terminals::Column::GrandTotalUpdatedAt.is_null())
                    .add(terminals::Column::GrandTotalUpdatedAt.ne(as_of)),
            )
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        if result.rows_affected == 0 {
            let exists = terminals::Entity::find()
                .filter(terminals::Column::Code.eq(code))
                .one(&self.db)
                .await
                .map_err(store_error)?
                .is_some();
            if !exists {
                return Err(StoreError::NotFound(format!("terminal {code}")));
            }
            debug!(terminal = %code, %as_of, "grand total already stored for date");
            return Ok(false);
        }

        debug!(terminal = %code, %new_total, %as_of, "grand total stored");
        Ok(true)
    }
}
