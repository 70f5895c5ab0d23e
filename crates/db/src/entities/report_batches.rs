//! `SeaORM` Entity for report_batches table.
//!
//! One marker per ingested (kind, date); the primary key rejects a second
//! batch for the same day.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "report_batches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub report_kind: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_date: Date,
    #[sea_orm(unique)]
    pub batch_id: Uuid,
    pub row_count: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
