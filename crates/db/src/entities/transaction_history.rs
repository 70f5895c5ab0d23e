//! `SeaORM` Entity for transaction_history table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub batch_id: Uuid,
    pub report_kind: String,
    pub terminal_code: String,
    pub terminal_name: Option<String>,
    pub local_txn: i64,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub local_amount: Decimal,
    pub vc_txn: i64,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub vc_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub vc_home: Decimal,
    pub mc_txn: i64,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub mc_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub mc_home: Decimal,
    pub cup_txn: i64,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub cup_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub cup_home: Decimal,
    pub total_txn: i64,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub total_amount: Decimal,
    pub transaction_date: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
