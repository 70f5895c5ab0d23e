//! Initial database migration.
//!
//! Creates the terminal registry, exchange rates, batch markers and the
//! transaction history ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: TERMINAL REGISTRY
        // ============================================================
        db.execute_unprepared(DISTRICTS_SQL).await?;
        db.execute_unprepared(BRANCHES_SQL).await?;
        db.execute_unprepared(TERMINALS_SQL).await?;

        // ============================================================
        // PART 2: EXCHANGE RATES
        // ============================================================
        db.execute_unprepared(CURRENCIES_SQL).await?;

        // ============================================================
        // PART 3: LEDGER
        // ============================================================
        db.execute_unprepared(REPORT_BATCHES_SQL).await?;
        db.execute_unprepared(TRANSACTION_HISTORY_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const DISTRICTS_SQL: &str = r"
CREATE TABLE districts (
    id SERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const BRANCHES_SQL: &str = r"
CREATE TABLE branches (
    id SERIAL PRIMARY KEY,
    name VARCHAR(150) NOT NULL UNIQUE,
    district_id INTEGER REFERENCES districts(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_branches_district ON branches(district_id);
";

const TERMINALS_SQL: &str = r"
CREATE TABLE terminals (
    id SERIAL PRIMARY KEY,
    code VARCHAR(50) NOT NULL UNIQUE,
    display_name VARCHAR(255),
    branch_id INTEGER REFERENCES branches(id) ON DELETE SET NULL,
    is_retired BOOLEAN NOT NULL DEFAULT FALSE,
    grand_total NUMERIC(20, 2) NOT NULL DEFAULT 0,
    grand_total_updated_at DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_grand_total_non_negative CHECK (grand_total >= 0)
);

CREATE INDEX idx_terminals_branch ON terminals(branch_id);
";

const CURRENCIES_SQL: &str = r"
CREATE TABLE currencies (
    code VARCHAR(3) PRIMARY KEY,
    rate NUMERIC(20, 6) NOT NULL,
    last_updated DATE NOT NULL,
    CONSTRAINT chk_currency_code CHECK (code IN ('VC', 'MC', 'CUP')),
    CONSTRAINT chk_rate_positive CHECK (rate > 0)
);
";

const REPORT_BATCHES_SQL: &str = r"
-- One marker per ingested extract kind and day
CREATE TABLE report_batches (
    report_kind VARCHAR(16) NOT NULL,
    transaction_date DATE NOT NULL,
    batch_id UUID NOT NULL UNIQUE,
    row_count INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (report_kind, transaction_date),
    CONSTRAINT chk_report_kind CHECK (report_kind IN ('merchant', 'branch'))
);
";

const TRANSACTION_HISTORY_SQL: &str = r"
CREATE TABLE transaction_history (
    id BIGSERIAL PRIMARY KEY,
    batch_id UUID NOT NULL REFERENCES report_batches(batch_id),
    report_kind VARCHAR(16) NOT NULL,
    terminal_code VARCHAR(50) NOT NULL,
    terminal_name VARCHAR(255),
    local_txn BIGINT NOT NULL DEFAULT 0,
    local_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    vc_txn BIGINT NOT NULL DEFAULT 0,
    vc_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    vc_home NUMERIC(20, 2) NOT NULL DEFAULT 0,
    mc_txn BIGINT NOT NULL DEFAULT 0,
    mc_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    mc_home NUMERIC(20, 2) NOT NULL DEFAULT 0,
    cup_txn BIGINT NOT NULL DEFAULT 0,
    cup_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    cup_home NUMERIC(20, 2) NOT NULL DEFAULT 0,
    total_txn BIGINT NOT NULL DEFAULT 0,
    total_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    transaction_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_history_kind_terminal_date UNIQUE (report_kind, terminal_code, transaction_date)
);

-- Range scans for history exports and missing-date checks
CREATE INDEX idx_history_kind_date ON transaction_history(report_kind, transaction_date);

-- Per-terminal history exports
CREATE INDEX idx_history_terminal ON transaction_history(terminal_code, transaction_date);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS transaction_history CASCADE;
DROP TABLE IF EXISTS report_batches CASCADE;
DROP TABLE IF EXISTS currencies CASCADE;
DROP TABLE IF EXISTS terminals CASCADE;
DROP TABLE IF EXISTS branches CASCADE;
DROP TABLE IF EXISTS districts CASCADE;
";
