//! In-memory repository doubles shared by the service tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::NaiveDate;
use posrecon_shared::CurrencyCode;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::currency::ExchangeRate;
use crate::ledger::{
    LedgerBatch, LedgerFilter, ReportKind, SumMetric, TerminalSum, TransactionHistoryRecord,
};
use crate::registry::TerminalSnapshot;
use crate::repository::{ExchangeRateStore, StoreError, TerminalRegistry, TransactionLedger};

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
}

pub fn terminal(code: &str, grand_total: Decimal) -> TerminalSnapshot {
    TerminalSnapshot {
        code: code.to_string(),
        display_name: Some(format!("Merchant {code}")),
        branch_name: Some("Main Branch".to_string()),
        district_name: Some("Central".to_string()),
        is_retired: false,
        grand_total,
        grand_total_updated_at: None,
    }
}

#[derive(Default)]
pub struct InMemoryRegistry {
    terminals: Mutex<Vec<TerminalSnapshot>>,
    bumps: Mutex<Vec<(String, Decimal, NaiveDate)>>,
    vanished: Mutex<HashSet<String>>,
    concurrent: Mutex<HashMap<String, Decimal>>,
}

impl InMemoryRegistry {
    pub fn with(terminals: Vec<TerminalSnapshot>) -> Self {
        Self {
            terminals: Mutex::new(terminals),
            ..Self::default()
        }
    }

    pub fn terminal(&self, code: &str) -> Option<TerminalSnapshot> {
        self.terminals
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.code == code)
            .cloned()
    }

    pub fn bump_count(&self) -> usize {
        self.bumps.lock().unwrap().len()
    }

    /// The terminal stays listed but disappears before its bump lands.
    pub fn vanish_on_bump(&self, code: &str) {
        self.vanished.lock().unwrap().insert(code.to_string());
    }

    /// Another batch raises the terminal to `total` for the same day just
    /// before this batch's bump lands.
    pub fn bump_concurrently(&self, code: &str, total: Decimal) {
        self.concurrent
            .lock()
            .unwrap()
            .insert(code.to_string(), total);
    }
}

impl TerminalRegistry for InMemoryRegistry {
    async fn lookup_all(&self) -> Result<Vec<TerminalSnapshot>, StoreError> {
        Ok(self.terminals.lock().unwrap().clone())
    }

    async fn bump_grand_total(
        &self,
        code: &str,
        new_total: Decimal,
        as_of: NaiveDate,
    ) -> Result<bool, StoreError> {
        if self.vanished.lock().unwrap().contains(code) {
            return Err(StoreError::NotFound(format!("terminal {code}")));
        }

        let mut terminals = self.terminals.lock().unwrap();
        let terminal = terminals
            .iter_mut()
            .find(|t| t.code == code)
            .ok_or_else(|| StoreError::NotFound(format!("terminal {code}")))?;
        if let Some(total) = self.concurrent.lock().unwrap().remove(code) {
            terminal.grand_total = total;
            terminal.grand_total_updated_at = Some(as_of);
        }
        if terminal.grand_total_updated_at == Some(as_of) {
            return Ok(false);
        }
        terminal.grand_total = new_total;
        terminal.grand_total_updated_at = Some(as_of);

        self.bumps
            .lock()
            .unwrap()
            .push((code.to_string(), new_total, as_of));
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryRates {
    rates: Mutex<HashMap<CurrencyCode, ExchangeRate>>,
}

impl InMemoryRates {
    /// VC 50, MC 40, CUP 7, all set on `date`.
    pub fn fresh_on(date: NaiveDate) -> Self {
        let store = Self::default();
        store.set(CurrencyCode::Vc, dec!(50), date);
        store.set(CurrencyCode::Mc, dec!(40), date);
        store.set(CurrencyCode::Cup, dec!(7), date);
        store
    }

    pub fn set(&self, currency: CurrencyCode, rate: Decimal, last_updated: NaiveDate) {
        self.rates
            .lock()
            .unwrap()
            .insert(currency, ExchangeRate::new(currency, rate, last_updated));
    }
}

impl ExchangeRateStore for InMemoryRates {
    async fn lookup_rates(&self, codes: &[CurrencyCode]) -> Result<Vec<ExchangeRate>, StoreError> {
        let rates = self.rates.lock().unwrap();
        Ok(codes.iter().filter_map(|c| rates.get(c).cloned()).collect())
    }
}

#[derive(Default)]
pub struct InMemoryLedger {
    markers: Mutex<HashSet<(ReportKind, NaiveDate)>>,
    racing: Mutex<HashSet<(ReportKind, NaiveDate)>>,
    records: Mutex<Vec<TransactionHistoryRecord>>,
    fail_writes: Mutex<bool>,
}

impl InMemoryLedger {
    pub fn records(&self) -> Vec<TransactionHistoryRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.lock().unwrap().len()
    }

    pub fn seed(&self, records: Vec<TransactionHistoryRecord>) {
        let mut markers = self.markers.lock().unwrap();
        for record in &records {
            markers.insert((record.report_kind, record.transaction_date));
        }
        self.records.lock().unwrap().extend(records);
    }

    /// Another writer claims the day after the pre-check has passed.
    pub fn claim_behind_check(&self, kind: ReportKind, date: NaiveDate) {
        self.racing.lock().unwrap().insert((kind, date));
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }
}

impl TransactionLedger for InMemoryLedger {
    async fn exists_for_date(&self, kind: ReportKind, date: NaiveDate) -> Result<bool, StoreError> {
        Ok(self.markers.lock().unwrap().contains(&(kind, date)))
    }

    async fn bulk_insert(&self, batch: LedgerBatch) -> Result<u64, StoreError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(StoreError::backend("connection reset"));
        }

        let key = (batch.report_kind, batch.transaction_date);
        let mut markers = self.markers.lock().unwrap();
        if markers.contains(&key) || self.racing.lock().unwrap().contains(&key) {
            return Err(StoreError::Conflict(format!(
                "batch {} {}",
                batch.report_kind, batch.transaction_date
            )));
        }
        markers.insert(key);

        let written = batch.records.len() as u64;
        self.records.lock().unwrap().extend(batch.records);
        Ok(written)
    }

    async fn query(&self, filter: &LedgerFilter) -> Result<Vec<TransactionHistoryRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn group_sum_by_terminal(
        &self,
        filter: &LedgerFilter,
        metric: SumMetric,
    ) -> Result<Vec<TerminalSum>, StoreError> {
        let mut sums: Vec<TerminalSum> = Vec::new();
        for record in self.records.lock().unwrap().iter().filter(|r| filter.matches(r)) {
            let value = metric.value_of(record);
            match sums.iter_mut().find(|s| s.terminal_code == record.terminal_code) {
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
        let mut dates: Vec<NaiveDate> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| filter.matches(r))
            .map(|r| r.transaction_date)
            .collect();
        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }
}
