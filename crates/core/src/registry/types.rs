//! Terminal registry data types.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Placeholder used for labels that cannot be resolved.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Current state of one terminal as read from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSnapshot {
    /// Unique terminal code.
    pub code: String,
    /// Merchant display name.
    pub display_name: Option<String>,
    /// Owning branch name.
    pub branch_name: Option<String>,
    /// District of the owning branch.
    pub district_name: Option<String>,
    /// Retired terminals take no new history and no accumulation.
    pub is_retired: bool,
    /// Cumulative home-currency amount.
    pub grand_total: Decimal,
    /// Calendar day the grand total was last bumped.
    pub grand_total_updated_at: Option<NaiveDate>,
}

impl TerminalSnapshot {
    /// Merchant name or the placeholder.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    /// Branch name or the placeholder.
    #[must_use]
    pub fn branch_label(&self) -> &str {
        self.branch_name.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    /// District name or the placeholder.
    #[must_use]
    pub fn district_label(&self) -> &str {
        self.district_name.as_deref().unwrap_or(UNKNOWN_LABEL)
    }
}

/// In-memory registry lookup keyed by terminal code.
///
/// Loaded once per batch so rows never query the registry one by one.
#[derive(Debug, Clone, Default)]
pub struct TerminalDirectory {
    terminals: HashMap<String, TerminalSnapshot>,
}

impl TerminalDirectory {
    /// Builds the directory from registry snapshots.
    #[must_use]
    pub fn from_snapshots(snapshots: impl IntoIterator<Item = TerminalSnapshot>) -> Self {
        Self {
            terminals: snapshots
                .into_iter()
                .map(|t| (t.code.clone(), t))
                .collect(),
        }
    }

    /// Looks up a terminal by code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&TerminalSnapshot> {
        self.terminals.get(code)
    }

    /// Records a committed bump so later rows see it.
    pub fn record_bump(&mut self, code: &str, grand_total: Decimal, as_of: NaiveDate) {
        if let Some(terminal) = self.terminals.get_mut(code) {
            terminal.grand_total = grand_total;
            terminal.grand_total_updated_at = Some(as_of);
        }
    }

    /// Number of terminals loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terminals.len()
    }

    /// Whether the registry was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terminals.is_empty()
    }
}
