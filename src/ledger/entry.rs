use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{Currency, EntryId, EntryType, TransactionId};

/// one immutable posting leg
///
/// Never updated or deleted; a correction is a new entry with
/// `is_reversal = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub transaction_id: TransactionId,
    /// customer account number or GL code
    pub account_ref: String,
    pub entry_type: EntryType,
    pub amount: Money,
    pub currency: Currency,
    pub narration: String,
    /// booking date
    pub transaction_date: DateTime<Utc>,
    /// date the funds are considered valued
    pub value_date: DateTime<Utc>,
    pub balance_before: Money,
    pub balance_after: Money,
    pub channel: String,
    pub external_reference: Option<String>,
    pub is_reversal: bool,
}

/// bank-internal general ledger account, the counter-side of cash and
/// interest postings
///
/// GL accounts carry no status or funds checks and may run negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlAccount {
    pub gl_code: String,
    pub name: String,
    pub currency: Currency,
    pub balance: Money,
}

impl GlAccount {
    pub fn new(gl_code: impl Into<String>, name: impl Into<String>, currency: Currency) -> Self {
        Self {
            gl_code: gl_code.into(),
            name: name.into(),
            currency,
            balance: Money::ZERO,
        }
    }
}
