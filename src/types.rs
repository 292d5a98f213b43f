use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier linking both legs of a posting to one financial transaction
pub type TransactionId = Uuid;

/// unique identifier for a ledger entry
pub type EntryId = Uuid;

/// supported account currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    NGN,
    USD,
    EUR,
    GBP,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Currency::NGN => "NGN",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
        };
        write!(f, "{}", code)
    }
}

/// deposit account types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Savings,
    Current,
    FixedDeposit,
}

/// account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    /// open and transacting
    Active,
    /// no transactions for a defined period
    Inactive,
    /// inactive for the longer, regulatory-defined period
    Dormant,
    /// closed, balance settled to zero
    Closed,
    /// blocked by operations (fraud suspicion, court order)
    Blocked,
}

/// side of a ledger posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    Debit,
    Credit,
}

/// loan account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// loan ongoing, payments expected
    Active,
    /// all outstanding buckets cleared
    PaidOff,
    /// one or more payments missed
    Overdue,
    /// seriously delinquent, recovery in progress
    Defaulted,
    Restructured,
    WrittenOff,
}

/// what to do with repayment amount left after principal is fully covered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverpaymentPolicy {
    /// record the residual on the repayment for the caller to sweep
    HoldUnallocated,
    /// report the residual for refund processing
    Refund,
}

/// how a repayment was split across outstanding buckets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RepaymentAllocation {
    pub to_penalties: Money,
    pub to_fees: Money,
    pub to_interest: Money,
    pub to_principal: Money,
    pub unallocated: Money,
}

impl RepaymentAllocation {
    pub fn total_applied(&self) -> Money {
        self.to_penalties + self.to_fees + self.to_interest + self.to_principal
    }
}
