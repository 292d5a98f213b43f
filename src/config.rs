use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::interest::DayCountBasis;
use crate::types::{AccountType, OverpaymentPolicy};

/// configuration for the daily interest accrual engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestConfig {
    pub day_count_basis: DayCountBasis,
    /// balances below this accrue nothing
    pub minimum_balance_for_interest: Money,
    /// account types that accrue customer interest
    pub interest_bearing_types: Vec<AccountType>,
}

impl InterestConfig {
    /// standard savings setup: actual/365, interest from the first naira
    pub fn savings_default() -> Self {
        Self {
            day_count_basis: DayCountBasis::Actual365,
            minimum_balance_for_interest: Money::ZERO,
            interest_bearing_types: vec![AccountType::Savings, AccountType::FixedDeposit],
        }
    }

    /// setup with a minimum-balance threshold before interest is earned
    pub fn with_minimum_balance(minimum: Money) -> Self {
        Self {
            minimum_balance_for_interest: minimum,
            ..Self::savings_default()
        }
    }
}

impl Default for InterestConfig {
    fn default() -> Self {
        Self::savings_default()
    }
}

/// configuration for the loan repayment allocator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentConfig {
    pub overpayment_policy: OverpaymentPolicy,
}

impl Default for RepaymentConfig {
    fn default() -> Self {
        Self {
            overpayment_policy: OverpaymentPolicy::HoldUnallocated,
        }
    }
}
