use thiserror::Error;

use crate::decimal::Money;
use crate::types::{AccountStatus, Currency, LoanStatus};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("not found: {resource}")]
    NotFound {
        resource: String,
    },

    #[error("invalid operation: {message}")]
    InvalidOperation {
        message: String,
    },

    #[error("insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Money,
        requested: Money,
    },

    #[error("currency mismatch: account holds {account}, entry is {entry}")]
    CurrencyMismatch {
        account: Currency,
        entry: Currency,
    },

    #[error("post-no-debit restriction on account {account_number}")]
    PostNoDebit {
        account_number: String,
    },

    #[error("invalid amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("account not active: current status is {status:?}")]
    AccountNotActive {
        status: AccountStatus,
    },

    #[error("loan not open for repayment: current status is {status:?}")]
    LoanClosed {
        status: LoanStatus,
    },

    #[error("invalid amortization terms: {message}")]
    InvalidAmortizationTerms {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
