pub mod account;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod ledger;
pub mod loans;
pub mod types;
pub mod views;

// re-export key types
pub use account::{generate_nuban, process_dormancy, Account, DormancySummary};
pub use config::{InterestConfig, RepaymentConfig};
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use interest::{
    post_accrued_interest, run_interest_posting, AccrualEngine, AccrualRun, DayCountBasis,
    InterestAccrualLog, PostingRun,
};
pub use ledger::{
    post_double_entry, post_entry, reverse_entry, GlAccount, LedgerEntry, PostingRequest,
    TransferRequest, TransferSide,
};
pub use loans::{
    LoanAccount, LoanRepayment, RepaymentAllocator, RepaymentSchedule, ScheduledInstallment,
};
pub use types::{
    AccountStatus, AccountType, Currency, EntryType, LoanStatus, OverpaymentPolicy,
    RepaymentAllocation, TransactionId,
};
pub use views::{AccountView, LoanView};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
