pub mod account;
pub mod amortization;
pub mod repayment;

pub use account::LoanAccount;
pub use amortization::{RepaymentSchedule, ScheduledInstallment};
pub use repayment::{LoanRepayment, RepaymentAllocator};
