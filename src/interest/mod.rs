pub mod accrual;
pub mod posting;

pub use accrual::{AccrualEngine, AccrualRun, DayCountBasis, InterestAccrualLog};
pub use posting::{post_accrued_interest, run_interest_posting, PostingRun};
