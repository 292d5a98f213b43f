pub mod entry;
pub mod posting;
pub mod transfer;

pub use entry::{GlAccount, LedgerEntry};
pub use posting::{post_entry, reverse_entry, PostingRequest};
pub use transfer::{post_double_entry, TransferRequest, TransferSide};
