use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{AccountStatus, Currency, EntryType, TransactionId};

/// all events emitted by balance-affecting operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // account lifecycle events
    AccountOpened {
        account_number: String,
        currency: Currency,
        timestamp: DateTime<Utc>,
    },
    AccountClosed {
        account_number: String,
        timestamp: DateTime<Utc>,
    },
    AccountStatusChanged {
        account_number: String,
        old_status: AccountStatus,
        new_status: AccountStatus,
        timestamp: DateTime<Utc>,
    },

    // ledger events
    EntryPosted {
        account_ref: String,
        transaction_id: TransactionId,
        entry_type: EntryType,
        amount: Money,
        balance_after: Money,
        timestamp: DateTime<Utc>,
    },
    TransferPosted {
        transaction_id: TransactionId,
        debit_ref: String,
        credit_ref: String,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    LienPlaced {
        account_number: String,
        amount: Money,
        available_after: Money,
        timestamp: DateTime<Utc>,
    },
    LienReleased {
        account_number: String,
        amount: Money,
        available_after: Money,
        timestamp: DateTime<Utc>,
    },

    // loan events
    LoanDisbursed {
        loan_account_number: String,
        principal: Money,
        interest_rate_pa: Rate,
        tenor_months: u32,
        timestamp: DateTime<Utc>,
    },
    RepaymentReceived {
        loan_account_number: String,
        amount: Money,
        to_penalties: Money,
        to_fees: Money,
        to_interest: Money,
        to_principal: Money,
        timestamp: DateTime<Utc>,
    },
    OverpaymentHeld {
        loan_account_number: String,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    OverpaymentRefundDue {
        loan_account_number: String,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    LoanPaidOff {
        loan_account_number: String,
        timestamp: DateTime<Utc>,
    },
    FeeCharged {
        loan_account_number: String,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    PenaltyCharged {
        loan_account_number: String,
        amount: Money,
        timestamp: DateTime<Utc>,
    },

    // interest events
    InterestAccrued {
        account_number: String,
        amount: Money,
        accrual_date: NaiveDate,
    },
    InterestPosted {
        account_number: String,
        transaction_id: TransactionId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    ResidualAccrualCleared {
        account_number: String,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
