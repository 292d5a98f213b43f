use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use uuid::Uuid;

use crate::account::Account;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::types::{Currency, EntryType, TransactionId};

use super::entry::LedgerEntry;

/// everything a single posting leg needs
#[derive(Debug, Clone)]
pub struct PostingRequest {
    pub transaction_id: TransactionId,
    pub entry_type: EntryType,
    pub amount: Money,
    pub currency: Currency,
    pub narration: String,
    pub value_date: DateTime<Utc>,
    pub channel: String,
    pub external_reference: Option<String>,
    /// system transactions (interest posting, reversals, account opening
    /// credits) bypass status and post-no-debit enforcement
    pub is_system_tx: bool,
}

impl PostingRequest {
    pub fn new(
        transaction_id: TransactionId,
        entry_type: EntryType,
        amount: Money,
        currency: Currency,
        narration: impl Into<String>,
        value_date: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id,
            entry_type,
            amount,
            currency,
            narration: narration.into(),
            value_date,
            channel: "SYSTEM".to_string(),
            external_reference: None,
            is_system_tx: false,
        }
    }

    pub fn via_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.external_reference = Some(reference.into());
        self
    }

    pub fn as_system_tx(mut self) -> Self {
        self.is_system_tx = true;
        self
    }
}

/// validate one leg against current account state without mutating anything
pub(crate) fn validate_entry(
    account: &Account,
    entry_type: EntryType,
    amount: Money,
    currency: Currency,
    is_system_tx: bool,
) -> Result<()> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidAmount { amount });
    }

    if account.currency != currency {
        return Err(LedgerError::CurrencyMismatch {
            account: account.currency,
            entry: currency,
        });
    }

    if !is_system_tx && !account.is_active() {
        return Err(LedgerError::AccountNotActive {
            status: account.status,
        });
    }

    if entry_type == EntryType::Debit && !is_system_tx {
        if account.post_no_debit {
            return Err(LedgerError::PostNoDebit {
                account_number: account.account_number.clone(),
            });
        }
        if account.available_balance < amount {
            return Err(LedgerError::InsufficientFunds {
                available: account.available_balance,
                requested: amount,
            });
        }
    }

    Ok(())
}

/// mutate balances and build the entry record; validation must already have passed
pub(crate) fn apply_entry(
    account: &mut Account,
    request: &PostingRequest,
    amount: Money,
    is_reversal: bool,
    time_provider: &SafeTimeProvider,
    events: &mut EventStore,
) -> LedgerEntry {
    let balance_before = account.ledger_balance;

    match request.entry_type {
        EntryType::Debit => {
            account.ledger_balance -= amount;
            account.available_balance -= amount;
        }
        EntryType::Credit => {
            account.ledger_balance += amount;
            account.available_balance += amount;
        }
    }

    let now = time_provider.now();
    account.last_activity_date = now;

    let entry = LedgerEntry {
        id: Uuid::new_v4(),
        transaction_id: request.transaction_id,
        account_ref: account.account_number.clone(),
        entry_type: request.entry_type,
        amount,
        currency: request.currency,
        narration: request.narration.clone(),
        transaction_date: now,
        value_date: request.value_date,
        balance_before,
        balance_after: account.ledger_balance,
        channel: request.channel.clone(),
        external_reference: request.external_reference.clone(),
        is_reversal,
    };

    events.emit(Event::EntryPosted {
        account_ref: entry.account_ref.clone(),
        transaction_id: entry.transaction_id,
        entry_type: entry.entry_type,
        amount: entry.amount,
        balance_after: entry.balance_after,
        timestamp: now,
    });

    entry
}

/// post one debit or credit leg against an account
///
/// The single funnel for balance mutation: every leg is validated here and
/// paired with exactly one immutable entry record. Amounts are posted at
/// 2 decimal places. The caller owns the unit-of-work boundary and discards
/// the account state on error.
pub fn post_entry(
    account: &mut Account,
    request: &PostingRequest,
    time_provider: &SafeTimeProvider,
    events: &mut EventStore,
) -> Result<LedgerEntry> {
    let amount = request.amount.round_dp(2);
    validate_entry(account, request.entry_type, amount, request.currency, request.is_system_tx)?;
    Ok(apply_entry(account, request, amount, false, time_provider, events))
}

/// post the opposite leg of an earlier entry, flagged as a reversal
///
/// Reversals are administrative system transactions: they land even on
/// blocked or post-no-debit accounts.
pub fn reverse_entry(
    account: &mut Account,
    original: &LedgerEntry,
    time_provider: &SafeTimeProvider,
    events: &mut EventStore,
) -> Result<LedgerEntry> {
    if original.account_ref != account.account_number {
        return Err(LedgerError::InvalidOperation {
            message: format!(
                "entry {} belongs to {}, not {}",
                original.id, original.account_ref, account.account_number
            ),
        });
    }

    let reversed_type = match original.entry_type {
        EntryType::Debit => EntryType::Credit,
        EntryType::Credit => EntryType::Debit,
    };

    let request = PostingRequest {
        transaction_id: original.transaction_id,
        entry_type: reversed_type,
        amount: original.amount,
        currency: original.currency,
        narration: format!("REVERSAL: {}", original.narration),
        value_date: time_provider.now(),
        channel: original.channel.clone(),
        external_reference: original.external_reference.clone(),
        is_system_tx: true,
    };

    validate_entry(account, reversed_type, original.amount, original.currency, true)?;
    Ok(apply_entry(account, &request, original.amount, true, time_provider, events))
}
