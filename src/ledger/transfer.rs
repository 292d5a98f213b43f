use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use uuid::Uuid;

use crate::account::Account;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::types::{Currency, EntryType, TransactionId};

use super::entry::{GlAccount, LedgerEntry};
use super::posting::{apply_entry, validate_entry, PostingRequest};

/// one side of a double-entry transaction
pub enum TransferSide<'a> {
    Customer(&'a mut Account),
    Gl(&'a mut GlAccount),
}

impl<'a> TransferSide<'a> {
    fn reference(&self) -> String {
        match self {
            TransferSide::Customer(account) => account.account_number.clone(),
            TransferSide::Gl(gl) => gl.gl_code.clone(),
        }
    }

    /// GL legs only need the currency to line up; customer legs get the full
    /// posting checks
    fn validate(
        &self,
        entry_type: EntryType,
        amount: Money,
        currency: Currency,
        is_system_tx: bool,
    ) -> Result<()> {
        match self {
            TransferSide::Customer(account) => {
                validate_entry(account, entry_type, amount, currency, is_system_tx)
            }
            TransferSide::Gl(gl) => {
                if !amount.is_positive() {
                    return Err(LedgerError::InvalidAmount { amount });
                }
                if gl.currency != currency {
                    return Err(LedgerError::CurrencyMismatch {
                        account: gl.currency,
                        entry: currency,
                    });
                }
                Ok(())
            }
        }
    }

    fn apply(
        &mut self,
        request: &PostingRequest,
        amount: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> LedgerEntry {
        match self {
            TransferSide::Customer(account) => {
                apply_entry(account, request, amount, false, time_provider, events)
            }
            TransferSide::Gl(gl) => {
                let balance_before = gl.balance;
                match request.entry_type {
                    EntryType::Debit => gl.balance -= amount,
                    EntryType::Credit => gl.balance += amount,
                }

                let now = time_provider.now();
                let entry = LedgerEntry {
                    id: Uuid::new_v4(),
                    transaction_id: request.transaction_id,
                    account_ref: gl.gl_code.clone(),
                    entry_type: request.entry_type,
                    amount,
                    currency: request.currency,
                    narration: request.narration.clone(),
                    transaction_date: now,
                    value_date: request.value_date,
                    balance_before,
                    balance_after: gl.balance,
                    channel: request.channel.clone(),
                    external_reference: request.external_reference.clone(),
                    is_reversal: false,
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
        }
    }
}

/// parameters shared by both legs of a double-entry posting
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub transaction_id: TransactionId,
    pub amount: Money,
    pub currency: Currency,
    pub narration: String,
    pub value_date: DateTime<Utc>,
    pub channel: String,
    pub external_reference: Option<String>,
    pub is_system_tx: bool,
}

impl TransferRequest {
    pub fn new(
        transaction_id: TransactionId,
        amount: Money,
        currency: Currency,
        narration: impl Into<String>,
        value_date: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id,
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

    fn leg(&self, entry_type: EntryType, leg_suffix: &str) -> PostingRequest {
        PostingRequest {
            transaction_id: self.transaction_id,
            entry_type,
            amount: self.amount,
            currency: self.currency,
            narration: self.narration.clone(),
            value_date: self.value_date,
            channel: self.channel.clone(),
            external_reference: self
                .external_reference
                .as_ref()
                .map(|r| format!("{}{}", r, leg_suffix)),
            is_system_tx: self.is_system_tx,
        }
    }
}

/// post debit and credit legs as one all-or-nothing unit
///
/// Both legs are validated against current state before either balance
/// moves, so a failure on either side leaves both untouched. The debit leg
/// is validated first: an available-balance shortfall surfaces as
/// `InsufficientFunds` ahead of any credit-side failure. Both legs share
/// the transaction id, so the transaction is reconstructable from either.
pub fn post_double_entry(
    mut debit: TransferSide<'_>,
    mut credit: TransferSide<'_>,
    request: &TransferRequest,
    time_provider: &SafeTimeProvider,
    events: &mut EventStore,
) -> Result<(LedgerEntry, LedgerEntry)> {
    let amount = request.amount.round_dp(2);

    debit.validate(EntryType::Debit, amount, request.currency, request.is_system_tx)?;
    credit.validate(EntryType::Credit, amount, request.currency, request.is_system_tx)?;

    let debit_entry = debit.apply(
        &request.leg(EntryType::Debit, "_DR"),
        amount,
        time_provider,
        events,
    );
    let credit_entry = credit.apply(
        &request.leg(EntryType::Credit, "_CR"),
        amount,
        time_provider,
        events,
    );

    events.emit(Event::TransferPosted {
        transaction_id: request.transaction_id,
        debit_ref: debit_entry.account_ref.clone(),
        credit_ref: credit_entry.account_ref.clone(),
        amount,
        timestamp: time_provider.now(),
    });

    Ok((debit_entry, credit_entry))
}
