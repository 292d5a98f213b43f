use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::types::{AccountStatus, AccountType, Currency};

/// customer deposit account
///
/// Balances are mutated only by the ledger entry poster and the lien
/// operations below. Invariant:
/// `available_balance = ledger_balance - lien_amount - uncleared_funds`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_number: String,
    pub customer_id: String,
    pub account_type: AccountType,
    pub currency: Currency,

    pub ledger_balance: Money,
    pub available_balance: Money,
    pub lien_amount: Money,
    pub uncleared_funds: Money,

    pub status: AccountStatus,
    pub post_no_debit: bool,

    // interest accrual tracking, posted periodically into the ledger
    pub accrued_interest_payable: Money,
    pub last_interest_accrual_date: Option<NaiveDate>,

    pub last_activity_date: DateTime<Utc>,
    pub opened_date: DateTime<Utc>,
    pub closed_date: Option<DateTime<Utc>>,
}

impl Account {
    /// open a new zero-balance account with a generated NUBAN
    pub fn open(
        customer_id: String,
        account_type: AccountType,
        currency: Currency,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Self {
        let account_number = generate_nuban(WEEZY_BANK_CODE);
        Self::open_with_number(account_number, customer_id, account_type, currency, time_provider, events)
    }

    /// open a new zero-balance account with a caller-supplied account number
    pub fn open_with_number(
        account_number: String,
        customer_id: String,
        account_type: AccountType,
        currency: Currency,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Self {
        let now = time_provider.now();

        events.emit(Event::AccountOpened {
            account_number: account_number.clone(),
            currency,
            timestamp: now,
        });

        Self {
            account_number,
            customer_id,
            account_type,
            currency,
            ledger_balance: Money::ZERO,
            available_balance: Money::ZERO,
            lien_amount: Money::ZERO,
            uncleared_funds: Money::ZERO,
            status: AccountStatus::Active,
            post_no_debit: false,
            accrued_interest_payable: Money::ZERO,
            last_interest_accrual_date: None,
            last_activity_date: now,
            opened_date: now,
            closed_date: None,
        }
    }

    /// open an account and post an initial deposit as a system credit
    pub fn open_with_deposit(
        customer_id: String,
        account_type: AccountType,
        currency: Currency,
        initial_deposit: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<(Self, crate::ledger::LedgerEntry)> {
        let mut account = Self::open(customer_id, account_type, currency, time_provider, events);

        let request = crate::ledger::PostingRequest::new(
            Uuid::new_v4(),
            crate::types::EntryType::Credit,
            initial_deposit,
            currency,
            format!("Initial deposit for account opening {}", account.account_number),
            time_provider.now(),
        )
        .as_system_tx();

        let entry = crate::ledger::post_entry(&mut account, &request, time_provider, events)?;
        Ok((account, entry))
    }

    /// check the balance identity
    pub fn balances_consistent(&self) -> bool {
        self.available_balance == self.ledger_balance - self.lien_amount - self.uncleared_funds
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// earmark funds: reduces available balance, leaves ledger balance intact
    pub fn place_lien(
        &mut self,
        amount: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<()> {
        if !self.is_active() {
            return Err(LedgerError::AccountNotActive { status: self.status });
        }
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount { amount });
        }
        if self.available_balance < amount {
            return Err(LedgerError::InsufficientFunds {
                available: self.available_balance,
                requested: amount,
            });
        }

        self.lien_amount += amount;
        self.available_balance -= amount;
        self.last_activity_date = time_provider.now();

        events.emit(Event::LienPlaced {
            account_number: self.account_number.clone(),
            amount,
            available_after: self.available_balance,
            timestamp: self.last_activity_date,
        });
        Ok(())
    }

    /// release an earmark; `None` releases the full outstanding lien
    pub fn release_lien(
        &mut self,
        amount: Option<Money>,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<Money> {
        let mut to_release = amount.unwrap_or(self.lien_amount);
        if to_release > self.lien_amount {
            to_release = self.lien_amount;
        }
        if !to_release.is_positive() {
            return Err(LedgerError::InvalidAmount { amount: to_release });
        }

        self.lien_amount -= to_release;
        self.available_balance += to_release;
        self.last_activity_date = time_provider.now();

        events.emit(Event::LienReleased {
            account_number: self.account_number.clone(),
            amount: to_release,
            available_after: self.available_balance,
            timestamp: self.last_activity_date,
        });
        Ok(to_release)
    }

    /// close the account; ledger balance must be exactly zero
    pub fn close(
        &mut self,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<()> {
        if !self.ledger_balance.is_zero() {
            return Err(LedgerError::InvalidOperation {
                message: format!(
                    "account {} balance must be zero before closing, found {}",
                    self.account_number, self.ledger_balance
                ),
            });
        }

        let now = time_provider.now();
        self.update_status(AccountStatus::Closed, now, events);
        self.closed_date = Some(now);
        Ok(())
    }

    /// administrative status change
    pub fn update_status(
        &mut self,
        new_status: AccountStatus,
        timestamp: DateTime<Utc>,
        events: &mut EventStore,
    ) {
        if new_status == self.status {
            return;
        }
        let old_status = self.status;
        self.status = new_status;
        self.last_activity_date = timestamp;

        events.emit(Event::AccountStatusChanged {
            account_number: self.account_number.clone(),
            old_status,
            new_status,
            timestamp,
        });
        if new_status == AccountStatus::Closed {
            events.emit(Event::AccountClosed {
                account_number: self.account_number.clone(),
                timestamp,
            });
        }
    }
}

pub const WEEZY_BANK_CODE: &str = "999999";

/// generate a NUBAN-style account number: 9-digit serial + weighted check digit
pub fn generate_nuban(bank_code: &str) -> String {
    let serial = (Uuid::new_v4().as_u128() % 1_000_000_000) as u64;
    let serial = format!("{:09}", serial);
    let check = nuban_check_digit(bank_code, &serial);
    format!("{}{}", serial, check)
}

/// weighted-modulo check digit over the first 3 bank code digits + serial
fn nuban_check_digit(bank_code: &str, serial: &str) -> u32 {
    const WEIGHTS: [u32; 12] = [3, 7, 3, 3, 7, 3, 3, 7, 3, 3, 7, 3];

    let digits: Vec<u32> = bank_code
        .chars()
        .take(3)
        .chain(serial.chars())
        .filter_map(|c| c.to_digit(10))
        .collect();

    let s: u32 = digits
        .iter()
        .zip(WEIGHTS.iter())
        .map(|(d, w)| d * w)
        .sum::<u32>()
        % 10;
    (10 - s) % 10
}

/// summary of a dormancy sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DormancySummary {
    pub made_inactive: usize,
    pub made_dormant: usize,
}

/// batch sweep: idle ACTIVE accounts become INACTIVE, long-idle INACTIVE become DORMANT
pub fn process_dormancy(
    accounts: &mut [Account],
    inactivity_period_days: i64,
    dormancy_period_days: i64,
    time_provider: &SafeTimeProvider,
    events: &mut EventStore,
) -> DormancySummary {
    let now = time_provider.now();
    let inactivity_threshold = now - chrono::Duration::days(inactivity_period_days);
    let dormancy_threshold = now - chrono::Duration::days(dormancy_period_days);

    let mut summary = DormancySummary {
        made_inactive: 0,
        made_dormant: 0,
    };

    for account in accounts.iter_mut() {
        match account.status {
            AccountStatus::Active if account.last_activity_date < inactivity_threshold => {
                account.update_status(AccountStatus::Inactive, now, events);
                summary.made_inactive += 1;
            }
            AccountStatus::Inactive if account.last_activity_date < dormancy_threshold => {
                account.update_status(AccountStatus::Dormant, now, events);
                summary.made_dormant += 1;
            }
            _ => {}
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn open_funded_account(time: &SafeTimeProvider, events: &mut EventStore) -> Account {
        let mut account = Account::open(
            "CUST-001".to_string(),
            AccountType::Savings,
            Currency::NGN,
            time,
            events,
        );
        account.ledger_balance = Money::from_major(1_000);
        account.available_balance = Money::from_major(1_000);
        account
    }

    #[test]
    fn test_nuban_shape_and_check_digit() {
        let nuban = generate_nuban(WEEZY_BANK_CODE);
        assert_eq!(nuban.len(), 10);
        assert!(nuban.chars().all(|c| c.is_ascii_digit()));

        let serial = &nuban[..9];
        let check: u32 = nuban[9..].parse().unwrap();
        assert_eq!(nuban_check_digit(WEEZY_BANK_CODE, serial), check);
    }

    #[test]
    fn test_open_with_initial_deposit() {
        let time = test_time();
        let mut events = EventStore::new();
        let (account, entry) = Account::open_with_deposit(
            "CUST-002".to_string(),
            AccountType::Savings,
            Currency::NGN,
            Money::from_major(500),
            &time,
            &mut events,
        )
        .unwrap();

        assert_eq!(account.ledger_balance, Money::from_major(500));
        assert_eq!(account.available_balance, Money::from_major(500));
        assert_eq!(entry.balance_before, Money::ZERO);
        assert_eq!(entry.balance_after, Money::from_major(500));
        assert!(entry.narration.starts_with("Initial deposit"));
    }

    #[test]
    fn test_lien_reduces_available_not_ledger() {
        let time = test_time();
        let mut events = EventStore::new();
        let mut account = open_funded_account(&time, &mut events);

        account.place_lien(Money::from_major(300), &time, &mut events).unwrap();

        assert_eq!(account.ledger_balance, Money::from_major(1_000));
        assert_eq!(account.available_balance, Money::from_major(700));
        assert_eq!(account.lien_amount, Money::from_major(300));
        assert!(account.balances_consistent());
    }

    #[test]
    fn test_lien_exceeding_available_fails() {
        let time = test_time();
        let mut events = EventStore::new();
        let mut account = open_funded_account(&time, &mut events);

        let result = account.place_lien(Money::from_major(1_001), &time, &mut events);
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(account.available_balance, Money::from_major(1_000));
    }

    #[test]
    fn test_release_lien_full_and_partial() {
        let time = test_time();
        let mut events = EventStore::new();
        let mut account = open_funded_account(&time, &mut events);
        account.place_lien(Money::from_major(500), &time, &mut events).unwrap();

        let released = account
            .release_lien(Some(Money::from_major(200)), &time, &mut events)
            .unwrap();
        assert_eq!(released, Money::from_major(200));
        assert_eq!(account.lien_amount, Money::from_major(300));

        // None releases the remainder
        let released = account.release_lien(None, &time, &mut events).unwrap();
        assert_eq!(released, Money::from_major(300));
        assert_eq!(account.lien_amount, Money::ZERO);
        assert_eq!(account.available_balance, Money::from_major(1_000));
        assert!(account.balances_consistent());
    }

    #[test]
    fn test_close_requires_zero_balance() {
        let time = test_time();
        let mut events = EventStore::new();
        let mut account = open_funded_account(&time, &mut events);

        assert!(account.close(&time, &mut events).is_err());

        account.ledger_balance = Money::ZERO;
        account.available_balance = Money::ZERO;
        account.close(&time, &mut events).unwrap();
        assert_eq!(account.status, AccountStatus::Closed);
        assert!(account.closed_date.is_some());
    }

    #[test]
    fn test_dormancy_sweep() {
        let time = test_time();
        let control = time.test_control().unwrap();
        let mut events = EventStore::new();

        let mut accounts = vec![
            open_funded_account(&time, &mut events),
            open_funded_account(&time, &mut events),
        ];

        // first sweep after 200 idle days: active accounts go inactive
        control.advance(chrono::Duration::days(200));
        let summary = process_dormancy(&mut accounts, 180, 365, &time, &mut events);
        assert_eq!(summary.made_inactive, 2);
        assert_eq!(summary.made_dormant, 0);

        // the sweep itself stamps activity, so advance past the dormancy window
        control.advance(chrono::Duration::days(400));
        let summary = process_dormancy(&mut accounts, 180, 365, &time, &mut events);
        assert_eq!(summary.made_dormant, 2);
        assert_eq!(accounts[0].status, AccountStatus::Dormant);
    }
}
