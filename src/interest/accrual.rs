use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::config::InterestConfig;
use crate::decimal::{Money, Rate};
use crate::events::{Event, EventStore};

/// day count convention for daily interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayCountBasis {
    /// actual days / 365
    Actual365,
    /// actual days / 360
    Actual360,
}

impl DayCountBasis {
    pub fn year_basis(&self) -> u32 {
        match self {
            DayCountBasis::Actual365 => 365,
            DayCountBasis::Actual360 => 360,
        }
    }
}

/// one accrual computed for one account on one day
///
/// Kept at 4 decimal places until the posting sweep rounds to the kobo,
/// limiting compounded rounding error across a month of accruals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestAccrualLog {
    pub account_number: String,
    pub accrual_date: NaiveDate,
    pub amount_accrued: Money,
    pub interest_rate_pa_used: Rate,
    pub balance_subject_to_interest: Money,
    pub is_posted: bool,
    pub posting_date: Option<NaiveDate>,
}

/// engine for the daily accrual phase: computes interest owed without
/// moving ledger balances
pub struct AccrualEngine {
    config: InterestConfig,
}

impl AccrualEngine {
    pub fn new(config: InterestConfig) -> Self {
        Self { config }
    }

    /// accrue one day of interest for one account
    ///
    /// Returns `None` when the account is ineligible (not active, not an
    /// interest-bearing type, already accrued for the date), the balance is
    /// below the configured minimum, or the computed amount rounds to zero.
    pub fn accrue_daily(
        &self,
        account: &mut Account,
        rate_pa: Rate,
        calculation_date: NaiveDate,
        events: &mut EventStore,
    ) -> Option<InterestAccrualLog> {
        if !account.is_active() {
            return None;
        }
        if !self.config.interest_bearing_types.contains(&account.account_type) {
            return None;
        }
        if let Some(last) = account.last_interest_accrual_date {
            if last >= calculation_date {
                return None;
            }
        }

        let balance = account.ledger_balance;
        if !balance.is_positive() || balance < self.config.minimum_balance_for_interest {
            return None;
        }

        let daily_rate = rate_pa.daily_rate(self.config.day_count_basis.year_basis());
        let amount = (balance * daily_rate.as_decimal()).round_dp(4);
        if !amount.is_positive() {
            return None;
        }

        account.accrued_interest_payable += amount;
        account.last_interest_accrual_date = Some(calculation_date);

        events.emit(Event::InterestAccrued {
            account_number: account.account_number.clone(),
            amount,
            accrual_date: calculation_date,
        });

        Some(InterestAccrualLog {
            account_number: account.account_number.clone(),
            accrual_date: calculation_date,
            amount_accrued: amount,
            interest_rate_pa_used: rate_pa,
            balance_subject_to_interest: balance,
            is_posted: false,
            posting_date: None,
        })
    }

    /// run one accrual day over a set of accounts
    ///
    /// Each account is its own commit boundary: a skip never stops the run.
    pub fn run_daily_accrual(
        &self,
        accounts: &mut [Account],
        rate_pa: Rate,
        calculation_date: NaiveDate,
        events: &mut EventStore,
    ) -> AccrualRun {
        let mut run = AccrualRun {
            logs: Vec::new(),
            accrued_count: 0,
            skipped_count: 0,
            total_accrued: Money::ZERO,
        };

        for account in accounts.iter_mut() {
            match self.accrue_daily(account, rate_pa, calculation_date, events) {
                Some(log) => {
                    run.accrued_count += 1;
                    run.total_accrued += log.amount_accrued;
                    run.logs.push(log);
                }
                None => run.skipped_count += 1,
            }
        }

        run
    }
}

/// outcome of one accrual batch day
#[derive(Debug)]
pub struct AccrualRun {
    pub logs: Vec<InterestAccrualLog>,
    pub accrued_count: usize,
    pub skipped_count: usize,
    pub total_accrued: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountType, Currency};
    use chrono::{TimeZone, Utc};
    use hourglass_rs::{SafeTimeProvider, TimeSource};

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn savings_account(balance: Money, time: &SafeTimeProvider, events: &mut EventStore) -> Account {
        let mut account = Account::open(
            "CUST-100".to_string(),
            AccountType::Savings,
            Currency::NGN,
            time,
            events,
        );
        account.ledger_balance = balance;
        account.available_balance = balance;
        account
    }

    fn engine() -> AccrualEngine {
        AccrualEngine::new(InterestConfig::savings_default())
    }

    #[test]
    fn test_daily_accrual_at_four_decimals() {
        let time = test_time();
        let mut events = EventStore::new();
        let mut account = savings_account(Money::from_major(10_000), &time, &mut events);

        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let log = engine()
            .accrue_daily(&mut account, Rate::from_percentage(5), date, &mut events)
            .unwrap();

        // 10000 * 0.05 / 365 = 1.36986..., held at 4dp
        assert_eq!(log.amount_accrued, Money::from_str_exact("1.3699").unwrap());
        assert_eq!(account.accrued_interest_payable, Money::from_str_exact("1.3699").unwrap());
        // ledger balance untouched by accrual
        assert_eq!(account.ledger_balance, Money::from_major(10_000));
        assert!(!log.is_posted);
    }

    #[test]
    fn test_accrual_idempotent_per_day() {
        let time = test_time();
        let mut events = EventStore::new();
        let mut account = savings_account(Money::from_major(10_000), &time, &mut events);

        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let engine = engine();
        assert!(engine.accrue_daily(&mut account, Rate::from_percentage(5), date, &mut events).is_some());
        // second run for the same date accrues nothing
        assert!(engine.accrue_daily(&mut account, Rate::from_percentage(5), date, &mut events).is_none());

        let next = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        assert!(engine.accrue_daily(&mut account, Rate::from_percentage(5), next, &mut events).is_some());
    }

    #[test]
    fn test_below_minimum_balance_skipped() {
        let time = test_time();
        let mut events = EventStore::new();
        let engine = AccrualEngine::new(InterestConfig::with_minimum_balance(Money::from_major(1_000)));
        let mut account = savings_account(Money::from_str_exact("999.99").unwrap(), &time, &mut events);

        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(engine.accrue_daily(&mut account, Rate::from_percentage(5), date, &mut events).is_none());
        assert_eq!(account.accrued_interest_payable, Money::ZERO);
    }

    #[test]
    fn test_non_interest_bearing_type_skipped() {
        let time = test_time();
        let mut events = EventStore::new();
        let mut account = savings_account(Money::from_major(10_000), &time, &mut events);
        account.account_type = AccountType::Current;

        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(engine().accrue_daily(&mut account, Rate::from_percentage(5), date, &mut events).is_none());
    }

    #[test]
    fn test_zero_and_negative_accrual_skipped() {
        let time = test_time();
        let mut events = EventStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let engine = engine();

        // zero balance accrues nothing
        let mut empty = savings_account(Money::ZERO, &time, &mut events);
        assert!(engine.accrue_daily(&mut empty, Rate::from_percentage(5), date, &mut events).is_none());

        // tiny balance rounds to a zero accrual
        let mut tiny = savings_account(Money::from_str_exact("0.01").unwrap(), &time, &mut events);
        assert!(engine.accrue_daily(&mut tiny, Rate::from_percentage(1), date, &mut events).is_none());
        assert_eq!(tiny.accrued_interest_payable, Money::ZERO);
    }

    #[test]
    fn test_actual_360_basis() {
        let time = test_time();
        let mut events = EventStore::new();
        let mut config = InterestConfig::savings_default();
        config.day_count_basis = DayCountBasis::Actual360;
        let engine = AccrualEngine::new(config);

        let mut account = savings_account(Money::from_major(3_600), &time, &mut events);
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let log = engine
            .accrue_daily(&mut account, Rate::from_percentage(10), date, &mut events)
            .unwrap();

        // 3600 * 0.10 / 360 = 1.00 per day
        assert_eq!(log.amount_accrued, Money::from_major(1));
    }

    #[test]
    fn test_batch_run_counts_and_continues() {
        let time = test_time();
        let mut events = EventStore::new();
        let mut accounts = vec![
            savings_account(Money::from_major(10_000), &time, &mut events),
            savings_account(Money::ZERO, &time, &mut events),
            savings_account(Money::from_major(5_000), &time, &mut events),
        ];

        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let run = engine().run_daily_accrual(&mut accounts, Rate::from_percentage(5), date, &mut events);

        assert_eq!(run.accrued_count, 2);
        assert_eq!(run.skipped_count, 1);
        assert_eq!(run.logs.len(), 2);
        assert_eq!(
            run.total_accrued,
            run.logs.iter().map(|l| l.amount_accrued).fold(Money::ZERO, |a, x| a + x)
        );
    }
}
