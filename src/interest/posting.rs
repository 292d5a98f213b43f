use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use uuid::Uuid;

use crate::account::Account;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::ledger::{post_double_entry, GlAccount, LedgerEntry, TransferRequest, TransferSide};

use super::accrual::InterestAccrualLog;

/// sweep an account's accrued interest into the ledger
///
/// Posts as a system transaction through the double-entry coordinator:
/// the interest-expense GL takes the debit, the customer account the
/// credit. A residual that rounds to zero at 2 decimal places is cleared
/// without posting.
pub fn post_accrued_interest(
    account: &mut Account,
    interest_expense_gl: &mut GlAccount,
    accrual_logs: &mut [InterestAccrualLog],
    posting_date: NaiveDate,
    time_provider: &SafeTimeProvider,
    events: &mut EventStore,
) -> Result<Option<(LedgerEntry, LedgerEntry)>> {
    let payable = account.accrued_interest_payable;
    if !payable.is_positive() {
        return Ok(None);
    }

    let amount = payable.round_dp(2);
    if amount.is_zero() {
        // sub-kobo residual: clear without a ledger entry
        account.accrued_interest_payable = Money::ZERO;
        events.emit(Event::ResidualAccrualCleared {
            account_number: account.account_number.clone(),
            amount: payable,
            timestamp: time_provider.now(),
        });
        return Ok(None);
    }

    let transaction_id = Uuid::new_v4();
    let request = TransferRequest::new(
        transaction_id,
        amount,
        account.currency,
        format!("Interest posting for period ending {}", posting_date),
        posting_date.and_time(chrono::NaiveTime::MIN).and_utc(),
    )
    .as_system_tx();

    let account_number = account.account_number.clone();
    let entries = post_double_entry(
        TransferSide::Gl(interest_expense_gl),
        TransferSide::Customer(account),
        &request,
        time_provider,
        events,
    )?;

    account.accrued_interest_payable -= amount;
    if account.accrued_interest_payable.is_negative() {
        account.accrued_interest_payable = Money::ZERO;
    }

    for log in accrual_logs
        .iter_mut()
        .filter(|log| log.account_number == account_number && !log.is_posted)
    {
        log.is_posted = true;
        log.posting_date = Some(posting_date);
    }

    events.emit(Event::InterestPosted {
        account_number,
        transaction_id,
        amount,
        timestamp: time_provider.now(),
    });

    Ok(Some(entries))
}

/// outcome of one posting batch
#[derive(Debug)]
pub struct PostingRun {
    pub posted_count: usize,
    pub skipped_count: usize,
    pub total_posted: Money,
    pub failures: Vec<(String, LedgerError)>,
}

/// run the periodic posting sweep over a set of accounts
///
/// Per-account boundaries: one account's failure is recorded and the run
/// moves on, so earlier postings stand.
pub fn run_interest_posting(
    accounts: &mut [Account],
    interest_expense_gl: &mut GlAccount,
    accrual_logs: &mut [InterestAccrualLog],
    posting_date: NaiveDate,
    time_provider: &SafeTimeProvider,
    events: &mut EventStore,
) -> PostingRun {
    let mut run = PostingRun {
        posted_count: 0,
        skipped_count: 0,
        total_posted: Money::ZERO,
        failures: Vec::new(),
    };

    for account in accounts.iter_mut() {
        match post_accrued_interest(
            account,
            interest_expense_gl,
            accrual_logs,
            posting_date,
            time_provider,
            events,
        ) {
            Ok(Some((_, credit))) => {
                run.posted_count += 1;
                run.total_posted += credit.amount;
            }
            Ok(None) => run.skipped_count += 1,
            Err(err) => run.failures.push((account.account_number.clone(), err)),
        }
    }

    run
}
