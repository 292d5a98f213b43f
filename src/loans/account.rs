use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::types::{Currency, LoanStatus};

use super::amortization::{add_months, RepaymentSchedule};

/// active loan after disbursement
///
/// Outstanding buckets are drawn down by the repayment allocator; fee,
/// penalty, and loan-interest charges are pushed in by external batch jobs
/// through the charge operations below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAccount {
    pub loan_account_number: String,
    pub customer_id: String,
    pub currency: Currency,

    pub principal_disbursed: Money,
    pub interest_rate_pa: Rate,
    pub tenor_months: u32,

    pub principal_outstanding: Money,
    pub interest_outstanding: Money,
    pub fees_outstanding: Money,
    pub penalties_outstanding: Money,

    pub total_repaid_principal: Money,
    pub total_repaid_interest: Money,

    pub status: LoanStatus,

    pub disbursement_date: DateTime<Utc>,
    pub first_repayment_date: NaiveDate,
    pub next_repayment_date: Option<NaiveDate>,
    pub maturity_date: NaiveDate,

    pub days_past_due: u32,
    pub last_repayment_date: Option<DateTime<Utc>>,
    pub last_repayment_amount: Option<Money>,
}

impl LoanAccount {
    /// seed a loan account at disbursement and generate its schedule
    ///
    /// Maturity falls `tenor_months` after disbursement; the first repayment
    /// is due one month out.
    pub fn disburse(
        loan_account_number: String,
        customer_id: String,
        principal: Money,
        interest_rate_pa: Rate,
        tenor_months: u32,
        currency: Currency,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<(Self, RepaymentSchedule)> {
        let disbursement_date = time_provider.now();
        let first_repayment_date = add_months(disbursement_date.date_naive(), 1);
        let maturity_date = add_months(disbursement_date.date_naive(), tenor_months);

        let schedule =
            RepaymentSchedule::generate(principal, interest_rate_pa, tenor_months, first_repayment_date)?;

        let loan = Self {
            loan_account_number: loan_account_number.clone(),
            customer_id,
            currency,
            principal_disbursed: principal,
            interest_rate_pa,
            tenor_months,
            principal_outstanding: principal,
            interest_outstanding: Money::ZERO,
            fees_outstanding: Money::ZERO,
            penalties_outstanding: Money::ZERO,
            total_repaid_principal: Money::ZERO,
            total_repaid_interest: Money::ZERO,
            status: LoanStatus::Active,
            disbursement_date,
            first_repayment_date,
            next_repayment_date: Some(first_repayment_date),
            maturity_date,
            days_past_due: 0,
            last_repayment_date: None,
            last_repayment_amount: None,
        };

        events.emit(Event::LoanDisbursed {
            loan_account_number,
            principal,
            interest_rate_pa,
            tenor_months,
            timestamp: disbursement_date,
        });

        Ok((loan, schedule))
    }

    /// sum of all outstanding buckets
    pub fn total_outstanding(&self) -> Money {
        self.principal_outstanding
            + self.interest_outstanding
            + self.fees_outstanding
            + self.penalties_outstanding
    }

    /// true once every bucket is exactly zero
    pub fn is_settled(&self) -> bool {
        self.principal_outstanding.is_zero()
            && self.interest_outstanding.is_zero()
            && self.fees_outstanding.is_zero()
            && self.penalties_outstanding.is_zero()
    }

    /// loans in these states accept no further repayments
    pub fn is_closed_to_repayment(&self) -> bool {
        matches!(self.status, LoanStatus::PaidOff | LoanStatus::WrittenOff)
    }

    /// add a servicing fee to the outstanding fees bucket
    pub fn charge_fee(
        &mut self,
        amount: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<()> {
        self.charge(amount)?;
        self.fees_outstanding += amount;
        events.emit(Event::FeeCharged {
            loan_account_number: self.loan_account_number.clone(),
            amount,
            timestamp: time_provider.now(),
        });
        Ok(())
    }

    /// add a late-payment penalty to the outstanding penalties bucket
    pub fn charge_penalty(
        &mut self,
        amount: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<()> {
        self.charge(amount)?;
        self.penalties_outstanding += amount;
        events.emit(Event::PenaltyCharged {
            loan_account_number: self.loan_account_number.clone(),
            amount,
            timestamp: time_provider.now(),
        });
        Ok(())
    }

    /// add accrued loan interest receivable to the outstanding interest bucket
    pub fn charge_interest(&mut self, amount: Money) -> Result<()> {
        self.charge(amount)?;
        self.interest_outstanding += amount;
        Ok(())
    }

    fn charge(&self, amount: Money) -> Result<()> {
        if self.is_closed_to_repayment() {
            return Err(LedgerError::LoanClosed { status: self.status });
        }
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount { amount });
        }
        Ok(())
    }

    /// administrative transition (overdue, defaulted, restructured, written off)
    ///
    /// PAID_OFF is never set here: only the repayment allocator reaching
    /// all-zero buckets drives that transition.
    pub fn update_status(&mut self, new_status: LoanStatus) -> Result<()> {
        if new_status == LoanStatus::PaidOff {
            return Err(LedgerError::InvalidOperation {
                message: "paid-off is driven by repayment allocation, not set directly".to_string(),
            });
        }
        if self.status == LoanStatus::PaidOff {
            return Err(LedgerError::LoanClosed { status: self.status });
        }
        self.status = new_status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
        ))
    }

    fn disburse_test_loan(time: &SafeTimeProvider, events: &mut EventStore) -> (LoanAccount, RepaymentSchedule) {
        LoanAccount::disburse(
            "LACC00000001".to_string(),
            "CUST-001".to_string(),
            Money::from_major(120_000),
            Rate::from_percentage(12),
            12,
            Currency::NGN,
            time,
            events,
        )
        .unwrap()
    }

    #[test]
    fn test_disbursement_seeds_loan_and_schedule() {
        let time = test_time();
        let mut events = EventStore::new();
        let (loan, schedule) = disburse_test_loan(&time, &mut events);

        assert_eq!(loan.principal_outstanding, Money::from_major(120_000));
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.first_repayment_date, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        assert_eq!(loan.next_repayment_date, Some(loan.first_repayment_date));
        assert_eq!(loan.maturity_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(schedule.installments.len(), 12);
        assert_eq!(schedule.installments[0].due_date, loan.first_repayment_date);
    }

    #[test]
    fn test_charges_accumulate_in_buckets() {
        let time = test_time();
        let mut events = EventStore::new();
        let (mut loan, _) = disburse_test_loan(&time, &mut events);

        loan.charge_fee(Money::from_major(200), &time, &mut events).unwrap();
        loan.charge_penalty(Money::from_major(500), &time, &mut events).unwrap();
        loan.charge_interest(Money::from_major(1_000)).unwrap();

        assert_eq!(loan.fees_outstanding, Money::from_major(200));
        assert_eq!(loan.penalties_outstanding, Money::from_major(500));
        assert_eq!(loan.interest_outstanding, Money::from_major(1_000));
        assert_eq!(loan.total_outstanding(), Money::from_major(121_700));
    }

    #[test]
    fn test_charges_rejected_on_written_off_loan() {
        let time = test_time();
        let mut events = EventStore::new();
        let (mut loan, _) = disburse_test_loan(&time, &mut events);

        loan.update_status(LoanStatus::WrittenOff).unwrap();
        let result = loan.charge_fee(Money::from_major(50), &time, &mut events);
        assert!(matches!(result, Err(LedgerError::LoanClosed { .. })));
    }

    #[test]
    fn test_paid_off_cannot_be_set_directly() {
        let time = test_time();
        let mut events = EventStore::new();
        let (mut loan, _) = disburse_test_loan(&time, &mut events);

        assert!(loan.update_status(LoanStatus::PaidOff).is_err());
        assert!(loan.update_status(LoanStatus::Overdue).is_ok());
        assert_eq!(loan.status, LoanStatus::Overdue);
    }
}
