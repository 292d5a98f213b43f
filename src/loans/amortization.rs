use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};

/// one expected installment in the repayment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledInstallment {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub principal_due: Money,
    pub interest_due: Money,
    pub fees_due: Money,
    pub total_due: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub fees_paid: Money,
    pub is_paid: bool,
    pub paid_date: Option<NaiveDate>,
}

impl ScheduledInstallment {
    pub fn outstanding(&self) -> Money {
        (self.principal_due - self.principal_paid)
            + (self.interest_due - self.interest_paid)
            + (self.fees_due - self.fees_paid)
    }
}

/// fixed-count installment plan generated once at disbursement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentSchedule {
    pub principal: Money,
    pub interest_rate_pa: Rate,
    pub tenor_months: u32,
    pub first_due_date: NaiveDate,
    pub installments: Vec<ScheduledInstallment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl RepaymentSchedule {
    /// generate an equal-installment reducing-balance schedule
    ///
    /// EMI = P * r * (1+r)^n / ((1+r)^n - 1), with r the monthly rate. The
    /// final installment forces principal to the remaining balance, which is
    /// the sole drift-correction step: per-row rounding never redistributes
    /// cents backwards.
    pub fn generate(
        principal: Money,
        interest_rate_pa: Rate,
        tenor_months: u32,
        first_due_date: NaiveDate,
    ) -> Result<Self> {
        if !principal.is_positive() {
            return Err(LedgerError::InvalidAmortizationTerms {
                message: format!("principal must be positive, got {}", principal),
            });
        }
        if tenor_months == 0 {
            return Err(LedgerError::InvalidAmortizationTerms {
                message: "tenor must be at least one month".to_string(),
            });
        }

        let monthly_rate = interest_rate_pa.monthly_rate().as_decimal();
        let emi = calculate_emi(principal, monthly_rate, tenor_months)?;

        let mut installments = Vec::with_capacity(tenor_months as usize);
        let mut balance = principal;

        for i in 1..=tenor_months {
            let interest_due = (balance * monthly_rate).round_dp(2);
            let mut principal_due = emi - interest_due;
            let total_due;

            if i == tenor_months {
                // clear the remaining balance exactly, absorbing rounding drift
                principal_due = balance;
                total_due = principal_due + interest_due;
            } else {
                if principal_due.is_negative() {
                    principal_due = Money::ZERO;
                }
                total_due = emi;
            }

            installments.push(ScheduledInstallment {
                installment_number: i,
                due_date: add_months(first_due_date, i - 1),
                principal_due,
                interest_due,
                fees_due: Money::ZERO,
                total_due,
                principal_paid: Money::ZERO,
                interest_paid: Money::ZERO,
                fees_paid: Money::ZERO,
                is_paid: false,
                paid_date: None,
            });

            balance -= principal_due;
        }

        let total_interest = installments
            .iter()
            .map(|row| row.interest_due)
            .fold(Money::ZERO, |acc, x| acc + x);
        let total_payment = installments
            .iter()
            .map(|row| row.total_due)
            .fold(Money::ZERO, |acc, x| acc + x);

        Ok(Self {
            principal,
            interest_rate_pa,
            tenor_months,
            first_due_date,
            installments,
            total_interest,
            total_payment,
        })
    }

    /// get installment by number (1-based)
    pub fn installment(&self, number: u32) -> Option<&ScheduledInstallment> {
        self.installments.get(number.saturating_sub(1) as usize)
    }

    /// earliest unpaid installment, if any
    pub fn next_unpaid(&self) -> Option<&ScheduledInstallment> {
        self.installments.iter().find(|row| !row.is_paid)
    }

    /// sum of principal due across all rows
    pub fn total_principal(&self) -> Money {
        self.installments
            .iter()
            .map(|row| row.principal_due)
            .fold(Money::ZERO, |acc, x| acc + x)
    }
}

/// equal monthly installment for a reducing-balance loan, rounded to the kobo
fn calculate_emi(principal: Money, monthly_rate: Decimal, months: u32) -> Result<Money> {
    if monthly_rate.is_zero() {
        // interest-free: straight division of principal
        return Ok((principal / Decimal::from(months)).round_dp(2));
    }

    let mut compound = Decimal::ONE;
    let base = Decimal::ONE + monthly_rate;
    for _ in 0..months {
        compound *= base;
    }

    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(LedgerError::InvalidAmortizationTerms {
            message: "EMI denominator is zero, check rate and tenor".to_string(),
        });
    }

    let numerator = principal.as_decimal() * monthly_rate * compound;
    Ok(Money::from_decimal(numerator / denominator).round_dp(2))
}

/// add calendar months, clamping to the last day of shorter months
pub(crate) fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    #[test]
    fn test_reducing_balance_schedule() {
        let schedule = RepaymentSchedule::generate(
            Money::from_major(120_000),
            Rate::from_percentage(12),
            12,
            first_due(),
        )
        .unwrap();

        assert_eq!(schedule.installments.len(), 12);

        // EMI at 1% monthly over 12 months
        let emi = Money::from_str_exact("10661.85").unwrap();
        for row in &schedule.installments[..11] {
            assert_eq!(row.total_due, emi);
        }

        // first month interest is 1% of the full principal
        let first = &schedule.installments[0];
        assert_eq!(first.interest_due, Money::from_str_exact("1200.00").unwrap());
        assert_eq!(first.principal_due, Money::from_str_exact("9461.85").unwrap());

        // interest declines as the balance reduces
        for i in 1..schedule.installments.len() {
            assert!(schedule.installments[i].interest_due < schedule.installments[i - 1].interest_due);
        }
    }

    #[test]
    fn test_principal_sums_exactly() {
        let schedule = RepaymentSchedule::generate(
            Money::from_major(120_000),
            Rate::from_percentage(12),
            12,
            first_due(),
        )
        .unwrap();

        assert_eq!(schedule.total_principal(), Money::from_major(120_000));
    }

    #[test]
    fn test_final_installment_absorbs_rounding_drift() {
        // awkward principal that cannot divide evenly
        let schedule = RepaymentSchedule::generate(
            Money::from_str_exact("99999.99").unwrap(),
            Rate::from_bps(1775), // 17.75%
            36,
            first_due(),
        )
        .unwrap();

        assert_eq!(
            schedule.total_principal(),
            Money::from_str_exact("99999.99").unwrap()
        );
        let last = schedule.installments.last().unwrap();
        assert_eq!(last.total_due, last.principal_due + last.interest_due);
    }

    #[test]
    fn test_interest_free_loan() {
        let schedule = RepaymentSchedule::generate(
            Money::from_major(1_000),
            Rate::ZERO,
            3,
            first_due(),
        )
        .unwrap();

        assert_eq!(schedule.installments[0].total_due, Money::from_str_exact("333.33").unwrap());
        assert_eq!(schedule.installments[0].interest_due, Money::ZERO);
        // final row picks up the residual 0.01
        assert_eq!(
            schedule.installments[2].principal_due,
            Money::from_str_exact("333.34").unwrap()
        );
        assert_eq!(schedule.total_principal(), Money::from_major(1_000));
        assert_eq!(schedule.total_interest, Money::ZERO);
    }

    #[test]
    fn test_invalid_terms_rejected() {
        let result = RepaymentSchedule::generate(
            Money::from_major(1_000),
            Rate::from_percentage(12),
            0,
            first_due(),
        );
        assert!(matches!(result, Err(LedgerError::InvalidAmortizationTerms { .. })));

        let result = RepaymentSchedule::generate(
            Money::ZERO,
            Rate::from_percentage(12),
            12,
            first_due(),
        );
        assert!(matches!(result, Err(LedgerError::InvalidAmortizationTerms { .. })));
    }

    #[test]
    fn test_due_dates_advance_by_calendar_month() {
        let schedule = RepaymentSchedule::generate(
            Money::from_major(10_000),
            Rate::from_percentage(10),
            4,
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap();

        let dates: Vec<NaiveDate> = schedule.installments.iter().map(|r| r.due_date).collect();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        // month-end clamped in february (2024 is a leap year)
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(dates[3], NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
    }

    #[test]
    fn test_add_months_across_year_boundary() {
        let date = NaiveDate::from_ymd_opt(2023, 11, 15).unwrap();
        assert_eq!(add_months(date, 3), NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
    }
}
