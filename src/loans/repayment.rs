use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RepaymentConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::types::{Currency, LoanStatus, OverpaymentPolicy, RepaymentAllocation};

use super::account::LoanAccount;
use super::amortization::RepaymentSchedule;

/// immutable record of one repayment and how it was split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRepayment {
    pub loan_account_number: String,
    pub payment_date: DateTime<Utc>,
    pub amount_paid: Money,
    pub currency: Currency,
    pub allocation: RepaymentAllocation,
    pub reference: String,
}

/// splits repayments across outstanding buckets in fixed priority order:
/// penalties, then fees, then interest, then principal
pub struct RepaymentAllocator {
    config: RepaymentConfig,
}

impl RepaymentAllocator {
    pub fn new(config: RepaymentConfig) -> Self {
        Self { config }
    }

    /// allocate one repayment and update loan and schedule state
    ///
    /// Buckets never go negative: each tier takes `min(remaining, bucket)`.
    /// When every bucket reaches exactly zero the loan transitions to
    /// PAID_OFF and the next repayment date is cleared.
    pub fn allocate(
        &self,
        loan: &mut LoanAccount,
        schedule: &mut RepaymentSchedule,
        amount_paid: Money,
        currency: Currency,
        payment_date: DateTime<Utc>,
        reference: impl Into<String>,
        events: &mut EventStore,
    ) -> Result<LoanRepayment> {
        if loan.is_closed_to_repayment() {
            return Err(LedgerError::LoanClosed { status: loan.status });
        }
        if !amount_paid.is_positive() {
            return Err(LedgerError::InvalidAmount { amount: amount_paid });
        }
        if currency != loan.currency {
            return Err(LedgerError::CurrencyMismatch {
                account: loan.currency,
                entry: currency,
            });
        }

        let mut remaining = amount_paid;

        let to_penalties = remaining.min(loan.penalties_outstanding);
        remaining -= to_penalties;

        let to_fees = remaining.min(loan.fees_outstanding);
        remaining -= to_fees;

        let to_interest = remaining.min(loan.interest_outstanding);
        remaining -= to_interest;

        let to_principal = remaining.min(loan.principal_outstanding);
        remaining -= to_principal;

        let allocation = RepaymentAllocation {
            to_penalties,
            to_fees,
            to_interest,
            to_principal,
            unallocated: remaining,
        };

        loan.penalties_outstanding -= to_penalties;
        loan.fees_outstanding -= to_fees;
        loan.interest_outstanding -= to_interest;
        loan.principal_outstanding -= to_principal;

        loan.total_repaid_principal += to_principal;
        loan.total_repaid_interest += to_interest;

        loan.last_repayment_date = Some(payment_date);
        loan.last_repayment_amount = Some(amount_paid);

        reconcile_schedule(schedule, &allocation, payment_date);

        if loan.is_settled() {
            loan.status = LoanStatus::PaidOff;
            loan.next_repayment_date = None;
            events.emit(Event::LoanPaidOff {
                loan_account_number: loan.loan_account_number.clone(),
                timestamp: payment_date,
            });
        } else {
            loan.next_repayment_date = schedule.next_unpaid().map(|row| row.due_date);
        }

        events.emit(Event::RepaymentReceived {
            loan_account_number: loan.loan_account_number.clone(),
            amount: amount_paid,
            to_penalties,
            to_fees,
            to_interest,
            to_principal,
            timestamp: payment_date,
        });

        if allocation.unallocated.is_positive() {
            match self.config.overpayment_policy {
                OverpaymentPolicy::HoldUnallocated => events.emit(Event::OverpaymentHeld {
                    loan_account_number: loan.loan_account_number.clone(),
                    amount: allocation.unallocated,
                    timestamp: payment_date,
                }),
                OverpaymentPolicy::Refund => events.emit(Event::OverpaymentRefundDue {
                    loan_account_number: loan.loan_account_number.clone(),
                    amount: allocation.unallocated,
                    timestamp: payment_date,
                }),
            }
        }

        Ok(LoanRepayment {
            loan_account_number: loan.loan_account_number.clone(),
            payment_date,
            amount_paid,
            currency,
            allocation,
            reference: reference.into(),
        })
    }
}

/// match allocations against unpaid installments, oldest first
///
/// A row is marked paid once principal, interest, and fees due are all
/// covered. Charges that never appear on the schedule (penalties, ad-hoc
/// fees beyond the plan) simply leave no schedule trace.
fn reconcile_schedule(
    schedule: &mut RepaymentSchedule,
    allocation: &RepaymentAllocation,
    payment_date: DateTime<Utc>,
) {
    let mut principal_left = allocation.to_principal;
    let mut interest_left = allocation.to_interest;
    let mut fees_left = allocation.to_fees;

    for row in schedule.installments.iter_mut().filter(|row| !row.is_paid) {
        let principal_gap = row.principal_due - row.principal_paid;
        let applied = principal_left.min(principal_gap);
        row.principal_paid += applied;
        principal_left -= applied;

        let interest_gap = row.interest_due - row.interest_paid;
        let applied = interest_left.min(interest_gap);
        row.interest_paid += applied;
        interest_left -= applied;

        let fees_gap = row.fees_due - row.fees_paid;
        let applied = fees_left.min(fees_gap);
        row.fees_paid += applied;
        fees_left -= applied;

        if row.principal_paid >= row.principal_due
            && row.interest_paid >= row.interest_due
            && row.fees_paid >= row.fees_due
        {
            row.is_paid = true;
            row.paid_date = Some(payment_date.date_naive());
        }

        if principal_left.is_zero() && interest_left.is_zero() && fees_left.is_zero() {
            break;
        }
    }
}
