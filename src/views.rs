/// serialization support for account and loan state
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::decimal::{Money, Rate};
use crate::loans::{LoanAccount, RepaymentSchedule};
use crate::types::{AccountStatus, AccountType, Currency, LoanStatus};

/// serializable view of an account's balance state
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountView {
    pub account_number: String,
    pub customer_id: String,
    pub account_type: AccountType,
    pub currency: Currency,
    pub status: AccountStatus,
    pub post_no_debit: bool,
    pub balances: BalanceView,
    pub opened_date: DateTime<Utc>,
    pub last_activity_date: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceView {
    pub ledger_balance: Money,
    pub available_balance: Money,
    pub lien_amount: Money,
    pub uncleared_funds: Money,
    pub accrued_interest_payable: Money,
}

impl AccountView {
    pub fn from_account(account: &Account) -> Self {
        Self {
            account_number: account.account_number.clone(),
            customer_id: account.customer_id.clone(),
            account_type: account.account_type,
            currency: account.currency,
            status: account.status,
            post_no_debit: account.post_no_debit,
            balances: BalanceView {
                ledger_balance: account.ledger_balance,
                available_balance: account.available_balance,
                lien_amount: account.lien_amount,
                uncleared_funds: account.uncleared_funds,
                accrued_interest_payable: account.accrued_interest_payable,
            },
            opened_date: account.opened_date,
            last_activity_date: account.last_activity_date,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// serializable view of a loan and its schedule position
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanView {
    pub loan_account_number: String,
    pub customer_id: String,
    pub currency: Currency,
    pub status: LoanStatus,
    pub terms: LoanTermsView,
    pub outstanding: OutstandingView,
    pub next_repayment_date: Option<NaiveDate>,
    pub days_past_due: u32,
    pub installments_total: usize,
    pub installments_paid: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoanTermsView {
    pub principal_disbursed: Money,
    pub interest_rate_pa: Rate,
    pub tenor_months: u32,
    pub disbursement_date: DateTime<Utc>,
    pub maturity_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OutstandingView {
    pub principal: Money,
    pub interest: Money,
    pub fees: Money,
    pub penalties: Money,
    pub total: Money,
    pub total_repaid_principal: Money,
    pub total_repaid_interest: Money,
}

impl LoanView {
    pub fn from_loan(loan: &LoanAccount, schedule: &RepaymentSchedule) -> Self {
        Self {
            loan_account_number: loan.loan_account_number.clone(),
            customer_id: loan.customer_id.clone(),
            currency: loan.currency,
            status: loan.status,
            terms: LoanTermsView {
                principal_disbursed: loan.principal_disbursed,
                interest_rate_pa: loan.interest_rate_pa,
                tenor_months: loan.tenor_months,
                disbursement_date: loan.disbursement_date,
                maturity_date: loan.maturity_date,
            },
            outstanding: OutstandingView {
                principal: loan.principal_outstanding,
                interest: loan.interest_outstanding,
                fees: loan.fees_outstanding,
                penalties: loan.penalties_outstanding,
                total: loan.total_outstanding(),
                total_repaid_principal: loan.total_repaid_principal,
                total_repaid_interest: loan.total_repaid_interest,
            },
            next_repayment_date: loan.next_repayment_date,
            days_past_due: loan.days_past_due,
            installments_total: schedule.installments.len(),
            installments_paid: schedule.installments.iter().filter(|r| r.is_paid).count(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
