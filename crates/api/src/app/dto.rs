use serde::Deserialize;

use loantrack_amortization::{LoanSummary, ScheduleEntry};
use loantrack_core::{DomainResult, LoanId};
use loantrack_loans::{Loan, LoanShare, User};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    pub owner_id: String,
    pub amount: f64,
    pub annual_interest_rate: f64,
    pub loan_term_months: i64,
}

#[derive(Debug, Deserialize)]
pub struct ShareLoanRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub month: i64,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn user_to_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id.to_string(),
        "name": user.name,
        "email": user.email,
        "created_at": user.created_at.to_rfc3339(),
    })
}

/// Loan body including its derived monthly payment.
///
/// A stored loan whose terms no longer validate is reported as an error rather
/// than rendered without a payment.
pub fn loan_to_json(loan: &Loan) -> DomainResult<serde_json::Value> {
    let monthly_payment = loan.terms()?.monthly_payment();
    Ok(serde_json::json!({
        "id": loan.id.to_string(),
        "owner_id": loan.owner_id.to_string(),
        "amount": loan.amount,
        "annual_interest_rate": loan.annual_interest_rate,
        "loan_term_months": loan.loan_term_months,
        "monthly_payment": monthly_payment,
        "created_at": loan.created_at.to_rfc3339(),
    }))
}

pub fn share_to_json(share: &LoanShare) -> serde_json::Value {
    serde_json::json!({
        "loan_id": share.loan_id.to_string(),
        "user_id": share.user_id.to_string(),
        "shared_at": share.shared_at.to_rfc3339(),
    })
}

pub fn schedule_to_json(loan_id: LoanId, schedule: &[ScheduleEntry]) -> serde_json::Value {
    serde_json::json!({
        "loan_id": loan_id.to_string(),
        "items": schedule,
    })
}

pub fn summary_to_json(loan_id: LoanId, month: i64, summary: &LoanSummary) -> serde_json::Value {
    serde_json::json!({
        "loan_id": loan_id.to_string(),
        "month": month,
        "current_principal_balance": summary.current_principal_balance,
        "total_principal_paid": summary.total_principal_paid,
        "total_interest_paid": summary.total_interest_paid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use loantrack_core::{DomainError, UserId};
    use loantrack_loans::NewLoan;

    // Rows read back from a store are not re-validated, so tests may bend
    // the fields after opening.
    fn stored_loan(amount: f64, months: u32) -> Loan {
        let mut loan = Loan::open(NewLoan {
            owner_id: UserId::new(),
            amount: 1_000.0,
            annual_interest_rate: 5.0,
            loan_term_months: 12,
        })
        .unwrap();
        loan.amount = amount;
        loan.loan_term_months = months;
        loan
    }

    #[test]
    fn loan_json_carries_monthly_payment() {
        let body = loan_to_json(&stored_loan(100_000.0, 360)).unwrap();
        let payment = body["monthly_payment"].as_f64().unwrap();
        assert!((payment - 536.82).abs() <= 0.6, "{payment}");
    }

    #[test]
    fn invalid_stored_terms_are_an_error_not_a_null_payment() {
        let err = loan_to_json(&stored_loan(-5.0, 12)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = loan_to_json(&stored_loan(1_000.0, 0)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
