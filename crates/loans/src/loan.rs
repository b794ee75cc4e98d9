use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use loantrack_amortization::{AmortizationError, LoanTerms};
use loantrack_core::{DomainError, DomainResult, Entity, LoanId, UserId};

/// Longest accepted loan term (100 years).
pub const MAX_TERM_MONTHS: i64 = 1200;

/// A fixed-rate loan owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub owner_id: UserId,
    pub amount: f64,
    /// Annual rate in percent (`5.0` means 5%).
    pub annual_interest_rate: f64,
    pub loan_term_months: u32,
    pub created_at: DateTime<Utc>,
}

/// Loan creation input, before validation.
///
/// `loan_term_months` is signed so negative terms arriving over the wire are
/// reported as validation failures instead of parse errors.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub owner_id: UserId,
    pub amount: f64,
    pub annual_interest_rate: f64,
    pub loan_term_months: i64,
}

impl Loan {
    /// Validate the requested terms and open a new loan.
    pub fn open(new: NewLoan) -> DomainResult<Self> {
        if new.loan_term_months < 1 || new.loan_term_months > MAX_TERM_MONTHS {
            return Err(DomainError::validation(format!(
                "loan_term_months must be between 1 and {MAX_TERM_MONTHS} (got {})",
                new.loan_term_months
            )));
        }
        // Bounded above, so the conversion cannot fail.
        let loan_term_months = new.loan_term_months as u32;

        LoanTerms::new(new.amount, new.annual_interest_rate, loan_term_months)
            .map_err(invalid_terms)?;

        Ok(Self {
            id: LoanId::new(),
            owner_id: new.owner_id,
            amount: new.amount,
            annual_interest_rate: new.annual_interest_rate,
            loan_term_months,
            created_at: Utc::now(),
        })
    }

    /// Amortization terms of this loan.
    ///
    /// Fails only for records that bypassed [`Loan::open`] (e.g. edited in storage).
    pub fn terms(&self) -> DomainResult<LoanTerms> {
        LoanTerms::new(self.amount, self.annual_interest_rate, self.loan_term_months)
            .map_err(invalid_terms)
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

fn invalid_terms(err: AmortizationError) -> DomainError {
    match err {
        AmortizationError::InvalidArgument(msg) => DomainError::Validation(msg),
    }
}

impl Entity for Loan {
    type Id = LoanId;

    fn id(&self) -> LoanId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn new_loan(amount: f64, rate: f64, months: i64) -> NewLoan {
        NewLoan {
            owner_id: UserId::new(),
            amount,
            annual_interest_rate: rate,
            loan_term_months: months,
        }
    }

    #[test]
    fn open_keeps_requested_terms() {
        let request = new_loan(100_000.0, 5.0, 360);
        let owner = request.owner_id;
        let loan = Loan::open(request).unwrap();

        assert!(loan.is_owned_by(owner));
        assert_eq!(loan.loan_term_months, 360);
        let terms = loan.terms().unwrap();
        assert_eq!(terms.principal(), 100_000.0);
        assert!((terms.monthly_payment() - 536.82).abs() < 0.6);
    }

    #[test]
    fn zero_interest_loans_are_allowed() {
        let loan = Loan::open(new_loan(6_000.0, 0.0, 12)).unwrap();
        assert_eq!(loan.terms().unwrap().monthly_payment(), 500.0);
    }

    #[test]
    fn out_of_range_terms_are_rejected() {
        for months in [i64::MIN, -12, 0, MAX_TERM_MONTHS + 1] {
            let err = Loan::open(new_loan(1_000.0, 5.0, months)).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{months} accepted");
        }
    }

    #[test]
    fn engine_rejections_surface_as_validation_errors() {
        for (amount, rate) in [(0.0, 5.0), (-5.0, 5.0), (1_000.0, -1.0), (f64::NAN, 5.0)] {
            let err = Loan::open(new_loan(amount, rate, 12)).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn terms_of_a_tampered_record_fail_validation() {
        let mut loan = Loan::open(new_loan(1_000.0, 5.0, 12)).unwrap();
        loan.loan_term_months = 0;
        assert!(matches!(loan.terms(), Err(DomainError::Validation(_))));
    }

    proptest! {
        /// Every term the API accepts yields a loan whose schedule spans it.
        #[test]
        fn accepted_loans_have_full_schedules(
            amount in 1.0f64..10_000_000.0,
            rate in 0.0f64..50.0,
            months in 1i64..=MAX_TERM_MONTHS,
        ) {
            let loan = Loan::open(new_loan(amount, rate, months)).unwrap();
            let schedule = loan.terms().unwrap().schedule();
            prop_assert_eq!(schedule.len() as i64, months);
        }
    }
}
