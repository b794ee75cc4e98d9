use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use loantrack_core::{DomainError, DomainResult, LoanId, UserId};

use crate::loan::Loan;

/// Link between a loan and a user it has been shared with.
///
/// A `(loan_id, user_id)` pair exists at most once; owners are never linked to
/// their own loans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanShare {
    pub loan_id: LoanId,
    pub user_id: UserId,
    pub shared_at: DateTime<Utc>,
}

impl LoanShare {
    pub fn new(loan_id: LoanId, user_id: UserId) -> Self {
        Self {
            loan_id,
            user_id,
            shared_at: Utc::now(),
        }
    }

    /// Share `loan` with `user_id`, refusing to share a loan with its owner.
    pub fn grant(loan: &Loan, user_id: UserId) -> DomainResult<Self> {
        if loan.is_owned_by(user_id) {
            return Err(DomainError::conflict("loan is already owned by this user"));
        }
        Ok(Self::new(loan.id, user_id))
    }

    /// Whether both records link the same loan and user.
    pub fn same_link(&self, other: &Self) -> bool {
        self.loan_id == other.loan_id && self.user_id == other.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::NewLoan;

    fn loan_owned_by(owner: UserId) -> Loan {
        Loan::open(NewLoan {
            owner_id: owner,
            amount: 10_000.0,
            annual_interest_rate: 4.0,
            loan_term_months: 36,
        })
        .unwrap()
    }

    #[test]
    fn grant_links_loan_and_user() {
        let loan = loan_owned_by(UserId::new());
        let friend = UserId::new();

        let share = LoanShare::grant(&loan, friend).unwrap();
        assert_eq!(share.loan_id, loan.id);
        assert_eq!(share.user_id, friend);
    }

    #[test]
    fn owner_cannot_be_granted_their_own_loan() {
        let owner = UserId::new();
        let loan = loan_owned_by(owner);

        let err = LoanShare::grant(&loan, owner).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn same_link_ignores_timestamp() {
        let loan = LoanId::new();
        let user = UserId::new();
        let a = LoanShare::new(loan, user);
        let mut b = LoanShare::new(loan, user);
        b.shared_at = a.shared_at + chrono::Duration::seconds(5);

        assert!(a.same_link(&b));
        assert_ne!(a, b);
        assert!(!a.same_link(&LoanShare::new(loan, UserId::new())));
    }
}
