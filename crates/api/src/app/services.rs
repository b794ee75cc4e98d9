//! Application services: existence checks, amortization calls, persistence.
//!
//! Handlers stay thin; everything they need goes through `AppServices`, which
//! owns the configured `LoanStore`.

use std::sync::Arc;

use thiserror::Error;

use loantrack_amortization::{AmortizationError, LoanSummary, LoanTerms, ScheduleEntry};
use loantrack_core::{DomainError, LoanId, UserId};
use loantrack_infra::{InMemoryLoanStore, LoanStore, StoreError};
use loantrack_loans::{Loan, LoanShare, NewLoan, NewUser, User};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Amortization(#[from] AmortizationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn LoanStore>,
}

impl AppServices {
    pub fn new(store: Arc<dyn LoanStore>) -> Self {
        Self { store }
    }

    /// Services over a fresh in-memory store (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryLoanStore::new()))
    }

    pub async fn register_user(&self, new: NewUser) -> ServiceResult<User> {
        let user = User::register(new)?;
        self.store.insert_user(user.clone()).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> ServiceResult<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user").into())
    }

    pub async fn list_users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }

    /// Loans the user owns or that were shared with them.
    pub async fn loans_for_user(&self, id: UserId) -> ServiceResult<Vec<Loan>> {
        self.get_user(id).await?;
        Ok(self.store.loans_for_user(id).await?)
    }

    pub async fn create_loan(&self, new: NewLoan) -> ServiceResult<Loan> {
        self.get_user(new.owner_id).await?;
        let loan = Loan::open(new)?;
        self.store.insert_loan(loan.clone()).await?;
        tracing::info!(
            loan_id = %loan.id,
            owner_id = %loan.owner_id,
            amount = loan.amount,
            term_months = loan.loan_term_months,
            "loan created"
        );
        Ok(loan)
    }

    pub async fn get_loan(&self, id: LoanId) -> ServiceResult<Loan> {
        self.store
            .get_loan(id)
            .await?
            .ok_or_else(|| DomainError::not_found("loan").into())
    }

    /// Validated amortization terms of a stored loan.
    pub async fn loan_terms(&self, id: LoanId) -> ServiceResult<LoanTerms> {
        Ok(self.get_loan(id).await?.terms()?)
    }

    pub async fn loan_schedule(&self, id: LoanId) -> ServiceResult<Vec<ScheduleEntry>> {
        let terms = self.loan_terms(id).await?;
        Ok(terms.schedule())
    }

    /// Cumulative summary through `month` (1-based, inclusive).
    ///
    /// `month` is taken as received so negative values are reported the same
    /// way as any other out-of-range month.
    pub async fn loan_summary(&self, id: LoanId, month: i64) -> ServiceResult<LoanSummary> {
        let terms = self.loan_terms(id).await?;
        let month = u32::try_from(month).map_err(|_| {
            AmortizationError::invalid_argument(format!("invalid month number: {month}"))
        })?;
        Ok(terms.summary(month)?)
    }

    /// Share a loan with another user.
    ///
    /// Returns the share and whether it was newly created; sharing twice keeps
    /// the first share.
    pub async fn share_loan(&self, loan_id: LoanId, user_id: UserId) -> ServiceResult<(LoanShare, bool)> {
        let loan = self.get_loan(loan_id).await?;
        self.get_user(user_id).await?;

        let share = LoanShare::grant(&loan, user_id)?;
        let created = self.store.insert_share(share.clone()).await?;
        if created {
            tracing::info!(loan_id = %loan_id, user_id = %user_id, "loan shared");
            return Ok((share, true));
        }

        let existing = self
            .store
            .shares_for_loan(loan_id)
            .await?
            .into_iter()
            .find(|s| s.same_link(&share))
            .unwrap_or(share);
        Ok((existing, false))
    }

    pub async fn loan_shares(&self, loan_id: LoanId) -> ServiceResult<Vec<LoanShare>> {
        self.get_loan(loan_id).await?;
        Ok(self.store.shares_for_loan(loan_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(services: &AppServices, name: &str) -> User {
        services
            .register_user(NewUser::new(name, format!("{}@example.com", name.to_lowercase())))
            .await
            .unwrap()
    }

    async fn loan(services: &AppServices, owner: UserId, amount: f64, rate: f64, months: i64) -> Loan {
        services
            .create_loan(NewLoan {
                owner_id: owner,
                amount,
                annual_interest_rate: rate,
                loan_term_months: months,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn loan_for_unknown_owner_is_not_found() {
        let services = AppServices::in_memory();
        let err = services
            .create_loan(NewLoan {
                owner_id: UserId::new(),
                amount: 1_000.0,
                annual_interest_rate: 5.0,
                loan_term_months: 12,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound("user"))));
    }

    #[tokio::test]
    async fn summary_matches_engine() {
        let services = AppServices::in_memory();
        let owner = user(&services, "Owner").await;
        let l = loan(&services, owner.id, 100_000.0, 5.0, 12).await;

        let summary = services.loan_summary(l.id, 6).await.unwrap();
        assert!((summary.current_principal_balance - 50_623.66).abs() < 0.01);

        let schedule = services.loan_schedule(l.id).await.unwrap();
        assert_eq!(schedule.len(), 12);
        assert_eq!(schedule[5].remaining_balance, summary.current_principal_balance);
    }

    #[tokio::test]
    async fn loan_terms_follow_stored_loan() {
        let services = AppServices::in_memory();
        let owner = user(&services, "Owner").await;
        let l = loan(&services, owner.id, 100_000.0, 5.0, 360).await;

        let terms = services.loan_terms(l.id).await.unwrap();
        assert_eq!(terms, LoanTerms::new(100_000.0, 5.0, 360).unwrap());
        assert_eq!(terms.term_months(), 360);

        let err = services.loan_terms(LoanId::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound("loan"))));
    }

    #[tokio::test]
    async fn summary_rejects_out_of_range_months() {
        let services = AppServices::in_memory();
        let owner = user(&services, "Owner").await;
        let l = loan(&services, owner.id, 1_000.0, 5.0, 12).await;

        for month in [-1, 0, 13] {
            let err = services.loan_summary(l.id, month).await.unwrap_err();
            assert!(
                matches!(err, ServiceError::Amortization(AmortizationError::InvalidArgument(_))),
                "month {month}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn sharing_is_idempotent_and_visible_to_recipient() {
        let services = AppServices::in_memory();
        let owner = user(&services, "Owner").await;
        let friend = user(&services, "Friend").await;
        let l = loan(&services, owner.id, 5_000.0, 3.0, 24).await;

        let (first, created) = services.share_loan(l.id, friend.id).await.unwrap();
        assert!(created);
        let (second, created_again) = services.share_loan(l.id, friend.id).await.unwrap();
        assert!(!created_again);
        assert_eq!(first, second);

        let friend_loans = services.loans_for_user(friend.id).await.unwrap();
        assert_eq!(friend_loans.len(), 1);
        assert_eq!(friend_loans[0].id, l.id);
        assert_eq!(services.loan_shares(l.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sharing_with_owner_conflicts() {
        let services = AppServices::in_memory();
        let owner = user(&services, "Owner").await;
        let l = loan(&services, owner.id, 5_000.0, 3.0, 24).await;

        let err = services.share_loan(l.id, owner.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));
    }
}
