//! Loan-tracking persistence boundary.
//!
//! `LoanStore` is the only thing the API layer knows about storage. Records are
//! validated before they reach a store; stores enforce uniqueness (user email,
//! loan/user share pairs) and nothing else.

pub mod in_memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use loantrack_core::{LoanId, UserId};
use loantrack_loans::{Loan, LoanShare, User};

pub use in_memory::InMemoryLoanStore;
pub use sqlite::SqliteLoanStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend failed (connection, IO, poisoned lock, ...).
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored row could not be mapped back to a record.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Corrupt(err.to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// Storage for users, loans and the shares linking them.
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Persist a new user. Fails with `Conflict` if the email is taken.
    async fn insert_user(&self, user: User) -> StoreResult<()>;

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// All users, oldest first.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn insert_loan(&self, loan: Loan) -> StoreResult<()>;

    async fn get_loan(&self, id: LoanId) -> StoreResult<Option<Loan>>;

    /// Record a share. Returns `false` if the loan was already shared with
    /// that user (the existing share is kept).
    async fn insert_share(&self, share: LoanShare) -> StoreResult<bool>;

    async fn shares_for_loan(&self, loan_id: LoanId) -> StoreResult<Vec<LoanShare>>;

    /// Loans the user owns or that were shared with them, oldest first.
    async fn loans_for_user(&self, user_id: UserId) -> StoreResult<Vec<Loan>>;
}

#[async_trait]
impl<S> LoanStore for Arc<S>
where
    S: LoanStore + ?Sized,
{
    async fn insert_user(&self, user: User) -> StoreResult<()> {
        (**self).insert_user(user).await
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        (**self).get_user(id).await
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        (**self).list_users().await
    }

    async fn insert_loan(&self, loan: Loan) -> StoreResult<()> {
        (**self).insert_loan(loan).await
    }

    async fn get_loan(&self, id: LoanId) -> StoreResult<Option<Loan>> {
        (**self).get_loan(id).await
    }

    async fn insert_share(&self, share: LoanShare) -> StoreResult<bool> {
        (**self).insert_share(share).await
    }

    async fn shares_for_loan(&self, loan_id: LoanId) -> StoreResult<Vec<LoanShare>> {
        (**self).shares_for_loan(loan_id).await
    }

    async fn loans_for_user(&self, user_id: UserId) -> StoreResult<Vec<Loan>> {
        (**self).loans_for_user(user_id).await
    }
}

/// Open the store selected by configuration.
///
/// `Some(url)` connects to SQLite at `url` (e.g. `sqlite://loans.db`);
/// `None` uses a process-local in-memory store.
pub async fn open(database_url: Option<&str>) -> StoreResult<Arc<dyn LoanStore>> {
    match database_url {
        Some(url) => {
            tracing::info!(url, "using sqlite loan store");
            Ok(Arc::new(SqliteLoanStore::connect(url).await?))
        }
        None => {
            tracing::info!("using in-memory loan store");
            Ok(Arc::new(InMemoryLoanStore::new()))
        }
    }
}
