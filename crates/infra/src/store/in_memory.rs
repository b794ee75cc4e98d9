use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use loantrack_core::{Entity, LoanId, UserId};
use loantrack_loans::{Loan, LoanShare, User};

use super::{LoanStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    loans: HashMap<LoanId, Loan>,
    shares: Vec<LoanShare>,
}

/// In-memory loan store for tests/dev. Contents die with the process.
#[derive(Debug, Default)]
pub struct InMemoryLoanStore {
    inner: RwLock<Tables>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

/// Insert or replace a row under its own id.
fn put<E: Entity>(rows: &mut HashMap<E::Id, E>, row: E) {
    rows.insert(row.id(), row);
}

#[async_trait]
impl LoanStore for InMemoryLoanStore {
    async fn insert_user(&self, user: User) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "email already registered: {}",
                user.email
            )));
        }
        put(&mut tables.users, user);
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.read()?.users.values().cloned().collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }

    async fn insert_loan(&self, loan: Loan) -> StoreResult<()> {
        put(&mut self.write()?.loans, loan);
        Ok(())
    }

    async fn get_loan(&self, id: LoanId) -> StoreResult<Option<Loan>> {
        Ok(self.read()?.loans.get(&id).cloned())
    }

    async fn insert_share(&self, share: LoanShare) -> StoreResult<bool> {
        let mut tables = self.write()?;
        if tables.shares.iter().any(|s| s.same_link(&share)) {
            return Ok(false);
        }
        tables.shares.push(share);
        Ok(true)
    }

    async fn shares_for_loan(&self, loan_id: LoanId) -> StoreResult<Vec<LoanShare>> {
        let tables = self.read()?;
        Ok(tables
            .shares
            .iter()
            .filter(|s| s.loan_id == loan_id)
            .cloned()
            .collect())
    }

    async fn loans_for_user(&self, user_id: UserId) -> StoreResult<Vec<Loan>> {
        let tables = self.read()?;
        let mut loans: Vec<Loan> = tables
            .loans
            .values()
            .filter(|loan| {
                loan.is_owned_by(user_id)
                    || tables
                        .shares
                        .iter()
                        .any(|s| s.loan_id == loan.id && s.user_id == user_id)
            })
            .cloned()
            .collect();
        loans.sort_by_key(|l| (l.created_at, l.id));
        Ok(loans)
    }
}
