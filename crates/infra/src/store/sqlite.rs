//! SQLite-backed loan store.
//!
//! The schema is created on connect (`CREATE TABLE IF NOT EXISTS`), so a fresh
//! database file or `sqlite::memory:` is usable immediately. Ids are stored as
//! UUID text and timestamps as RFC 3339 text, which sorts chronologically.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use loantrack_core::{DomainError, LoanId, UserId};
use loantrack_loans::{Loan, LoanShare, User};

use super::{LoanStore, StoreError, StoreResult};

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id         TEXT NOT NULL PRIMARY KEY,
        name       TEXT NOT NULL,
        email      TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS loans (
        id                   TEXT NOT NULL PRIMARY KEY,
        owner_id             TEXT NOT NULL REFERENCES users (id),
        amount               REAL NOT NULL,
        annual_interest_rate REAL NOT NULL,
        loan_term_months     INTEGER NOT NULL,
        created_at           TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS loan_shares (
        loan_id   TEXT NOT NULL REFERENCES loans (id),
        user_id   TEXT NOT NULL REFERENCES users (id),
        shared_at TEXT NOT NULL,
        PRIMARY KEY (loan_id, user_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS loan_shares_by_user ON loan_shares (user_id)",
];

/// SQLite loan store over a shared `sqlx` pool.
#[derive(Debug, Clone)]
pub struct SqliteLoanStore {
    pool: SqlitePool,
}

impl SqliteLoanStore {
    /// Connect to `url`, creating the database file and schema if missing.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` is a separate database; pin to one
        // connection that is never recycled.
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the schema if missing.
    pub async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        tracing::debug!("sqlite loan store schema ready");
        Ok(Self { pool })
    }
}

fn parse_id<T>(raw: String) -> StoreResult<T>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn user_from_row(row: &SqliteRow) -> StoreResult<User> {
    Ok(User {
        id: parse_id(row.try_get("id")?)?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

fn loan_from_row(row: &SqliteRow) -> StoreResult<Loan> {
    let term: i64 = row.try_get("loan_term_months")?;
    let loan_term_months = u32::try_from(term)
        .map_err(|_| StoreError::Corrupt(format!("loan_term_months out of range: {term}")))?;

    Ok(Loan {
        id: parse_id(row.try_get("id")?)?,
        owner_id: parse_id(row.try_get("owner_id")?)?,
        amount: row.try_get("amount")?,
        annual_interest_rate: row.try_get("annual_interest_rate")?,
        loan_term_months,
        created_at: row.try_get("created_at")?,
    })
}

fn share_from_row(row: &SqliteRow) -> StoreResult<LoanShare> {
    Ok(LoanShare {
        loan_id: parse_id(row.try_get("loan_id")?)?,
        user_id: parse_id(row.try_get("user_id")?)?,
        shared_at: row.try_get("shared_at")?,
    })
}

#[async_trait]
impl LoanStore for SqliteLoanStore {
    async fn insert_user(&self, user: User) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO users (id, name, email, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result.map_err(StoreError::from) {
            Ok(_) => Ok(()),
            Err(StoreError::Conflict(_)) => Err(StoreError::Conflict(format!(
                "email already registered: {}",
                user.email
            ))),
            Err(e) => Err(e),
        }
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        sqlx::query("SELECT id, name, email, created_at FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        sqlx::query("SELECT id, name, email, created_at FROM users ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(user_from_row)
            .collect()
    }

    async fn insert_loan(&self, loan: Loan) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO loans (id, owner_id, amount, annual_interest_rate, loan_term_months, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(loan.id.to_string())
        .bind(loan.owner_id.to_string())
        .bind(loan.amount)
        .bind(loan.annual_interest_rate)
        .bind(i64::from(loan.loan_term_months))
        .bind(loan.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_loan(&self, id: LoanId) -> StoreResult<Option<Loan>> {
        sqlx::query(
            r#"
            SELECT id, owner_id, amount, annual_interest_rate, loan_term_months, created_at
            FROM loans
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(loan_from_row)
        .transpose()
    }

    async fn insert_share(&self, share: LoanShare) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO loan_shares (loan_id, user_id, shared_at) VALUES (?, ?, ?)",
        )
        .bind(share.loan_id.to_string())
        .bind(share.user_id.to_string())
        .bind(share.shared_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn shares_for_loan(&self, loan_id: LoanId) -> StoreResult<Vec<LoanShare>> {
        sqlx::query(
            r#"
            SELECT loan_id, user_id, shared_at
            FROM loan_shares
            WHERE loan_id = ?
            ORDER BY shared_at, user_id
            "#,
        )
        .bind(loan_id.to_string())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(share_from_row)
        .collect()
    }

    async fn loans_for_user(&self, user_id: UserId) -> StoreResult<Vec<Loan>> {
        let user_id = user_id.to_string();
        sqlx::query(
            r#"
            SELECT id, owner_id, amount, annual_interest_rate, loan_term_months, created_at
            FROM loans
            WHERE owner_id = ?
               OR id IN (SELECT loan_id FROM loan_shares WHERE user_id = ?)
            ORDER BY created_at, id
            "#,
        )
        .bind(&user_id)
        .bind(&user_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(loan_from_row)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loantrack_loans::{NewLoan, NewUser};

    async fn memory_store() -> SqliteLoanStore {
        SqliteLoanStore::connect("sqlite::memory:").await.unwrap()
    }

    fn user(name: &str, email: &str) -> User {
        User::register(NewUser::new(name, email)).unwrap()
    }

    fn loan(owner: UserId) -> Loan {
        Loan::open(NewLoan {
            owner_id: owner,
            amount: 100_000.0,
            annual_interest_rate: 5.0,
            loan_term_months: 360,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn user_round_trip() {
        let store = memory_store().await;
        let ada = user("Ada", "ada@example.com");
        store.insert_user(ada.clone()).await.unwrap();

        let loaded = store.get_user(ada.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, ada.id);
        assert_eq!(loaded.name, "Ada");
        assert_eq!(loaded.email, "ada@example.com");
        assert_eq!(loaded.created_at.timestamp(), ada.created_at.timestamp());

        assert!(store.get_user(UserId::new()).await.unwrap().is_none());
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = memory_store().await;
        store.insert_user(user("Ada", "ada@example.com")).await.unwrap();

        let err = store
            .insert_user(user("Other", "ada@example.com"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Conflict("email already registered: ada@example.com".to_string())
        );
    }

    #[tokio::test]
    async fn loan_round_trip_preserves_terms() {
        let store = memory_store().await;
        let owner = user("Owner", "owner@example.com");
        store.insert_user(owner.clone()).await.unwrap();
        let l = loan(owner.id);
        store.insert_loan(l.clone()).await.unwrap();

        let loaded = store.get_loan(l.id).await.unwrap().unwrap();
        assert_eq!(loaded.owner_id, owner.id);
        assert_eq!(loaded.amount, 100_000.0);
        assert_eq!(loaded.annual_interest_rate, 5.0);
        assert_eq!(loaded.loan_term_months, 360);
        assert_eq!(
            loaded.terms().unwrap().monthly_payment(),
            l.terms().unwrap().monthly_payment()
        );
        assert!(store.get_loan(LoanId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn shares_and_user_loans() {
        let store = memory_store().await;
        let owner = user("Owner", "owner@example.com");
        let friend = user("Friend", "friend@example.com");
        store.insert_user(owner.clone()).await.unwrap();
        store.insert_user(friend.clone()).await.unwrap();

        let shared = loan(owner.id);
        let private = loan(owner.id);
        store.insert_loan(shared.clone()).await.unwrap();
        store.insert_loan(private.clone()).await.unwrap();

        assert!(store.insert_share(LoanShare::new(shared.id, friend.id)).await.unwrap());
        assert!(!store.insert_share(LoanShare::new(shared.id, friend.id)).await.unwrap());

        let shares = store.shares_for_loan(shared.id).await.unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].user_id, friend.id);

        let friend_loans = store.loans_for_user(friend.id).await.unwrap();
        assert_eq!(friend_loans.len(), 1);
        assert_eq!(friend_loans[0].id, shared.id);

        assert_eq!(store.loans_for_user(owner.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn corrupt_ids_are_reported() {
        let store = memory_store().await;
        sqlx::query("INSERT INTO users (id, name, email, created_at) VALUES ('nope', 'X', 'x@y.z', '2024-01-01T00:00:00Z')")
            .execute(&store.pool)
            .await
            .unwrap();

        let err = store.list_users().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
