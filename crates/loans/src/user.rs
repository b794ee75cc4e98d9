use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use loantrack_core::{DomainError, DomainResult, Entity, UserId};

/// A registered user. Emails are unique across users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Registration input, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Trim both fields, require a name, and normalize the email to lowercase.
    pub fn validate(self) -> DomainResult<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name must not be blank"));
        }

        let email = self.email.trim().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(DomainError::validation(format!(
                "email is not a valid address: {email:?}"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            email,
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

impl User {
    /// Validate registration input and assign a fresh identity.
    pub fn register(new: NewUser) -> DomainResult<Self> {
        let NewUser { name, email } = new.validate()?;
        Ok(Self {
            id: UserId::new(),
            name,
            email,
            created_at: Utc::now(),
        })
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}
