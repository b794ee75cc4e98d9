//! `loantrack-core`: ids, errors and record traits shared by every loantrack crate.
//!
//! Nothing here touches storage, HTTP or the payment math.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{LoanId, UserId};
