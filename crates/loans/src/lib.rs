//! Loan-tracking records: users, loans, and loan shares.
//!
//! Deterministic domain logic only (validation and construction). Storage lives
//! in `loantrack-infra`; the payment math lives in `loantrack-amortization`.

pub mod loan;
pub mod share;
pub mod user;

pub use loan::{Loan, NewLoan, MAX_TERM_MONTHS};
pub use share::LoanShare;
pub use user::{NewUser, User};
