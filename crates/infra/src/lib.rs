//! Infrastructure layer: persistence adapters for loan-tracking records.

pub mod store;

pub use store::{InMemoryLoanStore, LoanStore, SqliteLoanStore, StoreError, StoreResult};
