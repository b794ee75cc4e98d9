//! `loantrack-amortization`: fixed-rate loan amortization engine.
//!
//! Pure numeric functions over a principal, an annual interest rate and a term
//! in months: the fixed monthly payment, the month-by-month schedule, and a
//! cumulative summary as of any month. No IO, no shared state; every call is a
//! deterministic function of its inputs.
//!
//! ```
//! use loantrack_amortization::{build_schedule, compute_monthly_payment, compute_summary};
//!
//! let payment = compute_monthly_payment(100_000.0, 5.0, 360).unwrap();
//! assert!((payment - 536.82).abs() < 0.01);
//!
//! let schedule = build_schedule(100_000.0, 5.0, 360).unwrap();
//! assert_eq!(schedule.last().unwrap().remaining_balance, 0.0);
//!
//! let summary = compute_summary(100_000.0, 5.0, 360, 12).unwrap();
//! assert_eq!(summary.current_principal_balance, schedule[11].remaining_balance);
//! ```

pub mod error;
pub mod schedule;
pub mod terms;

pub use error::{AmortizationError, AmortizationResult};
pub use schedule::{Installment, Installments, LoanSummary, ScheduleEntry};
pub use terms::LoanTerms;

/// Fixed monthly payment for the given terms.
pub fn compute_monthly_payment(
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
) -> AmortizationResult<f64> {
    Ok(LoanTerms::new(principal, annual_rate_percent, term_months)?.monthly_payment())
}

/// Month-by-month schedule for the given terms.
pub fn build_schedule(
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
) -> AmortizationResult<Vec<ScheduleEntry>> {
    Ok(LoanTerms::new(principal, annual_rate_percent, term_months)?.schedule())
}

/// Cumulative principal/interest paid through `as_of_month`.
pub fn compute_summary(
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
    as_of_month: u32,
) -> AmortizationResult<LoanSummary> {
    LoanTerms::new(principal, annual_rate_percent, term_months)?.summary(as_of_month)
}
