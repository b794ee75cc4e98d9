//! Month-by-month replay of a loan: payment schedule and point-in-time summary.

use serde::{Deserialize, Serialize};

use crate::error::{AmortizationError, AmortizationResult};
use crate::terms::LoanTerms;

/// One row of a payment schedule.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based month number.
    pub month: u32,
    /// Principal still owed after this month's payment.
    pub remaining_balance: f64,
    /// The loan's fixed monthly payment.
    pub monthly_payment: f64,
}

/// Cumulative repayment state as of a given month.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub current_principal_balance: f64,
    pub total_principal_paid: f64,
    pub total_interest_paid: f64,
}

/// A single simulated month, split into its interest and principal parts.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Installment {
    pub month: u32,
    pub interest: f64,
    pub principal: f64,
    pub remaining_balance: f64,
}

/// Iterator over the installments of a loan, in month order.
///
/// Ends after the final month of the term or as soon as the balance reaches
/// zero, whichever comes first. The last installment always leaves a balance
/// of exactly `0.0`.
#[derive(Debug, Clone)]
pub struct Installments {
    rate: f64,
    payment: f64,
    balance: f64,
    term_months: u32,
    month: u32,
}

impl Installments {
    fn new(terms: &LoanTerms) -> Self {
        Self {
            rate: terms.monthly_rate(),
            payment: terms.monthly_payment(),
            balance: terms.principal(),
            term_months: terms.term_months(),
            month: 0,
        }
    }
}

impl Iterator for Installments {
    type Item = Installment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.month >= self.term_months || self.balance <= 0.0 {
            return None;
        }
        self.month += 1;

        let interest = self.balance * self.rate;
        let mut principal = self.payment - interest;
        let mut remaining = self.balance - principal;

        // Overshoot on the last payment, or float residue left at the end of
        // the term: settle exactly what is owed.
        if remaining < 0.0 || self.month == self.term_months {
            principal = self.balance;
            remaining = 0.0;
        }
        self.balance = remaining;

        Some(Installment {
            month: self.month,
            interest,
            principal,
            remaining_balance: remaining,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.balance <= 0.0 {
            return (0, Some(0));
        }
        let left = (self.term_months - self.month) as usize;
        (usize::from(left > 0), Some(left))
    }
}

impl LoanTerms {
    /// Replay the loan month by month.
    pub fn installments(&self) -> Installments {
        Installments::new(self)
    }

    /// Full payment schedule, one entry per month until payoff.
    pub fn schedule(&self) -> Vec<ScheduleEntry> {
        let monthly_payment = self.monthly_payment();
        self.installments()
            .map(|i| ScheduleEntry {
                month: i.month,
                remaining_balance: i.remaining_balance,
                monthly_payment,
            })
            .collect()
    }

    /// Principal and interest paid through `as_of_month` (inclusive).
    ///
    /// `as_of_month` must lie in `1..=term_months`; out-of-range months are
    /// rejected, never clamped.
    pub fn summary(&self, as_of_month: u32) -> AmortizationResult<LoanSummary> {
        if as_of_month == 0 || as_of_month > self.term_months() {
            return Err(AmortizationError::invalid_argument(format!(
                "invalid month number: {as_of_month} (loan term is {} months)",
                self.term_months()
            )));
        }

        let start = LoanSummary {
            current_principal_balance: self.principal(),
            ..LoanSummary::default()
        };

        Ok(self
            .installments()
            .take(as_of_month as usize)
            .fold(start, |acc, i| LoanSummary {
                current_principal_balance: i.remaining_balance.max(0.0),
                total_principal_paid: acc.total_principal_paid + i.principal,
                total_interest_paid: acc.total_interest_paid + i.interest,
            }))
    }
}
