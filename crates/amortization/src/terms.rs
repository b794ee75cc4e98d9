//! Validated loan terms and the fixed-payment annuity formula.

use crate::error::{AmortizationError, AmortizationResult};

/// Fixed-rate, fixed-term, monthly-compounding loan terms.
///
/// Fields are private: every instance went through [`LoanTerms::new`], so the
/// monthly payment is known to be finite and the term non-empty.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LoanTerms {
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
    monthly_payment: f64,
}

impl LoanTerms {
    /// Validate loan terms and derive the fixed monthly payment.
    ///
    /// `annual_rate_percent` is a percentage (`5.0` means 5%).
    pub fn new(principal: f64, annual_rate_percent: f64, term_months: u32) -> AmortizationResult<Self> {
        if !principal.is_finite() || principal <= 0.0 {
            return Err(AmortizationError::invalid_argument(format!(
                "principal must be a positive number (got {principal})"
            )));
        }
        if !annual_rate_percent.is_finite() || annual_rate_percent < 0.0 {
            return Err(AmortizationError::invalid_argument(format!(
                "annual interest rate must be zero or positive (got {annual_rate_percent})"
            )));
        }
        if term_months == 0 {
            return Err(AmortizationError::invalid_argument(
                "loan term must be at least one month",
            ));
        }

        let monthly_rate = periodic_rate(annual_rate_percent);
        let monthly_payment = annuity_payment(principal, monthly_rate, term_months);
        if !monthly_payment.is_finite() {
            return Err(AmortizationError::invalid_argument(format!(
                "loan terms overflow the payment formula (rate {annual_rate_percent}%, {term_months} months)"
            )));
        }

        Ok(Self {
            principal,
            annual_rate_percent,
            term_months,
            monthly_payment,
        })
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    /// Interest rate applied per month, as a fraction.
    pub fn monthly_rate(&self) -> f64 {
        periodic_rate(self.annual_rate_percent)
    }

    /// Fixed payment due every month for the life of the loan.
    pub fn monthly_payment(&self) -> f64 {
        self.monthly_payment
    }
}

fn periodic_rate(annual_rate_percent: f64) -> f64 {
    (annual_rate_percent / 100.0) / 12.0
}

/// `P * r * (1+r)^n / ((1+r)^n - 1)`, or `P / n` for an interest-free loan.
fn annuity_payment(principal: f64, rate: f64, term_months: u32) -> f64 {
    let n = f64::from(term_months);
    if rate == 0.0 {
        return principal / n;
    }

    let growth = (1.0 + rate).powf(n);
    // Rates too small to move `1 + r` away from 1.0 degenerate to the
    // interest-free case instead of dividing by zero.
    if growth == 1.0 {
        return principal / n;
    }

    principal * rate * growth / (growth - 1.0)
}
