use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Conversion-rate multiplier assumed for a rebuilt site. Configurable via
/// `estimator.roi_conversion_uplift`.
pub const DEFAULT_CONVERSION_UPLIFT: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

const PERCENT: Decimal = Decimal::ONE_HUNDRED;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiInputs {
    pub monthly_visitors: u32,
    /// Percentage, e.g. `2.5` for 2.5 %.
    pub conversion_rate_pct: Decimal,
    pub average_customer_value: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiProjection {
    pub current_monthly_revenue: Decimal,
    pub improved_conversion_rate_pct: Decimal,
    pub projected_monthly_revenue: Decimal,
    pub monthly_increase: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoiCalculator {
    uplift: Decimal,
}

impl Default for RoiCalculator {
    fn default() -> Self {
        Self { uplift: DEFAULT_CONVERSION_UPLIFT }
    }
}

impl RoiCalculator {
    pub fn with_uplift(uplift: Decimal) -> Result<Self, DomainError> {
        if uplift <= Decimal::ZERO {
            return Err(DomainError::InvalidCalculatorInput(format!(
                "conversion uplift must be positive, got {uplift}"
            )));
        }
        Ok(Self { uplift })
    }

    pub fn uplift(&self) -> Decimal {
        self.uplift
    }

    pub fn project(&self, inputs: &RoiInputs) -> Result<RoiProjection, DomainError> {
        if inputs.conversion_rate_pct.is_sign_negative() {
            return Err(DomainError::InvalidCalculatorInput(
                "conversion rate cannot be negative".to_string(),
            ));
        }
        if inputs.average_customer_value.is_sign_negative() {
            return Err(DomainError::InvalidCalculatorInput(
                "average customer value cannot be negative".to_string(),
            ));
        }

        let visitors = Decimal::from(inputs.monthly_visitors);
        let revenue_at = |rate_pct: Decimal| {
            visitors
                .checked_mul(rate_pct / PERCENT)
                .and_then(|converted| converted.checked_mul(inputs.average_customer_value))
                .ok_or_else(out_of_range)
        };

        let current_monthly_revenue = revenue_at(inputs.conversion_rate_pct)?;
        let improved_conversion_rate_pct =
            inputs.conversion_rate_pct.checked_mul(self.uplift).ok_or_else(out_of_range)?;
        let projected_monthly_revenue = revenue_at(improved_conversion_rate_pct)?;
        let monthly_increase = projected_monthly_revenue
            .checked_sub(current_monthly_revenue)
            .ok_or_else(out_of_range)?;

        Ok(RoiProjection {
            current_monthly_revenue,
            improved_conversion_rate_pct,
            projected_monthly_revenue,
            monthly_increase,
        })
    }
}

fn out_of_range() -> DomainError {
    DomainError::InvalidCalculatorInput("inputs are too large to project revenue".to_string())
}
