use rust_decimal::Decimal;
use serde_json::json;
use sitequote_core::calculators::{RoiCalculator, RoiInputs};
use sitequote_core::estimator::format_dollars;

use crate::commands::{load_config, CommandResult, EXIT_CONFIG, EXIT_INPUT};

pub fn run(visitors: u32, conversion_rate_pct: Decimal, customer_value: Decimal) -> CommandResult {
    let config = match load_config("roi") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let calculator = match RoiCalculator::with_uplift(config.estimator.roi_conversion_uplift) {
        Ok(calculator) => calculator,
        Err(error) => {
            return CommandResult::failure("roi", "config_validation", error.to_string(), EXIT_CONFIG)
        }
    };

    let inputs = RoiInputs {
        monthly_visitors: visitors,
        conversion_rate_pct,
        average_customer_value: customer_value,
    };

    match calculator.project(&inputs) {
        Ok(projection) => CommandResult::success_with_data(
            "roi",
            format!(
                "projected monthly increase {} at {}x conversion",
                format_dollars(projection.monthly_increase),
                calculator.uplift()
            ),
            Some(json!({ "uplift": calculator.uplift(), "projection": projection })),
        ),
        Err(error) => CommandResult::failure("roi", "invalid_input", error.to_string(), EXIT_INPUT),
    }
}
