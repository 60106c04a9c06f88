use rust_decimal::{Decimal, RoundingStrategy};

use super::quote::Quote;

/// Label used in the summary when no project type was chosen.
pub const UNKNOWN_PROJECT_LABEL: &str = "Unknown Project";

/// Renders the shareable text handed to the contact form.
pub fn format_summary(quote: &Quote) -> String {
    let project =
        quote.project_type().map(|line| line.label.as_str()).unwrap_or(UNKNOWN_PROJECT_LABEL);
    let features =
        quote.features().map(|line| line.label.as_str()).collect::<Vec<_>>().join(", ");

    format!(
        "I used the estimator. I'm looking for a {project}. Features: {features}. \
         Estimated Budget: {}.",
        format_dollars(quote.total)
    )
}

/// `$` followed by [`format_whole_amount`].
pub fn format_dollars(amount: Decimal) -> String {
    if amount.is_sign_negative() && !amount.round_dp(0).is_zero() {
        return format!("-${}", format_whole_amount(amount.abs()));
    }
    format!("${}", format_whole_amount(amount))
}

/// Whole currency units with `,` between thousands groups.
///
/// Fractional amounts round half away from zero.
pub fn format_whole_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().trunc().normalize().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}
