use serde_json::json;
use sitequote_core::calculators::score_answers;

use crate::commands::{CommandResult, EXIT_INPUT};

pub fn run(answers: &[usize]) -> CommandResult {
    match score_answers(answers) {
        Ok(report) => CommandResult::success_with_data(
            "health-check",
            format!("{} ({}/{})", report.title, report.score, report.max_score),
            Some(json!(report)),
        ),
        Err(error) => {
            CommandResult::failure("health-check", "invalid_input", error.to_string(), EXIT_INPUT)
        }
    }
}
