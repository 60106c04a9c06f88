use chrono::{NaiveDate, Utc};
use serde_json::json;
use sitequote_core::calculators::build_timeline;

use crate::commands::{CommandResult, EXIT_INPUT};

/// Pure calculation; needs no config or database.
pub fn run(project_type: &str, start: Option<NaiveDate>) -> CommandResult {
    let start = start.unwrap_or_else(|| Utc::now().date_naive());

    match build_timeline(project_type, start) {
        Ok(timeline) => CommandResult::success_with_data(
            "timeline",
            format!("{} weeks, launch on {}", timeline.total_weeks, timeline.launch),
            Some(json!(timeline)),
        ),
        Err(error) => {
            CommandResult::failure("timeline", "invalid_input", error.to_string(), EXIT_INPUT)
        }
    }
}
