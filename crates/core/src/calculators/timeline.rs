use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Weeks assumed when the project type is not in the table.
pub const DEFAULT_PROJECT_WEEKS: u32 = 4;

/// Build length in weeks for a project type, matched by label or catalog id.
pub fn weeks_for_project(project_type: &str) -> u32 {
    match project_type.trim().to_ascii_lowercase().as_str() {
        "landing page" | "landing" => 2,
        "corporate website" | "corporate" => 4,
        "e-commerce store" | "ecommerce" => 8,
        "custom web app" | "webapp" => 12,
        "mobile app" | "mobile" => 16,
        _ => DEFAULT_PROJECT_WEEKS,
    }
}

struct PhaseShare {
    name: &'static str,
    /// Share of total weeks, in tenths.
    duration_tenths: u32,
    /// Cumulative share of total days at which the phase ends, in percent.
    ends_at_pct: u32,
}

const PHASES: [PhaseShare; 4] = [
    PhaseShare { name: "Discovery & Strategy", duration_tenths: 2, ends_at_pct: 20 },
    PhaseShare { name: "UI/UX Design", duration_tenths: 3, ends_at_pct: 50 },
    PhaseShare { name: "Development", duration_tenths: 4, ends_at_pct: 90 },
    PhaseShare { name: "QA & Launch", duration_tenths: 1, ends_at_pct: 100 },
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePhase {
    pub name: String,
    pub duration_weeks: u32,
    pub ends_on: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTimeline {
    pub project_type: String,
    pub total_weeks: u32,
    pub start: NaiveDate,
    pub launch: NaiveDate,
    pub phases: Vec<TimelinePhase>,
}

pub fn build_timeline(project_type: &str, start: NaiveDate) -> Result<ProjectTimeline, DomainError> {
    let total_weeks = weeks_for_project(project_type);
    let total_days = u64::from(total_weeks) * 7;

    let offset = |days: u64| {
        start.checked_add_days(Days::new(days)).ok_or_else(|| {
            DomainError::InvalidCalculatorInput(format!("start date {start} is out of range"))
        })
    };

    let phases = PHASES
        .iter()
        .map(|phase| {
            Ok(TimelinePhase {
                name: phase.name.to_string(),
                duration_weeks: (total_weeks * phase.duration_tenths + 5) / 10,
                ends_on: offset(total_days * u64::from(phase.ends_at_pct) / 100)?,
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;

    Ok(ProjectTimeline {
        project_type: project_type.trim().to_string(),
        total_weeks,
        start,
        launch: offset(total_days)?,
        phases,
    })
}
