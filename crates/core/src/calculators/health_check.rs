use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HealthOption {
    pub text: &'static str,
    pub score: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HealthQuestion {
    pub question: &'static str,
    pub options: [HealthOption; 3],
}

const fn options(good: &'static str, fair: &'static str, poor: &'static str) -> [HealthOption; 3] {
    [
        HealthOption { text: good, score: 10 },
        HealthOption { text: fair, score: 5 },
        HealthOption { text: poor, score: 0 },
    ]
}

pub const QUESTIONS: [HealthQuestion; 5] = [
    HealthQuestion {
        question: "Is your website mobile-friendly?",
        options: options(
            "Yes, it works perfectly on phones",
            "It's okay, but some things look weird",
            "No, you have to pinch and zoom",
        ),
    },
    HealthQuestion {
        question: "How fast does your website load?",
        options: options(
            "Instantly (under 2 seconds)",
            "A bit slow (3-5 seconds)",
            "Painfully slow (5+ seconds)",
        ),
    },
    HealthQuestion {
        question: "When was the last time you updated the design?",
        options: options("In the last 12 months", "1-3 years ago", "More than 3 years ago"),
    },
    HealthQuestion {
        question: "Do you get regular leads from your website?",
        options: options("Yes, almost daily", "Sometimes, but not enough", "Rarely or never"),
    },
    HealthQuestion {
        question: "Is your site secure (HTTPS)?",
        options: options("Yes, it has a lock icon", "I'm not sure", "No, it says 'Not Secure'"),
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthVerdict {
    LookingGood,
    NeedsImprovement,
    CriticalCondition,
}

impl HealthVerdict {
    pub fn from_score(score: u32) -> Self {
        match score {
            40.. => Self::LookingGood,
            25..=39 => Self::NeedsImprovement,
            _ => Self::CriticalCondition,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::LookingGood => "Looking Good!",
            Self::NeedsImprovement => "Needs Improvement",
            Self::CriticalCondition => "Critical Condition",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::LookingGood => {
                "Your website is in great shape. You might just need minor optimizations."
            }
            Self::NeedsImprovement => {
                "Your site is functional but losing potential customers. \
                 A refresh would help significantly."
            }
            Self::CriticalCondition => {
                "Your website is likely hurting your brand and SEO. \
                 A complete redesign is highly recommended."
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub score: u32,
    pub max_score: u32,
    pub verdict: HealthVerdict,
    pub title: String,
    pub description: String,
}

/// Scores one option index per question, in question order.
pub fn score_answers(answers: &[usize]) -> Result<HealthReport, DomainError> {
    if answers.len() != QUESTIONS.len() {
        return Err(DomainError::InvalidCalculatorInput(format!(
            "expected {} answers, got {}",
            QUESTIONS.len(),
            answers.len()
        )));
    }

    let mut score = 0;
    for (position, (question, &choice)) in QUESTIONS.iter().zip(answers).enumerate() {
        let option = question.options.get(choice).ok_or_else(|| {
            DomainError::InvalidCalculatorInput(format!(
                "answer {} has no option {choice}",
                position + 1
            ))
        })?;
        score += option.score;
    }

    let verdict = HealthVerdict::from_score(score);
    Ok(HealthReport {
        score,
        max_score: QUESTIONS.len() as u32 * 10,
        verdict,
        title: verdict.title().to_string(),
        description: verdict.description().to_string(),
    })
}
