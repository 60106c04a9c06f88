use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::estimator::{format_summary, Quote};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeadId(pub String);

impl LeadId {
    pub fn generate() -> Self {
        Self(format!("LEAD-{}", Uuid::new_v4()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    Contact,
    Newsletter,
}

impl LeadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Newsletter => "newsletter",
        }
    }
}

impl std::str::FromStr for LeadKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "contact" => Ok(Self::Contact),
            "newsletter" => Ok(Self::Newsletter),
            other => Err(format!("unknown lead kind `{other}`")),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LeadValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("`{0}` is not a valid email address")]
    InvalidEmail(String),
}

/// Contact form fields as typed by the visitor, before validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactDraft {
    /// Draft whose message is pre-filled with the estimator summary.
    pub fn from_quote(quote: &Quote) -> Self {
        Self { message: format_summary(quote), ..Self::default() }
    }

    pub fn validate(self) -> Result<ContactMessage, LeadValidationError> {
        let name = required("name", &self.name)?;
        let email = validate_email(&self.email)?;
        let message = required("message", &self.message)?;
        Ok(ContactMessage { name, email, message })
    }
}

/// A contact submission that passed validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    name: String,
    email: String,
    message: String,
}

impl ContactMessage {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    email: String,
}

impl NewsletterSubscription {
    pub fn new(email: &str) -> Result<Self, LeadValidationError> {
        Ok(Self { email: validate_email(email)? })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Stored lead record, one per accepted submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub kind: LeadKind,
    pub name: Option<String>,
    pub email: String,
    pub message: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Lead {
    pub fn contact(message: ContactMessage) -> Self {
        Self {
            id: LeadId::generate(),
            kind: LeadKind::Contact,
            name: Some(message.name),
            email: message.email,
            message: Some(message.message),
            submitted_at: Utc::now(),
        }
    }

    pub fn newsletter(subscription: NewsletterSubscription) -> Self {
        Self {
            id: LeadId::generate(),
            kind: LeadKind::Newsletter,
            name: None,
            email: subscription.email,
            message: None,
            submitted_at: Utc::now(),
        }
    }
}

fn required(field: &'static str, value: &str) -> Result<String, LeadValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LeadValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn validate_email(value: &str) -> Result<String, LeadValidationError> {
    let email = required("email", value)?;
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
                && domain
                    .rsplit_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    .unwrap_or(false)
        }
        None => false,
    };

    if !well_formed {
        return Err(LeadValidationError::InvalidEmail(email));
    }
    Ok(email)
}
