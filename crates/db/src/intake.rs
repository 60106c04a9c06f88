use std::sync::Arc;

use thiserror::Error;

use sitequote_core::audit::{
    AuditCategory, AuditContext, AuditOutcome, AuditSink, TracingAuditSink,
};
use sitequote_core::domain::lead::{ContactDraft, Lead, LeadValidationError, NewsletterSubscription};

use crate::repositories::{LeadRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum LeadError {
    #[error(transparent)]
    Invalid(#[from] LeadValidationError),
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

const ACTOR: &str = "lead_intake";

/// Validates contact and newsletter submissions and stores accepted ones.
/// Every submission is audited: `lead.received`, `lead.rejected` or
/// `lead.store_failed`.
pub struct LeadIntake<R> {
    repository: R,
    sink: Arc<dyn AuditSink>,
}

impl<R> LeadIntake<R>
where
    R: LeadRepository,
{
    pub fn new(repository: R) -> Self {
        Self::with_audit(repository, Arc::new(TracingAuditSink))
    }

    pub fn with_audit(repository: R, sink: Arc<dyn AuditSink>) -> Self {
        Self { repository, sink }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub async fn submit_contact(
        &self,
        draft: ContactDraft,
        correlation_id: &str,
    ) -> Result<Lead, LeadError> {
        let audit = AuditContext::new(None, correlation_id, ACTOR);
        let message = draft.validate().map_err(|error| self.rejected(&audit, "contact", error))?;
        self.store(Lead::contact(message), &audit).await
    }

    pub async fn subscribe(&self, email: &str, correlation_id: &str) -> Result<Lead, LeadError> {
        let audit = AuditContext::new(None, correlation_id, ACTOR);
        let subscription = NewsletterSubscription::new(email)
            .map_err(|error| self.rejected(&audit, "newsletter", error))?;
        self.store(Lead::newsletter(subscription), &audit).await
    }

    fn rejected(&self, audit: &AuditContext, kind: &str, error: LeadValidationError) -> LeadError {
        self.sink.emit(
            audit
                .event("lead.rejected", AuditCategory::Lead, AuditOutcome::Rejected)
                .with_metadata("kind", kind)
                .with_metadata("reason", error.to_string()),
        );
        LeadError::Invalid(error)
    }

    async fn store(&self, lead: Lead, audit: &AuditContext) -> Result<Lead, LeadError> {
        if let Err(error) = self.repository.save(lead.clone()).await {
            self.sink.emit(
                audit
                    .event("lead.store_failed", AuditCategory::Lead, AuditOutcome::Failed)
                    .with_metadata("kind", lead.kind.as_str())
                    .with_metadata("error", error.to_string()),
            );
            return Err(LeadError::Storage(error));
        }

        self.sink.emit(
            audit
                .event("lead.received", AuditCategory::Lead, AuditOutcome::Success)
                .with_metadata("lead_id", lead.id.0.clone())
                .with_metadata("kind", lead.kind.as_str()),
        );
        Ok(lead)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sitequote_core::audit::{AuditOutcome, InMemoryAuditSink};
    use sitequote_core::domain::lead::{ContactDraft, LeadKind, LeadValidationError};

    use super::{LeadError, LeadIntake};
    use crate::connect_with_settings;
    use crate::repositories::{InMemoryLeadRepository, LeadRepository, SqlLeadRepository};

    #[tokio::test]
    async fn contact_is_trimmed_and_stored() {
        let sink = InMemoryAuditSink::default();
        let intake =
            LeadIntake::with_audit(InMemoryLeadRepository::default(), Arc::new(sink.clone()));
        let draft = ContactDraft {
            name: "  Ada ".to_string(),
            email: "ada@example.com ".to_string(),
            message: "Need a landing page".to_string(),
        };

        let lead = intake.submit_contact(draft, "req-1").await.expect("valid contact");

        assert_eq!(lead.kind, LeadKind::Contact);
        assert_eq!(lead.name.as_deref(), Some("Ada"));
        let stored = intake.repository().find_by_id(&lead.id).await.expect("lookup");
        assert_eq!(stored, Some(lead.clone()));

        let events = sink.events();
        assert_eq!(sink.event_types(), vec!["lead.received"]);
        assert_eq!(events[0].correlation_id, "req-1");
        assert_eq!(events[0].metadata.get("lead_id"), Some(&lead.id.0));
    }

    #[tokio::test]
    async fn invalid_newsletter_email_is_not_stored() {
        let sink = InMemoryAuditSink::default();
        let intake =
            LeadIntake::with_audit(InMemoryLeadRepository::default(), Arc::new(sink.clone()));

        let error = intake.subscribe("not-an-email", "req-2").await.expect_err("invalid email");

        assert!(matches!(error, LeadError::Invalid(LeadValidationError::InvalidEmail(_))));
        assert!(intake.repository().list_recent(10).await.expect("list").is_empty());
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "lead.rejected");
        assert_eq!(events[0].outcome, AuditOutcome::Rejected);
        assert_eq!(events[0].metadata.get("kind").map(String::as_str), Some("newsletter"));
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let intake = LeadIntake::new(InMemoryLeadRepository::default());
        let draft = ContactDraft {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "   ".to_string(),
        };

        let error = intake.submit_contact(draft, "req-3").await.expect_err("blank message");
        assert!(matches!(error, LeadError::Invalid(LeadValidationError::MissingField("message"))));
    }

    #[tokio::test]
    async fn storage_failure_is_audited_as_failed() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        pool.close().await;
        let sink = InMemoryAuditSink::default();
        let intake = LeadIntake::with_audit(SqlLeadRepository::new(pool), Arc::new(sink.clone()));

        let error = intake.subscribe("ada@example.com", "req-4").await.expect_err("pool closed");

        assert!(matches!(error, LeadError::Storage(_)));
        let events = sink.events();
        assert_eq!(sink.event_types(), vec!["lead.store_failed"]);
        assert_eq!(events[0].outcome, AuditOutcome::Failed);
    }
}
