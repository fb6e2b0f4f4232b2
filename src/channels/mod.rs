//! Outbound delivery channels (WhatsApp, dry run).
//!
//! Backends are pluggable behind [`Dispatcher`]; the job only ever sees
//! the trait object returned by [`build_dispatcher`].

pub mod dry_run;
pub mod traits;
pub mod whatsapp;

use crate::config::{DispatchBackend, DispatchConfig};
use std::sync::Arc;

pub use dry_run::DryRunDispatcher;
pub use traits::Dispatcher;
pub use whatsapp::WhatsAppDispatcher;

/// Configuration validation issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchValidationSeverity {
    Warning,
    Error,
}

/// Validation issue surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchValidationIssue {
    pub id: String,
    pub severity: DispatchValidationSeverity,
    pub summary: String,
}

/// Construct the configured dispatcher.
pub fn build_dispatcher(config: &DispatchConfig) -> Arc<dyn Dispatcher> {
    match config.backend {
        DispatchBackend::Whatsapp => Arc::new(WhatsAppDispatcher::new(&config.whatsapp)),
        DispatchBackend::DryRun => Arc::new(DryRunDispatcher),
    }
}

/// Validate dispatch configuration without network calls.
#[must_use]
pub fn validate_config(config: &DispatchConfig) -> Vec<DispatchValidationIssue> {
    let mut issues = Vec::new();

    if config.recipient.trim().is_empty() {
        issues.push(DispatchValidationIssue {
            id: "dispatch-missing-recipient".to_owned(),
            severity: match config.backend {
                DispatchBackend::Whatsapp => DispatchValidationSeverity::Error,
                DispatchBackend::DryRun => DispatchValidationSeverity::Warning,
            },
            summary: "dispatch.recipient is empty; puzzles have nowhere to go.".to_owned(),
        });
    }

    if config.backend == DispatchBackend::Whatsapp {
        if config.whatsapp.access_token.trim().is_empty() {
            issues.push(DispatchValidationIssue {
                id: "whatsapp-missing-access-token".to_owned(),
                severity: DispatchValidationSeverity::Error,
                summary: "WhatsApp is selected but the access token is empty.".to_owned(),
            });
        }
        if config.whatsapp.phone_number_id.trim().is_empty() {
            issues.push(DispatchValidationIssue {
                id: "whatsapp-missing-phone-number-id".to_owned(),
                severity: DispatchValidationSeverity::Error,
                summary: "WhatsApp is selected but the phone number ID is empty.".to_owned(),
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn default_config_builds_dry_run() {
        let dispatcher = build_dispatcher(&DispatchConfig::default());
        assert_eq!(dispatcher.id(), "dry_run");
    }

    #[test]
    fn whatsapp_backend_builds_whatsapp() {
        let config = DispatchConfig {
            backend: DispatchBackend::Whatsapp,
            ..DispatchConfig::default()
        };
        assert_eq!(build_dispatcher(&config).id(), "whatsapp");
    }

    #[test]
    fn dry_run_without_recipient_only_warns() {
        let issues = validate_config(&DispatchConfig::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, DispatchValidationSeverity::Warning);
    }

    #[test]
    fn whatsapp_without_credentials_is_error() {
        let config = DispatchConfig {
            backend: DispatchBackend::Whatsapp,
            recipient: "+15550001111".to_owned(),
            ..DispatchConfig::default()
        };
        let ids: Vec<_> = validate_config(&config).into_iter().map(|i| i.id).collect();
        assert_eq!(
            ids,
            vec![
                "whatsapp-missing-access-token".to_owned(),
                "whatsapp-missing-phone-number-id".to_owned()
            ]
        );
    }

    #[tokio::test]
    async fn dry_run_always_succeeds() {
        let dispatcher = DryRunDispatcher;
        dispatcher
            .send_image(std::path::Path::new("fallback_image.jpg"), "caption", "")
            .await
            .unwrap();
        assert!(dispatcher.health_check().await.unwrap());
    }
}
