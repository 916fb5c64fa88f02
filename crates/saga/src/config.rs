//! Saga configuration loaded from environment variables.

use std::time::Duration;

/// Endpoint and timeout for one saga step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSettings {
    pub endpoint: String,
    pub timeout: Duration,
}

impl StepSettings {
    /// Creates step settings from an endpoint and timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

/// Where generated document links point and where they should point instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    /// Host and port the document service writes into its links.
    pub internal_host: String,
    /// Base address clients can actually reach.
    pub public_base_url: String,
}

/// Follow-up transition scheduled once a run finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpSettings {
    pub target: String,
    pub success_delay: Duration,
    pub warning_delay: Duration,
}

/// Configuration for the confirmation saga.
///
/// Reads from environment variables:
/// - `RECORD_SERVICE_URL`, `DOCUMENT_SERVICE_URL`, `EMAIL_SERVICE_URL`, `SMS_SERVICE_URL`
/// - `RECORD_TIMEOUT_MS` (15000), `DOCUMENT_TIMEOUT_MS` (20000),
///   `EMAIL_TIMEOUT_MS` (15000), `SMS_TIMEOUT_MS` (15000)
/// - `DOCUMENT_INTERNAL_HOST` (`host.docker.internal:8004`), `DOCUMENT_PUBLIC_BASE_URL`
/// - `DOCUMENT_KIND` (`Policy Certificate`)
/// - `FOLLOW_UP_TARGET` (`/dashboard`), `SUCCESS_REDIRECT_DELAY_MS` (4000),
///   `WARNING_REDIRECT_DELAY_MS` (5000)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SagaConfig {
    pub record: StepSettings,
    pub document: StepSettings,
    pub email: StepSettings,
    pub sms: StepSettings,
    pub document_kind: String,
    pub links: LinkSettings,
    pub follow_up: FollowUpSettings,
}

impl SagaConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            record: step_from_env(
                "RECORD_SERVICE_URL",
                "RECORD_TIMEOUT_MS",
                &defaults.record,
            ),
            document: step_from_env(
                "DOCUMENT_SERVICE_URL",
                "DOCUMENT_TIMEOUT_MS",
                &defaults.document,
            ),
            email: step_from_env("EMAIL_SERVICE_URL", "EMAIL_TIMEOUT_MS", &defaults.email),
            sms: step_from_env("SMS_SERVICE_URL", "SMS_TIMEOUT_MS", &defaults.sms),
            document_kind: env_or("DOCUMENT_KIND", &defaults.document_kind),
            links: LinkSettings {
                internal_host: env_or("DOCUMENT_INTERNAL_HOST", &defaults.links.internal_host),
                public_base_url: env_or(
                    "DOCUMENT_PUBLIC_BASE_URL",
                    &defaults.links.public_base_url,
                ),
            },
            follow_up: FollowUpSettings {
                target: env_or("FOLLOW_UP_TARGET", &defaults.follow_up.target),
                success_delay: env_millis(
                    "SUCCESS_REDIRECT_DELAY_MS",
                    defaults.follow_up.success_delay,
                ),
                warning_delay: env_millis(
                    "WARNING_REDIRECT_DELAY_MS",
                    defaults.follow_up.warning_delay,
                ),
            },
        }
    }
}

impl Default for SagaConfig {
    fn default() -> Self {
        Self {
            record: StepSettings::new(
                "http://localhost:8001/api/policies/external",
                Duration::from_secs(15),
            ),
            document: StepSettings::new(
                "http://localhost:8004/api/documents/",
                Duration::from_secs(20),
            ),
            email: StepSettings::new(
                "http://localhost:5001/send-suds-email",
                Duration::from_secs(15),
            ),
            sms: StepSettings::new(
                "http://localhost:5002/send-suds-sms",
                Duration::from_secs(15),
            ),
            document_kind: "Policy Certificate".to_string(),
            links: LinkSettings {
                internal_host: "host.docker.internal:8004".to_string(),
                public_base_url: "http://localhost:8004".to_string(),
            },
            follow_up: FollowUpSettings {
                target: "/dashboard".to_string(),
                success_delay: Duration::from_millis(4000),
                warning_delay: Duration::from_millis(5000),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn step_from_env(url_key: &str, timeout_key: &str, default: &StepSettings) -> StepSettings {
    StepSettings {
        endpoint: env_or(url_key, &default.endpoint),
        timeout: env_millis(timeout_key, default.timeout),
    }
}
