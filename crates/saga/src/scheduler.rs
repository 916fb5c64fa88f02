//! Deferred follow-up transition once a run has finished.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::FollowUpSettings;
use crate::context::CallerContext;
use crate::outcome::{OverallStatus, SagaReport};

/// A planned follow-up transition, e.g. a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowUp {
    pub target: String,
    #[serde(rename = "delay_ms", serialize_with = "serialize_millis")]
    pub delay: Duration,
}

fn serialize_millis<S: serde::Serializer>(delay: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
}

/// Decides and schedules the follow-up transition for finished runs.
#[derive(Debug, Clone)]
pub struct CompletionScheduler {
    settings: FollowUpSettings,
}

impl CompletionScheduler {
    /// Creates a scheduler with the given target and delays.
    pub fn new(settings: FollowUpSettings) -> Self {
        Self { settings }
    }

    /// Plans the follow-up for a report.
    ///
    /// Success and Warning get a transition after their delay, so the
    /// message can be read first. Error gets none.
    pub fn plan(&self, report: &SagaReport) -> Option<FollowUp> {
        let delay = match report.status() {
            OverallStatus::Success => self.settings.success_delay,
            OverallStatus::Warning => self.settings.warning_delay,
            OverallStatus::Error => return None,
        };
        Some(FollowUp {
            target: self.settings.target.clone(),
            delay,
        })
    }

    /// Schedules the planned follow-up, if any.
    ///
    /// `action` runs after the delay unless the caller context is torn down
    /// or the returned handle is cancelled first. The spawned task holds only
    /// a child cancellation token, never the context itself.
    pub fn schedule<F, Fut>(
        &self,
        report: &SagaReport,
        caller: &CallerContext,
        action: F,
    ) -> Option<ScheduledFollowUp>
    where
        F: FnOnce(FollowUp) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let follow_up = self.plan(report)?;
        if !caller.is_live() {
            return None;
        }

        let token = caller.token().child_token();
        let task_token = token.clone();
        let planned = follow_up.clone();
        let run_id = report.run_id();

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = task_token.cancelled() => {
                    tracing::debug!(%run_id, "follow-up cancelled");
                    false
                }
                () = tokio::time::sleep(follow_up.delay) => {
                    if task_token.is_cancelled() {
                        return false;
                    }
                    tracing::info!(%run_id, target = %follow_up.target, "follow-up fired");
                    action(follow_up).await;
                    true
                }
            }
        });

        Some(ScheduledFollowUp {
            follow_up: planned,
            token,
            handle,
        })
    }
}

/// Handle to a scheduled follow-up.
#[derive(Debug)]
pub struct ScheduledFollowUp {
    follow_up: FollowUp,
    token: CancellationToken,
    handle: JoinHandle<bool>,
}

impl ScheduledFollowUp {
    /// The planned transition.
    pub fn follow_up(&self) -> &FollowUp {
        &self.follow_up
    }

    /// Cancels the follow-up if it has not fired yet.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Waits for the follow-up to settle; true if the action ran.
    pub async fn fired(self) -> bool {
        self.handle.await.unwrap_or(false)
    }
}
