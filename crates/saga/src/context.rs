//! The caller's side of a saga run: liveness and progress delivery.

use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::events::SagaProgress;

/// Context owned by whoever started a saga run.
///
/// Tearing it down stops every further observable effect of the run: no
/// more progress, no report, no follow-up transition. Calls already in
/// flight may finish, but their results are discarded.
#[derive(Debug, Clone, Default)]
pub struct CallerContext {
    token: CancellationToken,
    progress: Option<mpsc::UnboundedSender<SagaProgress>>,
}

impl CallerContext {
    /// Creates a live context that does not observe progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a live context and the receiving end of its progress stream.
    pub fn with_progress() -> (Self, mpsc::UnboundedReceiver<SagaProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = Self {
            token: CancellationToken::new(),
            progress: Some(tx),
        };
        (ctx, rx)
    }

    /// Returns true until the context is torn down.
    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Tears the context down.
    pub fn tear_down(&self) {
        self.token.cancel();
    }

    /// Returns a guard that tears the context down when dropped.
    pub fn drop_guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    /// Returns the liveness token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Delivers a progress event if the context is still live.
    ///
    /// Returns false once torn down. A dropped receiver does not count as
    /// teardown.
    pub fn emit(&self, event: SagaProgress) -> bool {
        if !self.is_live() {
            tracing::trace!(event = event.event_type(), "progress suppressed after teardown");
            return false;
        }
        if let Some(tx) = &self.progress {
            let _ = tx.send(event);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::StepName;

    #[test]
    fn test_emit_delivers_while_live() {
        let (ctx, mut rx) = CallerContext::with_progress();
        assert!(ctx.emit(SagaProgress::Validating));
        assert_eq!(rx.try_recv().unwrap(), SagaProgress::Validating);
    }

    #[test]
    fn test_emit_is_suppressed_after_teardown() {
        let (ctx, mut rx) = CallerContext::with_progress();
        ctx.tear_down();
        assert!(!ctx.is_live());
        assert!(!ctx.emit(SagaProgress::StepStarted {
            step: StepName::CreateRecord
        }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_drop_guard_tears_down() {
        let ctx = CallerContext::new();
        {
            let _guard = ctx.drop_guard();
            assert!(ctx.is_live());
        }
        assert!(!ctx.is_live());
    }

    #[test]
    fn test_clones_share_liveness() {
        let ctx = CallerContext::new();
        let clone = ctx.clone();
        clone.tear_down();
        assert!(!ctx.is_live());
    }

    #[test]
    fn test_emit_without_observer_still_reports_liveness() {
        let ctx = CallerContext::new();
        assert!(ctx.emit(SagaProgress::Validating));
    }
}
