//! Boundary to the external auth/stats collaborator.
//!
//! The game server owns no persistent state; the only thing that leaves a
//! finished match is one `MatchOutcome` per identified player. Reporter
//! failures are logged and swallowed so cleanup never blocks on the
//! collaborator.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Opaque id minted by the auth service; the engine never inspects it.
    pub user_id: String,
    pub did_win: bool,
}

#[derive(Debug, Error)]
#[error("outcome report failed: {0}")]
pub struct ReportError(pub String);

#[async_trait]
pub trait OutcomeReporter: Send + Sync {
    /// Called exactly once per finished game, with one entry per player
    /// that carried a user id.
    async fn report_outcomes(&self, outcomes: Vec<MatchOutcome>) -> Result<(), ReportError>;
}

/// Default reporter: emits a structured log record per outcome. The real
/// stats collaborator is a separate service; swap this implementation at
/// the `AppState` seam.
pub struct LogOutcomeReporter;

#[async_trait]
impl OutcomeReporter for LogOutcomeReporter {
    async fn report_outcomes(&self, outcomes: Vec<MatchOutcome>) -> Result<(), ReportError> {
        for outcome in &outcomes {
            info!(
                user_id = %outcome.user_id,
                did_win = outcome.did_win,
                "match outcome"
            );
        }
        Ok(())
    }
}
