//! Lifecycle of one detection run: `idle → requesting → succeeded | failed`
//!
//! Every run gets a ticket. Resolving with a ticket that is no longer the
//! outstanding one yields [`Resolution::Stale`], so a response that arrives
//! after the user cleared the image never overwrites newer state.

use brickyard_pieces::{mock_batch, Piece};
use thiserror::Error;

/// Failure message for a run that produced no pieces
pub const NO_PIECES: &str = "No pieces detected";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("a detection run is already in progress")]
    AlreadyRunning,
}

/// Handle identifying one outstanding request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunTicket(u64);

/// What happens to the displayed batch when a run fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the error and keep the previous batch (primary generation flow)
    #[default]
    Alert,
    /// Substitute the mock batch so the UI always has content (demo flow)
    SubstituteMock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Requesting(RunTicket),
}

/// How the last run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded { count: usize },
    Failed { message: String, substituted: bool },
}

/// What the caller should do with a resolved run
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Replace the displayed batch
    Replace(Vec<Piece>),
    /// Show the message; the previous batch stays
    KeepPrevious { message: String },
    /// The run was superseded or cancelled; ignore it
    Stale,
}

#[derive(Debug, Clone)]
pub struct DetectionRun {
    phase: RunPhase,
    policy: FailurePolicy,
    next_ticket: u64,
    last_outcome: Option<RunOutcome>,
}

impl DetectionRun {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            phase: RunPhase::Idle,
            policy,
            next_ticket: 0,
            last_outcome: None,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, RunPhase::Requesting(_))
    }

    pub fn last_outcome(&self) -> Option<&RunOutcome> {
        self.last_outcome.as_ref()
    }

    /// Enter `requesting`; only one run may be outstanding
    pub fn begin(&mut self) -> Result<RunTicket, RunError> {
        if self.is_running() {
            return Err(RunError::AlreadyRunning);
        }
        self.next_ticket += 1;
        let ticket = RunTicket(self.next_ticket);
        self.phase = RunPhase::Requesting(ticket);
        Ok(ticket)
    }

    /// Abandon the outstanding run, if any; its resolution becomes stale.
    /// Returns whether a run was abandoned.
    pub fn cancel(&mut self) -> bool {
        let was_running = self.is_running();
        if was_running {
            tracing::info!("abandoning in-flight detection run");
        }
        self.phase = RunPhase::Idle;
        was_running
    }

    /// Apply the result of the run identified by `ticket` and return to idle
    pub fn resolve(&mut self, ticket: RunTicket, result: Result<Vec<Piece>, String>) -> Resolution {
        if self.phase != RunPhase::Requesting(ticket) {
            tracing::debug!("discarding stale detection result {:?}", ticket);
            return Resolution::Stale;
        }
        self.phase = RunPhase::Idle;

        // Zero usable pieces is a failure under either policy
        let result = result.and_then(|pieces| {
            if pieces.is_empty() {
                Err(NO_PIECES.to_string())
            } else {
                Ok(pieces)
            }
        });

        match (result, self.policy) {
            (Ok(pieces), _) => {
                self.last_outcome = Some(RunOutcome::Succeeded {
                    count: pieces.len(),
                });
                Resolution::Replace(pieces)
            }
            (Err(message), FailurePolicy::SubstituteMock) => {
                tracing::warn!("detection failed, substituting mock batch: {message}");
                self.last_outcome = Some(RunOutcome::Failed {
                    message,
                    substituted: true,
                });
                Resolution::Replace(mock_batch())
            }
            (Err(message), FailurePolicy::Alert) => {
                tracing::error!("detection failed: {message}");
                self.last_outcome = Some(RunOutcome::Failed {
                    message: message.clone(),
                    substituted: false,
                });
                Resolution::KeepPrevious { message }
            }
        }
    }
}

impl Default for DetectionRun {
    fn default() -> Self {
        Self::new(FailurePolicy::default())
    }
}
