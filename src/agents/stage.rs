//! Per-stage lifecycle tracking
//!
//! Each stage moves through
//! `Pending → Generating → Extracting → [Refining → Extracting]? → Normalizing → Done`.
//! The synthesis stage may instead go `Extracting → Generating` once to
//! regenerate. `Failed` is reachable from every non-terminal state and, like
//! `Done`, is terminal.

use crate::types::{AppError, Result};
use tracing::{debug, error, info};

/// The four stages of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageName {
    Plan,
    Clinical,
    Patent,
    Synthesis,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Plan => "plan",
            StageName::Clinical => "clinical",
            StageName::Patent => "patent",
            StageName::Synthesis => "synthesis",
        }
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Pending,
    Generating,
    Extracting,
    Refining,
    Normalizing,
    Done,
    Failed,
}

impl StageState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StageState::Done | StageState::Failed)
    }

    pub fn can_transition_to(&self, next: StageState) -> bool {
        use StageState::*;

        if self.is_terminal() {
            return false;
        }

        matches!(
            (self, next),
            (_, Failed)
                | (Pending, Generating)
                | (Generating, Extracting)
                | (Extracting, Refining)
                | (Extracting, Normalizing)
                | (Extracting, Generating)
                | (Refining, Extracting)
                | (Normalizing, Done)
        )
    }
}

/// Records the state history of one stage execution.
#[derive(Debug, Clone)]
pub struct StageTracker {
    stage: StageName,
    state: StageState,
    history: Vec<StageState>,
}

impl StageTracker {
    pub fn new(stage: StageName) -> Self {
        Self {
            stage,
            state: StageState::Pending,
            history: vec![StageState::Pending],
        }
    }

    pub fn stage(&self) -> StageName {
        self.stage
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn history(&self) -> &[StageState] {
        &self.history
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow
    pub fn advance(&mut self, next: StageState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(AppError::Internal(format!(
                "Invalid transition for stage '{}': {:?} -> {:?}",
                self.stage, self.state, next
            )));
        }

        debug!(stage = %self.stage, from = ?self.state, to = ?next, "Stage transition");
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Mark the stage failed. No-op once terminal.
    pub fn fail(&mut self, err: &AppError) {
        if self.state.is_terminal() {
            return;
        }

        error!(stage = %self.stage, state = ?self.state, error = %err, "Stage failed");
        self.state = StageState::Failed;
        self.history.push(StageState::Failed);
    }

    /// Close out a stage run: `Done` on success, `Failed` on error.
    pub fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        let result = result.and_then(|value| {
            self.advance(StageState::Done)?;
            Ok(value)
        });

        match result {
            Ok(value) => {
                info!(stage = %self.stage, "Stage complete");
                Ok(value)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StageState::*;

    #[test]
    fn test_refine_path() {
        let mut tracker = StageTracker::new(StageName::Clinical);
        for next in [Generating, Extracting, Refining, Extracting, Normalizing] {
            tracker.advance(next).unwrap();
        }
        tracker.finish(Ok(())).unwrap();

        assert_eq!(
            tracker.history(),
            &[Pending, Generating, Extracting, Refining, Extracting, Normalizing, Done]
        );
    }

    #[test]
    fn test_regeneration_path() {
        let mut tracker = StageTracker::new(StageName::Synthesis);
        for next in [Generating, Extracting, Generating, Extracting, Normalizing] {
            tracker.advance(next).unwrap();
        }
        assert_eq!(tracker.state(), Normalizing);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut tracker = StageTracker::new(StageName::Plan);
        let err = tracker.advance(Normalizing).unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(tracker.state(), Pending);
    }

    #[test]
    fn test_failed_is_terminal() {
        let mut tracker = StageTracker::new(StageName::Patent);
        tracker.advance(Generating).unwrap();
        tracker.fail(&AppError::Transport("boom".into()));

        assert_eq!(tracker.state(), Failed);
        assert!(tracker.advance(Extracting).is_err());

        // Failing again does not add history
        tracker.fail(&AppError::Transport("again".into()));
        assert_eq!(tracker.history(), &[Pending, Generating, Failed]);
    }

    #[test]
    fn test_finish_with_error_marks_failed() {
        let mut tracker = StageTracker::new(StageName::Plan);
        tracker.advance(Generating).unwrap();

        let result: Result<()> = tracker.finish(Err(AppError::RetryExhausted { attempts: 3 }));
        assert!(result.is_err());
        assert_eq!(tracker.state(), Failed);
    }

    #[test]
    fn test_finish_before_normalizing_fails() {
        let mut tracker = StageTracker::new(StageName::Plan);
        tracker.advance(Generating).unwrap();

        let result = tracker.finish(Ok(1));
        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(tracker.state(), Failed);
    }
}
