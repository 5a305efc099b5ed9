use thiserror::Error;

/// Phases of the timed round loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundPhase {
    /// No session is running; entered at startup and after a session finished.
    Idle,
    /// A song is being drawn and the round announced.
    Announcing,
    /// Guesses are accepted and scored until the window closes.
    Collecting,
    /// The answer is published and recorded in the history.
    Revealing,
    /// Pause between rounds so clients can render the reveal.
    Cooldown,
    /// The round limit was reached; the final leaderboard is published.
    Finished,
}

/// Overall lifecycle of the session, derived from [`RoundPhase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for the first round.
    Idle,
    /// Rounds in progress.
    Running,
    /// Round limit reached.
    Finished,
}

impl From<RoundPhase> for SessionPhase {
    fn from(value: RoundPhase) -> Self {
        match value {
            RoundPhase::Idle => SessionPhase::Idle,
            RoundPhase::Finished => SessionPhase::Finished,
            RoundPhase::Announcing
            | RoundPhase::Collecting
            | RoundPhase::Revealing
            | RoundPhase::Cooldown => SessionPhase::Running,
        }
    }
}

/// Events driving the round loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    /// Start announcing a new round (from idle or after a cooldown).
    Announce,
    /// The round has been announced; open the collecting window.
    OpenGuesses,
    /// The collecting window expired.
    CloseGuesses,
    /// The answer was revealed; pause before the next round.
    StartCooldown,
    /// The round limit was reached.
    Finish,
    /// The final leaderboard was published; go back to idle.
    Reset,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: RoundPhase,
    /// The event that cannot be applied from this phase.
    pub event: RoundEvent,
}

/// State machine implementing the round loop.
#[derive(Debug, Clone)]
pub struct RoundStateMachine {
    phase: RoundPhase,
    version: usize,
}

impl Default for RoundStateMachine {
    fn default() -> Self {
        Self {
            phase: RoundPhase::Idle,
            version: 0,
        }
    }
}

impl RoundStateMachine {
    /// Create a new state machine initialised in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Number of transitions applied so far.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Apply `event`, returning the new phase.
    pub fn apply(&mut self, event: RoundEvent) -> Result<RoundPhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(next)
    }

    fn compute_transition(&self, event: RoundEvent) -> Result<RoundPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (RoundPhase::Idle | RoundPhase::Cooldown, RoundEvent::Announce) => {
                RoundPhase::Announcing
            }
            (RoundPhase::Announcing, RoundEvent::OpenGuesses) => RoundPhase::Collecting,
            (RoundPhase::Collecting, RoundEvent::CloseGuesses) => RoundPhase::Revealing,
            (RoundPhase::Revealing, RoundEvent::StartCooldown) => RoundPhase::Cooldown,
            (RoundPhase::Cooldown, RoundEvent::Finish) => RoundPhase::Finished,
            (RoundPhase::Finished, RoundEvent::Reset) => RoundPhase::Idle,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(sm: &mut RoundStateMachine, event: RoundEvent) -> RoundPhase {
        sm.apply(event).unwrap()
    }

    #[test]
    fn initial_state_is_idle() {
        let sm = RoundStateMachine::new();
        assert_eq!(sm.phase(), RoundPhase::Idle);
        assert_eq!(SessionPhase::from(sm.phase()), SessionPhase::Idle);
    }

    #[test]
    fn round_cycle_visits_phases_in_order() {
        let mut sm = RoundStateMachine::new();

        for _ in 0..2 {
            assert_eq!(apply(&mut sm, RoundEvent::Announce), RoundPhase::Announcing);
            assert_eq!(apply(&mut sm, RoundEvent::OpenGuesses), RoundPhase::Collecting);
            assert_eq!(apply(&mut sm, RoundEvent::CloseGuesses), RoundPhase::Revealing);
            assert_eq!(apply(&mut sm, RoundEvent::StartCooldown), RoundPhase::Cooldown);
        }

        assert_eq!(apply(&mut sm, RoundEvent::Finish), RoundPhase::Finished);
        assert_eq!(SessionPhase::from(sm.phase()), SessionPhase::Finished);
        assert_eq!(apply(&mut sm, RoundEvent::Reset), RoundPhase::Idle);
        assert_eq!(sm.version(), 10);
    }

    #[test]
    fn collecting_cannot_be_closed_early_from_other_phases() {
        let mut sm = RoundStateMachine::new();
        let err = sm.apply(RoundEvent::CloseGuesses).unwrap_err();
        assert_eq!(err.from, RoundPhase::Idle);
        assert_eq!(err.event, RoundEvent::CloseGuesses);
        assert_eq!(sm.version(), 0);
    }

    #[test]
    fn finish_is_only_reachable_from_cooldown() {
        let mut sm = RoundStateMachine::new();
        apply(&mut sm, RoundEvent::Announce);
        apply(&mut sm, RoundEvent::OpenGuesses);

        let err = sm.apply(RoundEvent::Finish).unwrap_err();
        assert_eq!(
            err,
            InvalidTransition {
                from: RoundPhase::Collecting,
                event: RoundEvent::Finish,
            }
        );
        assert_eq!(sm.phase(), RoundPhase::Collecting);
    }

    #[test]
    fn running_phases_map_to_running_session() {
        for phase in [
            RoundPhase::Announcing,
            RoundPhase::Collecting,
            RoundPhase::Revealing,
            RoundPhase::Cooldown,
        ] {
            assert_eq!(SessionPhase::from(phase), SessionPhase::Running);
        }
    }
}
