// Use-case level inputs/outputs for the world loop.

use crate::domain::World;
use std::fmt;

/// Deferred mutation applied to the world on the loop task, before the next step.
///
/// Input and network collaborators never touch the world directly; they send
/// one of these through the loop handle instead.
pub type WorldCommand = Box<dyn FnOnce(&mut World) + Send + 'static>;

/// Errors returned when talking to a running world loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopError {
    /// The loop task has exited and no longer accepts commands.
    Closed,
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopError::Closed => write!(f, "world loop is no longer running"),
        }
    }
}

impl std::error::Error for LoopError {}
