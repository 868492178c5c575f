//! Session state for a controller connection
//!
//! A session tracks where the single connection is in its lifecycle:
//!
//! ```text
//! Disconnected → Connecting → Connected → Negotiating → Receiving → Connected → …
//!       ↑             │            │            │             │
//!       └─────────────┴────────────┴────────────┴─────────────┘  (close / failure)
//! ```
//!
//! Only one command is ever in flight. A handshake declined at its first step
//! returns the session from `Negotiating` to `Connected`.

use crate::{
    command::Command,
    error::{Error, Result},
};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection
    Disconnected,

    /// Connection attempts in progress
    Connecting,

    /// Connected and idle
    Connected,

    /// Running the 3-step handshake for a command
    Negotiating,

    /// Collecting response frames for a command
    Receiving,
}

/// Session state machine
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    command: Option<Command>,
    completed: u64,
}

impl Session {
    /// Create a new disconnected session
    pub fn new() -> Self {
        Self {
            state: SessionState::Disconnected,
            command: None,
            completed: 0,
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Command currently in flight
    pub fn command(&self) -> Option<Command> {
        self.command
    }

    /// Number of commands that ran to completion on this session
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Check if a connection is established
    pub fn is_connected(&self) -> bool {
        matches!(
            self.state,
            SessionState::Connected | SessionState::Negotiating | SessionState::Receiving
        )
    }

    /// Connection attempts are starting
    pub fn begin_connect(&mut self) -> Result<()> {
        self.transition(SessionState::Disconnected, SessionState::Connecting)
    }

    /// Connection established
    pub fn connected(&mut self) -> Result<()> {
        self.transition(SessionState::Connecting, SessionState::Connected)
    }

    /// Handshake for `command` is starting
    pub fn begin_command(&mut self, command: Command) -> Result<()> {
        self.transition(SessionState::Connected, SessionState::Negotiating)?;
        self.command = Some(command);
        Ok(())
    }

    /// Handshake completed, response collection is starting
    pub fn negotiated(&mut self) -> Result<()> {
        self.transition(SessionState::Negotiating, SessionState::Receiving)
    }

    /// Handshake declined at its first step
    pub fn declined(&mut self) -> Result<()> {
        self.transition(SessionState::Negotiating, SessionState::Connected)?;
        self.command = None;
        Ok(())
    }

    /// Response collection finished
    pub fn finish_command(&mut self) -> Result<()> {
        self.transition(SessionState::Receiving, SessionState::Connected)?;
        self.command = None;
        self.completed += 1;
        Ok(())
    }

    /// Close session (any state)
    pub fn close(&mut self) {
        self.state = SessionState::Disconnected;
        self.command = None;
    }

    fn transition(&mut self, from: SessionState, to: SessionState) -> Result<()> {
        if self.state != from {
            return Err(Error::InvalidSessionState(format!(
                "Cannot move to {:?} from state: {:?}",
                to, self.state
            )));
        }

        self.state = to;
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
