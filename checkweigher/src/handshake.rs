//! Command handshake
//!
//! Every command is started with the same three exchanges:
//!
//! ```text
//! host                          controller
//!  │ 43 57 05 (ENQ)        ──▶       │
//!  │        ◀──   43 57 10 30 (ready) │
//!  │ 43 57 02 cmd 30 03 BCC ──▶      │
//!  │        ◀── 43 57 10 31 (accepted)│
//!  │ 43 57 04 (EOT)        ──▶       │
//!  │        ◀──      43 57 05 (3 B)   │
//! ```
//!
//! The final reply is read as 3 bytes even though it reuses the leading bytes
//! of the 4-byte ready frame.

use tracing::{debug, warn};

use checkweigher_core::{constants::frames, Command};
use checkweigher_transport::Transport;

use crate::{error::Result, exchange::exchange};

/// Outcome of a handshake
#[derive(Debug)]
pub enum Negotiation {
    /// All three steps succeeded; response frames follow
    Accepted,

    /// The controller was not ready at step 1; nothing was sent for the
    /// command and the connection is still usable
    Declined(checkweigher_core::Error),
}

impl Negotiation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Run the 3-step handshake for `command`
///
/// A protocol-level refusal at step 1 (DLE EOT, NAK or another reply) is
/// returned as [`Negotiation::Declined`]. Any failure at steps 2 or 3, and
/// transport failures at any step, are returned as errors.
pub async fn negotiate(transport: &mut dyn Transport, command: Command) -> Result<Negotiation> {
    debug!("Command 1: enquire");

    match exchange(transport, &frames::ENQUIRE, frames::READY.len(), Some(&frames::READY)).await {
        Ok(_) => {}
        Err(crate::Error::Core(e)) if e.is_protocol() => {
            warn!("Controller not ready for {}: {}", command, e);
            return Ok(Negotiation::Declined(e));
        }
        Err(e) => return Err(e),
    }

    debug!("Command 2: {}", command);

    exchange(
        transport,
        &command.frame(),
        frames::ACCEPTED.len(),
        Some(&frames::ACCEPTED),
    )
    .await?;

    debug!("Command 3: finalize");

    exchange(
        transport,
        &frames::FINALIZE,
        frames::FINALIZE_EXPECT.len(),
        Some(&frames::FINALIZE_EXPECT),
    )
    .await?;

    debug!("Command {} negotiated", command);

    Ok(Negotiation::Accepted)
}
