//! Playback clock adapter.
//!
//! Wraps the external video player behind a narrow, polled contract. The
//! player is an unreliable collaborator: it may not be initialized yet, it
//! may stall, and its commands are best-effort. None of that is ever
//! surfaced as an error — a failed poll is "no update this tick" and the
//! next tick self-corrects.

pub mod mpv;

pub use mpv::MpvClock;

use async_trait::async_trait;

/// The core's only view of the external player.
#[async_trait]
pub trait PlayerClock: Send {
    /// Current playback position in seconds, or `None` when the player has
    /// no position to report this tick (not ready, stalled, gone).
    async fn poll(&mut self) -> Option<f64>;

    /// Move playback to an absolute position. Best-effort; failures are
    /// swallowed.
    async fn seek_to(&mut self, seconds: f64);

    /// Pause or resume playback. Best-effort; failures are swallowed.
    async fn set_paused(&mut self, paused: bool);

    /// Drain the most recent play/pause notification, if one arrived since
    /// the last call. `Some(true)` means the player reported it is playing.
    async fn take_play_state(&mut self) -> Option<bool>;
}
