//! Subtitle synchronization engine.
//!
//! Maps a continuously advancing, externally polled playback clock onto the
//! discrete line intervals of a [`LineCollection`], and tracks the state of
//! one study session: active line, repeat loop, sync offset, overlay
//! toggles.
//!
//! Line changes come from two distinct paths and must not be conflated:
//!
//! - **Passive**: the polled clock entered another line's interval. The
//!   player is already physically there, so no seek is issued.
//! - **Active**: the learner navigated explicitly. The player must be moved,
//!   so `seek_requested` is raised and the driver issues exactly one seek
//!   per false→true transition before consuming the flag.
//!
//! Conflating the two creates a feedback loop: a programmatic seek shifts
//! the clock, the shifted clock changes the line, the line change seeks
//! again. The `seek_requested` flag is the mechanism that breaks it.

pub mod driver;

pub use driver::{PlaybackSnapshot, PlayerCommand, SyncDriver};

use crate::script::{LineCollection, SubtitleLine};
use std::sync::Arc;

/// Mutable state for one study session.
///
/// Created when the learner opens a video, discarded on leaving it; none of
/// it persists across sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    /// The line considered active for display, 1-based.
    pub current_line: u32,
    /// Last polled player position in seconds.
    pub clock_time: f64,
    /// Global subtitle timing correction in seconds, rounded to one decimal.
    /// Positive shifts subtitles later relative to the audio.
    pub sync_offset: f64,
    /// Loop playback within the active line's interval.
    pub is_repeating: bool,
    /// Mirror of the external player's play/pause state.
    pub is_playing: bool,
    /// Raised by user navigation, cleared only by [`SyncEngine::consume_seek_request`].
    pub seek_requested: bool,
    pub show_original: bool,
    pub show_translation: bool,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            current_line: 1,
            clock_time: 0.0,
            sync_offset: 0.0,
            is_repeating: false,
            is_playing: false,
            seek_requested: false,
            show_original: true,
            show_translation: true,
        }
    }
}

/// Outcome of a single clock tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// The active line changed (passively) on this tick.
    pub line_changed: bool,
    /// The repeat loop wants the player moved back to this position.
    pub repeat_seek: Option<f64>,
}

/// The synchronization state machine.
pub struct SyncEngine {
    lines: Arc<LineCollection>,
    session: PlaybackSession,
}

impl SyncEngine {
    pub fn new(lines: Arc<LineCollection>) -> Self {
        Self {
            lines,
            session: PlaybackSession::default(),
        }
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn lines(&self) -> &LineCollection {
        &self.lines
    }

    /// The [`SubtitleLine`] for the current line, if the collection has it.
    pub fn active_line(&self) -> Option<&SubtitleLine> {
        self.lines.get(self.session.current_line)
    }

    /// Feed one polled clock reading.
    ///
    /// The line lookup uses the offset-adjusted time; when no interval
    /// contains it (a gap, or before the first / after the last line) the
    /// active line is retained rather than cleared. The repeat comparison
    /// uses the raw clock time against the active line's interval.
    pub fn on_clock_tick(&mut self, time: f64) -> Tick {
        self.session.clock_time = time;

        let adjusted = time - self.session.sync_offset;
        let mut line_changed = false;
        if let Some(line) = self.lines.line_at(adjusted) {
            if line.line != self.session.current_line {
                // Passive update: the player is already at this position.
                self.session.current_line = line.line;
                line_changed = true;
            }
        }

        let repeat_seek = if self.session.is_repeating {
            self.active_line()
                .filter(|line| time >= line.end_time)
                .map(|line| line.start_time)
        } else {
            None
        };

        Tick {
            line_changed,
            repeat_seek,
        }
    }

    /// Explicit jump to a line number.
    ///
    /// Out-of-range targets are rejected as silent no-ops, uniformly with
    /// prev/next boundary behavior. An in-range jump always raises
    /// `seek_requested` and drops the repeat loop — repeat is scoped to the
    /// line it was enabled on. Re-selecting the current line replays it
    /// from the start.
    pub fn navigate_to(&mut self, line: u32) -> bool {
        if line < 1 || line as usize > self.lines.len() {
            return false;
        }

        self.session.current_line = line;
        self.session.is_repeating = false;
        self.session.seek_requested = true;
        true
    }

    /// Navigate to the previous line; silent no-op at the first line.
    pub fn prev_line(&mut self) -> bool {
        if self.session.current_line > 1 {
            self.navigate_to(self.session.current_line - 1)
        } else {
            false
        }
    }

    /// Navigate to the next line; silent no-op at the last line.
    pub fn next_line(&mut self) -> bool {
        if (self.session.current_line as usize) < self.lines.len() {
            self.navigate_to(self.session.current_line + 1)
        } else {
            false
        }
    }

    pub fn seek_requested(&self) -> bool {
        self.session.seek_requested
    }

    /// Acknowledge that the pending seek has been issued.
    ///
    /// Idempotent, and the only way the flag clears.
    pub fn consume_seek_request(&mut self) {
        self.session.seek_requested = false;
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.session.is_playing = playing;
    }

    pub fn set_repeating(&mut self, repeating: bool) {
        self.session.is_repeating = repeating;
    }

    pub fn toggle_repeating(&mut self) {
        self.session.is_repeating = !self.session.is_repeating;
    }

    /// Adjust the sync offset by a delta, rounding to one decimal place to
    /// avoid floating-point drift across repeated adjustments.
    pub fn adjust_offset(&mut self, delta: f64) {
        self.session.sync_offset = ((self.session.sync_offset + delta) * 10.0).round() / 10.0;
    }

    pub fn reset_offset(&mut self) {
        self.session.sync_offset = 0.0;
    }

    pub fn toggle_original(&mut self) {
        self.session.show_original = !self.session.show_original;
    }

    pub fn toggle_translation(&mut self) {
        self.session.show_translation = !self.session.show_translation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptLine;

    fn collection(intervals: &[(f64, f64)]) -> Arc<LineCollection> {
        let script = intervals
            .iter()
            .enumerate()
            .map(|(i, &(start, end))| ScriptLine {
                line: i as u32 + 1,
                start_time: start,
                end_time: end,
                text: format!("line {}", i + 1),
            })
            .collect();
        Arc::new(LineCollection::merge(script, vec![], vec![]))
    }

    fn engine(intervals: &[(f64, f64)]) -> SyncEngine {
        SyncEngine::new(collection(intervals))
    }

    #[test]
    fn test_passive_updates_never_request_seek() {
        let mut engine = engine(&[(0.0, 2.0), (2.0, 4.0)]);

        let tick = engine.on_clock_tick(1.5);
        assert_eq!(engine.session().current_line, 1);
        assert!(!tick.line_changed);

        let tick = engine.on_clock_tick(2.5);
        assert_eq!(engine.session().current_line, 2);
        assert!(tick.line_changed);
        assert!(!engine.seek_requested());
    }

    #[test]
    fn test_tick_is_idempotent() {
        let mut engine = engine(&[(0.0, 2.0), (2.0, 4.0)]);

        let first = engine.on_clock_tick(2.5);
        assert!(first.line_changed);

        for _ in 0..5 {
            let tick = engine.on_clock_tick(2.5);
            assert!(!tick.line_changed);
            assert_eq!(engine.session().current_line, 2);
            assert!(!engine.seek_requested());
        }
    }

    #[test]
    fn test_gap_retains_current_line() {
        let mut engine = engine(&[(0.0, 2.0), (3.0, 5.0)]);

        engine.on_clock_tick(1.0);
        assert_eq!(engine.session().current_line, 1);

        // In the gap between lines: active line unchanged.
        engine.on_clock_tick(2.5);
        assert_eq!(engine.session().current_line, 1);

        // Before the first line and after the last: same policy.
        engine.on_clock_tick(4.0);
        assert_eq!(engine.session().current_line, 2);
        engine.on_clock_tick(99.0);
        assert_eq!(engine.session().current_line, 2);
    }

    #[test]
    fn test_offset_shifts_line_lookup() {
        let mut engine = engine(&[(0.0, 2.0), (2.0, 4.0)]);

        // offset +1.0: subtitles later; clock 2.5 maps to adjusted 1.5.
        engine.adjust_offset(0.5);
        engine.adjust_offset(0.5);
        engine.on_clock_tick(2.5);
        assert_eq!(engine.session().current_line, 1);

        engine.on_clock_tick(3.5);
        assert_eq!(engine.session().current_line, 2);
    }

    #[test]
    fn test_navigation_invariant() {
        let mut engine = engine(&[(0.0, 2.0), (2.0, 4.0), (4.0, 6.0)]);
        engine.set_repeating(true);

        assert!(engine.navigate_to(3));
        assert_eq!(engine.session().current_line, 3);
        assert!(engine.seek_requested());
        assert!(!engine.session().is_repeating);
    }

    #[test]
    fn test_navigate_to_current_line_replays() {
        let mut engine = engine(&[(0.0, 2.0), (2.0, 4.0)]);

        assert!(engine.navigate_to(1));
        assert!(engine.seek_requested());
    }

    #[test]
    fn test_out_of_range_jump_is_noop() {
        let mut engine = engine(&[(0.0, 2.0), (2.0, 4.0)]);
        engine.on_clock_tick(2.5);

        assert!(!engine.navigate_to(0));
        assert!(!engine.navigate_to(3));
        assert_eq!(engine.session().current_line, 2);
        assert!(!engine.seek_requested());
    }

    #[test]
    fn test_prev_next_clamp_at_boundaries() {
        let mut engine = engine(&[(0.0, 2.0), (2.0, 4.0)]);

        assert!(!engine.prev_line());
        assert_eq!(engine.session().current_line, 1);
        assert!(!engine.seek_requested());

        assert!(engine.next_line());
        engine.consume_seek_request();
        assert!(!engine.next_line());
        assert_eq!(engine.session().current_line, 2);
        assert!(!engine.seek_requested());

        assert!(engine.prev_line());
        assert_eq!(engine.session().current_line, 1);
        assert!(engine.seek_requested());
    }

    #[test]
    fn test_empty_collection_rejects_navigation() {
        let mut engine = engine(&[]);

        assert!(!engine.navigate_to(1));
        assert!(!engine.next_line());
        assert!(!engine.seek_requested());
        assert!(engine.active_line().is_none());

        let tick = engine.on_clock_tick(1.0);
        assert!(!tick.line_changed);
        assert_eq!(tick.repeat_seek, None);
    }

    #[test]
    fn test_consume_seek_request_is_idempotent() {
        let mut engine = engine(&[(0.0, 2.0)]);

        engine.navigate_to(1);
        assert!(engine.seek_requested());

        engine.consume_seek_request();
        assert!(!engine.seek_requested());
        engine.consume_seek_request();
        assert!(!engine.seek_requested());
    }

    #[test]
    fn test_repeat_loop_seeks_at_interval_end() {
        let mut engine = engine(&[(0.0, 2.0), (2.0, 5.0)]);

        engine.navigate_to(2);
        engine.consume_seek_request();
        engine.set_repeating(true);

        let tick = engine.on_clock_tick(4.9);
        assert_eq!(tick.repeat_seek, None);

        let tick = engine.on_clock_tick(5.0);
        assert_eq!(tick.repeat_seek, Some(2.0));
        // The repeat seek is a pure side effect.
        assert_eq!(engine.session().current_line, 2);
        assert!(!engine.seek_requested());
    }

    #[test]
    fn test_repeat_not_triggered_when_disabled() {
        let mut engine = engine(&[(2.0, 5.0)]);

        let tick = engine.on_clock_tick(5.0);
        assert_eq!(tick.repeat_seek, None);
    }

    #[test]
    fn test_offset_round_trip() {
        let mut engine = engine(&[(0.0, 2.0)]);

        engine.adjust_offset(0.5);
        engine.adjust_offset(0.5);
        engine.adjust_offset(0.5);
        engine.adjust_offset(-0.5);
        assert_eq!(engine.session().sync_offset, 1.0);

        engine.reset_offset();
        assert_eq!(engine.session().sync_offset, 0.0);
    }

    #[test]
    fn test_offset_rounding_avoids_drift() {
        let mut engine = engine(&[(0.0, 2.0)]);

        for _ in 0..3 {
            engine.adjust_offset(0.1);
        }
        assert_eq!(engine.session().sync_offset, 0.3);
    }

    #[test]
    fn test_overlay_toggles() {
        let mut engine = engine(&[(0.0, 2.0)]);
        assert!(engine.session().show_original);
        assert!(engine.session().show_translation);

        engine.toggle_original();
        engine.toggle_translation();
        assert!(!engine.session().show_original);
        assert!(!engine.session().show_translation);

        engine.toggle_original();
        assert!(engine.session().show_original);
    }

    #[test]
    fn test_end_to_end_tick_sequence() {
        let mut engine = engine(&[(0.0, 2.0), (2.0, 4.0)]);

        engine.on_clock_tick(1.5);
        assert_eq!(engine.session().current_line, 1);

        engine.on_clock_tick(2.5);
        assert_eq!(engine.session().current_line, 2);
        assert!(!engine.seek_requested());
        assert_eq!(engine.session().clock_time, 2.5);
    }
}
