//! Polling driver for the sync engine.
//!
//! One driver task owns the engine and the player adapter, so engine
//! operations are strictly sequential: user commands and clock ticks are
//! serviced by the same `select!` loop and never interleave. User intents
//! arrive over an mpsc channel; derived state leaves over a watch channel,
//! letting presentation layers render at their own cadence instead of the
//! poll cadence.

use super::{PlaybackSession, SyncEngine};
use crate::player::PlayerClock;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};

/// User intents delivered to the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    PrevLine,
    NextLine,
    JumpTo(u32),
    TogglePause,
    ToggleRepeat,
    AdjustOffset(f64),
    ResetOffset,
    ToggleOriginal,
    ToggleTranslation,
    Shutdown,
}

/// Derived state published after every serviced command or tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub session: PlaybackSession,
    pub line_count: usize,
}

/// Drives one study session: polls the player, feeds the engine, executes
/// the seeks the engine asks for.
pub struct SyncDriver {
    engine: SyncEngine,
    player: Box<dyn PlayerClock>,
    poll_interval: Duration,
    commands: mpsc::Receiver<PlayerCommand>,
    state: watch::Sender<PlaybackSnapshot>,
}

impl SyncDriver {
    /// Build a driver plus its command and state channels.
    pub fn new(
        engine: SyncEngine,
        player: Box<dyn PlayerClock>,
        poll_interval: Duration,
    ) -> (
        Self,
        mpsc::Sender<PlayerCommand>,
        watch::Receiver<PlaybackSnapshot>,
    ) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(PlaybackSnapshot {
            session: engine.session().clone(),
            line_count: engine.lines().len(),
        });

        let driver = Self {
            engine,
            player,
            poll_interval,
            commands: command_rx,
            state: state_tx,
        };

        (driver, command_tx, state_rx)
    }

    /// Run until a shutdown command arrives or all command senders drop.
    ///
    /// Teardown is just returning: the pending timer and any in-flight
    /// player state are discarded, nothing is flushed.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(PlayerCommand::Shutdown) | None => {
                            debug!("sync driver shutting down");
                            break;
                        }
                        Some(command) => self.handle_command(command).await,
                    }
                }
                _ = ticker.tick() => self.tick().await,
            }
            self.publish();
        }
    }

    async fn handle_command(&mut self, command: PlayerCommand) {
        trace!(?command, "handling player command");

        match command {
            PlayerCommand::PrevLine => {
                self.engine.prev_line();
            }
            PlayerCommand::NextLine => {
                self.engine.next_line();
            }
            PlayerCommand::JumpTo(line) => {
                self.engine.navigate_to(line);
            }
            PlayerCommand::TogglePause => {
                let playing = self.engine.session().is_playing;
                self.player.set_paused(playing).await;
            }
            PlayerCommand::ToggleRepeat => self.engine.toggle_repeating(),
            PlayerCommand::AdjustOffset(delta) => self.engine.adjust_offset(delta),
            PlayerCommand::ResetOffset => self.engine.reset_offset(),
            PlayerCommand::ToggleOriginal => self.engine.toggle_original(),
            PlayerCommand::ToggleTranslation => self.engine.toggle_translation(),
            PlayerCommand::Shutdown => {}
        }

        self.flush_seek().await;
    }

    /// Issue the seek for a raised request, then consume the flag.
    ///
    /// Runs synchronously after the command that raised it, so the next
    /// passive tick never observes a pending request. One seek per
    /// false→true transition, best-effort against an unready player.
    async fn flush_seek(&mut self) {
        if !self.engine.seek_requested() {
            return;
        }

        if let Some(start) = self.engine.active_line().map(|l| l.start_time) {
            self.player.seek_to(start).await;
        }
        self.engine.consume_seek_request();
    }

    async fn tick(&mut self) {
        if let Some(playing) = self.player.take_play_state().await {
            self.engine.set_playing(playing);
        }

        let Some(time) = self.player.poll().await else {
            // Player not ready: no update this tick.
            return;
        };

        let tick = self.engine.on_clock_tick(time);
        if let Some(target) = tick.repeat_seek {
            self.player.seek_to(target).await;
        }
    }

    fn publish(&self) {
        let snapshot = PlaybackSnapshot {
            session: self.engine.session().clone(),
            line_count: self.engine.lines().len(),
        };

        // Only notify watchers on real changes, so an idle session doesn't
        // force a re-render every poll.
        self.state.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
