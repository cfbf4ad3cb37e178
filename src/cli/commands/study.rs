//! Study command - interactive sentence-by-sentence study session.
//!
//! mpv plays the video in its own window while the terminal shows the
//! synchronized line, translation, and expression notes. Keys mirror the
//! playback controls: 1/2/3/4 for prev, play/pause, repeat, next.

use crate::captions::youtube;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::highlight::highlight_spans;
use crate::library::VideoLibrary;
use crate::player::{mpv, MpvClock};
use crate::script::{Highlight, LineCollection, SubtitleLine};
use crate::sync::{PlaybackSnapshot, PlayerCommand, SyncDriver, SyncEngine};
use crate::timecode;
use anyhow::Result;
use console::{style, Key, Term};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the study command.
pub async fn run_study(video_id: &str, settings: Settings) -> Result<()> {
    preflight::check(Operation::Study)?;

    let library = VideoLibrary::from_settings(&settings);

    let collection = match library.load_collection(video_id) {
        Ok(collection) => collection,
        Err(e) => {
            Output::error(&format!("Cannot study '{}': {}", video_id, e));
            Output::info(
                "Run 'terp process <url>' first, then supply the translation and analysis files ('terp list' shows what's missing).",
            );
            return Err(e.into());
        }
    };

    if collection.is_empty() {
        Output::error("The script file has no lines.");
        return Ok(());
    }

    let title = library
        .load_metadata(video_id)
        .map(|m| m.title)
        .unwrap_or_else(|| video_id.to_string());

    // mpv plays the video; its IPC socket lives in a throwaway directory
    // that disappears with the session.
    let socket_dir = tempfile::tempdir()?;
    let socket = socket_dir.path().join("mpv.sock");
    let mut child = mpv::launch(
        &settings.player.mpv_binary,
        &youtube::watch_url(video_id),
        &socket,
    )
    .await?;

    let spinner = Output::spinner("Waiting for mpv...");
    let clock = MpvClock::connect_with_retries(&socket, 40, Duration::from_millis(250)).await;
    spinner.finish_and_clear();

    let clock = match clock {
        Ok(clock) => clock,
        Err(e) => {
            let _ = child.start_kill();
            Output::error(&format!("Could not reach mpv: {}", e));
            return Err(e.into());
        }
    };

    let collection = Arc::new(collection);
    let engine = SyncEngine::new(collection.clone());
    let (driver, commands, mut state) =
        SyncDriver::new(engine, Box::new(clock), settings.poll_interval());
    let driver_task = tokio::spawn(driver.run());

    // Raw keys come from a blocking reader thread feeding the event loop.
    let (key_tx, mut key_rx) = mpsc::channel::<Key>(8);
    let key_task = tokio::task::spawn_blocking(move || {
        let term = Term::stdout();
        while let Ok(key) = term.read_key() {
            let quit = key == Key::Char('q') || key == Key::Escape;
            if key_tx.blocking_send(key).is_err() || quit {
                break;
            }
        }
    });

    let term = Term::stdout();
    term.hide_cursor().ok();
    render(&term, &title, &collection, &state.borrow().clone());

    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = state.borrow_and_update().clone();
                render(&term, &title, &collection, &snapshot);
            }
            key = key_rx.recv() => {
                let Some(key) = key else { break };
                let Some(command) = map_key(key, settings.player.offset_step) else {
                    continue;
                };
                let quit = command == PlayerCommand::Shutdown;
                let _ = commands.send(command).await;
                if quit {
                    break;
                }
            }
        }
    }

    let _ = commands.send(PlayerCommand::Shutdown).await;
    let _ = child.start_kill();
    driver_task.await.ok();
    key_task.abort();

    term.show_cursor().ok();
    term.clear_screen().ok();
    Output::info("Study session ended.");

    Ok(())
}

/// Map a key press to a player command.
fn map_key(key: Key, offset_step: f64) -> Option<PlayerCommand> {
    match key {
        Key::Char('1') | Key::ArrowLeft => Some(PlayerCommand::PrevLine),
        Key::Char('2') | Key::Char(' ') => Some(PlayerCommand::TogglePause),
        Key::Char('3') | Key::Char('r') => Some(PlayerCommand::ToggleRepeat),
        Key::Char('4') | Key::ArrowRight => Some(PlayerCommand::NextLine),
        Key::Char('-') => Some(PlayerCommand::AdjustOffset(-offset_step)),
        Key::Char('+') | Key::Char('=') => Some(PlayerCommand::AdjustOffset(offset_step)),
        Key::Char('0') => Some(PlayerCommand::ResetOffset),
        Key::Char('o') => Some(PlayerCommand::ToggleOriginal),
        Key::Char('t') => Some(PlayerCommand::ToggleTranslation),
        Key::Char('q') | Key::Escape => Some(PlayerCommand::Shutdown),
        _ => None,
    }
}

/// Redraw the whole study view for the given snapshot.
fn render(term: &Term, title: &str, collection: &LineCollection, snapshot: &PlaybackSnapshot) {
    let session = &snapshot.session;
    term.clear_screen().ok();

    let mut frame = String::new();

    frame.push_str(&format!("{}\n", style(title).bold()));

    let offset = format!(
        "{}{:.1}s",
        if session.sync_offset >= 0.0 { "+" } else { "" },
        session.sync_offset
    );
    let offset = if session.sync_offset != 0.0 {
        style(offset).yellow().to_string()
    } else {
        style(offset).dim().to_string()
    };
    frame.push_str(&format!(
        "{} {}/{}  {}  {} {}  {}{}\n\n",
        style("line").dim(),
        session.current_line,
        snapshot.line_count,
        style(timecode::format_clock(session.clock_time)).cyan(),
        style("sync").dim(),
        offset,
        if session.is_playing { "▶ playing" } else { "⏸ paused" },
        if session.is_repeating {
            format!("  {}", style("↺ repeat").green())
        } else {
            String::new()
        },
    ));

    if let Some(prev) = collection.get(session.current_line.saturating_sub(1)) {
        frame.push_str(&format!("{}\n", style(format!("← {}", prev.text)).dim()));
    }

    match collection.get(session.current_line) {
        Some(line) => frame.push_str(&render_line(line, session.show_original, session.show_translation)),
        None => frame.push_str(&format!("{}\n", style("(no line data)").dim())),
    }

    if let Some(next) = collection.get(session.current_line + 1) {
        frame.push_str(&format!("{}\n", style(format!("→ {}", next.text)).dim()));
    }

    frame.push_str(&format!(
        "\n{}\n",
        style("1/← prev   2/space play·pause   3 repeat   4/→ next   -/+ sync   0 reset   o original   t translation   q quit")
            .dim()
    ));

    let _ = term.write_line(&frame);
}

/// Render the active line: highlighted sentence, translation, expression notes.
fn render_line(line: &SubtitleLine, show_original: bool, show_translation: bool) -> String {
    let mut out = String::new();

    if show_original {
        let spans = highlight_spans(&line.text, &line.expressions());
        let styled: String = spans
            .iter()
            .map(|span| match span.highlight {
                Some(Highlight::Green) => style(&span.text).green().bold().to_string(),
                Some(Highlight::Yellow) => style(&span.text).yellow().bold().to_string(),
                None => span.text.clone(),
            })
            .collect();
        out.push_str(&format!("\n  {}\n", styled));
    }

    if show_translation && !line.translation.is_empty() {
        out.push_str(&format!("  {}\n", style(&line.translation).dim()));
    }

    if !line.key_expressions.is_empty() || !line.idioms.is_empty() {
        out.push('\n');
    }

    for expr in &line.key_expressions {
        out.push_str(&format!(
            "  {} {} — {}\n",
            style("●").green(),
            style(&expr.phrase).green().bold(),
            expr.meaning
        ));
        if !expr.example.is_empty() {
            out.push_str(&format!("    {}\n", style(format!("\"{}\"", expr.example)).dim()));
        }
    }

    for expr in &line.idioms {
        out.push_str(&format!(
            "  {} {} — {}\n",
            style("●").yellow(),
            style(&expr.phrase).yellow().bold(),
            expr.meaning
        ));
        if !expr.example.is_empty() {
            out.push_str(&format!("    {}\n", style(format!("\"{}\"", expr.example)).dim()));
        }
    }

    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_key_playback_controls() {
        assert_eq!(map_key(Key::Char('1'), 0.5), Some(PlayerCommand::PrevLine));
        assert_eq!(map_key(Key::Char('2'), 0.5), Some(PlayerCommand::TogglePause));
        assert_eq!(map_key(Key::Char('3'), 0.5), Some(PlayerCommand::ToggleRepeat));
        assert_eq!(map_key(Key::Char('4'), 0.5), Some(PlayerCommand::NextLine));
        assert_eq!(map_key(Key::ArrowLeft, 0.5), Some(PlayerCommand::PrevLine));
        assert_eq!(map_key(Key::ArrowRight, 0.5), Some(PlayerCommand::NextLine));
    }

    #[test]
    fn test_map_key_offset_uses_configured_step() {
        assert_eq!(map_key(Key::Char('+'), 0.5), Some(PlayerCommand::AdjustOffset(0.5)));
        assert_eq!(map_key(Key::Char('-'), 0.5), Some(PlayerCommand::AdjustOffset(-0.5)));
        assert_eq!(map_key(Key::Char('-'), 0.1), Some(PlayerCommand::AdjustOffset(-0.1)));
        assert_eq!(map_key(Key::Char('0'), 0.5), Some(PlayerCommand::ResetOffset));
    }

    #[test]
    fn test_map_key_ignores_unbound_keys() {
        assert_eq!(map_key(Key::Char('x'), 0.5), None);
        assert_eq!(map_key(Key::PageUp, 0.5), None);
    }

    #[test]
    fn test_map_key_quit() {
        assert_eq!(map_key(Key::Char('q'), 0.5), Some(PlayerCommand::Shutdown));
        assert_eq!(map_key(Key::Escape, 0.5), Some(PlayerCommand::Shutdown));
    }
}
