use std::time::Duration;

use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::{
    handle::{AppCommand, PlayerHandle},
    router::{RouteAction, RouteHandler},
    state::AppState,
};

const SEEK_STEP: Duration = Duration::from_secs(5);

// ==================================================================
// Playback Route Implementation
// ==================================================================

#[derive(Debug, Clone)]
pub struct PlaybackRoute;

impl RouteHandler for PlaybackRoute {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        draw_playback_panel(frame, area, state);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &PlayerHandle,
    ) -> anyhow::Result<RouteAction> {
        match key {
            KeyCode::Up => {
                state.volume = (state.volume + 0.1).min(1.0);
                handle.cmd_tx.send(AppCommand::SetVolume(state.volume))?;
            }
            KeyCode::Down => {
                state.volume = (state.volume - 0.1).max(0.0);
                handle.cmd_tx.send(AppCommand::SetVolume(state.volume))?;
            }
            KeyCode::Right => {
                let mut new_pos = state.position + SEEK_STEP;
                // Zero means the length is unknown
                if !state.duration().is_zero() {
                    new_pos = new_pos.min(state.duration());
                }
                handle.cmd_tx.send(AppCommand::Seek(new_pos))?;
            }
            KeyCode::Left => {
                let new_pos = state.position.saturating_sub(SEEK_STEP);
                handle.cmd_tx.send(AppCommand::Seek(new_pos))?;
            }
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Playback"
    }

    fn help_items(&self) -> Vec<(&str, &str)> {
        vec![("←/→", "Seek"), ("↑/↓", "Volume"), ("Tab", "Switch Tab"), ("Q", "Quit")]
    }
}

/// Draw the playback panel
pub fn draw_playback_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Now playing info
            Constraint::Length(3), // Progress bar
            Constraint::Length(3), // Modes
            Constraint::Min(0),
        ])
        .split(area);

    draw_now_playing(f, chunks[0], state);
    draw_progress(f, chunks[1], state);
    draw_modes(f, chunks[2], state);
}

/// Draw the now playing section
fn draw_now_playing(f: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" 🎵 Now Playing ")
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let inner = block.inner(area);
    f.render_widget(block, area);

    if let Some(ref song) = state.player.current_song {
        let status = if state.player.is_playing { "▶ Playing" } else { "⏸ Paused" };
        let text = vec![
            Line::from(vec![Span::styled(
                song.title.as_str(),
                Style::default().fg(Color::White).bold(),
            )]),
            Line::from(vec![Span::styled(song.artist.as_str(), Style::default().fg(Color::Gray))]),
            Line::from(vec![Span::styled(status, Style::default().fg(Color::DarkGray))]),
        ];

        f.render_widget(Paragraph::new(text), inner);
    } else {
        let text = Paragraph::new("Nothing queued").style(Style::default().fg(Color::DarkGray));
        f.render_widget(text, inner);
    }
}

/// Draw the progress bar
fn draw_progress(f: &mut Frame, area: Rect, state: &AppState) {
    let progress_pct = (state.progress() * 100.0) as u16;
    let label = format!(
        "{} / {}",
        AppState::format_time(state.position),
        AppState::format_time(state.duration())
    );

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .percent(progress_pct)
        .label(label);

    f.render_widget(gauge, area);
}

/// Draw shuffle, repeat and volume
fn draw_modes(f: &mut Frame, area: Rect, state: &AppState) {
    let active = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let inactive = Style::default().fg(Color::DarkGray);

    let line = Line::from(vec![
        Span::styled(
            state.shuffle_label(),
            if state.player.shuffle { active } else { inactive },
        ),
        Span::raw("  |  "),
        Span::styled(state.repeat_label(), active),
        Span::raw("  |  "),
        Span::raw(format!("🔊 {:.0}%", state.volume * 100.0)),
    ]);

    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use tuneroom_core::{song::Song, store::PlayerSnapshot};

    use super::*;

    fn state_at(position: Duration, duration: u32) -> AppState {
        let mut song = Song::new("a", "A", "X", "/a.mp3");
        song.duration = duration;
        let mut state = AppState::new("offline");
        state.refresh(
            PlayerSnapshot {
                current_song: Some(song.clone()),
                queue: vec![song],
                current_index: Some(0),
                ..PlayerSnapshot::default()
            },
            position,
            1.0,
        );
        state
    }

    fn seek_sent(state: &mut AppState, key: KeyCode) -> AppCommand {
        let (handle, cmd_rx) = PlayerHandle::new();
        PlaybackRoute.handle_input(key, state, &handle).unwrap();
        cmd_rx.try_recv().unwrap()
    }

    #[test]
    fn seek_forward_with_unknown_length() {
        let mut state = state_at(Duration::from_secs(30), 0);
        assert_eq!(
            seek_sent(&mut state, KeyCode::Right),
            AppCommand::Seek(Duration::from_secs(35))
        );
    }

    #[test]
    fn seek_stays_inside_the_track() {
        let mut state = state_at(Duration::from_secs(58), 60);
        assert_eq!(
            seek_sent(&mut state, KeyCode::Right),
            AppCommand::Seek(Duration::from_secs(60))
        );

        let mut state = state_at(Duration::from_secs(3), 60);
        assert_eq!(seek_sent(&mut state, KeyCode::Left), AppCommand::Seek(Duration::ZERO));
    }
}
