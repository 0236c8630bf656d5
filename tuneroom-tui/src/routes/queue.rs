use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use tuneroom_core::commands::PlayerCommand;

use crate::{
    handle::PlayerHandle,
    router::{RouteAction, RouteHandler, route_for_name},
    state::AppState,
};

/// Queue route
#[derive(Debug, Clone)]
pub struct QueueRoute;

impl RouteHandler for QueueRoute {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        draw_queue_panel(frame, area, state);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &PlayerHandle,
    ) -> anyhow::Result<RouteAction> {
        match key {
            KeyCode::Up => state.queue_prev(),
            KeyCode::Down => state.queue_next(),
            KeyCode::Enter => {
                if let Some(idx) = state.queue_selected() {
                    handle.send(PlayerCommand::PlayIndex(idx))?;
                }
            }
            KeyCode::Esc => return Ok(RouteAction::Replace(route_for_name("Playback"))),
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Queue"
    }

    /// Start browsing from the track that is playing
    fn on_enter(&mut self, state: &mut AppState) -> anyhow::Result<()> {
        if let Some(index) = state.player.current_index {
            state.queue_state.select(Some(index));
        }
        Ok(())
    }

    fn help_items(&self) -> Vec<(&str, &str)> {
        vec![("↑/↓", "Select"), ("Enter", "Play"), ("Esc", "Back"), ("Tab", "Switch Tab"), ("Q", "Quit")]
    }
}

/// Draw the queue panel
pub fn draw_queue_panel(f: &mut Frame, area: Rect, state: &AppState) {
    let title = format!(" Queue ({} tracks) ", state.player.queue.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let items: Vec<ListItem> = state
        .player
        .queue
        .iter()
        .enumerate()
        .map(|(i, song)| {
            let is_current = state.player.current_index == Some(i);
            let prefix = if is_current { "▶ " } else { "  " };
            let style = if is_current {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!("{}{}", prefix, song)).style(style)
        })
        .collect();

    if items.is_empty() {
        let empty_msg = Paragraph::new("Queue is empty. Pass files or a song list on the command line.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty_msg, area);
    } else {
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");

        let mut list_state = state.queue_state.clone();
        f.render_stateful_widget(list, area, &mut list_state);
    }
}
