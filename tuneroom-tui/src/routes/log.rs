use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};
use tui_logger::{TuiLoggerWidget, TuiWidgetEvent, TuiWidgetState};

use crate::{
    handle::PlayerHandle,
    router::{RouteAction, RouteHandler, route_for_name},
    state::AppState,
};

/// Log route, backed by tui-logger's buffer
pub struct LogRoute {
    widget_state: TuiWidgetState,
}

impl LogRoute {
    pub fn new() -> Self {
        Self {
            widget_state: TuiWidgetState::new(),
        }
    }
}

impl std::fmt::Debug for LogRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogRoute").finish_non_exhaustive()
    }
}

impl RouteHandler for LogRoute {
    fn render(&self, frame: &mut Frame, area: Rect, _state: &AppState) {
        let log_widget = TuiLoggerWidget::default()
            .block(
                Block::default()
                    .title(" 📋 Log (PgUp/PgDn to Scroll) ")
                    .borders(Borders::ALL)
                    .border_style(
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
            )
            .style(Style::default().fg(Color::White))
            .state(&self.widget_state);

        frame.render_widget(log_widget, area);
    }

    fn handle_input(
        &mut self,
        key: KeyCode,
        _state: &mut AppState,
        _handle: &PlayerHandle,
    ) -> anyhow::Result<RouteAction> {
        match key {
            KeyCode::PageUp | KeyCode::Up => self.widget_state.transition(TuiWidgetEvent::PrevPageKey),
            KeyCode::PageDown | KeyCode::Down => {
                self.widget_state.transition(TuiWidgetEvent::NextPageKey)
            }
            // Leave page mode and follow new lines again
            KeyCode::End => self.widget_state.transition(TuiWidgetEvent::EscapeKey),
            KeyCode::Esc => return Ok(RouteAction::Replace(route_for_name("Playback"))),
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Log"
    }

    fn help_items(&self) -> Vec<(&str, &str)> {
        vec![("PgUp/PgDn", "Scroll"), ("End", "Follow"), ("Esc", "Back"), ("Tab", "Switch Tab"), ("Q", "Quit")]
    }
}
