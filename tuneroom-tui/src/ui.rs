use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    router::{Router, tab_names},
    state::AppState,
};

/// Draw the TUI interface
pub fn draw(f: &mut Frame, state: &AppState, router: &Router) {
    // Main horizontal split: Sidebar (left) and Main Content (right)
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([
            Constraint::Length(15), // Sidebar navigation
            Constraint::Min(40),    // Main content area
        ])
        .split(f.area());

    draw_sidebar(f, main_chunks[0], router);
    draw_main_content(f, main_chunks[1], state, router);
}

/// Draw the sidebar navigation
fn draw_sidebar(f: &mut Frame, area: Rect, router: &Router) {
    let block = Block::default()
        .title(" Navigation ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let current = router.current().name();
    let nav_text: Vec<Line> = tab_names()
        .iter()
        .map(|tab| {
            let is_active = *tab == current;
            let prefix = if is_active { "▶ " } else { "  " };
            let style = if is_active {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(format!("{}{}", prefix, tab), style))
        })
        .collect();

    f.render_widget(Paragraph::new(nav_text), inner);
}

/// Draw the main content area for the current route
fn draw_main_content(f: &mut Frame, area: Rect, state: &AppState, router: &Router) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Route content
            Constraint::Length(3), // Controls info
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    router.current().render(f, chunks[0], state);
    draw_controls(f, chunks[1], router);
    draw_status(f, chunks[2], state);
}

/// Global keys plus whatever the current route offers
fn draw_controls(f: &mut Frame, area: Rect, router: &Router) {
    let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let mut spans = Vec::new();
    let global = [
        ("Space", "Play/Pause"),
        ("N/P", "Next/Prev"),
        ("S", "Shuffle"),
        ("R", "Repeat"),
    ];
    for (key, action) in global.into_iter().chain(router.current().help_items()) {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::raw(format!("{} ", action)));
    }

    let controls = Paragraph::new(Line::from(spans))
        .block(Block::default().title(" Controls ").borders(Borders::ALL));
    f.render_widget(controls, area);
}

fn draw_status(f: &mut Frame, area: Rect, state: &AppState) {
    let line = Line::from(vec![
        Span::styled(state.status_message.as_str(), Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", state.presence_label),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let status = Paragraph::new(line).block(Block::default().title(" Status ").borders(Borders::ALL));
    f.render_widget(status, area);
}
