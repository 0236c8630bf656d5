use anyhow::Result;
use ratatui::{Frame, crossterm::event::KeyCode, layout::Rect};

use crate::{
    handle::PlayerHandle,
    routes::{log::LogRoute, playback::PlaybackRoute, queue::QueueRoute},
    state::AppState,
};

/// Trait that all routes must implement
pub trait RouteHandler: std::fmt::Debug {
    /// Render this route's UI
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState);

    /// Handle keyboard input for this route
    fn handle_input(
        &mut self,
        key: KeyCode,
        state: &mut AppState,
        handle: &PlayerHandle,
    ) -> Result<RouteAction>;

    /// Get the display name for navigation
    fn name(&self) -> &str;

    /// Optional: Called when entering this route
    fn on_enter(&mut self, _state: &mut AppState) -> Result<()> {
        Ok(())
    }

    fn help_items(&self) -> Vec<(&str, &str)> {
        vec![("Tab", "Switch Tab"), ("Q", "Quit")]
    }
}

/// Actions that can be returned from route handlers
#[derive(Debug)]
pub enum RouteAction {
    /// Do nothing, stay on current route
    None,
    /// Replace current route with a new one
    Replace(Box<dyn RouteHandler>),
    /// Quit the application
    Quit,
}

/// Router keeps the active route
pub struct Router {
    current: Box<dyn RouteHandler>,
}

impl Router {
    pub fn new(initial_route: Box<dyn RouteHandler>) -> Self {
        Self {
            current: initial_route,
        }
    }

    pub fn current(&self) -> &dyn RouteHandler {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> &mut Box<dyn RouteHandler> {
        &mut self.current
    }

    /// Execute a route action, returns true when the app should quit
    pub fn execute_action(&mut self, action: RouteAction, state: &mut AppState) -> Result<bool> {
        match action {
            RouteAction::None => Ok(false),
            RouteAction::Replace(route) => {
                self.replace(route, state)?;
                Ok(false)
            }
            RouteAction::Quit => Ok(true),
        }
    }

    /// Replace current route (tab switching)
    pub fn replace(&mut self, mut new_route: Box<dyn RouteHandler>, state: &mut AppState) -> Result<()> {
        new_route.on_enter(state)?;
        self.current = new_route;
        Ok(())
    }

    /// Move to the tab after the current one
    pub fn next_tab(&mut self, state: &mut AppState) -> Result<()> {
        let tabs = tab_names();
        let current_idx = tabs
            .iter()
            .position(|n| *n == self.current.name())
            .unwrap_or(0);
        let next_idx = (current_idx + 1) % tabs.len();
        self.replace(route_for_name(tabs[next_idx]), state)
    }
}

/// Get a route handler for a given tab name
pub fn route_for_name(name: &str) -> Box<dyn RouteHandler> {
    match name {
        "Queue" => Box::new(QueueRoute),
        "Log" => Box::new(LogRoute::new()),
        _ => Box::new(PlaybackRoute),
    }
}

/// Get all main tab names in order
pub fn tab_names() -> &'static [&'static str] {
    &["Playback", "Queue", "Log"]
}
