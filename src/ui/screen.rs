use ratatui::Frame;

use crate::{ui::render_picker, App, AppState};

/// A UI Screen boundary: responsible for rendering
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Typing screen - renders the line pairs and stats using the App widget
pub struct TypingScreen;

impl Screen for TypingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Article picker screen
pub struct PickerScreen;

impl Screen for PickerScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        render_picker(app, area, f.buffer_mut());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Typing => Box::new(TypingScreen),
        AppState::ArticlePicker => Box::new(PickerScreen),
    }
}
