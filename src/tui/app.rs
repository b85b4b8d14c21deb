//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation (form and result)
//! - Input event handling
//! - Synchronous prediction on submit

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::forest::RandomForestModel;
use crate::application::PredictionService;
use crate::config::{AppConfig, MODEL_PATH_ENV};
use crate::ports::{Classifier, ModelRepository};

use super::ui::{
    form::{render_form, FormState, PAGE_STEPS},
    render_disclaimer, render_header,
    result::{render_result, ResultState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
}

/// Main application state
pub struct App<C: Classifier> {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Prediction service over the loaded model
    service: PredictionService<C>,

    /// Values being edited
    form_state: FormState,

    /// Outcome of the last submission
    result_state: Option<ResultState>,
}

impl App<RandomForestModel> {
    /// Load the trained model named by `config` and build the application.
    ///
    /// Refuses to start if the model cannot be loaded or verified.
    ///
    /// # Errors
    /// Returns error if the artifact is missing, unsigned under a strict
    /// policy, or does not match the expected feature layout.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = config
            .model_store()
            .context("Failed to read model signing configuration")?;

        if !store.exists() {
            return Err(anyhow!(
                "No trained model at {:?}. Run `train_model` first or set {MODEL_PATH_ENV}.",
                store.model_path()
            ));
        }

        let model = store
            .load()
            .with_context(|| format!("Failed to load model from {:?}", store.dir()))?;

        Ok(Self::new(PredictionService::new(Arc::new(model))))
    }
}

impl<C: Classifier> App<C> {
    /// Create application with an injected prediction service.
    pub fn new(service: PredictionService<C>) -> Self {
        Self {
            screen: Screen::Form,
            should_quit: false,
            service,
            form_state: FormState::default(),
            result_state: None,
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn form(&self) -> &FormState {
        &self.form_state
    }

    #[must_use]
    pub fn result(&self) -> Option<&ResultState> {
        self.result_state.as_ref()
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(2),
                        Constraint::Min(0),
                        Constraint::Length(2),
                    ])
                    .split(f.area());

                render_header(f, chunks[0]);
                match (&self.screen, &self.result_state) {
                    (Screen::Result, Some(result)) => render_result(f, chunks[1], result),
                    _ => render_form(f, chunks[1], &self.form_state),
                }
                render_disclaimer(f, chunks[2]);
            })?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q')) {
            self.should_quit = true;
            return;
        }
        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::BackTab => self.form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form_state.next_field(),
            KeyCode::Left => self.form_state.adjust(-1),
            KeyCode::Right => self.form_state.adjust(1),
            KeyCode::PageDown => self.form_state.adjust(-PAGE_STEPS),
            KeyCode::PageUp => self.form_state.adjust(PAGE_STEPS),
            KeyCode::Char('r') | KeyCode::Char('R') => self.form_state.reset(),
            KeyCode::Enter => self.submit(),
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Esc => {
                self.screen = Screen::Form;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.form_state = FormState::default();
                self.result_state = None;
                self.screen = Screen::Form;
            }
            _ => {}
        }
    }

    /// Blocks until the prediction returns.
    fn submit(&mut self) {
        let state = match self.service.predict(&self.form_state.input) {
            Ok(diagnosis) => ResultState::Complete { diagnosis },
            Err(e) => {
                tracing::error!("Prediction failed: {}", e);
                ResultState::Error {
                    message: e.to_string(),
                }
            }
        };
        self.result_state = Some(state);
        self.screen = Screen::Result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureVector, ModelError, RiskLevel};

    /// Probability rises with age: 0.0 at 20, 1.0 at 80.
    struct AgeClassifier;

    impl Classifier for AgeClassifier {
        fn classes(&self) -> &[i32] {
            &[0, 1]
        }

        fn predict(&self, features: &FeatureVector) -> Result<i32, ModelError> {
            Ok(i32::from(features.as_slice()[0] >= 50.0))
        }

        fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
            let p = (features.as_slice()[0] - 20.0) / 60.0;
            Ok(vec![1.0 - p, p])
        }
    }

    struct BrokenClassifier;

    impl Classifier for BrokenClassifier {
        fn classes(&self) -> &[i32] {
            &[]
        }

        fn predict(&self, _features: &FeatureVector) -> Result<i32, ModelError> {
            Ok(0)
        }

        fn predict_proba(&self, _features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
            Ok(Vec::new())
        }
    }

    fn press(app: &mut App<impl Classifier>, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    fn app() -> App<AgeClassifier> {
        App::new(PredictionService::new(Arc::new(AgeClassifier)))
    }

    #[test]
    fn test_submit_shows_result() {
        let mut app = app();
        press(&mut app, KeyCode::PageUp);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Result);
        match app.result() {
            Some(ResultState::Complete { diagnosis }) => {
                assert_eq!(diagnosis.input.age, 60.0);
                assert_eq!(diagnosis.risk_level, RiskLevel::Moderate);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_return_keeps_values_and_new_form_resets() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen(), Screen::Form);
        assert_eq!(app.form().input.age, 51.0);

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen(), Screen::Form);
        assert_eq!(app.form().input.age, 50.0);
        assert!(app.result().is_none());
    }

    #[test]
    fn test_prediction_error_is_displayed() {
        let mut app = App::new(PredictionService::new(Arc::new(BrokenClassifier)));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen(), Screen::Result);
        assert!(matches!(app.result(), Some(ResultState::Error { .. })));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());

        let mut app = self::app();
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit());

        let mut app = self::app();
        app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit());
    }

    #[test]
    fn test_reset_key() {
        let mut app = app();
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.form().input.age, 40.0);
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.form().input.age, 50.0);
    }
}
