pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use itertools::Itertools;
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Instant,
};

use linetype::{
    app_dirs::AppDirs,
    articles::{Catalogue, TextSource},
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    metrics::Metrics,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::TypingSession,
};

use crate::ui::screen::current_screen;

/// line-by-line typing practice with live wpm and accuracy
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a passage one wrapped line at a time. Each line unlocks when the previous one matches exactly; time, words per minute and accuracy update every second."
)]
pub struct Cli {
    /// maximum characters per line
    #[clap(short = 'w', long)]
    width: Option<usize>,

    /// built-in article to type, by number or title
    #[clap(short = 'a', long)]
    article: Option<String>,

    /// custom text to type
    #[clap(short = 'p', long, conflicts_with_all = ["article", "file"])]
    prompt: Option<String>,

    /// read the text to type from a file
    #[clap(short = 'f', long, conflicts_with = "article")]
    file: Option<PathBuf>,

    /// start on a random built-in article
    #[clap(long)]
    random: bool,

    /// print the built-in articles and exit
    #[clap(long)]
    list: bool,

    /// write diagnostics to this file
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// diagnostics level; enables logging to the default log file
    #[clap(long, value_enum)]
    log_level: Option<LogLevel>,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Cli {
    fn resolve_width(&self, config: &Config) -> linetype::Result<usize> {
        match self.width.unwrap_or(config.max_chars) {
            0 => Err(linetype::Error::InvalidWidth),
            width => Ok(width),
        }
    }

    fn resolve_source<R: rand::Rng + ?Sized>(
        &self,
        config: &Config,
        catalogue: &Catalogue,
        rng: &mut R,
    ) -> linetype::Result<TextSource> {
        if let Some(prompt) = &self.prompt {
            return Ok(TextSource::Prompt(prompt.clone()));
        }
        if let Some(path) = &self.file {
            return TextSource::from_file(path);
        }
        if let Some(query) = &self.article {
            return catalogue.find(query).map(TextSource::Article);
        }
        if self.random || config.random {
            if let Some(index) = catalogue.random_index(rng) {
                return Ok(TextSource::Article(index));
            }
        }
        let index = if config.article < catalogue.len() {
            config.article
        } else {
            0
        };
        Ok(TextSource::Article(index))
    }

    fn log_target(&self) -> Option<(PathBuf, LogLevel)> {
        if self.log_file.is_none() && self.log_level.is_none() {
            return None;
        }
        let path = self.log_file.clone().or_else(AppDirs::log_path)?;
        let level = self.log_level.unwrap_or(LogLevel::Info);
        Some((path, level))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Typing,
    ArticlePicker,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Default)]
pub struct PickerState {
    pub selected: usize,
}

pub struct App {
    pub catalogue: Catalogue,
    pub source: TextSource,
    pub max_chars: usize,
    pub session: TypingSession,
    pub state: AppState,
    pub picker: PickerState,
    pub config: Config,
    /// Figures reported by the keystroke that completed the last line.
    pub final_metrics: Option<Metrics>,
    store: Option<Box<dyn ConfigStore>>,
}

impl App {
    pub fn new(catalogue: Catalogue, source: TextSource, max_chars: usize) -> Self {
        let session = TypingSession::from_text(source.text(&catalogue), max_chars);
        Self {
            catalogue,
            source,
            max_chars,
            session,
            state: AppState::Typing,
            picker: PickerState::default(),
            config: Config::default(),
            final_metrics: None,
            store: None,
        }
    }

    pub fn with_store(mut self, config: Config, store: Box<dyn ConfigStore>) -> Self {
        self.config = config;
        self.store = Some(store);
        self
    }

    /// Starts the current passage over.
    pub fn restart(&mut self) {
        log::info!("restarting {}", self.source.label(&self.catalogue));
        self.session.reset();
        self.final_metrics = None;
        self.state = AppState::Typing;
    }

    /// Switches to another passage and wraps it into a fresh session.
    pub fn load(&mut self, source: TextSource) {
        self.session.reset();
        self.session = TypingSession::from_text(source.text(&self.catalogue), self.max_chars);
        self.source = source;
        self.final_metrics = None;
        self.state = AppState::Typing;
        log::info!(
            "loaded {} as {} lines",
            self.source.label(&self.catalogue),
            self.session.line_count()
        );
    }

    fn type_char(&mut self, c: char) {
        let Some(index) = self.session.active_line() else {
            return;
        };
        let mut value = self
            .session
            .input(index)
            .map(|i| i.typed.clone())
            .unwrap_or_default();
        value.push(c);
        self.submit(index, &value);
    }

    fn backspace(&mut self) {
        let Some(index) = self.session.active_line() else {
            return;
        };
        let Some(mut value) = self.session.input(index).map(|i| i.typed.clone()) else {
            return;
        };
        if value.pop().is_some() {
            self.submit(index, &value);
        }
    }

    // Character colours are redrawn from `line_states` for every visible line,
    // so only the completion report of the outcome is kept.
    fn submit(&mut self, index: usize, value: &str) {
        if let Some(outcome) = self.session.on_keystroke(index, value) {
            if let Some(metrics) = outcome.final_metrics {
                self.final_metrics = Some(metrics);
            }
        }
    }

    /// Returns true when the screen needs redrawing.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        self.session.poll_timer(now).is_some()
    }

    fn open_picker(&mut self) {
        if self.catalogue.is_empty() {
            return;
        }
        self.picker.selected = match self.source {
            TextSource::Article(index) => index.min(self.catalogue.len() - 1),
            _ => 0,
        };
        self.state = AppState::ArticlePicker;
    }

    fn pick_article(&mut self) {
        let index = self.picker.selected;
        self.load(TextSource::Article(index));
        self.config.article = index;
        if let Some(store) = &self.store {
            if let Err(err) = store.save(&self.config) {
                log::warn!("could not save config: {err}");
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.state {
            AppState::Typing => match key.code {
                KeyCode::Esc => return Flow::Quit,
                KeyCode::Char('r') if ctrl => self.restart(),
                KeyCode::F(5) => self.restart(),
                KeyCode::Tab => self.open_picker(),
                KeyCode::Backspace => self.backspace(),
                KeyCode::Char(c)
                    if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) =>
                {
                    self.type_char(c)
                }
                _ => {}
            },
            AppState::ArticlePicker => match key.code {
                KeyCode::Esc => self.state = AppState::Typing,
                KeyCode::Up | KeyCode::Char('k') => {
                    self.picker.selected = self.picker.selected.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if self.picker.selected + 1 < self.catalogue.len() {
                        self.picker.selected += 1;
                    }
                }
                KeyCode::Enter => self.pick_article(),
                _ => {}
            },
        }

        Flow::Continue
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let catalogue = Catalogue::builtin()?;

    if cli.list {
        println!(
            "{}",
            catalogue
                .titles()
                .enumerate()
                .map(|(i, title)| format!("{:>2}. {}", i + 1, title))
                .join("\n")
        );
        return Ok(());
    }

    if let Some((path, level)) = cli.log_target() {
        logging::init(&path, level.into())?;
        log::info!("logging at {level} to {}", path.display());
    }

    let store = FileConfigStore::new();
    let config = store.load();

    let mut cmd = Cli::command();
    let max_chars = cli
        .resolve_width(&config)
        .unwrap_or_else(|err| cmd.error(ErrorKind::InvalidValue, err).exit());
    let source = cli
        .resolve_source(&config, &catalogue, &mut rand::thread_rng())
        .unwrap_or_else(|err| cmd.error(ErrorKind::InvalidValue, err).exit());

    if !stdin().is_tty() {
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(catalogue, source, max_chars).with_store(config, Box::new(store));
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                if app.on_tick(Instant::now()) {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                if app.handle_key(key) == Flow::Quit {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    current_screen(&app.state).render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use linetype::articles::Article;
    use linetype::session::CharState;
    use ratatui::backend::TestBackend;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn catalogue() -> Catalogue {
        Catalogue::from_articles(vec![
            Article {
                title: "Short".into(),
                text: "ab cd".into(),
            },
            Article {
                title: "Longer".into(),
                text: "the quick brown fox".into(),
            },
        ])
    }

    fn app(width: usize) -> App {
        App::new(catalogue(), TextSource::Article(0), width)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn rendered(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| ui(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[derive(Clone, Default)]
    struct MemoryStore(Rc<RefCell<Option<Config>>>);

    impl ConfigStore for MemoryStore {
        fn load(&self) -> Config {
            self.0.borrow().clone().unwrap_or_default()
        }

        fn save(&self, cfg: &Config) -> io::Result<()> {
            *self.0.borrow_mut() = Some(cfg.clone());
            Ok(())
        }
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["linetype"]);
        assert_eq!(cli.width, None);
        assert_eq!(cli.article, None);
        assert!(!cli.random);
        assert!(!cli.list);
        assert!(cli.log_target().is_none());
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::parse_from(["linetype", "-w", "40", "-a", "oliver"]);
        assert_eq!(cli.width, Some(40));
        assert_eq!(cli.article.as_deref(), Some("oliver"));

        let cli = Cli::parse_from(["linetype", "--prompt", "hello there"]);
        assert_eq!(cli.prompt.as_deref(), Some("hello there"));
    }

    #[test]
    fn test_cli_prompt_conflicts_with_article() {
        let result = Cli::try_parse_from(["linetype", "-p", "x", "-a", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_log_level() {
        let cli = Cli::parse_from(["linetype", "--log-level", "debug", "--log-file", "/tmp/x.log"]);
        assert_matches!(cli.log_level, Some(LogLevel::Debug));
        let (path, level) = cli.log_target().unwrap();
        assert_eq!(path, PathBuf::from("/tmp/x.log"));
        assert_matches!(level, LogLevel::Debug);
        assert_eq!(LevelFilter::from(level), LevelFilter::Debug);

        let cli = Cli::parse_from(["linetype", "--log-file", "/tmp/y.log"]);
        assert_matches!(cli.log_target().unwrap().1, LogLevel::Info);
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Warn.to_string(), "Warn");
    }

    #[test]
    fn test_resolve_width() {
        let config = Config::default();
        assert_eq!(Cli::parse_from(["linetype"]).resolve_width(&config).unwrap(), 60);
        assert_eq!(
            Cli::parse_from(["linetype", "-w", "30"])
                .resolve_width(&config)
                .unwrap(),
            30
        );
        assert_matches!(
            Cli::parse_from(["linetype", "-w", "0"]).resolve_width(&config),
            Err(linetype::Error::InvalidWidth)
        );
    }

    #[test]
    fn test_resolve_source_precedence() {
        let catalogue = catalogue();
        let mut rng = StdRng::seed_from_u64(1);
        let config = Config {
            article: 1,
            ..Config::default()
        };

        let cli = Cli::parse_from(["linetype", "-p", "typed text"]);
        assert_eq!(
            cli.resolve_source(&config, &catalogue, &mut rng).unwrap(),
            TextSource::Prompt("typed text".into())
        );

        let cli = Cli::parse_from(["linetype", "-a", "short"]);
        assert_eq!(
            cli.resolve_source(&config, &catalogue, &mut rng).unwrap(),
            TextSource::Article(0)
        );

        let cli = Cli::parse_from(["linetype"]);
        assert_eq!(
            cli.resolve_source(&config, &catalogue, &mut rng).unwrap(),
            TextSource::Article(1)
        );
    }

    #[test]
    fn test_resolve_source_clamps_stale_config() {
        let config = Config {
            article: 9,
            ..Config::default()
        };
        let cli = Cli::parse_from(["linetype"]);
        let source = cli
            .resolve_source(&config, &catalogue(), &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(source, TextSource::Article(0));
    }

    #[test]
    fn test_resolve_source_unknown_article() {
        let cli = Cli::parse_from(["linetype", "-a", "missing"]);
        let result = cli.resolve_source(
            &Config::default(),
            &catalogue(),
            &mut StdRng::seed_from_u64(1),
        );
        assert_matches!(result, Err(linetype::Error::UnknownArticle(_)));
    }

    #[test]
    fn test_resolve_source_random() {
        let cli = Cli::parse_from(["linetype", "--random"]);
        let catalogue = catalogue();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            let source = cli
                .resolve_source(&Config::default(), &catalogue, &mut rng)
                .unwrap();
            assert_matches!(source, TextSource::Article(i) if i < 2);
        }
    }

    #[test]
    fn test_app_new_wraps_source() {
        let app = app(3);
        assert_eq!(app.session.lines(), &["ab".to_string(), "cd".to_string()]);
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.session.active_line(), Some(0));
    }

    #[test]
    fn test_typing_advances_lines() {
        let mut app = app(3);
        type_str(&mut app, "ab");
        assert_eq!(app.session.active_line(), Some(1));
        assert!(app.session.is_started());

        type_str(&mut app, "cx");
        assert_eq!(
            app.session.line_states(1),
            vec![CharState::Correct, CharState::Incorrect]
        );

        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.session.input(1).unwrap().typed, "c");
        type_str(&mut app, "d");
        assert!(app.session.is_finished());
        assert_eq!(app.session.scoreboard().accuracy, 100);
    }

    #[test]
    fn test_backspace_on_empty_line_is_ignored() {
        let mut app = app(3);
        app.handle_key(key(KeyCode::Backspace));
        assert!(!app.session.is_started());
    }

    #[test]
    fn test_keys_ignored_after_finish() {
        let mut app = app(10);
        type_str(&mut app, "ab cd");
        assert!(app.session.is_finished());
        type_str(&mut app, "zz");
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.session.input(0).unwrap().typed, "ab cd");
    }

    #[test]
    fn test_restart_resets_session() {
        let mut app = app(3);
        type_str(&mut app, "ab");
        app.handle_key(ctrl('r'));
        assert!(!app.session.is_started());
        assert_eq!(app.session.active_line(), Some(0));
        assert!(app.session.input(0).unwrap().typed.is_empty());

        type_str(&mut app, "a");
        app.handle_key(key(KeyCode::F(5)));
        assert!(!app.session.is_started());
    }

    #[test]
    fn test_modified_chars_are_not_typed() {
        let mut app = app(3);
        app.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::ALT));
        app.handle_key(ctrl('x'));
        assert!(!app.session.is_started());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app(3);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Flow::Quit);
        assert_eq!(app.handle_key(ctrl('c')), Flow::Quit);
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Flow::Continue);
    }

    #[test]
    fn test_picker_selects_article_and_saves() {
        let store = MemoryStore::default();
        let mut app = app(60).with_store(Config::default(), Box::new(store.clone()));
        type_str(&mut app, "ab");

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.state, AppState::ArticlePicker);
        assert_eq!(app.picker.selected, 0);

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.picker.selected, 1);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.source, TextSource::Article(1));
        assert_eq!(app.session.lines(), &["the quick brown fox".to_string()]);
        assert!(!app.session.is_started());
        assert_eq!(store.load().article, 1);
    }

    #[test]
    fn test_picker_escape_keeps_session() {
        let mut app = app(60);
        type_str(&mut app, "a");
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.picker.selected, 0);
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.session.input(0).unwrap().typed, "a");
    }

    #[test]
    fn test_on_tick_updates_scoreboard() {
        let mut app = app(60);
        let start = Instant::now();
        assert!(!app.on_tick(start));

        type_str(&mut app, "ab");
        let later = app.session.started_at().unwrap() + std::time::Duration::from_secs(2);
        assert!(app.on_tick(later));
        assert_eq!(app.session.scoreboard().elapsed_secs, 2);
        assert_eq!(app.session.scoreboard().wpm, 12);
    }

    #[test]
    fn test_render_typing_screen() {
        let mut app = app(60);
        type_str(&mut app, "ab");
        let screen = rendered(&app, 60, 12);
        assert!(screen.contains("Short"));
        assert!(screen.contains("ab cd"));
        assert!(screen.contains("> ab"));
        assert!(screen.contains("0s   0 wpm   100% acc"));
    }

    #[test]
    fn test_render_shows_done_when_finished() {
        let mut app = app(60);
        type_str(&mut app, "ab cd");
        let screen = rendered(&app, 60, 12);
        assert!(screen.contains("done"));
    }

    #[test]
    fn test_render_picker_screen() {
        let mut app = app(60);
        app.handle_key(key(KeyCode::Tab));
        let screen = rendered(&app, 60, 12);
        assert!(screen.contains("Choose an article"));
        assert!(screen.contains("> 1. Short"));
        assert!(screen.contains("2. Longer"));
    }

    #[test]
    fn test_render_survives_tiny_terminal() {
        let app = app(60);
        let _ = rendered(&app, 4, 2);
    }

    #[test]
    fn test_render_survives_unbroken_long_word() {
        // a single word wider than u16 can hold stays on one wrapped line
        let app = App::new(catalogue(), TextSource::Prompt("y".repeat(65534)), 60);
        assert_eq!(app.session.line_count(), 1);
        let screen = rendered(&app, 80, 20);
        assert!(screen.contains("yyyy"));
    }

    #[test]
    fn test_finished_app_keeps_final_metrics() {
        let mut app = app(60);
        type_str(&mut app, "ab c");
        assert!(app.final_metrics.is_none());
        type_str(&mut app, "d");
        let done = app.final_metrics.expect("completing the last line reports metrics");
        assert_eq!(done.typed_chars, 5);
        assert_eq!(done.correct_chars, 5);
        assert_eq!(done.accuracy, 100);
        assert!(rendered(&app, 60, 12).contains("done (5/5 chars)"));

        app.handle_key(ctrl('r'));
        assert!(app.final_metrics.is_none());
    }
}
