mod ui;

use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin, Write},
    path::PathBuf,
    time::Duration,
};

use rhophi::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    form::InputForm,
    input::Impulse,
    runtime::{CrosstermEventSource, FixedTicker, PolarEvent, Runner},
    Mode, Trainer,
};
use ui::screen::current_screen;

const TICK_RATE_MS: u64 = 16;

/// polar coordinates trainer: steer a point by ρ and φ
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal trainer for polar coordinates. Steer a point by radius and phase towards random targets, or trace a ρ(φ) formula while the phase sweeps and get scored on accuracy."
)]
pub struct Cli {
    /// ρ(φ) formula for exercise mode, e.g. "200*sin(3*phi)"
    #[clap(short = 'e', long)]
    expression: Option<String>,

    /// sweep start angle in degrees
    #[clap(long = "from", allow_negative_numbers = true)]
    phi_from: Option<f64>,

    /// sweep end angle in degrees
    #[clap(long = "to", allow_negative_numbers = true)]
    phi_to: Option<f64>,

    /// sweep speed in degrees per tick
    #[clap(short = 's', long)]
    speed: Option<f64>,

    /// radius change per tick while ↑ or ↓ is held
    #[clap(short = 'r', long, allow_negative_numbers = true)]
    radius_step: Option<f64>,

    /// mode to open in
    #[clap(short = 'm', long, value_enum)]
    mode: Option<StartMode>,

    /// draw the reference curve while an exercise sweeps
    #[clap(long)]
    show_reference: bool,

    /// config file to load and save instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// log more to the log file (-v info, -vv debug, -vvv trace)
    #[clap(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum, strum_macros::Display)]
pub enum StartMode {
    Target,
    Exercise,
}

impl From<StartMode> for Mode {
    fn from(m: StartMode) -> Self {
        match m {
            StartMode::Target => Mode::Target,
            StartMode::Exercise => Mode::Exercise,
        }
    }
}

impl Cli {
    /// Command line flags win over the stored config
    fn apply_to(&self, cfg: &mut Config) {
        if let Some(expression) = &self.expression {
            cfg.exercise.expression = expression.clone();
        }
        if let Some(v) = self.phi_from {
            cfg.exercise.phi_from_deg = v.to_string();
        }
        if let Some(v) = self.phi_to {
            cfg.exercise.phi_to_deg = v.to_string();
        }
        if let Some(v) = self.speed {
            cfg.exercise.speed_deg = v.to_string();
        }
        if let Some(v) = self.radius_step {
            cfg.exercise.radius_step = v.to_string();
        }
        if let Some(mode) = self.mode {
            cfg.start_mode = mode.into();
        }
        if self.show_reference {
            cfg.show_reference = true;
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub trainer: Trainer,
    pub exercise_form: InputForm,
    pub goto_form: InputForm,
    pub config: Config,
    pub status: Option<String>,
    store: Option<FileConfigStore>,
}

impl App {
    pub fn new(cli: &Cli) -> Self {
        let store = match &cli.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        };
        let mut config = store.load();
        cli.apply_to(&mut config);

        Self::with_trainer(Trainer::new(), config, Some(store))
    }

    pub fn with_trainer(
        mut trainer: Trainer,
        config: Config,
        store: Option<FileConfigStore>,
    ) -> Self {
        trainer.set_show_reference(config.show_reference);
        if trainer.mode() != config.start_mode {
            trainer.switch_mode(config.start_mode);
        }

        Self {
            trainer,
            exercise_form: InputForm::exercise(&config.exercise),
            goto_form: InputForm::goto(),
            config,
            status: None,
            store,
        }
    }

    fn active_form_mut(&mut self) -> &mut InputForm {
        match self.trainer.mode() {
            Mode::Target => &mut self.goto_form,
            Mode::Exercise => &mut self.exercise_form,
        }
    }

    pub fn is_editing(&self) -> bool {
        match self.trainer.mode() {
            Mode::Target => self.goto_form.editing,
            Mode::Exercise => self.exercise_form.editing,
        }
    }

    fn start_exercise(&mut self) {
        let inputs = self.exercise_form.exercise_inputs();
        self.status = None;
        if self.trainer.start_from_inputs(&inputs).is_err() {
            return;
        }

        self.config
            .remember_exercise(&inputs, self.trainer.show_reference());
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.config) {
                log::warn!("could not save config to {}: {e}", store.path().display());
                self.status = Some(format!("config not saved: {e}"));
            }
        }
    }

    fn go_to(&mut self) {
        match self.goto_form.goto_values() {
            Some((radius, angle)) => {
                self.status = None;
                self.trainer.go_to_target(radius, angle);
            }
            None => self.status = Some("ρ and φ must both be numbers".to_string()),
        }
    }

    fn apply_form(&mut self) {
        match self.trainer.mode() {
            Mode::Target => self.go_to(),
            Mode::Exercise => self.start_exercise(),
        }
    }

    fn on_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.active_form_mut().editing = false,
            KeyCode::Tab => self.active_form_mut().focus_next(),
            KeyCode::BackTab => self.active_form_mut().focus_prev(),
            KeyCode::Backspace => self.active_form_mut().backspace(),
            KeyCode::Delete => self.active_form_mut().clear_focused(),
            KeyCode::Enter => {
                self.active_form_mut().editing = false;
                self.apply_form();
            }
            KeyCode::Char(c) => self.active_form_mut().insert(c),
            _ => {}
        }
    }

    /// Handle one key press; returns true when the app should quit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        // ctrl+c quits from anywhere, including the form
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        if self.is_editing() {
            self.on_edit_key(key);
            return false;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                if let Some(impulse) = Impulse::from_key(key.code) {
                    self.trainer.press(impulse);
                }
            }
            KeyCode::Char('m') => {
                self.status = None;
                self.trainer.clear_error();
                self.trainer.toggle_mode();
            }
            KeyCode::Char('e') => self.active_form_mut().editing = true,
            KeyCode::Char(' ') => {
                let moving = self.trainer.continue_moving();
                self.trainer.set_continue(!moving);
            }
            KeyCode::Char('o') => {
                let show = self.trainer.show_reference();
                self.trainer.set_show_reference(!show);
            }
            KeyCode::Char('s') => self.start_exercise(),
            KeyCode::Enter => self.apply_form(),
            KeyCode::Char('r') if self.trainer.mode() == Mode::Exercise => self.trainer.reset(),
            KeyCode::Char('g') if self.trainer.mode() == Mode::Target => self.go_to(),
            KeyCode::Char('t') if self.trainer.mode() == Mode::Target => {
                self.trainer.reset_target_position()
            }
            _ => {}
        }
        false
    }
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Log to a file; the terminal is owned by the UI. RUST_LOG overrides `-v`.
fn init_logging(verbose: u8) {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = env_logger::Builder::new()
        .filter_level(log_level(verbose))
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(cli.verbose);
    log::info!("rhophi {} starting", env!("CARGO_PKG_VERSION"));

    let mut app = App::new(&cli);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        log::error!("terminal loop failed: {e}");
    }
    res
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui(app, f))?;
    loop {
        match runner.step() {
            PolarEvent::Tick => app.trainer.on_tick(),
            PolarEvent::Resize => {}
            PolarEvent::Key(key) => {
                if app.on_key(key) {
                    break;
                }
            }
        }
        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    current_screen(app.trainer.mode()).render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhophi::SessionPhase;
    use tempfile::tempdir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
    }

    fn test_app() -> App {
        App::with_trainer(Trainer::with_seed(5), Config::default(), None)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["rhophi"]);

        assert_eq!(cli.expression, None);
        assert_eq!(cli.phi_from, None);
        assert_eq!(cli.phi_to, None);
        assert_eq!(cli.speed, None);
        assert_eq!(cli.radius_step, None);
        assert_eq!(cli.mode, None);
        assert!(!cli.show_reference);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_exercise_flags() {
        let cli = Cli::parse_from([
            "rhophi",
            "-e",
            "100 + 50*cos(phi)",
            "--from",
            "-90",
            "--to",
            "90",
            "-s",
            "0.5",
            "-r",
            "4",
            "-m",
            "exercise",
            "--show-reference",
            "-vv",
        ]);

        assert_eq!(cli.expression.as_deref(), Some("100 + 50*cos(phi)"));
        assert_eq!(cli.phi_from, Some(-90.0));
        assert_eq!(cli.phi_to, Some(90.0));
        assert_eq!(cli.speed, Some(0.5));
        assert_eq!(cli.radius_step, Some(4.0));
        assert_eq!(cli.mode, Some(StartMode::Exercise));
        assert!(cli.show_reference);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["rhophi", "--mode", "sideways"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["rhophi", "-e", "phi*40", "--to", "360", "-m", "exercise"]);
        let mut cfg = Config::default();
        cli.apply_to(&mut cfg);

        assert_eq!(cfg.exercise.expression, "phi*40");
        assert_eq!(cfg.exercise.phi_to_deg, "360");
        assert_eq!(cfg.exercise.phi_from_deg, "0");
        assert_eq!(cfg.start_mode, Mode::Exercise);
        assert!(!cfg.show_reference);
    }

    #[test]
    fn test_log_level_from_verbosity() {
        assert_eq!(log_level(0), LevelFilter::Warn);
        assert_eq!(log_level(1), LevelFilter::Info);
        assert_eq!(log_level(2), LevelFilter::Debug);
        assert_eq!(log_level(9), LevelFilter::Trace);
    }

    #[test]
    fn test_app_applies_start_mode_and_reference() {
        let cfg = Config {
            start_mode: Mode::Exercise,
            show_reference: true,
            ..Config::default()
        };
        let app = App::with_trainer(Trainer::with_seed(1), cfg, None);
        assert_eq!(app.trainer.mode(), Mode::Exercise);
        assert!(app.trainer.show_reference());
        assert_eq!(app.exercise_form.exercise_inputs().expression, "200*sin(3*phi)");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        assert!(app.on_key(key(KeyCode::Char('q'))));
        assert!(app.on_key(key(KeyCode::Esc)));
        assert!(app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!app.on_key(key(KeyCode::Char('x'))));
    }

    #[test]
    fn test_arrow_moves_point_on_next_tick() {
        let mut app = test_app();
        app.on_key(key(KeyCode::Up));
        assert_eq!(app.trainer.point().radius, 100.0);
        app.trainer.on_tick();
        assert_eq!(app.trainer.point().radius, 103.0);
    }

    #[test]
    fn test_space_pauses_movement() {
        let mut app = test_app();
        app.on_key(key(KeyCode::Char(' ')));
        assert!(!app.trainer.continue_moving());
        app.on_key(key(KeyCode::Up));
        app.trainer.on_tick();
        assert_eq!(app.trainer.point().radius, 100.0);
    }

    #[test]
    fn test_mode_and_reference_toggles() {
        let mut app = test_app();
        app.on_key(key(KeyCode::Char('m')));
        assert_eq!(app.trainer.mode(), Mode::Exercise);
        app.on_key(key(KeyCode::Char('o')));
        assert!(app.trainer.show_reference());
        app.on_key(key(KeyCode::Char('m')));
        assert_eq!(app.trainer.mode(), Mode::Target);
    }

    #[test]
    fn test_edit_and_start_exercise() {
        let mut app = test_app();
        app.on_key(key(KeyCode::Char('m')));
        app.on_key(key(KeyCode::Char('e')));
        assert!(app.is_editing());

        app.on_key(key(KeyCode::Delete));
        // 'q' and 'm' are plain text while editing
        type_str(&mut app, "150+sqrt(phi)*m");
        app.on_key(key(KeyCode::Backspace));
        app.on_key(key(KeyCode::Backspace));
        app.on_key(key(KeyCode::Enter));

        assert!(!app.is_editing());
        assert_eq!(app.trainer.phase(), SessionPhase::CountingDown);
        assert_eq!(app.trainer.config().expression, "150+sqrt(phi)");
        assert_eq!(app.config.exercise.expression, "150+sqrt(phi)");
        assert!(app.config.saved_at.is_some());
    }

    #[test]
    fn test_bad_expression_keeps_target_mode() {
        let mut app = test_app();
        app.on_key(key(KeyCode::Char('m')));
        app.on_key(key(KeyCode::Char('e')));
        app.on_key(key(KeyCode::Delete));
        type_str(&mut app, "2*");
        app.on_key(key(KeyCode::Esc));
        app.on_key(key(KeyCode::Char('m')));
        assert_eq!(app.trainer.mode(), Mode::Target);

        app.on_key(key(KeyCode::Char('s')));
        assert_eq!(app.trainer.mode(), Mode::Target);
        assert!(app.trainer.last_error().is_some());
        assert_eq!(app.config.saved_at, None);
    }

    #[test]
    fn test_start_from_target_switches_to_exercise() {
        let mut app = test_app();
        app.on_key(key(KeyCode::Char('s')));
        assert_eq!(app.trainer.mode(), Mode::Exercise);
        assert_eq!(app.trainer.phase(), SessionPhase::CountingDown);
        app.on_key(key(KeyCode::Char('r')));
        assert_eq!(app.trainer.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_goto_form() {
        let mut app = test_app();
        app.on_key(key(KeyCode::Char('g')));
        assert!(app.trainer.is_animating());

        app.on_key(key(KeyCode::Char('e')));
        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::Delete));
        type_str(&mut app, "abc");
        app.on_key(key(KeyCode::Enter));
        assert!(app.status.is_some());
    }

    #[test]
    fn test_new_target_key() {
        let mut app = test_app();
        let before = app.trainer.target();
        app.on_key(key(KeyCode::Char('t')));
        assert_ne!(app.trainer.target(), before);
    }

    #[test]
    fn test_start_saves_config_to_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let mut app = App::with_trainer(Trainer::with_seed(2), Config::default(), Some(store));

        app.on_key(key(KeyCode::Char('s')));
        assert!(path.exists());
        let saved = FileConfigStore::with_path(&path).load();
        assert_eq!(saved.exercise, app.config.exercise);
        assert!(saved.saved_at.is_some());
    }

    #[test]
    fn test_ui_renders_both_screens() {
        use ratatui::backend::TestBackend;

        let mut app = test_app();
        let backend = TestBackend::new(100, 36);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|f| ui(&app, f)).unwrap();
        app.on_key(key(KeyCode::Char('m')));
        terminal.draw(|f| ui(&app, f)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Exercise"));
    }

    #[test]
    fn test_tick_rate_constant() {
        const _: () = assert!(TICK_RATE_MS > 0);
        const _: () = assert!(TICK_RATE_MS <= 100);
    }
}
