use std::{
    fs,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
        EnableFocusChange, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};

use glance::{
    app::App,
    app_dirs::AppDirs,
    input::PlayMode,
    logging,
    runtime::{CrosstermEventSource, EventSource, Runner},
    store::{FileStore, KeyValueStore},
    Error,
};

/// Upper bound on how long the loop waits for input while nothing is scheduled.
const IDLE_WAIT_MS: u64 = 250;

/// terminal speed reader that flashes text one word at a time
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal RSVP speed reader. Words appear one at a time at a fixed spot with their recognition point highlighted, so your eyes never have to move."
)]
pub struct Cli {
    /// text to read; words are split on whitespace
    text: Option<String>,

    /// read the text from a file instead
    #[clap(short = 'f', long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// start with the built-in sample text
    #[clap(long, conflicts_with_all = ["text", "file"])]
    sample: bool,

    /// reading speed in words per minute, clamped to 50-1200 and saved for
    /// next time; a value that is not a number is ignored
    #[clap(short = 'w', long, allow_hyphen_values = true)]
    wpm: Option<String>,

    /// skip the editor and open the reader straight away
    #[clap(short = 'r', long)]
    read: bool,

    /// read only while space is held down (needs a terminal that reports key releases)
    #[clap(long)]
    hold: bool,

    /// settings file to use instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// where to write the log (filter with GLANCE_LOG)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Text given on the command line or through `--file`.
    fn initial_text(&self) -> glance::Result<Option<String>> {
        if let Some(path) = &self.file {
            return fs::read_to_string(path)
                .map(Some)
                .map_err(|source| Error::ReadInput {
                    path: path.clone(),
                    source,
                });
        }
        Ok(self.text.clone())
    }

    fn store(&self) -> Box<dyn KeyValueStore> {
        match &self.config {
            Some(path) => Box::new(FileStore::with_path(path)),
            None => Box::new(FileStore::new()),
        }
    }

    fn log_path(&self) -> Option<PathBuf> {
        self.log_file.clone().or_else(AppDirs::log_path)
    }
}

fn build_app(cli: &Cli, mode: PlayMode) -> glance::Result<App> {
    let mut app = App::new(cli.store(), mode);

    if let Some(wpm) = &cli.wpm {
        app.submit_wpm(wpm);
    }
    if cli.sample {
        app.editor.load_sample();
    } else if let Some(text) = cli.initial_text()? {
        app.editor.paste(&text);
    }
    if cli.read {
        app.submit();
    }
    Ok(app)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = cli.log_path() {
        logging::init(&path);
    }

    let hold = cli.hold && supports_keyboard_enhancement().unwrap_or(false);
    if cli.hold && !hold {
        warn!("terminal does not report key releases, falling back to toggle mode");
    }
    let mode = if hold { PlayMode::Hold } else { PlayMode::Toggle };

    let mut app = build_app(&cli, mode)?;
    info!(%mode, wpm = app.wpm(), "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    if hold {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(IDLE_WAIT_MS),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    if hold {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        DisableBracketedPaste,
        LeaveAlternateScreen,
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn std::error::Error>> {
    app.ensure_screen();

    while !app.should_quit() {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let event = runner.step(app.next_deadline());
        app.handle_event(event);
        // catch up on any ticks that fell due while handling the event
        while app.on_timeout() {}
    }

    info!("quitting");
    Ok(())
}
