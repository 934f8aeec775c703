mod diff;
mod state;
mod theme;
mod ui;

use anyhow::{Context, Result};
use carrot_core::{MemoryStore, PanelSide, PreferenceStore, Settings};
use carrot_host::{FsHost, JsonFileStore};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::{backend::CrosstermBackend, Terminal};
use state::PromptKind;
use std::{
    collections::HashSet,
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, Receiver},
        Mutex,
    },
    time::Duration,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Compare files and directories side by side.
#[derive(Debug, Parser)]
#[command(name = "carrot", version, about)]
struct Cli {
    /// File or directory opened on the left side
    left: Option<PathBuf>,
    /// File or directory opened on the right side
    right: Option<PathBuf>,
    /// Start with only differing entries shown in the trees
    #[arg(long)]
    only_different: bool,
    /// Write logs here instead of the default state directory
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref());

    let settings = Settings::load(open_preferences());
    let mut app = state::App::new(Box::new(FsHost::new()), settings);
    app.only_different = cli.only_different;
    for (side, path) in [(PanelSide::Left, &cli.left), (PanelSide::Right, &cli.right)] {
        if let Some(path) = path {
            let kind = if path.is_dir() {
                PromptKind::OpenDirectory
            } else {
                PromptKind::OpenFile
            };
            app.open_path(kind, side, path);
        }
    }

    let mut watcher = DirWatcher::new();
    let mut terminal = setup_terminal().context("failed to set up terminal")?;
    let result = run_app(&mut terminal, &mut app, &mut watcher);
    restore_terminal(&mut terminal).context("failed to restore terminal")?;

    if let Err(err) = result {
        eprintln!("carrot: {err}");
    }

    Ok(())
}

fn open_preferences() -> Box<dyn PreferenceStore> {
    match JsonFileStore::default_path() {
        Some(path) => {
            info!(path = %path.display(), "loading settings");
            Box::new(JsonFileStore::open(path))
        }
        None => {
            warn!("no config directory, settings will not be saved");
            Box::new(MemoryStore::new())
        }
    }
}

fn init_logging(log_file: Option<&Path>) {
    let level = std::env::var("CARROT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let path = log_file
        .map(Path::to_path_buf)
        .unwrap_or_else(default_log_path);

    match open_log_file(&path) {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        Err(_) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
}

fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("carrot")
        .join("carrot.log")
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut state::App,
    watcher: &mut DirWatcher,
) -> Result<()> {
    let input_poll = Duration::from_millis(100);

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(input_poll)? {
            match event::read()? {
                Event::Key(key) => {
                    if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                        app.handle_key(key);
                    }
                }
                Event::Mouse(mouse) => {
                    app.handle_mouse(mouse);
                }
                _ => {}
            }
        }

        if watcher.changed() {
            app.reload_active_tab();
        }
        watcher.sync(&app.watched_roots());

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

/// Watches the directories open in the active tab. Roots that could not be
/// watched are retried on the next sync and only warned about once.
struct DirWatcher {
    watcher: Option<RecommendedWatcher>,
    rx: Option<Receiver<()>>,
    watched: HashSet<PathBuf>,
    failed: HashSet<PathBuf>,
}

impl DirWatcher {
    fn new() -> Self {
        let (tx, rx) = mpsc::sync_channel(1);
        match RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| {
                if res.is_ok() {
                    let _ = tx.try_send(());
                }
            },
            Config::default(),
        ) {
            Ok(watcher) => Self {
                watcher: Some(watcher),
                rx: Some(rx),
                watched: HashSet::new(),
                failed: HashSet::new(),
            },
            Err(err) => {
                warn!("watcher_unavailable: {err}");
                Self {
                    watcher: None,
                    rx: None,
                    watched: HashSet::new(),
                    failed: HashSet::new(),
                }
            }
        }
    }

    fn changed(&self) -> bool {
        let Some(rx) = &self.rx else {
            return false;
        };
        let mut changed = false;
        while rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }

    fn sync(&mut self, roots: &[PathBuf]) {
        let Some(watcher) = self.watcher.as_mut() else {
            return;
        };
        let wanted: HashSet<PathBuf> = roots.iter().cloned().collect();
        for stale in self.watched.difference(&wanted) {
            let _ = watcher.unwatch(stale);
        }
        self.watched.retain(|path| wanted.contains(path));
        self.failed.retain(|path| wanted.contains(path));
        for root in wanted {
            if self.watched.contains(&root) {
                continue;
            }
            match watcher.watch(&root, RecursiveMode::Recursive) {
                Ok(()) => {
                    self.failed.remove(&root);
                    self.watched.insert(root);
                }
                Err(err) => {
                    if self.failed.insert(root.clone()) {
                        warn!("watch_failed: path={} error={err}", root.display());
                    }
                }
            }
        }
    }
}
