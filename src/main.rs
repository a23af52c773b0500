mod config;
mod grid;
mod logging;
mod tui;

use clap::{Parser, Subcommand, ValueHint, Command, CommandFactory};
use clap_complete::{generate, Generator, Shell};
use config::{Config, ConfigError};
use std::io;
use std::path::PathBuf;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use grid::{palette::ColorAllocator, session::Session};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tui::{app::App, ui};

#[derive(Parser)]
#[command(name = "boxgrid")]
#[command(about = "A terminal grid of colored boxes to rearrange by drag and drop, with undo and redo")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(long, help = "Number of columns (overrides the config file)")]
    columns: Option<usize>,

    #[arg(long, help = "Number of rows to start with (overrides the config file)")]
    rows: Option<usize>,

    #[arg(long, help = "Seed for color assignment, for reproducible sessions")]
    seed: Option<u64>,

    #[arg(long, help = "Write logs to this file", value_hint = ValueHint::FilePath)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Configuration management")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    #[command(about = "Set a configuration value")]
    Set {
        #[arg(help = "Configuration key (columns, initial_rows, first_box_id, id_step, seed, log_file)")]
        key: String,
        #[arg(help = "Configuration value (empty to clear seed or log_file)")]
        value: String,
    },
    #[command(about = "Get a configuration value")]
    Get {
        #[arg(help = "Configuration key")]
        key: String,
    },
    #[command(about = "List all configuration values")]
    List,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { action }) => {
            if let Err(e) = handle_config_command(action) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
        }
        None => {
            if let Err(e) = run_main_app(cli.columns, cli.rows, cli.seed, cli.log_file) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn handle_config_command(action: ConfigAction) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("Configuration saved successfully.");
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for key in config::KEYS {
                println!("{} = {}", key, config.get(key)?);
            }
        }
    }
    Ok(())
}

fn run_main_app(
    columns: Option<usize>,
    rows: Option<usize>,
    seed: Option<u64>,
    log_file: Option<PathBuf>,
) -> Result<()> {
    let mut config = Config::load()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    if let Some(columns) = columns {
        config.columns = columns;
    }
    if let Some(rows) = rows {
        config.initial_rows = rows;
    }
    if seed.is_some() {
        config.seed = seed;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let log_path = log_file
        .or_else(|| config.log_file.as_ref().map(PathBuf::from))
        .or_else(logging::default_log_path);
    if let Some(path) = log_path {
        logging::init(&path)?;
    }

    let colors = match config.seed {
        Some(seed) => ColorAllocator::with_seed(seed),
        None => ColorAllocator::new(),
    };
    let session = Session::new(config.grid_settings(), colors);
    let mut app = App::new(session);

    run_tui(&mut app)?;
    tracing::info!("session ended");

    Ok(())
}

fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key_event(key)?,
            Event::Mouse(mouse) => app.handle_mouse_event(mouse)?,
            _ => {}
        }
        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn print_completions<G: Generator>(generator: G, cmd: &mut Command) {
    generate(generator, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
