// memsim: stack and heap simulator with a terminal visualizer

use std::fs::{self, File};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use memsim::config::SimConfig;
use memsim::interpreter::constants::{
    DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_FRAMES, DEFAULT_MAX_HEAP_ENTRIES, DEFAULT_ROOT_FRAME,
};
use memsim::interpreter::engine::Executor;
use memsim::script::load_commands;
use memsim::ui::App;

#[derive(Parser, Debug)]
#[command(name = "memsim", version, about = "Stack and heap memory simulator")]
struct Cli {
    /// Script with one command per line, run before the session starts
    script: Option<PathBuf>,

    /// Run without the TUI and print each outcome and the final state
    #[arg(long)]
    plain: bool,

    /// Name of the frame that exists from the start
    #[arg(long, default_value = DEFAULT_ROOT_FRAME)]
    root_frame: String,

    /// Maximum number of frames on the stack
    #[arg(long, default_value_t = DEFAULT_MAX_FRAMES)]
    max_frames: usize,

    /// Maximum number of live heap entries
    #[arg(long, default_value_t = DEFAULT_MAX_HEAP_ENTRIES)]
    max_heap: usize,

    /// Memory budget for the snapshot history, in bytes
    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    history_limit: usize,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long)]
    log: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> SimConfig {
        SimConfig::default()
            .with_root_frame(self.root_frame.clone())
            .with_max_frames(self.max_frames)
            .with_max_heap_entries(self.max_heap)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let commands = match &cli.script {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read script '{}'", path.display()))?;
            load_commands(&text)
        }
        None => Vec::new(),
    };

    let mut executor = Executor::new(&cli.config());

    if cli.plain {
        let all_ok = run_plain(&mut executor, &cli, commands)?;
        print!("{}", executor.snapshot());
        if !all_ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    for command in &commands {
        executor.run(command);
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(executor, cli.history_limit);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("terminal UI failed")
}

/// Run script commands, or stdin lines when no script was given.
/// Returns whether every command succeeded.
fn run_plain(executor: &mut Executor, cli: &Cli, commands: Vec<String>) -> Result<bool> {
    let commands = if cli.script.is_some() {
        commands
    } else {
        let mut text = String::new();
        for line in io::stdin().lock().lines() {
            text.push_str(&line.context("failed to read stdin")?);
            text.push('\n');
        }
        load_commands(&text)
    };

    let mut all_ok = true;
    for command in &commands {
        let outcome = executor.run(command);
        let status = if outcome.ok { "ok" } else { "error" };
        println!("{}: {}", status, outcome.message);
        all_ok &= outcome.ok;
    }
    Ok(all_ok)
}

/// Logs go to `--log` when given, else to stderr in plain mode; the TUI owns
/// the terminal, so without a log file nothing is installed there.
fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &cli.log {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if cli.plain => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}
