//! Secret Valentine TUI Entry Point
//!
//! Launches the terminal surface for the Secret Valentine story.
//!
//! Usage:
//!   valentine-tui [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>         Configuration file
//!   --mute                      Play no sounds
//!   --player <COMMAND>          Sound player command line
//!   --sounds-dir <DIR>          Directory holding the sound clips
//!   --typing-speed-ms <MS>      Milliseconds per typed character
//!   --log-file <PATH>           Write logs here (the screen belongs to the story)

use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use valentine_conductor::{default_config_path, load_config_from_path, ConfigOverrides, StoryConfig};
use valentine_tui::conductor_client::ConductorClient;
use valentine_tui::App;

/// Secret Valentine - a little terminal love letter
#[derive(Parser, Debug)]
#[command(name = "valentine-tui")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "VALENTINE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Play no sounds
    #[arg(long)]
    mute: bool,

    /// Sound player command line ({path}, {offset}, {duration}, {volume} are filled in)
    #[arg(long, value_name = "COMMAND")]
    player: Option<String>,

    /// Directory holding the sound clips
    #[arg(long, value_name = "DIR")]
    sounds_dir: Option<PathBuf>,

    /// Milliseconds per typed character
    #[arg(long, value_name = "MS")]
    typing_speed_ms: Option<u64>,

    /// Log file (logs go nowhere without it unless RUST_LOG is set)
    #[arg(long, env = "VALENTINE_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "VALENTINE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    /// Command-line flags as config overrides
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if self.mute {
            overrides = overrides.with_muted(true);
        }
        if let Some(ref player) = self.player {
            overrides =
                overrides.with_player(player.split_whitespace().map(String::from).collect());
        }
        if let Some(ref dir) = self.sounds_dir {
            overrides = overrides.with_sounds_dir(dir.clone());
        }
        if let Some(ms) = self.typing_speed_ms {
            overrides = overrides.with_typing_speed_ms(ms);
        }
        overrides
    }
}

/// Initialize logging
///
/// The alternate screen owns stdout, so logs only go to a file, or to stderr
/// when RUST_LOG asks for them explicitly.
fn init_logging(log_file: Option<&Path>, level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "valentine_tui={level},valentine_conductor={level}"
        ))
    });

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .init();
    } else if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }

    Ok(())
}

fn load_story_config(args: &Args) -> anyhow::Result<StoryConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path)?;
    args.overrides().apply(&mut config);
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), &args.log_level)?;

    let config = load_story_config(&args)?;
    info!(source = %config.source(), muted = config.audio.muted, "Configuration loaded");

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("❌ Error: valentine-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  • SSH without -t flag");
        eprintln!("  • Piped stdin/stdout");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = run_app(&mut terminal, config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    match result {
        Ok(Some(farewell)) => {
            println!("\n\x1b[35m{farewell}\x1b[0m\n");
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => Err(e),
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: StoryConfig,
) -> anyhow::Result<Option<&'static str>> {
    let client = ConductorClient::new(config);
    let mut app = App::for_terminal(client)?;
    app.run(terminal).await?;
    Ok(app.farewell())
}
