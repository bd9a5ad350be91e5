mod catalog;
mod cli;
mod config;
mod handlers;
mod orchestrator;
mod piston;
mod printer;
mod state;
mod tui;

use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Mutex;

use anyhow::{Context, Result};
use cli::Command;
use config::{Config, Settings};
use is_terminal::IsTerminal;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Load config: --config overrides the default rc location
    let cfg = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let mut settings = Settings::from_config(&cfg)?;
    if let Some(base) = args.api_base.as_deref() {
        settings.api_base = base.trim_end_matches('/').to_string();
    }

    let command = args.command.clone().unwrap_or(Command::Edit {
        file: None,
        language: None,
        version: None,
    });

    // The editor owns the terminal, so it logs to a file
    let interactive = matches!(command, Command::Edit { .. });
    init_logging(&cfg, args.verbose, interactive);
    tracing::debug!(
        config = %cfg.config_path.display(),
        api = %settings.api_base,
        "configuration loaded"
    );

    match command {
        Command::Edit { file, language, version } => {
            let initial = file
                .map(|path| {
                    fs::read_to_string(&path)
                        .with_context(|| format!("failed to read '{}'", path.display()))
                })
                .transpose()?;
            if let Some(language) = language {
                settings.default_language = language;
            }
            if let Some(version) = version {
                settings.default_version = version;
            }
            tui::run_tui(&settings, initial).await
        }
        Command::Runtimes { md } => handlers::runtimes::run(&settings, md).await,
        Command::Run { file, language, version, stdin, no_color, args } => {
            let color = !no_color && io::stderr().is_terminal();
            let code = handlers::run::run(
                &settings,
                handlers::run::RunOptions {
                    file: file.as_deref(),
                    language: language.as_deref(),
                    version: version.as_deref(),
                    stdin,
                    args,
                    color,
                },
            )
            .await?;
            // Mirror the remote program's exit status
            match code {
                Some(code) if code != 0 => std::process::exit(code),
                _ => Ok(()),
            }
        }
    }
}

fn init_logging(cfg: &Config, verbose: bool, to_file: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if to_file {
        Level::INFO
    } else {
        Level::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var("CODEPAD_LOG")
        .from_env_lossy();

    if !to_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init();
        return;
    }

    let path = cfg.log_path();
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    // Without a writable log file the editor runs without logging
    if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
}
