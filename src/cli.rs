use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "codepad", about = "Terminal code editor backed by a remote code-execution API", version)]
pub struct Cli {
    /// Path to the rc file (default: <config dir>/codepad/.codepadrc).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the execution service, e.g. http://localhost:2000/api/v2.
    #[arg(long = "api-base", global = true)]
    pub api_base: Option<String>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open the editor (default when no command is given).
    Edit {
        /// Source file to load into the editor.
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Initially selected language.
        #[arg(short, long)]
        language: Option<String>,

        /// Initially selected version.
        #[arg(long = "lang-version")]
        version: Option<String>,
    },

    /// List the runtimes the execution service supports.
    Runtimes {
        /// Render the listing as a markdown table.
        #[arg(long)]
        md: bool,
    },

    /// Execute a source file (or code piped on stdin) once and print its output.
    Run {
        /// Source file; reads stdin when omitted.
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Language name or alias.
        #[arg(short, long)]
        language: Option<String>,

        /// Runtime version; resolved from the catalog when only --language is given.
        #[arg(long = "lang-version")]
        version: Option<String>,

        /// Text passed to the program's standard input.
        #[arg(long)]
        stdin: Option<String>,

        /// Disable coloured stderr.
        #[arg(long = "no-color")]
        no_color: bool,

        /// Arguments passed to the program.
        #[arg(last = true)]
        args: Vec<String>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
