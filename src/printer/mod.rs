//! Printers for the non-interactive commands: plain/coloured text and markdown (termimad).

use owo_colors::OwoColorize;
use termimad::MadSkin;

use crate::catalog::Catalog;
use crate::orchestrator::ExecutionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Dimmed,
}

pub struct TextPrinter {
    pub color: Option<Color>,
}

impl TextPrinter {
    pub fn paint(&self, text: &str) -> String {
        match self.color {
            Some(Color::Red) => text.red().to_string(),
            Some(Color::Dimmed) => text.dimmed().to_string(),
            None => text.to_string(),
        }
    }

    pub fn print(&self, text: &str) {
        print!("{}", self.paint(text));
    }

    pub fn eprint(&self, text: &str) {
        eprint!("{}", self.paint(text));
    }
}

pub struct MarkdownPrinter {
    pub skin: MadSkin,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self { skin: MadSkin::default() }
    }
}

impl MarkdownPrinter {
    pub fn print(&self, text: &str) { self.skin.print_text(text); println!(); }
}

/// Markdown table of the catalog, one row per selectable id.
pub fn runtimes_markdown(catalog: &Catalog) -> String {
    let mut md = String::from("|id|language|version|aliases|\n|-:|:-|:-|:-|\n");
    for o in catalog.options() {
        md.push_str(&format!(
            "|{}|{}|{}|{}|\n",
            o.id,
            o.language,
            o.version,
            o.aliases.join(", ")
        ));
    }
    md
}

pub fn runtimes_plain(catalog: &Catalog) -> String {
    let width = catalog
        .options()
        .iter()
        .map(|o| o.language.len())
        .max()
        .unwrap_or(0);
    catalog
        .options()
        .iter()
        .map(|o| format!("{:>3}  {:<width$}  {}\n", o.id, o.language, o.version, width = width))
        .collect()
}

pub fn print_runtimes(catalog: &Catalog, markdown: bool) {
    if markdown {
        MarkdownPrinter::default().print(&runtimes_markdown(catalog));
    } else {
        print!("{}", runtimes_plain(catalog));
    }
}

/// Trailing status line for a finished run, e.g. `exit code 1` or `killed by SIGKILL`.
pub fn exit_summary(result: &ExecutionResult) -> String {
    match (&result.signal, result.code) {
        (Some(sig), _) => format!("killed by {}", sig),
        (None, Some(code)) => format!("exit code {}", code),
        (None, None) => "finished".to_string(),
    }
}

/// stdout to stdout, stderr in red to stderr, then a dimmed status line.
pub fn print_run_result(result: &ExecutionResult, color: bool) {
    let plain = TextPrinter { color: None };
    plain.print(&result.stdout);
    if !result.stdout.is_empty() && !result.stdout.ends_with('\n') {
        println!();
    }

    let err = TextPrinter { color: color.then_some(Color::Red) };
    err.eprint(&result.stderr);
    if !result.stderr.is_empty() && !result.stderr.ends_with('\n') {
        eprintln!();
    }

    let status = TextPrinter { color: color.then_some(Color::Dimmed) };
    status.eprint(&format!("[{}]\n", exit_summary(result)));
}
