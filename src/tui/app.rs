//! TUI application state management.

use ratatui::widgets::ListState;
use tui_textarea::TextArea;

use crate::catalog::CatalogStatus;
use crate::config::Settings;
use crate::orchestrator::CodeBuffer;
use crate::state::{Action, UiState};

pub const EDITOR_PLACEHOLDER_TEXT: &str = "// let's write some broken code 😈";
pub const CONSOLE_PLACEHOLDER: &str = "Nothing to console try,\nconsole.log(\"Hello world!\")";
pub const ERROR_PLACEHOLDER: &str =
    "Ha ha! No errors here.\nLet’s crash with some spectacularly faulty code!";

impl CodeBuffer for TextArea<'_> {
    fn buffer(&self) -> String {
        self.lines().join("\n")
    }
}

/// Which widget receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    /// Language picker popup is open
    Picker,
}

/// Application state for the TUI
pub struct App<'a> {
    /// Selection, output panes, loading flag and catalog
    pub state: UiState,
    /// Code editor widget
    pub editor: TextArea<'a>,
    /// Highlighted row in the language picker
    pub picker: ListState,
    pub focus: Focus,
    /// Whether to show help
    pub show_help: bool,
    /// Separator used to rebuild the buffer from the editor lines
    line_ending: &'static str,
}

impl CodeBuffer for App<'_> {
    fn buffer(&self) -> String {
        self.editor.lines().join(self.line_ending)
    }
}

/// Split source text into editor lines and the separator that joins them back.
///
/// Uniform CRLF text is shown without the `\r`; any other `\r` stays in its line.
fn split_lines(text: &str) -> (Vec<String>, &'static str) {
    let crlf = text.contains("\r\n") && !text.replace("\r\n", "").contains('\n');
    if crlf {
        (text.split("\r\n").map(str::to_string).collect(), "\r\n")
    } else {
        (text.split('\n').map(str::to_string).collect(), "\n")
    }
}

impl<'a> App<'a> {
    /// Create a new TUI application instance, optionally pre-loaded with source text
    pub fn new(settings: &Settings, initial: Option<String>) -> Self {
        let text = initial.unwrap_or_else(|| EDITOR_PLACEHOLDER_TEXT.to_string());
        let (lines, line_ending) = split_lines(&text);
        let mut editor = TextArea::new(lines);
        editor.set_max_histories(200);

        Self {
            state: UiState::new(settings),
            editor,
            picker: ListState::default(),
            focus: Focus::Editor,
            show_help: false,
            line_ending,
        }
    }

    pub fn apply(&mut self, action: Action) {
        self.state.apply(action);
        // keep the highlighted row inside a replaced catalog
        if let Some(i) = self.picker.selected() {
            if i >= self.state.catalog.len() {
                self.picker.select(if self.state.catalog.is_empty() { None } else { Some(0) });
            }
        }
    }

    /// Execute is disabled while a request is in flight
    pub fn can_execute(&self) -> bool {
        !self.state.is_loading
    }

    pub fn execute_label(&self) -> &'static str {
        if self.state.is_loading {
            "Executing..."
        } else {
            "Execute"
        }
    }

    pub fn console_text(&self) -> &str {
        if self.state.output.is_empty() {
            CONSOLE_PLACEHOLDER
        } else {
            &self.state.output
        }
    }

    pub fn error_text(&self) -> &str {
        if self.state.error.is_empty() {
            ERROR_PLACEHOLDER
        } else {
            &self.state.error
        }
    }

    /// Toggle help display
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn open_picker(&mut self) {
        let current = self
            .state
            .catalog
            .position_of(&self.state.selection.language, &self.state.selection.version);
        let row = current.or(if self.state.catalog.is_empty() { None } else { Some(0) });
        self.picker.select(row);
        self.focus = Focus::Picker;
    }

    pub fn close_picker(&mut self) {
        self.focus = Focus::Editor;
    }

    pub fn picker_next(&mut self) {
        let len = self.state.catalog.len();
        if len == 0 {
            return;
        }
        let next = match self.picker.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => len - 1,
            None => 0,
        };
        self.picker.select(Some(next));
    }

    pub fn picker_prev(&mut self) {
        if self.state.catalog.is_empty() {
            return;
        }
        let prev = self.picker.selected().map(|i| i.saturating_sub(1)).unwrap_or(0);
        self.picker.select(Some(prev));
    }

    /// Apply the highlighted picker row as the new selection and close the picker
    pub fn confirm_picker(&mut self) {
        if let Some(id) = self.picker.selected() {
            self.apply(Action::LanguageSelected(id));
        }
        self.close_picker();
    }

    pub fn status_line(&self) -> String {
        let catalog = match &self.state.catalog_status {
            CatalogStatus::Loading => "runtimes: loading".to_string(),
            CatalogStatus::Loaded => format!("runtimes: {}", self.state.catalog.len()),
            CatalogStatus::Unavailable(_) => "runtimes: unavailable (F3 retry)".to_string(),
        };
        let last = match &self.state.last_run {
            Some(run) => match (&run.signal, run.code) {
                (Some(sig), _) => format!(" | killed by {}", sig),
                (None, Some(code)) => format!(" | exit {}", code),
                (None, None) => String::new(),
            },
            None => String::new(),
        };
        format!(
            "{} {} | {}{} | ctrl+e execute, ctrl+l language, F1 help",
            self.state.selection.language, self.state.selection.version, catalog, last
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::orchestrator::ExecutionResult;
    use crate::piston::Runtime;

    fn app() -> App<'static> {
        App::new(&Settings::default(), None)
    }

    fn catalog(n: usize) -> Catalog {
        Catalog::from_runtimes(
            (0..n)
                .map(|i| Runtime {
                    language: format!("lang{i}"),
                    version: format!("{i}.0.0"),
                    aliases: Vec::new(),
                })
                .collect(),
        )
    }

    #[test]
    fn editor_starts_with_placeholder_code() {
        let app = app();
        assert_eq!(app.editor.buffer(), EDITOR_PLACEHOLDER_TEXT);
    }

    #[test]
    fn editor_buffer_preserves_lines() {
        let app = App::new(&Settings::default(), Some("a\n  b\n\nc".into()));
        assert_eq!(app.editor.buffer(), "a\n  b\n\nc");
    }

    #[test]
    fn loaded_file_keeps_trailing_newline() {
        let app = App::new(&Settings::default(), Some("print(1)\n".into()));
        assert_eq!(app.buffer(), "print(1)\n");
        assert_eq!(app.editor.lines(), ["print(1)", ""]);
    }

    #[test]
    fn crlf_file_round_trips() {
        let app = App::new(&Settings::default(), Some("a\r\nb\r\n".into()));
        assert_eq!(app.editor.lines(), ["a", "b", ""]);
        assert_eq!(app.buffer(), "a\r\nb\r\n");

        let mixed = App::new(&Settings::default(), Some("a\r\nb\nc".into()));
        assert_eq!(mixed.buffer(), "a\r\nb\nc");
    }

    #[test]
    fn panes_show_placeholders_when_empty() {
        let mut app = app();
        assert_eq!(app.console_text(), CONSOLE_PLACEHOLDER);
        assert_eq!(app.error_text(), ERROR_PLACEHOLDER);

        let id = app.state.begin_execute();
        app.apply(Action::ExecuteSucceeded {
            dispatch: id,
            result: ExecutionResult { stdout: "42\n".into(), ..Default::default() },
        });
        assert_eq!(app.console_text(), "42\n");
        assert_eq!(app.error_text(), ERROR_PLACEHOLDER);
    }

    #[test]
    fn execute_label_follows_loading() {
        let mut app = app();
        assert!(app.can_execute());
        assert_eq!(app.execute_label(), "Execute");
        app.state.begin_execute();
        assert!(!app.can_execute());
        assert_eq!(app.execute_label(), "Executing...");
    }

    #[test]
    fn picker_walks_and_confirms() {
        let mut app = app();
        app.apply(Action::CatalogLoaded(catalog(3)));
        app.open_picker();
        assert_eq!(app.focus, Focus::Picker);
        assert_eq!(app.picker.selected(), Some(0));

        app.picker_next();
        app.picker_next();
        app.picker_next();
        assert_eq!(app.picker.selected(), Some(2));
        app.picker_prev();
        app.confirm_picker();

        assert_eq!(app.focus, Focus::Editor);
        assert_eq!(app.state.selection.language, "lang1");
        assert_eq!(app.state.selection.version, "1.0.0");
    }

    #[test]
    fn picker_on_empty_catalog_selects_nothing() {
        let mut app = app();
        app.open_picker();
        app.picker_next();
        app.confirm_picker();
        assert_eq!(app.picker.selected(), None);
        assert_eq!(app.state.selection.language, "javascript");
    }

    #[test]
    fn picker_reopens_on_current_selection() {
        let mut app = app();
        app.apply(Action::CatalogLoaded(catalog(4)));
        app.apply(Action::LanguageSelected(2));
        app.open_picker();
        assert_eq!(app.picker.selected(), Some(2));
    }

    #[test]
    fn shrinking_catalog_clamps_highlight() {
        let mut app = app();
        app.apply(Action::CatalogLoaded(catalog(5)));
        app.open_picker();
        app.picker.select(Some(4));
        app.apply(Action::CatalogLoaded(catalog(2)));
        assert_eq!(app.picker.selected(), Some(0));
    }

    #[test]
    fn status_line_mentions_selection_and_catalog() {
        let mut app = app();
        assert!(app.status_line().starts_with("javascript 20.11.1 | runtimes: loading"));
        app.apply(Action::CatalogFailed("boom".into()));
        assert!(app.status_line().contains("unavailable"));
    }
}
