//! Editor UI state and the transitions that mutate it.
//!
//! Everything the panes show lives in [`UiState`], and the only way to change
//! it is [`UiState::apply`]. Catalog fetches and execution dispatches run off
//! the UI task and come back as [`Action`]s.

use crate::catalog::{Catalog, CatalogStatus};
use crate::config::{FailureChannel, ResultPolicy, Settings};
use crate::orchestrator::ExecutionResult;

/// Monotonic tag handed out per execution dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct DispatchId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub language: String,
    pub version: String,
}

#[derive(Debug, Clone)]
pub enum Action {
    CatalogRequested,
    CatalogLoaded(Catalog),
    CatalogFailed(String),
    /// Selection by catalog id; ids that don't resolve are ignored.
    LanguageSelected(usize),
    ExecuteStarted,
    ExecuteSucceeded {
        dispatch: DispatchId,
        result: ExecutionResult,
    },
    ExecuteFailed {
        dispatch: DispatchId,
        message: String,
    },
}

/// Exit details of the last completed run, shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRun {
    pub code: Option<i32>,
    pub signal: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub catalog: Catalog,
    pub catalog_status: CatalogStatus,
    pub selection: Selection,
    pub output: String,
    pub error: String,
    pub is_loading: bool,
    pub last_run: Option<LastRun>,
    latest_dispatch: DispatchId,
    failure_channel: FailureChannel,
    result_policy: ResultPolicy,
}

impl UiState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            catalog: Catalog::default(),
            catalog_status: CatalogStatus::Loading,
            selection: Selection {
                language: settings.default_language.clone(),
                version: settings.default_version.clone(),
            },
            output: String::new(),
            error: String::new(),
            is_loading: false,
            last_run: None,
            latest_dispatch: DispatchId::default(),
            failure_channel: settings.failure_channel,
            result_policy: settings.result_policy,
        }
    }

    /// Id of the most recent `ExecuteStarted`.
    pub fn latest_dispatch(&self) -> DispatchId {
        self.latest_dispatch
    }

    /// Record a new dispatch and return its id.
    pub fn begin_execute(&mut self) -> DispatchId {
        self.apply(Action::ExecuteStarted);
        self.latest_dispatch
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::CatalogRequested => {
                self.catalog_status = CatalogStatus::Loading;
            }
            Action::CatalogLoaded(catalog) => {
                self.catalog = catalog;
                self.catalog_status = CatalogStatus::Loaded;
            }
            Action::CatalogFailed(reason) => {
                self.catalog_status = CatalogStatus::Unavailable(reason);
            }
            Action::LanguageSelected(id) => {
                if let Some(option) = self.catalog.select(id) {
                    tracing::debug!(language = %option.language, version = %option.version, "language selected");
                    self.selection = Selection {
                        language: option.language.clone(),
                        version: option.version.clone(),
                    };
                }
            }
            Action::ExecuteStarted => {
                self.latest_dispatch = DispatchId(self.latest_dispatch.0 + 1);
                self.is_loading = true;
            }
            Action::ExecuteSucceeded { dispatch, result } => {
                if !self.accepts(dispatch) {
                    return;
                }
                self.is_loading = false;
                self.error = result.stderr;
                self.output = result.stdout;
                self.last_run = Some(LastRun {
                    code: result.code,
                    signal: result.signal,
                });
            }
            Action::ExecuteFailed { dispatch, message } => {
                if !self.accepts(dispatch) {
                    return;
                }
                self.is_loading = false;
                self.last_run = None;
                match self.failure_channel {
                    FailureChannel::Output => self.output = message,
                    FailureChannel::Error => self.error = message,
                }
            }
        }
    }

    fn accepts(&self, dispatch: DispatchId) -> bool {
        match self.result_policy {
            ResultPolicy::LastArrival => true,
            ResultPolicy::LastDispatch => {
                let current = dispatch >= self.latest_dispatch;
                if !current {
                    tracing::debug!(
                        dispatch = dispatch.0,
                        latest = self.latest_dispatch.0,
                        "dropping superseded execution result"
                    );
                }
                current
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piston::Runtime;

    fn catalog(entries: &[(&str, &str)]) -> Catalog {
        Catalog::from_runtimes(
            entries
                .iter()
                .map(|(l, v)| Runtime {
                    language: l.to_string(),
                    version: v.to_string(),
                    aliases: Vec::new(),
                })
                .collect(),
        )
    }

    fn result(stdout: &str, stderr: &str) -> ExecutionResult {
        ExecutionResult {
            stdout: stdout.into(),
            stderr: stderr.into(),
            code: Some(0),
            signal: None,
        }
    }

    fn state() -> UiState {
        UiState::new(&Settings::default())
    }

    #[test]
    fn starts_with_default_selection() {
        let s = state();
        assert_eq!(s.selection.language, "javascript");
        assert_eq!(s.selection.version, "20.11.1");
        assert!(!s.is_loading);
        assert_eq!(s.catalog_status, CatalogStatus::Loading);
    }

    #[test]
    fn selecting_a_catalog_entry_updates_both_fields() {
        let mut s = state();
        s.apply(Action::CatalogLoaded(catalog(&[("python", "3.10.0"), ("rust", "1.68.2")])));
        s.apply(Action::LanguageSelected(1));
        assert_eq!(
            s.selection,
            Selection { language: "rust".into(), version: "1.68.2".into() }
        );
    }

    #[test]
    fn unresolved_selection_leaves_state_unchanged() {
        let mut s = state();
        s.apply(Action::LanguageSelected(0));
        assert_eq!(s.selection.language, "javascript");

        s.apply(Action::CatalogLoaded(catalog(&[("python", "3.10.0")])));
        s.apply(Action::LanguageSelected(0));
        s.apply(Action::LanguageSelected(7));
        assert_eq!(s.selection.language, "python");
        assert_eq!(s.selection.version, "3.10.0");
    }

    #[test]
    fn reloaded_catalog_replaces_previous_entries() {
        let mut s = state();
        s.apply(Action::CatalogLoaded(catalog(&[("python", "3.10.0"), ("go", "1.16.2")])));
        s.apply(Action::CatalogLoaded(catalog(&[("bash", "5.2.0")])));
        assert_eq!(s.catalog.len(), 1);
        assert_eq!(s.catalog.select(0).unwrap().language, "bash");
    }

    #[test]
    fn catalog_failure_keeps_prior_entries() {
        let mut s = state();
        s.apply(Action::CatalogLoaded(catalog(&[("python", "3.10.0")])));
        s.apply(Action::CatalogRequested);
        s.apply(Action::CatalogFailed("connection refused".into()));
        assert_eq!(s.catalog.len(), 1);
        assert_eq!(s.catalog_status, CatalogStatus::Unavailable("connection refused".into()));
    }

    #[test]
    fn loading_flag_brackets_each_dispatch() {
        let mut s = state();
        let id = s.begin_execute();
        assert!(s.is_loading);
        s.apply(Action::ExecuteSucceeded { dispatch: id, result: result("hi\n", "") });
        assert!(!s.is_loading);
        assert_eq!(s.output, "hi\n");
        assert_eq!(s.error, "");

        let id = s.begin_execute();
        assert!(s.is_loading);
        s.apply(Action::ExecuteFailed { dispatch: id, message: "Error: boom".into() });
        assert!(!s.is_loading);
    }

    #[test]
    fn stderr_only_response() {
        let mut s = state();
        let id = s.begin_execute();
        s.apply(Action::ExecuteSucceeded { dispatch: id, result: result("", "SyntaxError") });
        assert_eq!(s.output, "");
        assert_eq!(s.error, "SyntaxError");
    }

    #[test]
    fn failure_goes_to_output_and_keeps_error() {
        let mut s = state();
        let id = s.begin_execute();
        s.apply(Action::ExecuteSucceeded { dispatch: id, result: result("", "ReferenceError") });

        let id = s.begin_execute();
        s.apply(Action::ExecuteFailed { dispatch: id, message: "Error: connection refused".into() });
        assert_eq!(s.output, "Error: connection refused");
        assert_eq!(s.error, "ReferenceError");
        assert!(s.last_run.is_none());
    }

    #[test]
    fn failure_channel_can_route_to_error_pane() {
        let settings = Settings { failure_channel: FailureChannel::Error, ..Settings::default() };
        let mut s = UiState::new(&settings);
        s.output = "previous".into();
        let id = s.begin_execute();
        s.apply(Action::ExecuteFailed { dispatch: id, message: "Error: timeout".into() });
        assert_eq!(s.error, "Error: timeout");
        assert_eq!(s.output, "previous");
    }

    #[test]
    fn second_success_overwrites_first() {
        let mut s = state();
        let id = s.begin_execute();
        s.apply(Action::ExecuteSucceeded { dispatch: id, result: result("one\n", "warn") });
        let id = s.begin_execute();
        s.apply(Action::ExecuteSucceeded { dispatch: id, result: result("two\n", "") });
        assert_eq!(s.output, "two\n");
        assert_eq!(s.error, "");
    }

    #[test]
    fn last_dispatch_policy_drops_stale_results() {
        let mut s = state();
        let first = s.begin_execute();
        let second = s.begin_execute();
        s.apply(Action::ExecuteSucceeded { dispatch: second, result: result("second", "") });
        s.apply(Action::ExecuteSucceeded { dispatch: first, result: result("first", "") });
        assert_eq!(s.output, "second");
        assert!(!s.is_loading);
    }

    #[test]
    fn stale_result_does_not_clear_loading_of_newer_dispatch() {
        let mut s = state();
        let first = s.begin_execute();
        let _second = s.begin_execute();
        s.apply(Action::ExecuteFailed { dispatch: first, message: "Error: late".into() });
        assert!(s.is_loading);
        assert_eq!(s.output, "");
    }

    #[test]
    fn last_arrival_policy_keeps_whatever_lands_last() {
        let settings = Settings { result_policy: ResultPolicy::LastArrival, ..Settings::default() };
        let mut s = UiState::new(&settings);
        let first = s.begin_execute();
        let second = s.begin_execute();
        s.apply(Action::ExecuteSucceeded { dispatch: second, result: result("second", "") });
        s.apply(Action::ExecuteSucceeded { dispatch: first, result: result("first", "") });
        assert_eq!(s.output, "first");
    }

    #[test]
    fn exit_details_are_recorded() {
        let mut s = state();
        let id = s.begin_execute();
        s.apply(Action::ExecuteSucceeded {
            dispatch: id,
            result: ExecutionResult {
                stdout: String::new(),
                stderr: String::new(),
                code: None,
                signal: Some("SIGKILL".into()),
            },
        });
        assert_eq!(
            s.last_run,
            Some(LastRun { code: None, signal: Some("SIGKILL".into()) })
        );
    }
}
