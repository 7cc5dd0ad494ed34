//! Command execution against a workflow session.

use crate::command::{Command, HELP, ParseCommandError};
use crate::render;
use deal_desk_workflow::{Reconciled, RunStepOutcome, WorkflowBackend, WorkflowSession};
use std::fmt::Write;
use tracing::debug;

/// Result of handling one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text to print; may be empty.
    Output(String),
    /// The user asked to exit.
    Quit,
}

/// Line-oriented front end over a [`WorkflowSession`].
pub struct Console<B> {
    session: WorkflowSession<B>,
}

impl<B: WorkflowBackend> Console<B> {
    #[must_use]
    pub fn new(session: WorkflowSession<B>) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &WorkflowSession<B> {
        &self.session
    }

    /// Parses and executes one input line.
    pub async fn handle_line(&self, line: &str) -> Reply {
        match line.parse::<Command>() {
            Ok(command) => self.execute(command).await,
            Err(ParseCommandError::Empty) => Reply::Output(String::new()),
            Err(e) => Reply::Output(format!("error: {e}")),
        }
    }

    /// Executes a command and appends the surfaced error, if any.
    ///
    /// The error slot is cleared once printed.
    pub async fn execute(&self, command: Command) -> Reply {
        debug!(command = command.name(), "executing command");
        let mut out = match command {
            Command::Quit => return Reply::Quit,
            Command::Help => HELP.to_string(),
            Command::List => self.list(),
            Command::Refresh => match self.session.load_runs().await {
                Ok(count) => format!("loaded {count} investigation(s)\n{}", self.list()),
                Err(_) => String::new(),
            },
            Command::New { label, address } => {
                match self.session.create_run(&label, address.as_deref()).await {
                    Ok(run) => format!("created {} ({})", run.id, run.label),
                    Err(_) => String::new(),
                }
            }
            Command::Select(run_id) => {
                if self.session.runs().iter().any(|r| r.id == run_id) {
                    self.session.select(run_id.clone());
                    format!("selected {run_id}")
                } else {
                    format!("no investigation with id {run_id}")
                }
            }
            Command::Show => match self.session.selected_run() {
                Some(run) => render::run_detail(&run, self.session.running_step()),
                None => "no investigation selected".to_string(),
            },
            Command::Edit {
                step_id,
                field,
                value,
            } => match self.session.edit_field(step_id, &field, value) {
                Ok(()) => format!("{step_id}.{field} updated (unsaved)"),
                Err(_) => String::new(),
            },
            Command::Save(step_id) => match self.session.save_step(step_id).await {
                Ok(Reconciled::Applied) => format!("saved {step_id}"),
                Ok(Reconciled::Dropped) => {
                    format!("saved {step_id}, but the investigation is no longer listed")
                }
                Err(_) => String::new(),
            },
            Command::Run(step_id) => match self.session.run_step(step_id).await {
                Ok(RunStepOutcome::Applied) => format!(
                    "ran {step_id}\n{}",
                    render::step_panel(
                        step_id.definition(),
                        &self.session.step_data(step_id),
                        false
                    )
                ),
                Ok(RunStepOutcome::Dropped) => {
                    format!("ran {step_id}, but the investigation is no longer listed")
                }
                Ok(RunStepOutcome::Busy { running }) => {
                    format!("{running} automation is already running for this investigation")
                }
                Err(_) => String::new(),
            },
            Command::Reload => match self.session.selected_id() {
                Some(run_id) => match self.session.refresh_run(&run_id).await {
                    Ok(Reconciled::Applied) => format!("reloaded {run_id}"),
                    Ok(Reconciled::Dropped) => format!("{run_id} is no longer listed"),
                    Err(_) => String::new(),
                },
                None => "no investigation selected".to_string(),
            },
            Command::Credentials {
                site,
                username,
                password,
            } => match self
                .session
                .save_credentials(&site, &username, &password)
                .await
            {
                Ok(()) => format!("saved credentials for {site}"),
                Err(_) => String::new(),
            },
        };

        if let Some(message) = self.session.last_error() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            let _ = write!(out, "error: {message}");
            self.session.clear_error();
        }
        Reply::Output(out.trim_end().to_string())
    }

    fn list(&self) -> String {
        render::run_list(&self.session.runs(), self.session.selected_id().as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use deal_desk_core::RunId;
    use deal_desk_workflow::{
        BackendError, CreateRunRequest, SaveStepRequest, SiteCredential, StepId, WorkflowRun,
    };
    use rootcause::Report;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        runs: Mutex<Vec<WorkflowRun>>,
        fail_saves: bool,
    }

    fn run(id: &str, label: &str) -> WorkflowRun {
        serde_json::from_value(json!({
            "id": id,
            "label": label,
            "address": null,
            "created_at": "2025-01-01T00:00:00",
            "updated_at": "2025-01-01T00:00:00",
            "status": "new",
            "steps": []
        }))
        .expect("valid run")
    }

    impl FakeBackend {
        fn with_runs(runs: Vec<WorkflowRun>) -> Self {
            Self {
                runs: Mutex::new(runs),
                fail_saves: false,
            }
        }

        fn find(&self, run_id: &RunId) -> Result<WorkflowRun, Report<BackendError>> {
            self.runs
                .lock()
                .unwrap()
                .iter()
                .find(|r| &r.id == run_id)
                .cloned()
                .ok_or_else(|| {
                    BackendError::Status {
                        status: 404,
                        body: "not found".to_string(),
                    }
                    .into()
                })
        }
    }

    #[async_trait]
    impl WorkflowBackend for FakeBackend {
        async fn list_runs(&self) -> Result<Vec<WorkflowRun>, Report<BackendError>> {
            Ok(self.runs.lock().unwrap().clone())
        }

        async fn create_run(
            &self,
            request: &CreateRunRequest,
        ) -> Result<WorkflowRun, Report<BackendError>> {
            let mut created = run("r9", &request.label);
            created.address = request.address.clone();
            self.runs.lock().unwrap().insert(0, created.clone());
            Ok(created)
        }

        async fn fetch_run(&self, run_id: &RunId) -> Result<WorkflowRun, Report<BackendError>> {
            self.find(run_id)
        }

        async fn save_step(
            &self,
            run_id: &RunId,
            step_id: StepId,
            request: &SaveStepRequest,
        ) -> Result<WorkflowRun, Report<BackendError>> {
            if self.fail_saves {
                return Err(BackendError::Transport {
                    reason: "connection refused".to_string(),
                }
                .into());
            }
            let mut saved = self.find(run_id)?;
            for (field, value) in request.data.iter() {
                saved.merge_step_field(step_id, field.clone(), value.clone());
            }
            Ok(saved)
        }

        async fn run_step(
            &self,
            run_id: &RunId,
            step_id: StepId,
        ) -> Result<WorkflowRun, Report<BackendError>> {
            let mut ran = self.find(run_id)?;
            ran.merge_step_field(step_id, "owner", "Acme LLC");
            Ok(ran)
        }

        async fn save_credentials(
            &self,
            _site: &str,
            _credential: &SiteCredential,
        ) -> Result<(), Report<BackendError>> {
            Ok(())
        }
    }

    fn console(backend: FakeBackend) -> Console<FakeBackend> {
        Console::new(WorkflowSession::new(backend))
    }

    async fn output(console: &Console<FakeBackend>, line: &str) -> String {
        match console.handle_line(line).await {
            Reply::Output(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn refresh_lists_and_selects_first_run() {
        let c = console(FakeBackend::with_runs(vec![run("r1", "Hwy 90"), run("r2", "Ambassador")]));
        let text = output(&c, "refresh").await;
        assert_eq!(
            text,
            "loaded 2 investigation(s)\n* r1  Hwy 90  [new]\n  r2  Ambassador  [new]"
        );
    }

    #[tokio::test]
    async fn edits_show_before_saving() {
        let c = console(FakeBackend::with_runs(vec![run("r1", "Hwy 90")]));
        output(&c, "refresh").await;

        assert_eq!(
            output(&c, "edit usgs_flood notes zone AE").await,
            "usgs_flood.notes updated (unsaved)"
        );
        assert!(output(&c, "show").await.contains("  Notes: zone AE"));
        assert_eq!(output(&c, "save usgs_flood").await, "saved usgs_flood");
    }

    #[tokio::test]
    async fn failed_save_prints_error_once() {
        let backend = FakeBackend {
            fail_saves: true,
            ..FakeBackend::with_runs(vec![run("r1", "Hwy 90")])
        };
        let c = console(backend);
        output(&c, "refresh").await;

        assert_eq!(
            output(&c, "save proposal").await,
            "error: request failed: connection refused"
        );
        assert_eq!(output(&c, "list").await, "* r1  Hwy 90  [new]");
    }

    #[tokio::test]
    async fn commands_need_a_selection() {
        let c = console(FakeBackend::default());
        assert_eq!(
            output(&c, "edit proposal notes x").await,
            "error: no investigation selected"
        );
        assert_eq!(output(&c, "show").await, "no investigation selected");
        assert_eq!(output(&c, "reload").await, "no investigation selected");
    }

    #[tokio::test]
    async fn new_creates_and_selects() {
        let c = console(FakeBackend::with_runs(vec![run("r1", "Hwy 90")]));
        output(&c, "refresh").await;

        assert_eq!(
            output(&c, "new Ambassador Caffery | 500 Main").await,
            "created r9 (Ambassador Caffery)"
        );
        assert_eq!(
            output(&c, "list").await,
            "* r9  Ambassador Caffery (500 Main)  [new]\n  r1  Hwy 90  [new]"
        );
    }

    #[tokio::test]
    async fn run_prints_updated_panel() {
        let c = console(FakeBackend::with_runs(vec![run("r1", "Hwy 90")]));
        output(&c, "refresh").await;

        let text = output(&c, "run beacon_tax").await;
        assert!(text.starts_with("ran beacon_tax\n[beacon_tax]"));
        assert!(text.contains("  Owner: Acme LLC"));
    }

    #[tokio::test]
    async fn select_rejects_unknown_ids() {
        let c = console(FakeBackend::with_runs(vec![run("r1", "Hwy 90"), run("r2", "Ambassador")]));
        output(&c, "refresh").await;

        assert_eq!(output(&c, "select r7").await, "no investigation with id r7");
        assert_eq!(output(&c, "select r2").await, "selected r2");
        assert_eq!(c.session().selected_id().map(String::from).as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn parse_errors_and_quit() {
        let c = console(FakeBackend::default());
        assert_eq!(
            output(&c, "frobnicate").await,
            "error: unknown command 'frobnicate' (try 'help')"
        );
        assert_eq!(output(&c, "   ").await, "");
        assert_eq!(c.handle_line("quit").await, Reply::Quit);
    }
}
