//! Console command parsing.

use deal_desk_core::{ParseIdError, RunId};
use deal_desk_workflow::{StepId, UnknownStepError};
use std::fmt;
use std::str::FromStr;

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the run list.
    List,
    /// Re-fetch the run list from the backend.
    Refresh,
    /// Create a run.
    New {
        label: String,
        address: Option<String>,
    },
    /// Select a run by id.
    Select(RunId),
    /// Print the selected run with all step panels.
    Show,
    /// Set one field of a step on the selected run locally.
    Edit {
        step_id: StepId,
        field: String,
        value: String,
    },
    /// Persist one step of the selected run.
    Save(StepId),
    /// Run the automation for one step of the selected run.
    Run(StepId),
    /// Re-fetch the selected run from the backend.
    Reload,
    /// Store credentials for an external research site.
    Credentials {
        site: String,
        username: String,
        password: String,
    },
    Help,
    Quit,
}

impl Command {
    /// Returns the command keyword. Safe to log, unlike the arguments.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Refresh => "refresh",
            Self::New { .. } => "new",
            Self::Select(_) => "select",
            Self::Show => "show",
            Self::Edit { .. } => "edit",
            Self::Save(_) => "save",
            Self::Run(_) => "run",
            Self::Reload => "reload",
            Self::Credentials { .. } => "creds",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }
}

/// Error returned for input that is not a valid command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    Empty,
    Unknown(String),
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    UnknownStep(UnknownStepError),
    InvalidRunId(ParseIdError),
}

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no command given"),
            Self::Unknown(name) => write!(f, "unknown command '{name}' (try 'help')"),
            Self::MissingArgument { command, argument } => {
                write!(f, "'{command}' needs <{argument}>")
            }
            Self::UnknownStep(e) => write!(f, "{e}"),
            Self::InvalidRunId(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ParseCommandError {}

impl From<UnknownStepError> for ParseCommandError {
    fn from(e: UnknownStepError) -> Self {
        Self::UnknownStep(e)
    }
}

impl From<ParseIdError> for ParseCommandError {
    fn from(e: ParseIdError) -> Self {
        Self::InvalidRunId(e)
    }
}

/// Usage text printed by `help`.
pub const HELP: &str = "\
commands:
  list                              show investigations
  refresh                           reload investigations from the backend
  new <label> [| <address>]         start an investigation
  select <id>                       select an investigation
  show                              show the selected investigation
  edit <step> <field> <value...>    change a field locally
  save <step>                       save a step
  run <step>                        run a step's automation
  reload                            reload the selected investigation
  creds <site> <username> <password>  store research site credentials
  help                              show this text
  quit                              exit";

/// Splits off the first whitespace-delimited word.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(end) => (&input[..end], input[end..].trim_start()),
        None => (input, ""),
    }
}

fn required<'a>(
    input: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<(&'a str, &'a str), ParseCommandError> {
    let (word, rest) = split_word(input);
    if word.is_empty() {
        return Err(ParseCommandError::MissingArgument { command, argument });
    }
    Ok((word, rest))
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (name, rest) = split_word(line);
        match name {
            "" => Err(ParseCommandError::Empty),
            "list" | "ls" => Ok(Self::List),
            "refresh" => Ok(Self::Refresh),
            "new" => {
                let (label, address) = match rest.split_once('|') {
                    Some((label, address)) => (label.trim(), Some(address.trim())),
                    None => (rest.trim(), None),
                };
                if label.is_empty() {
                    return Err(ParseCommandError::MissingArgument {
                        command: "new",
                        argument: "label",
                    });
                }
                Ok(Self::New {
                    label: label.to_string(),
                    address: address.filter(|a| !a.is_empty()).map(str::to_string),
                })
            }
            "select" => {
                let (id, _) = required(rest, "select", "id")?;
                Ok(Self::Select(id.parse()?))
            }
            "show" => Ok(Self::Show),
            "edit" => {
                let (step, rest) = required(rest, "edit", "step")?;
                let (field, value) = required(rest, "edit", "field")?;
                Ok(Self::Edit {
                    step_id: step.parse()?,
                    field: field.to_string(),
                    value: value.trim_end().to_string(),
                })
            }
            "save" => {
                let (step, _) = required(rest, "save", "step")?;
                Ok(Self::Save(step.parse()?))
            }
            "run" => {
                let (step, _) = required(rest, "run", "step")?;
                Ok(Self::Run(step.parse()?))
            }
            "reload" => Ok(Self::Reload),
            "creds" => {
                let (site, rest) = required(rest, "creds", "site")?;
                let (username, rest) = required(rest, "creds", "username")?;
                let (password, _) = required(rest, "creds", "password")?;
                Ok(Self::Credentials {
                    site: site.to_string(),
                    username: username.to_string(),
                    password: password.to_string(),
                })
            }
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}
