//! Actions: commands run on the node during apply
//!
//! Actions have no state to compare. When reached (and not skipped) they
//! run, and succeed if the return code and any expected output match.

use serde::Deserialize;
use serde_json::Value;

use super::{ItemContext, ItemStatus, ItemType, StateDict};
use crate::config::items::ItemAttributes;
use crate::error::Result;
use crate::node::{CommandRunner, RunResult};

pub const SECTION: &str = "actions";
pub const TYPE_NAME: &str = "action";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Attributes {
    command: String,
    #[serde(default)]
    expected_return_code: i32,
    #[serde(default)]
    expected_stdout: Option<String>,
    #[serde(default)]
    expected_stderr: Option<String>,
    #[serde(default)]
    interactive: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub command: String,
    pub expected_return_code: i32,
    pub expected_stdout: Option<String>,
    pub expected_stderr: Option<String>,
    /// `Some(true)`: only run in interactive mode; `Some(false)`: never ask
    pub interactive: Option<bool>,
}

impl Action {
    pub fn from_attributes(ctx: &ItemContext<'_>, attributes: ItemAttributes) -> Result<Self> {
        let attributes: Attributes = ctx.parse(attributes)?;
        if attributes.command.trim().is_empty() {
            return Err(ctx.error("'command' must not be empty"));
        }
        Ok(Self {
            command: attributes.command,
            expected_return_code: attributes.expected_return_code,
            expected_stdout: attributes.expected_stdout,
            expected_stderr: attributes.expected_stderr,
            interactive: attributes.interactive,
        })
    }

    /// Run the command; returns why it failed, if it did
    pub fn run(&self, runner: &dyn CommandRunner) -> Result<Option<String>> {
        let result = runner.run_may_fail(&self.command)?;
        Ok(self.check(&result))
    }

    fn check(&self, result: &RunResult) -> Option<String> {
        if result.return_code != self.expected_return_code {
            return Some(format!(
                "wrong return code: {} (expected {})",
                result.return_code, self.expected_return_code
            ));
        }
        if let Some(expected) = &self.expected_stdout {
            if &result.stdout != expected {
                return Some(format!("wrong stdout: {:?} (expected {expected:?})", result.stdout));
            }
        }
        if let Some(expected) = &self.expected_stderr {
            if &result.stderr != expected {
                return Some(format!("wrong stderr: {:?} (expected {expected:?})", result.stderr));
            }
        }
        None
    }
}

impl ItemType for Action {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn cdict(&self) -> Option<StateDict> {
        Some(StateDict::from([(
            "command".to_string(),
            Value::from(self.command.as_str()),
        )]))
    }

    fn sdict(&self, _runner: &dyn CommandRunner) -> Result<Option<StateDict>> {
        // never compared, the action simply runs
        Ok(self.cdict())
    }

    fn fix(&self, runner: &dyn CommandRunner, _status: &ItemStatus) -> Result<()> {
        self.run(runner).map(|_| ())
    }

    fn as_action(&self) -> Option<&Action> {
        Some(self)
    }
}
