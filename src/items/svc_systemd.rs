//! Services managed by systemd

use serde::Deserialize;
use serde_json::Value;
use serde_yaml::Value as YamlValue;

use super::{ItemContext, ItemStatus, ItemType, StateDict};
use crate::config::items::ItemAttributes;
use crate::error::Result;
use crate::node::CommandRunner;
use crate::node::shell::quote;

pub const SECTION: &str = "svc_systemd";
pub const TYPE_NAME: &str = "svc_systemd";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Attributes {
    #[serde(default = "default_running")]
    running: bool,
}

fn default_running() -> bool {
    true
}

/// A systemd unit that should be running or stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvcSystemd {
    pub unit: String,
    pub running: bool,
}

impl SvcSystemd {
    pub fn from_attributes(ctx: &ItemContext<'_>, attributes: ItemAttributes) -> Result<Self> {
        let attributes: Attributes = ctx.parse(attributes)?;
        Ok(Self {
            unit: ctx.name.to_string(),
            running: attributes.running,
        })
    }
}

impl ItemType for SvcSystemd {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn cdict(&self) -> Option<StateDict> {
        Some(StateDict::from([(
            "running".to_string(),
            Value::Bool(self.running),
        )]))
    }

    fn sdict(&self, runner: &dyn CommandRunner) -> Result<Option<StateDict>> {
        let result = runner.run_may_fail(&format!("systemctl status -- {}", quote(&self.unit)))?;
        Ok(Some(StateDict::from([(
            "running".to_string(),
            Value::Bool(result.success()),
        )])))
    }

    fn fix(&self, runner: &dyn CommandRunner, _status: &ItemStatus) -> Result<()> {
        let verb = if self.running { "start" } else { "stop" };
        runner.run(&format!("systemctl {verb} -- {}", quote(&self.unit)))?;
        Ok(())
    }

    fn static_needs(&self) -> &'static [&'static str] {
        &["pkg_apt:", "pkg_yum:"]
    }

    fn canned_actions(&self, id: &str) -> Vec<(String, ItemAttributes)> {
        ["reload", "restart"]
            .into_iter()
            .map(|verb| {
                let mut attributes = ItemAttributes::new();
                attributes.insert(
                    YamlValue::from("command"),
                    YamlValue::from(format!("systemctl {verb} -- {}", quote(&self.unit))),
                );
                attributes.insert(
                    YamlValue::from("needs"),
                    YamlValue::Sequence(vec![YamlValue::from(id)]),
                );
                (verb.to_string(), attributes)
            })
            .collect()
    }
}
