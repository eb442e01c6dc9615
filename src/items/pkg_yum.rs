//! Packages managed by yum

use serde::Deserialize;
use serde_json::Value;

use super::{ItemContext, ItemStatus, ItemType, StateDict};
use crate::config::items::ItemAttributes;
use crate::error::Result;
use crate::node::CommandRunner;
use crate::node::shell::quote;

pub const SECTION: &str = "pkg_yum";
pub const TYPE_NAME: &str = "pkg_yum";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Attributes {
    #[serde(default = "default_installed")]
    installed: bool,
}

fn default_installed() -> bool {
    true
}

/// An RPM package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkgYum {
    pub name: String,
    pub installed: bool,
}

impl PkgYum {
    pub fn from_attributes(ctx: &ItemContext<'_>, attributes: ItemAttributes) -> Result<Self> {
        let attributes: Attributes = ctx.parse(attributes)?;
        Ok(Self {
            name: ctx.name.to_string(),
            installed: attributes.installed,
        })
    }
}

impl ItemType for PkgYum {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn cdict(&self) -> Option<StateDict> {
        Some(StateDict::from([(
            "installed".to_string(),
            Value::Bool(self.installed),
        )]))
    }

    fn sdict(&self, runner: &dyn CommandRunner) -> Result<Option<StateDict>> {
        let result = runner.run_may_fail(&format!("yum -q list installed {}", quote(&self.name)))?;
        Ok(Some(StateDict::from([(
            "installed".to_string(),
            Value::Bool(result.success()),
        )])))
    }

    fn fix(&self, runner: &dyn CommandRunner, _status: &ItemStatus) -> Result<()> {
        let verb = if self.installed { "install" } else { "remove" };
        runner.run(&format!("yum -d0 -e0 -y {verb} {}", quote(&self.name)))?;
        Ok(())
    }
}
