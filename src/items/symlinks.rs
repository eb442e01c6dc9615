//! Symbolic links on the node

use serde::Deserialize;
use serde_json::Value;

use super::directories::blocking_error;
use super::{
    Item, ItemContext, ItemStatus, ItemType, StateDict, chown_spec, insert_optional, validate_path,
};
use crate::config::items::ItemAttributes;
use crate::error::Result;
use crate::node::CommandRunner;
use crate::node::path_info::{self, PathType};
use crate::node::shell::quote;
use crate::path_utils::is_subdirectory;

pub const SECTION: &str = "symlinks";
pub const TYPE_NAME: &str = "symlink";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Attributes {
    target: String,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symlink {
    pub path: String,
    pub target: String,
    pub owner: Option<String>,
    pub group: Option<String>,
}

impl Symlink {
    pub fn from_attributes(ctx: &ItemContext<'_>, attributes: ItemAttributes) -> Result<Self> {
        validate_path(ctx, ctx.name)?;
        let attributes: Attributes = ctx.parse(attributes)?;
        Ok(Self {
            path: ctx.name.to_string(),
            target: attributes.target,
            owner: attributes.owner,
            group: attributes.group,
        })
    }

    fn fix_owner(&self, runner: &dyn CommandRunner) -> Result<()> {
        let spec = chown_spec(self.owner.as_deref(), self.group.as_deref());
        if !spec.is_empty() {
            runner.run(&format!("chown -h {spec} -- {}", quote(&self.path)))?;
        }
        Ok(())
    }
}

impl ItemType for Symlink {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn cdict(&self) -> Option<StateDict> {
        let mut cdict = StateDict::from([
            ("type".to_string(), Value::from("symlink")),
            ("target".to_string(), Value::from(self.target.as_str())),
        ]);
        insert_optional(&mut cdict, "owner", self.owner.as_ref());
        insert_optional(&mut cdict, "group", self.group.as_ref());
        Some(cdict)
    }

    fn sdict(&self, runner: &dyn CommandRunner) -> Result<Option<StateDict>> {
        let Some(stat) = path_info::stat(runner, &self.path)? else {
            return Ok(None);
        };
        let target = if stat.path_type == PathType::Symlink {
            Value::from(path_info::symlink_target(runner, &self.path)?)
        } else {
            Value::Null
        };
        Ok(Some(StateDict::from([
            ("type".to_string(), Value::from(stat.path_type.as_str())),
            ("target".to_string(), target),
            ("owner".to_string(), Value::from(stat.owner)),
            ("group".to_string(), Value::from(stat.group)),
        ])))
    }

    fn fix(&self, runner: &dyn CommandRunner, status: &ItemStatus) -> Result<()> {
        if status.needs("type") || status.needs("target") {
            runner.run(&format!("rm -rf -- {}", quote(&self.path)))?;
            runner.run(&format!(
                "ln -s -- {} {}",
                quote(&self.target),
                quote(&self.path)
            ))?;
            return self.fix_owner(runner);
        }
        if status.needs("owner") || status.needs("group") {
            self.fix_owner(runner)?;
        }
        Ok(())
    }

    fn auto_deps(&self, this: &Item, items: &[Item]) -> Result<Vec<String>> {
        let mut deps = Vec::new();
        for item in items {
            if item.id() == this.id() {
                continue;
            }
            if item.type_name() == "file"
                && (item.name == self.path || is_subdirectory(&item.name, &self.path))
            {
                return Err(blocking_error(item, this));
            }
            if matches!(item.type_name(), "directory" | "symlink")
                && is_subdirectory(&item.name, &self.path)
            {
                deps.push(item.id());
            }
        }
        Ok(deps)
    }
}
