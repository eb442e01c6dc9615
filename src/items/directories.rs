//! Directories on the node

use serde::Deserialize;
use serde_json::Value;

use super::{
    Item, ItemContext, ItemStatus, ItemType, ModeValue, StateDict, chown_spec, insert_optional,
    validate_mode, validate_path,
};
use crate::config::items::ItemAttributes;
use crate::error::Result;
use crate::node::CommandRunner;
use crate::node::path_info;
use crate::node::shell::quote;
use crate::path_utils::is_subdirectory;

pub const SECTION: &str = "directories";
pub const TYPE_NAME: &str = "directory";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Attributes {
    #[serde(default)]
    mode: Option<ModeValue>,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    group: Option<String>,
}

/// A directory; unset attributes are left alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub path: String,
    /// Four octal digits
    pub mode: Option<String>,
    pub owner: Option<String>,
    pub group: Option<String>,
}

impl Directory {
    pub fn from_attributes(ctx: &ItemContext<'_>, attributes: ItemAttributes) -> Result<Self> {
        validate_path(ctx, ctx.name)?;
        let attributes: Attributes = ctx.parse(attributes)?;
        let mode = attributes
            .mode
            .map(|mode| validate_mode(ctx, &mode.as_string()))
            .transpose()?;
        Ok(Self {
            path: ctx.name.to_string(),
            mode,
            owner: attributes.owner,
            group: attributes.group,
        })
    }

    fn fix_mode(&self, runner: &dyn CommandRunner) -> Result<()> {
        if let Some(mode) = &self.mode {
            runner.run(&format!("chmod {mode} -- {}", quote(&self.path)))?;
        }
        Ok(())
    }

    fn fix_owner(&self, runner: &dyn CommandRunner) -> Result<()> {
        let spec = chown_spec(self.owner.as_deref(), self.group.as_deref());
        if !spec.is_empty() {
            runner.run(&format!("chown {spec} -- {}", quote(&self.path)))?;
        }
        Ok(())
    }

    fn fix_type(&self, runner: &dyn CommandRunner) -> Result<()> {
        runner.run(&format!("rm -rf -- {}", quote(&self.path)))?;
        runner.run(&format!("mkdir -p -- {}", quote(&self.path)))?;
        self.fix_mode(runner)?;
        self.fix_owner(runner)
    }
}

/// Error for an item occupying the path another item needs
pub(crate) fn blocking_error(blocker: &Item, blocked: &Item) -> crate::error::BwError {
    crate::error::item::bundle_error(format!(
        "{} (from bundle '{}') blocking path to {} (from bundle '{}')",
        blocker.id(),
        blocker.bundle,
        blocked.id(),
        blocked.bundle
    ))
}

impl ItemType for Directory {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn cdict(&self) -> Option<StateDict> {
        let mut cdict = StateDict::from([("type".to_string(), Value::from("directory"))]);
        insert_optional(&mut cdict, "mode", self.mode.as_ref());
        insert_optional(&mut cdict, "owner", self.owner.as_ref());
        insert_optional(&mut cdict, "group", self.group.as_ref());
        Some(cdict)
    }

    fn sdict(&self, runner: &dyn CommandRunner) -> Result<Option<StateDict>> {
        let Some(stat) = path_info::stat(runner, &self.path)? else {
            return Ok(None);
        };
        Ok(Some(StateDict::from([
            ("type".to_string(), Value::from(stat.path_type.as_str())),
            ("mode".to_string(), Value::from(stat.mode)),
            ("owner".to_string(), Value::from(stat.owner)),
            ("group".to_string(), Value::from(stat.group)),
        ])))
    }

    fn fix(&self, runner: &dyn CommandRunner, status: &ItemStatus) -> Result<()> {
        if status.needs("type") {
            // recreating the directory fixes everything else
            return self.fix_type(runner);
        }
        if status.needs("mode") {
            self.fix_mode(runner)?;
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
            let blocks = match item.type_name() {
                "file" => is_subdirectory(&item.name, &self.path) || item.name == self.path,
                "symlink" => item.name == self.path,
                _ => false,
            };
            if blocks {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::test_support::{item, items};
    use crate::test_fixtures::FakeRunner;
    use serde_json::json;

    #[test]
    fn test_cdict_only_has_configured_keys() {
        let item = item("directories:\n  /var/www:\n    mode: 755\n");
        assert_eq!(
            serde_json::to_value(item.cdict()).unwrap(),
            json!({"type": "directory", "mode": "0755"})
        );
    }

    #[test]
    fn test_mode_as_string() {
        let item = item("directories:\n  /tmp/x:\n    mode: '1777'\n    owner: root\n");
        let cdict = item.cdict().unwrap();
        assert_eq!(cdict["mode"], json!("1777"));
        assert_eq!(cdict["owner"], json!("root"));
    }

    #[test]
    fn test_invalid_mode() {
        let err = items("directories:\n  /srv:\n    mode: 0999\n").unwrap_err();
        assert!(err.to_string().contains("invalid mode"));
    }

    #[test]
    fn test_path_must_be_normalized() {
        let err = items("directories:\n  /var/www/:\n").unwrap_err();
        assert!(err.to_string().contains("should be '/var/www'"));
    }

    #[test]
    fn test_missing_directory_is_created() {
        let runner = FakeRunner::new().respond("stat", 1, "");
        let item = item("directories:\n  /srv/app:\n    mode: '0750'\n    owner: app\n    group: app\n");
        let status = item.status(&runner).unwrap();
        assert!(status.needs("type"));

        item.fix(&runner, &status).unwrap();
        let commands = runner.commands();
        assert_eq!(
            &commands[1..],
            &[
                "rm -rf -- /srv/app",
                "mkdir -p -- /srv/app",
                "chmod 0750 -- /srv/app",
                "chown app:app -- /srv/app",
            ]
        );
    }

    #[test]
    fn test_fix_owner_and_group_with_one_chown() {
        let runner = FakeRunner::new().respond("stat", 0, "directory:755:root:root:4096\n");
        let item = item("directories:\n  /srv:\n    mode: '0755'\n    owner: www\n    group: www\n");
        let status = item.status(&runner).unwrap();
        assert_eq!(status.keys, vec!["group", "owner"]);

        item.fix(&runner, &status).unwrap();
        let chowns: Vec<_> = runner
            .commands()
            .into_iter()
            .filter(|c| c.starts_with("chown"))
            .collect();
        assert_eq!(chowns, vec!["chown www:www -- /srv"]);
        assert!(!runner.ran("chmod"));
    }

    #[test]
    fn test_unset_attributes_are_ignored() {
        let runner = FakeRunner::new().respond("stat", 0, "directory:700:nobody:nogroup:4096\n");
        let status = item("directories:\n  /srv:\n").status(&runner).unwrap();
        assert!(status.correct());
    }

    #[test]
    fn test_auto_deps_on_parent_directories() {
        let items = items("directories:\n  /srv:\n  /srv/app:\n  /srv/app/data:\n").unwrap();
        let data = &items[2];
        let deps = data.kind().auto_deps(data, &items).unwrap();
        assert_eq!(deps, vec!["directory:/srv", "directory:/srv/app"]);
    }

    #[test]
    fn test_file_blocks_directory() {
        let items = items("directories:\n  /srv/app/data:\nfiles:\n  /srv/app:\n    content: x\n")
            .unwrap();
        let dir = items.iter().find(|i| i.type_name() == "directory").unwrap();
        let err = dir.kind().auto_deps(dir, &items).unwrap_err();
        assert!(err.to_string().contains("file:/srv/app (from bundle 'test') blocking path"));
    }
}
