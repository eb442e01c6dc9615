//! Packages managed by apt-get

use serde::Deserialize;
use serde_json::Value;

use super::{ItemContext, ItemStatus, ItemType, StateDict};
use crate::config::items::ItemAttributes;
use crate::error::Result;
use crate::node::CommandRunner;
use crate::node::shell::quote;

pub const SECTION: &str = "pkg_apt";
pub const TYPE_NAME: &str = "pkg_apt";

/// Line `dpkg -s` prints for an installed package
const INSTALLED_STATUS: &str = "Status: install ok installed";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Attributes {
    #[serde(default = "default_installed")]
    installed: bool,
}

fn default_installed() -> bool {
    true
}

/// A Debian package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkgApt {
    pub name: String,
    pub installed: bool,
}

impl PkgApt {
    pub fn from_attributes(ctx: &ItemContext<'_>, attributes: ItemAttributes) -> Result<Self> {
        let attributes: Attributes = ctx.parse(attributes)?;
        Ok(Self {
            name: ctx.name.to_string(),
            installed: attributes.installed,
        })
    }
}

/// Whether a package is installed on the node
pub fn pkg_installed(runner: &dyn CommandRunner, name: &str) -> Result<bool> {
    let result = runner.run_may_fail(&format!("dpkg -s {}", quote(name)))?;
    Ok(result.success() && result.stdout.contains(INSTALLED_STATUS))
}

pub fn pkg_install(runner: &dyn CommandRunner, name: &str) -> Result<()> {
    runner.run(&format!(
        "DEBIAN_FRONTEND=noninteractive apt-get -qy -o Dpkg::Options::=--force-confold install {}",
        quote(name)
    ))?;
    Ok(())
}

pub fn pkg_remove(runner: &dyn CommandRunner, name: &str) -> Result<()> {
    runner.run(&format!(
        "DEBIAN_FRONTEND=noninteractive apt-get -qy -o Dpkg::Options::=--force-confold remove {}",
        quote(name)
    ))?;
    Ok(())
}

impl ItemType for PkgApt {
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
        let installed = pkg_installed(runner, &self.name)?;
        Ok(Some(StateDict::from([(
            "installed".to_string(),
            Value::Bool(installed),
        )])))
    }

    fn fix(&self, runner: &dyn CommandRunner, _status: &ItemStatus) -> Result<()> {
        if self.installed {
            pkg_install(runner, &self.name)
        } else {
            pkg_remove(runner, &self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::test_support::{item, items};
    use crate::test_fixtures::FakeRunner;

    const DPKG_INSTALLED: &str = "Package: htop\nStatus: install ok installed\n";

    #[test]
    fn test_installed_defaults_to_true() {
        let item = item("pkg_apt:\n  htop:\n");
        assert_eq!(item.id(), "pkg_apt:htop");
        assert_eq!(
            item.cdict().unwrap()["installed"],
            Value::Bool(true)
        );
    }

    #[test]
    fn test_installed_must_be_bool() {
        let err = items("pkg_apt:\n  htop:\n    installed: maybe\n").unwrap_err();
        assert!(err.to_string().contains("pkg_apt:htop"));
    }

    #[test]
    fn test_status_installed() {
        let runner = FakeRunner::new().respond("dpkg -s htop", 0, DPKG_INSTALLED);
        let status = item("pkg_apt:\n  htop:\n").status(&runner).unwrap();
        assert!(status.correct());
    }

    #[test]
    fn test_status_deinstalled_package_is_not_installed() {
        let runner = FakeRunner::new().respond(
            "dpkg -s htop",
            0,
            "Package: htop\nStatus: deinstall ok config-files\n",
        );
        let status = item("pkg_apt:\n  htop:\n").status(&runner).unwrap();
        assert_eq!(status.keys, vec!["installed"]);
    }

    #[test]
    fn test_fix_installs() {
        let runner = FakeRunner::new().respond("dpkg -s", 1, "");
        let item = item("pkg_apt:\n  htop:\n");
        let status = item.status(&runner).unwrap();
        item.fix(&runner, &status).unwrap();
        assert!(runner.ran(
            "DEBIAN_FRONTEND=noninteractive apt-get -qy -o Dpkg::Options::=--force-confold install htop"
        ));
    }

    #[test]
    fn test_fix_removes() {
        let runner = FakeRunner::new().respond("dpkg -s telnet", 0, DPKG_INSTALLED);
        let item = item("pkg_apt:\n  telnet:\n    installed: false\n");
        let status = item.status(&runner).unwrap();
        assert!(!status.correct());
        item.fix(&runner, &status).unwrap();
        assert!(runner.ran(
            "DEBIAN_FRONTEND=noninteractive apt-get -qy -o Dpkg::Options::=--force-confold remove telnet"
        ));
    }
}
