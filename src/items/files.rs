//! Files on the node

use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::directories::blocking_error;
use super::{
    Item, ItemContext, ItemStatus, ItemType, ModeValue, StateDict, chown_spec, insert_optional,
    validate_mode, validate_path,
};
use crate::config::items::ItemAttributes;
use crate::error::Result;
use crate::node::CommandRunner;
use crate::node::path_info::{self, PathType};
use crate::node::shell::quote;
use crate::path_utils::{basename, dirname, is_subdirectory};

pub const SECTION: &str = "files";
pub const TYPE_NAME: &str = "file";

/// How file content is produced and compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// UTF-8 text
    Text,
    /// Raw bytes from `source`
    Binary,
    /// Any content is fine; only existence and permissions are managed
    Any,
}

impl ContentType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(ContentType::Text),
            "binary" => Some(ContentType::Binary),
            "any" => Some(ContentType::Any),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Attributes {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    delete: bool,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    mode: Option<ModeValue>,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

impl Attributes {
    fn has_non_delete_attributes(&self) -> bool {
        self.content.is_some()
            || self.content_type.is_some()
            || self.encoding.is_some()
            || self.group.is_some()
            || self.mode.is_some()
            || self.owner.is_some()
            || self.source.is_some()
    }
}

/// A regular file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub path: String,
    pub content_type: ContentType,
    /// Content to upload; empty for `any`
    pub content: Vec<u8>,
    pub delete: bool,
    pub mode: Option<String>,
    pub owner: Option<String>,
    pub group: Option<String>,
}

impl File {
    pub fn from_attributes(ctx: &ItemContext<'_>, attributes: ItemAttributes) -> Result<Self> {
        if ctx.name == "/" {
            return Err(ctx.error("'/' cannot be a file"));
        }
        validate_path(ctx, ctx.name)?;
        let attributes: Attributes = ctx.parse(attributes)?;

        if attributes.delete {
            if attributes.has_non_delete_attributes() {
                return Err(ctx.error("cannot have other attributes besides 'delete'"));
            }
            return Ok(Self {
                path: ctx.name.to_string(),
                content_type: ContentType::Any,
                content: Vec::new(),
                delete: true,
                mode: None,
                owner: None,
                group: None,
            });
        }

        if attributes.content.is_some() && attributes.source.is_some() {
            return Err(ctx.error("cannot have both 'content' and 'source'"));
        }

        let content_type = match attributes.content_type.as_deref() {
            None => ContentType::Text,
            Some(value) => ContentType::parse(value)
                .ok_or_else(|| ctx.error(format!("invalid content_type: '{value}'")))?,
        };
        if content_type == ContentType::Any
            && (attributes.content.is_some()
                || attributes.encoding.is_some()
                || attributes.source.is_some())
        {
            return Err(ctx.error(
                "with content_type 'any' must not define 'content', 'encoding' and/or 'source'",
            ));
        }
        if let Some(encoding) = attributes.encoding.as_deref() {
            if !matches!(encoding.to_ascii_lowercase().as_str(), "utf-8" | "utf8") {
                return Err(ctx.error(format!("unsupported encoding: '{encoding}'")));
            }
        }

        let content = match (content_type, attributes.content) {
            (ContentType::Any, _) => Vec::new(),
            (_, Some(content)) => content.into_bytes(),
            (_, None) => {
                let source = attributes
                    .source
                    .unwrap_or_else(|| basename(ctx.name).to_string());
                read_source(ctx, &source, content_type)?
            }
        };

        let mode = attributes
            .mode
            .map(|mode| validate_mode(ctx, &mode.as_string()))
            .transpose()?;

        Ok(Self {
            path: ctx.name.to_string(),
            content_type,
            content,
            delete: false,
            mode,
            owner: attributes.owner,
            group: attributes.group,
        })
    }

    /// SHA-256 of the configured content
    pub fn content_hash(&self) -> String {
        hex::encode(Sha256::digest(&self.content))
    }

    fn fix_content(&self, runner: &dyn CommandRunner) -> Result<()> {
        runner.upload(&self.content, &self.path)?;
        self.fix_mode(runner)?;
        self.fix_owner(runner)
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
}

/// Read `bundles/<bundle>/files/<source>`
fn read_source(ctx: &ItemContext<'_>, source: &str, content_type: ContentType) -> Result<Vec<u8>> {
    let path = ctx.bundle.files_dir().join(source);
    if !path.is_file() {
        return Err(ctx.error(format!(
            "refers to missing file '{}' in its 'source' attribute",
            path.display()
        )));
    }
    let content = std::fs::read(&path).map_err(|e| {
        crate::error::fs::read_failed(path.display().to_string(), e.to_string())
    })?;
    if content_type == ContentType::Text && std::str::from_utf8(&content).is_err() {
        return Err(ctx.error(format!(
            "'{}' is not valid UTF-8, use content_type 'binary'",
            path.display()
        )));
    }
    Ok(content)
}

impl ItemType for File {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn cdict(&self) -> Option<StateDict> {
        if self.delete {
            return None;
        }
        let mut cdict = StateDict::from([("type".to_string(), Value::from("file"))]);
        if self.content_type != ContentType::Any {
            cdict.insert("content_hash".to_string(), Value::from(self.content_hash()));
        }
        insert_optional(&mut cdict, "mode", self.mode.as_ref());
        insert_optional(&mut cdict, "owner", self.owner.as_ref());
        insert_optional(&mut cdict, "group", self.group.as_ref());
        Some(cdict)
    }

    fn sdict(&self, runner: &dyn CommandRunner) -> Result<Option<StateDict>> {
        let Some(stat) = path_info::stat(runner, &self.path)? else {
            return Ok(None);
        };
        let content_hash = if stat.path_type == PathType::File && !self.delete {
            Value::from(path_info::sha256(runner, &self.path)?)
        } else {
            Value::Null
        };
        Ok(Some(StateDict::from([
            ("type".to_string(), Value::from(stat.path_type.as_str())),
            ("content_hash".to_string(), content_hash),
            ("mode".to_string(), Value::from(stat.mode)),
            ("owner".to_string(), Value::from(stat.owner)),
            ("group".to_string(), Value::from(stat.group)),
            ("size".to_string(), Value::from(stat.size)),
        ])))
    }

    fn fix(&self, runner: &dyn CommandRunner, status: &ItemStatus) -> Result<()> {
        if status.needs("type") {
            if status.exists() {
                runner.run(&format!("rm -rf -- {}", quote(&self.path)))?;
            }
            if self.delete {
                return Ok(());
            }
            runner.run(&format!("mkdir -p -- {}", quote(dirname(&self.path))))?;
            return self.fix_content(runner);
        }
        if status.needs("content_hash") {
            // uploading also sets mode and ownership
            return self.fix_content(runner);
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
            if item.type_name() == "file" && is_subdirectory(&item.name, &self.path) {
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
