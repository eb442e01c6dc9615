//! Inspection of paths on a node

use super::runner::CommandRunner;
use super::shell::quote;
use crate::error::Result;

/// Type of a filesystem entry as reported by `stat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    File,
    Directory,
    Symlink,
    Other,
}

impl PathType {
    fn from_stat(description: &str) -> Self {
        match description {
            "regular file" | "regular empty file" => PathType::File,
            "directory" => PathType::Directory,
            "symbolic link" => PathType::Symlink,
            _ => PathType::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PathType::File => "file",
            PathType::Directory => "directory",
            PathType::Symlink => "symlink",
            PathType::Other => "other",
        }
    }
}

/// Attributes of an existing path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStat {
    pub path_type: PathType,
    /// Permission bits, four octal digits
    pub mode: String,
    pub owner: String,
    pub group: String,
    pub size: u64,
}

/// Stat a path without following symlinks; `None` if it does not exist
pub fn stat(runner: &dyn CommandRunner, path: &str) -> Result<Option<PathStat>> {
    let result = runner.run_may_fail(&format!("stat -c '%F:%a:%U:%G:%s' -- {}", quote(path)))?;
    if !result.success() {
        return Ok(None);
    }
    Ok(parse_stat_line(result.stdout.trim()))
}

fn parse_stat_line(line: &str) -> Option<PathStat> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != 5 {
        return None;
    }
    Some(PathStat {
        path_type: PathType::from_stat(fields[0]),
        mode: format!("{:0>4}", fields[1]),
        owner: fields[2].to_string(),
        group: fields[3].to_string(),
        size: fields[4].parse().unwrap_or(0),
    })
}

/// SHA-256 of a file's content on the node
pub fn sha256(runner: &dyn CommandRunner, path: &str) -> Result<String> {
    let result = runner.run(&format!("sha256sum -- {}", quote(path)))?;
    Ok(result
        .stdout
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string())
}

/// Target of a symlink on the node
pub fn symlink_target(runner: &dyn CommandRunner, path: &str) -> Result<String> {
    let result = runner.run(&format!("readlink -- {}", quote(path)))?;
    Ok(result.stdout.trim_end_matches('\n').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::runner::LocalRunner;
    use crate::test_fixtures::create_temp_dir;

    #[test]
    fn test_parse_stat_line() {
        let stat = parse_stat_line("directory:755:root:staff:4096").unwrap();
        assert_eq!(stat.path_type, PathType::Directory);
        assert_eq!(stat.mode, "0755");
        assert_eq!(stat.owner, "root");
        assert_eq!(stat.group, "staff");
        assert_eq!(stat.size, 4096);
    }

    #[test]
    fn test_parse_stat_line_types() {
        assert_eq!(
            parse_stat_line("regular empty file:644:a:b:0").unwrap().path_type,
            PathType::File
        );
        assert_eq!(
            parse_stat_line("symbolic link:777:a:b:4").unwrap().path_type,
            PathType::Symlink
        );
        assert_eq!(
            parse_stat_line("fifo:644:a:b:0").unwrap().path_type,
            PathType::Other
        );
        assert!(parse_stat_line("garbage").is_none());
    }

    #[test]
    fn test_stat_missing_path() {
        let temp = create_temp_dir();
        let runner = LocalRunner::new("localhost");
        let missing = temp.path().join("missing");
        assert!(stat(&runner, &missing.display().to_string()).unwrap().is_none());
    }

    #[test]
    fn test_stat_and_hash_local_file() {
        let temp = create_temp_dir();
        let path = temp.path().join("file");
        std::fs::write(&path, "abc").unwrap();
        let path = path.display().to_string();
        let runner = LocalRunner::new("localhost");

        let info = stat(&runner, &path).unwrap().unwrap();
        assert_eq!(info.path_type, PathType::File);
        assert_eq!(info.size, 3);
        assert_eq!(
            sha256(&runner, &path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
