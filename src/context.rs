//! Local execution context used to ground the prompt.
//!
//! Collection never fails: each probe that cannot answer degrades to a
//! placeholder so the request can still be sent.

use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::System;
use tracing::debug;

pub const UNKNOWN: &str = "Unknown";
pub const LISTING_ERROR: &str = "Error listing files";
pub const MAX_LISTED_ENTRIES: usize = 20;

/// Development tools reported to the model when found on `PATH`.
pub const KNOWN_TOOLS: &[&str] = &[
    "git", "npm", "node", "python", "docker", "pip", "go", "rustc", "cargo", "java", "mvn", "gradle",
];

/// Snapshot of the environment the command will run in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    pub os: String,
    pub shell: String,
    pub cwd: String,
    pub user: String,
    /// Comma-separated listing, or [`LISTING_ERROR`].
    pub files: String,
    pub is_git_repo: bool,
    pub tools: Vec<String>,
}

/// Source of the raw facts behind an [`ExecutionContext`].
pub trait EnvironmentProbe {
    fn os_description(&self) -> Option<String>;
    fn parent_process_name(&self) -> Option<String>;
    fn current_dir(&self) -> Option<PathBuf>;
    fn user_name(&self) -> Option<String>;
    fn list_dir(&self, dir: &Path) -> std::io::Result<Vec<String>>;
    fn path_exists(&self, path: &Path) -> bool;
    fn program_exists(&self, program: &str) -> bool;
}

/// Probe backed by the running process and the host OS.
pub struct SystemProbe;

impl EnvironmentProbe for SystemProbe {
    fn os_description(&self) -> Option<String> {
        let name = System::name().unwrap_or_else(|| std::env::consts::OS.to_string());
        match System::kernel_version() {
            Some(release) => Some(format!("{} {}", name, release)),
            None => Some(name),
        }
    }

    fn parent_process_name(&self) -> Option<String> {
        let pid = sysinfo::get_current_pid().ok()?;
        let mut system = System::new();
        system.refresh_processes();
        let parent = system.process(pid)?.parent()?;
        system.process(parent).map(|p| p.name().to_string())
    }

    fn current_dir(&self) -> Option<PathBuf> {
        std::env::current_dir().ok()
    }

    fn user_name(&self) -> Option<String> {
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .ok()
    }

    fn list_dir(&self, dir: &Path) -> std::io::Result<Vec<String>> {
        fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect()
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn program_exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

impl ExecutionContext {
    /// Collects the context of the current process.
    pub fn collect() -> Self {
        Self::collect_with(&SystemProbe)
    }

    pub fn collect_with(probe: &impl EnvironmentProbe) -> Self {
        let cwd = probe.current_dir();

        let files = match &cwd {
            Some(dir) => match probe.list_dir(dir) {
                Ok(entries) => format_listing(&entries),
                Err(e) => {
                    debug!("Listing {} failed: {}", dir.display(), e);
                    LISTING_ERROR.to_string()
                }
            },
            None => LISTING_ERROR.to_string(),
        };

        let is_git_repo = cwd
            .as_ref()
            .map(|dir| probe.path_exists(&dir.join(".git")))
            .unwrap_or(false);

        let tools = KNOWN_TOOLS
            .iter()
            .filter(|tool| probe.program_exists(tool))
            .map(|tool| tool.to_string())
            .collect();

        Self {
            os: probe.os_description().unwrap_or_else(|| UNKNOWN.to_string()),
            shell: probe.parent_process_name().unwrap_or_else(|| UNKNOWN.to_string()),
            cwd: cwd
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            user: probe.user_name().unwrap_or_else(|| UNKNOWN.to_string()),
            files,
            is_git_repo,
            tools,
        }
    }

    pub fn tools_display(&self) -> String {
        self.tools.join(", ")
    }
}

/// Joins the first [`MAX_LISTED_ENTRIES`] names, marking any overflow.
fn format_listing(entries: &[String]) -> String {
    let shown = entries.iter().take(MAX_LISTED_ENTRIES).cloned().collect::<Vec<_>>();
    let mut listing = shown.join(", ");
    if entries.len() > MAX_LISTED_ENTRIES {
        listing.push_str("...");
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io;

    struct MockProbe {
        cwd: Option<PathBuf>,
        entries: io::Result<Vec<String>>,
        git: bool,
        tools: HashSet<&'static str>,
    }

    impl MockProbe {
        fn new(entries: Vec<&str>) -> Self {
            Self {
                cwd: Some(PathBuf::from("/work/project")),
                entries: Ok(entries.into_iter().map(String::from).collect()),
                git: false,
                tools: HashSet::new(),
            }
        }
    }

    impl EnvironmentProbe for MockProbe {
        fn os_description(&self) -> Option<String> {
            Some("Linux 6.1.0".to_string())
        }

        fn parent_process_name(&self) -> Option<String> {
            None
        }

        fn current_dir(&self) -> Option<PathBuf> {
            self.cwd.clone()
        }

        fn user_name(&self) -> Option<String> {
            Some("dev".to_string())
        }

        fn list_dir(&self, _dir: &Path) -> io::Result<Vec<String>> {
            match &self.entries {
                Ok(entries) => Ok(entries.clone()),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }

        fn path_exists(&self, path: &Path) -> bool {
            self.git && path.ends_with(".git")
        }

        fn program_exists(&self, program: &str) -> bool {
            self.tools.contains(program)
        }
    }

    #[test]
    fn test_collect_uses_placeholders_for_missing_facts() {
        let context = ExecutionContext::collect_with(&MockProbe::new(vec!["Cargo.toml"]));

        assert_eq!(context.shell, UNKNOWN);
        assert_eq!(context.os, "Linux 6.1.0");
        assert_eq!(context.cwd, "/work/project");
        assert_eq!(context.files, "Cargo.toml");
    }

    #[test]
    fn test_listing_truncates_after_twenty_entries() {
        let names: Vec<String> = (0..25).map(|i| format!("f{}", i)).collect();
        let probe = MockProbe::new(names.iter().map(|s| s.as_str()).collect());

        let context = ExecutionContext::collect_with(&probe);

        assert!(context.files.starts_with("f0, f1, "));
        assert!(context.files.ends_with("f19..."));
        assert!(!context.files.contains("f20"));
    }

    #[test]
    fn test_exactly_twenty_entries_has_no_marker() {
        let names: Vec<String> = (0..20).map(|i| format!("f{}", i)).collect();
        let probe = MockProbe::new(names.iter().map(|s| s.as_str()).collect());

        let context = ExecutionContext::collect_with(&probe);
        assert!(context.files.ends_with("f19"));
    }

    #[test]
    fn test_listing_failure_degrades_to_placeholder() {
        let mut probe = MockProbe::new(vec![]);
        probe.entries = Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));

        let context = ExecutionContext::collect_with(&probe);
        assert_eq!(context.files, LISTING_ERROR);
    }

    #[test]
    fn test_missing_cwd_degrades_to_placeholders() {
        let mut probe = MockProbe::new(vec![]);
        probe.cwd = None;
        probe.git = true;

        let context = ExecutionContext::collect_with(&probe);
        assert_eq!(context.cwd, UNKNOWN);
        assert_eq!(context.files, LISTING_ERROR);
        assert!(!context.is_git_repo);
    }

    #[test]
    fn test_tools_keep_allow_list_order() {
        let mut probe = MockProbe::new(vec![]);
        probe.tools = ["cargo", "git", "docker"].into_iter().collect();

        let context = ExecutionContext::collect_with(&probe);
        assert_eq!(context.tools, vec!["git", "docker", "cargo"]);
        assert_eq!(context.tools_display(), "git, docker, cargo");
    }

    #[test]
    fn test_git_repo_detected_from_dot_git() {
        let mut probe = MockProbe::new(vec![".git"]);
        probe.git = true;

        assert!(ExecutionContext::collect_with(&probe).is_git_repo);
    }
}
