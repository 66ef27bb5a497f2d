//! Configuration loading and discovery.
//!
//! This module provides configuration file discovery by:
//! 1. Walking up from the current directory to find project config
//! 2. Loading user config from XDG config directory
//! 3. Merging with sensible defaults
//!
//! # Supported formats
//!
//! - TOML (`.toml`)
//! - YAML (`.yaml`, `.yml`)
//! - JSON (`.json`)
//!
//! # Config file locations (in order of precedence, highest first):
//! - `.scribe.<ext>` in current directory or any parent
//! - `scribe.<ext>` in current directory or any parent
//! - `~/.config/scribe/config.<ext>` (user config)
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use scribe_core::config::{Config, ConfigLoader};
//!
//! let cwd = std::env::current_dir().unwrap();
//! let cwd = Utf8PathBuf::try_from(cwd).expect("current directory is not valid UTF-8");
//! let config = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! println!("rule: {}", config.rule_name());
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::bump::BumpMap;
use crate::error::{ConfigError, ConfigResult};
use crate::rule::QuestionSpec;
use crate::rule::conventional;

/// The configuration for scribe.
///
/// Deserialized from config files found during discovery (TOML, YAML, or JSON).
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files (falls back to platform defaults if unset).
    pub log_dir: Option<Utf8PathBuf>,
    /// Name of the commit rule to use (default: `"conventional"`).
    pub rule: Option<String>,
    /// Definition for the configuration-driven `customize` rule.
    pub customize: Option<CustomizeConfig>,
}

impl Config {
    /// The selected rule name, falling back to the built-in rule.
    pub fn rule_name(&self) -> &str {
        self.rule.as_deref().unwrap_or(conventional::NAME)
    }
}

/// The raw `[customize]` section.
///
/// Every key is optional at this layer; building the `customize` rule is
/// what enforces `message_template`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CustomizeConfig {
    /// Template turning answers into a commit message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_template: Option<String>,
    /// An example commit message, shown verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// Human-readable message shape (e.g., `"<type>: <body>"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Regex a valid message must contain a match for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_pattern: Option<String>,
    /// Regex matched against each commit's first line at release time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bump_pattern: Option<String>,
    /// Captured `bump_pattern` text to `MAJOR` / `MINOR` / `PATCH`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bump_map: Option<BumpMap>,
    /// Free-text guidance for contributors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    /// File holding guidance; wins over `info`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_path: Option<Utf8PathBuf>,
    /// Questions, in prompt order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<QuestionSpec>,
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "scribe";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Starting directory for project config search.
    project_search_root: Option<Utf8PathBuf>,
    /// Whether to include user config from XDG directory.
    include_user_config: bool,
    /// Stop searching when we hit a directory containing this file/dir.
    boundary_marker: Option<String>,
    /// Explicit config files to load (for testing or programmatic use).
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default settings.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Set the starting directory for project config search.
    ///
    /// The loader will walk up from this directory looking for config files.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/scribe/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Set a boundary marker to stop directory traversal.
    ///
    /// When walking up directories, stop if we find a directory containing
    /// this file or directory name. Default is `.git`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Disable boundary marker (search all the way to filesystem root).
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file to load.
    ///
    /// Files are loaded in order, with later files taking precedence.
    /// Explicit files are loaded after discovered files.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all discovered sources.
    ///
    /// Precedence (highest to lowest):
    /// 1. Explicit files (in order added via `with_file`)
    /// 2. Project config (closest to search root)
    /// 3. User config (`~/.config/scribe/config.<ext>`)
    /// 4. Default values
    pub fn load(self) -> ConfigResult<Config> {
        self.load_with_source().map(|loaded| loaded.config)
    }

    /// Load configuration and report which project file (if any) was used.
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load_with_source(self) -> ConfigResult<LoadedConfig> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if self.include_user_config
            && let Some(user_config) = self.find_user_config()
        {
            figment = Self::merge_file(figment, &user_config);
        }

        let project_file = self
            .project_search_root
            .as_ref()
            .and_then(|root| self.find_project_config(root));
        if let Some(ref project_config) = project_file {
            figment = Self::merge_file(figment, project_config);
        }

        for file in &self.explicit_files {
            figment = Self::merge_file(figment, file);
        }

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::debug!(
            log_level = config.log_level.as_str(),
            rule = config.rule_name(),
            has_customize = config.customize.is_some(),
            project_file = ?project_file,
            "configuration loaded"
        );

        let project_root = project_file
            .as_deref()
            .and_then(Utf8Path::parent)
            .map(Utf8Path::to_path_buf)
            .or(self.project_search_root);

        Ok(LoadedConfig {
            config,
            project_file,
            project_root,
        })
    }

    /// Find project config by walking up from the given directory.
    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            for ext in CONFIG_EXTENSIONS {
                let dotfile = dir.join(format!(".{APP_NAME}.{ext}"));
                if dotfile.is_file() {
                    return Some(dotfile);
                }

                let regular = dir.join(format!("{APP_NAME}.{ext}"));
                if regular.is_file() {
                    return Some(regular);
                }
            }

            // The marker directory is the last one searched.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
            {
                break;
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        None
    }

    /// Find user config in XDG config directory.
    fn find_user_config(&self) -> Option<Utf8PathBuf> {
        let proj_dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| proj_dirs.config_dir().join(format!("config.{ext}")))
            .find(|path| path.is_file())
            .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
    }

    /// Merge a config file into the figment, detecting format from extension.
    fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
        match path.extension() {
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
            Some("json") => figment.merge(Json::file_exact(path.as_str())),
            _ => figment.merge(Toml::file_exact(path.as_str())),
        }
    }
}

/// A loaded configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: Config,
    /// The project config file, when one was discovered.
    pub project_file: Option<Utf8PathBuf>,
    /// Directory relative paths (such as `info_path`) resolve against: the
    /// project file's directory, else the search root.
    pub project_root: Option<Utf8PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::QuestionKind;
    use crate::version::BumpLevel;
    use std::fs;
    use tempfile::TempDir;

    const CUSTOMIZE_TOML: &str = r#"
rule = "customize"

[customize]
message_template = "{{change_type}}:{% if show_message %} {{message}}{% endif %}"
example = "feature: this feature enable customize through config file"
schema = "<type>: <body>"
schema_pattern = "(feature|bug fix):(\\s.*)"
bump_pattern = "^(break|new|fix|hotfix)"
bump_map = {"break" = "MAJOR", "new" = "MINOR", "fix" = "PATCH", "hotfix" = "PATCH"}
info = "This is a customized rule."
unknown_key = "ignored"

[[customize.questions]]
type = "list"
name = "change_type"
choices = [
    {value = "feature", name = "feature: A new feature."},
    {value = "bug fix", name = "bug fix: A bug fix."}
]
message = "Select the type of change you are committing"

[[customize.questions]]
type = "input"
name = "message"
message = "Body."

[[customize.questions]]
type = "confirm"
name = "show_message"
message = "Do you want to add body message in commit?"
"#;

    fn write(dir: &TempDir, name: &str, contents: &str) -> Utf8PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        Utf8PathBuf::try_from(path).unwrap()
    }

    fn load_file(path: &Utf8Path) -> Config {
        ConfigLoader::new()
            .with_user_config(false)
            .with_file(path)
            .load()
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.log_dir.is_none());
        assert!(config.customize.is_none());
        assert_eq!(config.rule_name(), "conventional");
    }

    #[test]
    fn test_loader_builds_with_defaults() {
        let config = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .load()
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_later_file_overrides_earlier() {
        let tmp = TempDir::new().unwrap();
        let base = write(&tmp, "base.toml", r#"log_level = "warn""#);
        let over = write(&tmp, "override.toml", r#"log_level = "error""#);

        let config = ConfigLoader::new()
            .with_user_config(false)
            .with_file(&base)
            .with_file(&over)
            .load()
            .unwrap();

        assert_eq!(config.log_level, LogLevel::Error);
    }

    #[test]
    fn test_project_config_discovery_sets_root() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("project");
        let sub_dir = project_dir.join("src").join("deep");
        fs::create_dir_all(&sub_dir).unwrap();
        fs::write(project_dir.join(".scribe.toml"), r#"rule = "customize""#).unwrap();

        let sub_dir = Utf8PathBuf::try_from(sub_dir).unwrap();
        let project_dir = Utf8PathBuf::try_from(project_dir).unwrap();

        let loaded = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .with_project_search(&sub_dir)
            .load_with_source()
            .unwrap();

        assert_eq!(loaded.config.rule_name(), "customize");
        assert_eq!(loaded.project_file, Some(project_dir.join(".scribe.toml")));
        assert_eq!(loaded.project_root, Some(project_dir));
    }

    #[test]
    fn test_project_root_falls_back_to_search_root() {
        let tmp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();

        let loaded = ConfigLoader::new()
            .with_user_config(false)
            .with_boundary_marker(".git")
            .with_project_search(&root)
            .load_with_source()
            .unwrap();

        assert!(loaded.project_file.is_none());
        assert_eq!(loaded.project_root, Some(root));
    }

    #[test]
    fn test_boundary_marker_stops_search() {
        let tmp = TempDir::new().unwrap();
        let parent = tmp.path().join("parent");
        let child = parent.join("child");
        let work = child.join("work");
        fs::create_dir_all(&work).unwrap();
        fs::write(parent.join(".scribe.toml"), r#"log_level = "warn""#).unwrap();
        fs::create_dir(child.join(".git")).unwrap();

        let work = Utf8PathBuf::try_from(work).unwrap();
        let config = ConfigLoader::new()
            .with_user_config(false)
            .with_boundary_marker(".git")
            .with_project_search(&work)
            .load()
            .unwrap();

        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_config_beside_boundary_marker_is_found() {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        let src = repo.join("src");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir(repo.join(".git")).unwrap();
        fs::write(repo.join(".scribe.toml"), r#"log_level = "warn""#).unwrap();

        let src = Utf8PathBuf::try_from(src).unwrap();
        let loaded = ConfigLoader::new()
            .with_user_config(false)
            .with_boundary_marker(".git")
            .with_project_search(&src)
            .load_with_source()
            .unwrap();

        assert_eq!(loaded.config.log_level, LogLevel::Warn);
        let repo = Utf8PathBuf::try_from(repo).unwrap();
        assert_eq!(loaded.project_file, Some(repo.join(".scribe.toml")));
        assert_eq!(loaded.project_root, Some(repo));
    }

    #[test]
    fn test_customize_section_toml() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "config.toml", CUSTOMIZE_TOML);
        let config = load_file(&path);

        assert_eq!(config.rule_name(), "customize");
        let customize = config.customize.unwrap();
        assert_eq!(
            customize.bump_pattern.as_deref(),
            Some("^(break|new|fix|hotfix)")
        );
        assert_eq!(
            customize.schema_pattern.as_deref(),
            Some(r"(feature|bug fix):(\s.*)")
        );
        let bump_map = customize.bump_map.unwrap();
        assert_eq!(bump_map["break"], BumpLevel::Major);
        assert_eq!(bump_map["hotfix"], BumpLevel::Patch);

        let names: Vec<_> = customize.questions.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(names, ["change_type", "message", "show_message"]);
        assert_eq!(customize.questions[0].kind, QuestionKind::List);
        let choices = customize.questions[0].choices.as_ref().unwrap();
        assert_eq!(choices[1].value, "bug fix");
        assert_eq!(choices[1].name, "bug fix: A bug fix.");
    }

    #[test]
    fn test_customize_section_yaml() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "config.yaml",
            r#"
customize:
  message_template: "{{kind}}: {{summary}}"
  info_path: docs/commits.txt
  bump_pattern: "^(major|minor)"
  bump_map:
    major: MAJOR
    minor: minor
  questions:
    - type: checkbox
      name: kind
      message: Pick kinds
      choices:
        - {value: a, name: "A"}
    - type: password
      name: summary
      message: Summary
      default: none
"#,
        );
        let customize = load_file(&path).customize.unwrap();

        assert_eq!(customize.info_path.as_deref(), Some(Utf8Path::new("docs/commits.txt")));
        assert_eq!(customize.bump_map.unwrap()["minor"], BumpLevel::Minor);
        assert_eq!(customize.questions[0].kind, QuestionKind::Checkbox);
        assert_eq!(
            customize.questions[1].kind,
            QuestionKind::Other("password".into())
        );
        assert_eq!(customize.questions[1].default, Some("none".into()));
    }

    #[test]
    fn test_customize_section_json() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "config.json",
            r#"{"customize": {"example": "x: y"}}"#,
        );
        let customize = load_file(&path).customize.unwrap();
        assert!(customize.message_template.is_none());
        assert_eq!(customize.example.as_deref(), Some("x: y"));
    }

    #[test]
    fn test_invalid_bump_level_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "config.toml",
            r#"
[customize]
message_template = "{{x}}"
bump_map = { "x" = "HUGE" }
"#,
        );
        let result = ConfigLoader::new()
            .with_user_config(false)
            .with_file(&path)
            .load();
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    #[test]
    fn test_config_ignores_unknown_sections() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "config.toml",
            r#"
log_level = "warn"

[tool.release]
name = "elsewhere"
"#,
        );
        let config = load_file(&path);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(config.customize.is_none());
    }
}
