//! Settings infrastructure for ramlsp.
//!
//! This module loads `ramlsp.toml` files to turn individual language features
//! on or off and to tune validation.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::providers::IssueType;

/// File name searched for by [`discover_settings`].
pub const SETTINGS_FILE: &str = "ramlsp.toml";

/// Root settings structure loaded from ramlsp.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Per-capability switches.
    pub features: Option<FeatureSettings>,

    /// Validation configuration.
    pub validation: Option<ValidationSettings>,
}

/// Feature toggles. Every feature is enabled unless set to `false`.
#[derive(Debug, Default, Deserialize)]
pub struct FeatureSettings {
    pub symbols: Option<bool>,
    pub completion: Option<bool>,
    pub definition: Option<bool>,
    pub references: Option<bool>,
    pub highlight: Option<bool>,
    pub rename: Option<bool>,
    pub validation: Option<bool>,
}

/// Validation settings.
#[derive(Debug, Default, Deserialize)]
pub struct ValidationSettings {
    /// Type names accepted in addition to the builtin ones.
    pub extra_types: Option<Vec<String>>,

    /// Severity of unresolved references: "error" (default) or "warning".
    pub unresolved_severity: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Symbols,
    Completion,
    Definition,
    References,
    Highlight,
    Rename,
    Validation,
}

impl Settings {
    pub fn feature_enabled(&self, feature: Feature) -> bool {
        let Some(features) = &self.features else {
            return true;
        };
        let flag = match feature {
            Feature::Symbols => features.symbols,
            Feature::Completion => features.completion,
            Feature::Definition => features.definition,
            Feature::References => features.references,
            Feature::Highlight => features.highlight,
            Feature::Rename => features.rename,
            Feature::Validation => features.validation,
        };
        flag.unwrap_or(true)
    }

    pub fn extra_types(&self) -> Vec<String> {
        self.validation
            .as_ref()
            .and_then(|v| v.extra_types.clone())
            .unwrap_or_default()
    }

    pub fn unresolved_severity(&self) -> IssueType {
        let severity = self
            .validation
            .as_ref()
            .and_then(|v| v.unresolved_severity.as_deref());

        match severity {
            None | Some("error") => IssueType::Error,
            Some("warning") => IssueType::Warning,
            Some(other) => {
                warn!(component = "settings", severity = other, "unknown severity, using error");
                IssueType::Error
            }
        }
    }
}

/// Load settings from a ramlsp.toml file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(component = "settings", path = %path.display(), "failed to parse {SETTINGS_FILE}: {e}");
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

/// Discover ramlsp.toml by searching up the directory tree, then direct children.
///
/// Search order:
/// 1. Walk up from `start_dir` to filesystem root
/// 2. If not found, check immediate child directories of `start_dir`
///
/// Returns `(settings, settings_dir)` where `settings_dir` is the directory
/// containing the found file. If not found, returns
/// `(Settings::default(), start_dir)`.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    // Phase 1: Walk up from start_dir
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join(SETTINGS_FILE);
        if candidate.is_file() {
            return (load_settings(&candidate), dir.to_path_buf());
        }
        current = dir.parent();
    }

    // Phase 2: Check immediate child directories
    if let Ok(entries) = std::fs::read_dir(start_dir) {
        for entry in entries.flatten() {
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                let candidate = entry.path().join(SETTINGS_FILE);
                if candidate.is_file() {
                    return (load_settings(&candidate), entry.path());
                }
            }
        }
    }

    (Settings::default(), start_dir.to_path_buf())
}
