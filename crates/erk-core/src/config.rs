use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// TrackerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_gh_binary")]
    pub gh_binary: String,
    /// Passed to the tracker when a query sets no limit of its own.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

fn default_gh_binary() -> String {
    "gh".to_string()
}

fn default_list_limit() -> usize {
    1000
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            gh_binary: default_gh_binary(),
            list_limit: default_list_limit(),
        }
    }
}

// ---------------------------------------------------------------------------
// LabelsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Six hex digits, no leading `#`.
    pub color: String,
}

impl LabelSpec {
    fn new(name: &str, description: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelsConfig {
    #[serde(default = "default_plan_label")]
    pub plan: LabelSpec,
    #[serde(default = "default_queue_label")]
    pub queue: LabelSpec,
}

fn default_plan_label() -> LabelSpec {
    LabelSpec::new("erk-plan", "Implementation plan tracked by erk", "0E8A16")
}

fn default_queue_label() -> LabelSpec {
    LabelSpec::new("erk-queue", "Plan queued for remote implementation", "FBCA04")
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            plan: default_plan_label(),
            queue: default_queue_label(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
}

static COLOR_RE: OnceLock<Regex> = OnceLock::new();

fn color_re() -> &'static Regex {
    COLOR_RE.get_or_init(|| Regex::new(r"^[0-9A-Fa-f]{6}$").unwrap())
}

impl Config {
    /// Parse a config document. Empty input yields the defaults.
    pub fn from_yaml(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.tracker.gh_binary.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "tracker.gh_binary is empty".to_string(),
            });
        }
        if self.tracker.list_limit == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "tracker.list_limit is 0; unbounded listings will return nothing"
                    .to_string(),
            });
        }

        for (key, label) in [("plan", &self.labels.plan), ("queue", &self.labels.queue)] {
            if label.name.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("labels.{key}.name is empty"),
                });
            }
            if !color_re().is_match(&label.color) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "labels.{key}.color '{}' is not a 6-digit hex color",
                        label.color
                    ),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
