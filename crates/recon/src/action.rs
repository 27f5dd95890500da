use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// Classification of one key after reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Add,
    Update,
    Delete,
    Keep,
}

impl SyncAction {
    pub const ALL: [SyncAction; 4] = [Self::Add, Self::Update, Self::Delete, Self::Keep];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Keep => "keep",
        }
    }

    pub fn default_code(&self) -> &'static str {
        match self {
            Self::Add => "1",
            Self::Update => "2",
            Self::Delete => "3",
            Self::Keep => "9",
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Keep => "KEEP",
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Add => 0,
            Self::Update => 1,
            Self::Delete => 2,
            Self::Keep => 3,
        }
    }
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Config shape
// ---------------------------------------------------------------------------

/// Raw `[sync_actions.<action>]` table. Missing fields fall back to the
/// action's defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionSetting {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncActionsConfig {
    #[serde(default)]
    pub add: ActionSetting,
    #[serde(default)]
    pub update: ActionSetting,
    #[serde(default)]
    pub delete: ActionSetting,
    #[serde(default)]
    pub keep: ActionSetting,
}

impl SyncActionsConfig {
    fn setting(&self, action: SyncAction) -> &ActionSetting {
        match action {
            SyncAction::Add => &self.add,
            SyncAction::Update => &self.update,
            SyncAction::Delete => &self.delete,
            SyncAction::Keep => &self.keep,
        }
    }
}

// ---------------------------------------------------------------------------
// Validated mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionEntry {
    pub action: SyncAction,
    pub code: String,
    pub label: String,
    pub enabled: bool,
}

/// Validated, immutable action ↔ code table. Codes are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTable {
    entries: [ActionEntry; 4],
}

impl ActionTable {
    pub fn from_config(config: &SyncActionsConfig) -> Result<Self, ReconError> {
        let entries = SyncAction::ALL.map(|action| {
            let s = config.setting(action);
            ActionEntry {
                action,
                code: s
                    .code
                    .clone()
                    .unwrap_or_else(|| action.default_code().to_string()),
                label: s
                    .label
                    .clone()
                    .unwrap_or_else(|| action.default_label().to_string()),
                enabled: s.enabled.unwrap_or(true),
            }
        });

        for (i, entry) in entries.iter().enumerate() {
            if entry.code.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "sync action '{}' has an empty code",
                    entry.action
                )));
            }
            if let Some(other) = entries[..i].iter().find(|e| e.code == entry.code) {
                return Err(ReconError::DuplicateActionCode {
                    code: entry.code.clone(),
                    first: other.action.to_string(),
                    second: entry.action.to_string(),
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn entry(&self, action: SyncAction) -> &ActionEntry {
        &self.entries[action.index()]
    }

    pub fn code(&self, action: SyncAction) -> &str {
        &self.entry(action).code
    }

    pub fn label(&self, action: SyncAction) -> &str {
        &self.entry(action).label
    }

    pub fn is_enabled(&self, action: SyncAction) -> bool {
        self.entry(action).enabled
    }

    /// Codes of exporter-enabled actions, in ADD/UPDATE/DELETE/KEEP order.
    pub fn enabled_codes(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.code.as_str())
            .collect()
    }

    /// Copy of this table with a different enablement set.
    pub fn with_enabled(&self, enabled: impl Fn(SyncAction) -> bool) -> Self {
        let mut table = self.clone();
        for entry in &mut table.entries {
            entry.enabled = enabled(entry.action);
        }
        table
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self {
            entries: SyncAction::ALL.map(|action| ActionEntry {
                action,
                code: action.default_code().to_string(),
                label: action.default_label().to_string(),
                enabled: true,
            }),
        }
    }
}
