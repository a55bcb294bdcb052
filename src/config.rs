//! Configuration handling for profile form sessions

use crate::state::FormLayout;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Navigation targets of the profile workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowRoutes {
    /// Qualifications form while creating a profile
    pub create_form: String,
    /// Qualifications form while editing a profile
    pub edit_form: String,
    /// Onboarding step after "save and finish" in create mode
    pub create_next_step: String,
    /// Target of "save and next" on the last section
    pub workflow_complete: String,
    /// Profile summary after "save and finish" in edit mode
    pub edit_finish: String,
}

impl Default for WorkflowRoutes {
    fn default() -> Self {
        Self {
            create_form: "/profile/create/step/6".to_string(),
            edit_form: "/profile/edit/qualifications".to_string(),
            create_next_step: "/profile/create/step/8".to_string(),
            workflow_complete: "/profile/create/step/7".to_string(),
            edit_finish: "/profile/edit/finish".to_string(),
        }
    }
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FormsConfig {
    /// Workflow routes
    #[serde(default)]
    pub routes: WorkflowRoutes,
    /// Directory of the local profile store
    pub store_dir: Option<PathBuf>,
    /// Maximum number of education entries
    pub education_limit: Option<usize>,
    /// Maximum number of experience entries
    pub experience_limit: Option<usize>,
}

impl FormsConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "profile-forms", "profile-forms")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: FormsConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Qualifications layout with the configured limits
    pub fn layout(&self) -> FormLayout {
        FormLayout::qualifications(
            self.education_limit.unwrap_or(3),
            self.experience_limit.unwrap_or(10),
        )
    }
}
