// borderly/src/core/settings.rs
use super::{BorderlyError, DispositionPolicy, Profile, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};

pub const DEFAULT_SETTINGS_FILE: &str = "borderly_settings.json";

const DEFAULT_MAX_RECENT_FILES: usize = 10;

/// What to do with an original once it has been processed, as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessedFileOption {
    #[default]
    None,
    Delete,
    Move,
}

impl ProcessedFileOption {
    fn as_str(&self) -> &'static str {
        match self {
            ProcessedFileOption::None => "None",
            ProcessedFileOption::Delete => "Delete",
            ProcessedFileOption::Move => "Move",
        }
    }
}

impl Serialize for ProcessedFileOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProcessedFileOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        match text.to_lowercase().as_str() {
            "none" => Ok(ProcessedFileOption::None),
            "delete" => Ok(ProcessedFileOption::Delete),
            "move" => Ok(ProcessedFileOption::Move),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["None", "Delete", "Move"],
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,
    #[serde(default)]
    pub processed_file_option: ProcessedFileOption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_directory: Option<PathBuf>,
    #[serde(default)]
    pub recent_files: Vec<PathBuf>,
    #[serde(default = "default_max_recent_files")]
    pub max_recent_files: usize,
}

fn default_max_recent_files() -> usize {
    DEFAULT_MAX_RECENT_FILES
}

impl Default for Settings {
    fn default() -> Self {
        let home = home_dir();
        Self {
            output_directory: home.join("Borderly_Output"),
            input_directory: home,
            processed_file_option: ProcessedFileOption::None,
            processed_directory: None,
            recent_files: Vec::new(),
            max_recent_files: DEFAULT_MAX_RECENT_FILES,
        }
    }
}

fn home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Settings {
    /// The disposition policy these settings describe. `Move` without a
    /// processed directory is rejected here, before any batch is scheduled.
    pub fn disposition_policy(&self) -> Result<DispositionPolicy> {
        let policy = match self.processed_file_option {
            ProcessedFileOption::None => DispositionPolicy::Keep,
            ProcessedFileOption::Delete => DispositionPolicy::Delete,
            ProcessedFileOption::Move => match &self.processed_directory {
                Some(dir) => DispositionPolicy::Move(dir.clone()),
                None => {
                    return Err(BorderlyError::InvalidConfiguration(
                        "Move requires a processed directory".to_string(),
                    ))
                }
            },
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Puts `path` at the front of the recent list, dropping any earlier
    /// occurrence and trimming to `max_recent_files`.
    pub fn add_recent_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.recent_files.retain(|existing| existing != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(self.max_recent_files);
    }

    pub fn remove_recent_file(&mut self, path: &Path) -> bool {
        let before = self.recent_files.len();
        self.recent_files.retain(|existing| existing != path);
        self.recent_files.len() != before
    }

    pub fn clear_recent_files(&mut self) {
        self.recent_files.clear();
    }

    /// Drops entries whose files no longer exist, returning how many went.
    pub fn prune_missing_recent_files(&mut self) -> usize {
        let before = self.recent_files.len();
        self.recent_files.retain(|path| path.exists());
        before - self.recent_files.len()
    }
}

/// The persisted settings file: global settings plus the profile list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SettingsDocument {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default = "default_profiles")]
    pub profiles: Vec<Profile>,
}

fn default_profiles() -> Vec<Profile> {
    vec![Profile::default()]
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            profiles: default_profiles(),
        }
    }
}

impl SettingsDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let document: SettingsDocument = serde_json::from_str(&content)?;
        log::debug!(
            "Loaded {} profiles from {}",
            document.profiles.len(),
            path.display()
        );
        Ok(document)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.name == name)
    }
}
