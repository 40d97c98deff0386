use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ErgRsError;
use crate::logging::LogConfig;
use crate::models::{AthleteDetails, AthleteProfile};

/// Keys accepted by [`AppConfig::get_value`] and [`AppConfig::set_value`]
pub const CONFIG_KEYS: [&str; 9] = [
    "defaults.age",
    "defaults.weight_kg",
    "defaults.height_cm",
    "defaults.max_hr",
    "defaults.resting_hr",
    "batch.num_threads",
    "batch.show_progress",
    "batch.continue_on_error",
    "default_athlete_id",
];

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Fallbacks for athlete fields that are not known
    #[serde(default)]
    pub defaults: ProfileDefaults,

    /// Batch scoring preferences
    #[serde(default)]
    pub batch: BatchSettings,

    /// Logging preferences
    #[serde(default)]
    pub logging: LogConfig,

    /// Athletes configuration
    #[serde(default)]
    pub athletes: HashMap<String, AthleteConfig>,

    /// Default athlete ID (currently active)
    pub default_athlete_id: Option<String>,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Values substituted when an athlete field is unknown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDefaults {
    /// Age used when the date of birth is unknown
    pub age: f64,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub max_hr: f64,
    pub resting_hr: f64,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        ProfileDefaults {
            age: 30.0,
            weight_kg: 75.0,
            height_cm: 175.0,
            max_hr: 190.0,
            resting_hr: 50.0,
        }
    }
}

/// Batch scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Worker threads (None uses the rayon default)
    pub num_threads: Option<usize>,

    /// Show a progress bar while scoring
    pub show_progress: bool,

    /// Keep going when a workout fails validation
    pub continue_on_error: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        BatchSettings {
            num_threads: None,
            show_progress: true,
            continue_on_error: true,
        }
    }
}

/// Athlete-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteConfig {
    /// Unique athlete identifier
    pub id: String,

    /// Athlete's display name
    pub name: String,

    /// Physiological details, any of which may be unknown
    #[serde(default)]
    pub details: AthleteDetails,

    /// Creation date
    pub created_date: DateTime<Utc>,

    /// Last updated date
    pub last_updated: DateTime<Utc>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            defaults: ProfileDefaults::default(),
            batch: BatchSettings::default(),
            logging: LogConfig::default(),
            athletes: HashMap::new(),
            default_athlete_id: None,
        }
    }
}

fn unknown_key(key: &str) -> anyhow::Error {
    ErgRsError::Configuration(format!("Unknown configuration key: {}", key)).into()
}

fn athlete_not_found(id: &str) -> anyhow::Error {
    ErgRsError::Configuration(format!("Athlete not found: {}", id)).into()
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ergrs")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(
                    path = %config_path.display(),
                    error = %err,
                    "using default configuration"
                );
                Self::default()
            }
        }
    }

    /// Add a new athlete to the configuration
    pub fn add_athlete(&mut self, athlete_config: AthleteConfig) {
        let athlete_id = athlete_config.id.clone();

        // First athlete becomes the default
        if self.athletes.is_empty() {
            self.default_athlete_id = Some(athlete_id.clone());
        }

        self.athletes.insert(athlete_id, athlete_config);
        self.metadata.updated_at = Utc::now();
    }

    /// Remove an athlete from the configuration
    pub fn remove_athlete(&mut self, athlete_id: &str) -> Result<()> {
        if self.athletes.remove(athlete_id).is_none() {
            return Err(athlete_not_found(athlete_id));
        }

        if self.default_athlete_id.as_deref() == Some(athlete_id) {
            // Smallest id keeps the choice stable across runs
            self.default_athlete_id = self.athletes.keys().min().cloned();
        }

        self.metadata.updated_at = Utc::now();
        Ok(())
    }

    pub fn get_athlete(&self, athlete_id: &str) -> Option<&AthleteConfig> {
        self.athletes.get(athlete_id)
    }

    /// Get the default (currently active) athlete
    pub fn get_default_athlete(&self) -> Option<&AthleteConfig> {
        self.default_athlete_id
            .as_ref()
            .and_then(|id| self.athletes.get(id))
    }

    pub fn set_default_athlete(&mut self, athlete_id: &str) -> Result<()> {
        if !self.athletes.contains_key(athlete_id) {
            return Err(athlete_not_found(athlete_id));
        }

        self.default_athlete_id = Some(athlete_id.to_string());
        self.metadata.updated_at = Utc::now();
        Ok(())
    }

    /// Resolve the profile for an athlete, or the bare defaults when none is given
    pub fn resolve_profile(
        &self,
        athlete_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<AthleteProfile> {
        let athlete = match athlete_id {
            Some(id) => Some(self.get_athlete(id).ok_or_else(|| athlete_not_found(id))?),
            None => self.get_default_athlete(),
        };

        Ok(match athlete {
            Some(athlete) => athlete.profile(today, &self.defaults),
            None => self.defaults.into(),
        })
    }

    /// Read a value by dotted key, e.g. `defaults.max_hr`
    pub fn get_value(&self, key: &str) -> Result<String> {
        let value = match key {
            "defaults.age" => self.defaults.age.to_string(),
            "defaults.weight_kg" => self.defaults.weight_kg.to_string(),
            "defaults.height_cm" => self.defaults.height_cm.to_string(),
            "defaults.max_hr" => self.defaults.max_hr.to_string(),
            "defaults.resting_hr" => self.defaults.resting_hr.to_string(),
            "batch.num_threads" => self
                .batch
                .num_threads
                .map(|n| n.to_string())
                .unwrap_or_else(|| "auto".to_string()),
            "batch.show_progress" => self.batch.show_progress.to_string(),
            "batch.continue_on_error" => self.batch.continue_on_error.to_string(),
            "default_athlete_id" => self.default_athlete_id.clone().unwrap_or_default(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a value by dotted key from its string form
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parse_f64 = |v: &str| -> Result<f64> {
            let parsed: f64 = v
                .parse()
                .with_context(|| format!("Invalid number for {}: {}", key, v))?;
            if !parsed.is_finite() || parsed < 0.0 {
                return Err(ErgRsError::Configuration(format!(
                    "{} must be a non-negative number, got {}",
                    key, v
                ))
                .into());
            }
            Ok(parsed)
        };
        let parse_bool = |v: &str| -> Result<bool> {
            v.parse()
                .with_context(|| format!("Invalid boolean for {}: {}", key, v))
        };

        match key {
            "defaults.age" => self.defaults.age = parse_f64(value)?,
            "defaults.weight_kg" => self.defaults.weight_kg = parse_f64(value)?,
            "defaults.height_cm" => self.defaults.height_cm = parse_f64(value)?,
            "defaults.max_hr" => self.defaults.max_hr = parse_f64(value)?,
            "defaults.resting_hr" => self.defaults.resting_hr = parse_f64(value)?,
            "batch.num_threads" => {
                self.batch.num_threads = match value {
                    "auto" => None,
                    v => Some(
                        v.parse()
                            .with_context(|| format!("Invalid thread count: {}", v))?,
                    ),
                }
            }
            "batch.show_progress" => self.batch.show_progress = parse_bool(value)?,
            "batch.continue_on_error" => self.batch.continue_on_error = parse_bool(value)?,
            "default_athlete_id" => self.set_default_athlete(value)?,
            _ => return Err(unknown_key(key)),
        }

        self.metadata.updated_at = Utc::now();
        Ok(())
    }
}

impl AthleteConfig {
    /// Create a new athlete configuration
    pub fn new(name: String, athlete_id: Option<String>) -> Self {
        let id = athlete_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let now = Utc::now();

        AthleteConfig {
            id,
            name,
            details: AthleteDetails::default(),
            created_date: now,
            last_updated: now,
        }
    }

    pub fn with_details(mut self, details: AthleteDetails) -> Self {
        self.details = details;
        self.last_updated = Utc::now();
        self
    }

    /// Resolved physiology for scoring on `today`
    pub fn profile(&self, today: NaiveDate, defaults: &ProfileDefaults) -> AthleteProfile {
        self.details.resolve(today, defaults)
    }
}
