use crate::core::posture_evaluator::EvaluationThresholds;
use crate::models::pose::PoseConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Text-generation backend settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Phrase feedback with the generative model; when off, the local summary is returned
    pub enabled: bool,
    /// Google Cloud project; falls back to `GOOGLE_CLOUD_PROJECT`
    pub project: Option<String>,
    /// Vertex AI region
    pub location: String,
    /// Generative model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            project: None,
            location: "asia-northeast1".to_string(),
            model: "gemini-1.5-flash-002".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// Plank rule table
    pub thresholds: EvaluationThresholds,
    /// Landmark detection settings
    pub detection: PoseConfig,
    /// Coaching text generation settings
    pub generation: GenerationConfig,
}

impl Config {
    /// Load configuration from file, creating with defaults if it doesn't exist
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Create default config and save it
            let mut config = Self::default();
            config.save()?;
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        config.apply_env_overrides();
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.validate()?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Serialize and write to file with pretty formatting
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.thresholds.validate()?;

        // Validate detection confidence
        if !(0.0..=1.0).contains(&self.detection.min_detection_confidence) {
            return Err(format!(
                "Invalid detection confidence: {}. Must be between 0.0 and 1.0",
                self.detection.min_detection_confidence
            )
            .into());
        }

        // Validate landmark visibility threshold
        if !(0.0..=1.0).contains(&self.detection.min_visibility) {
            return Err(format!(
                "Invalid landmark visibility threshold: {}. Must be between 0.0 and 1.0",
                self.detection.min_visibility
            )
            .into());
        }

        if self.generation.location.trim().is_empty() {
            return Err("Generation location cannot be empty".into());
        }

        if self.generation.model.trim().is_empty() {
            return Err("Generation model cannot be empty".into());
        }

        // Validate request timeout
        if self.generation.timeout_secs == 0 || self.generation.timeout_secs > 600 {
            return Err(format!(
                "Invalid generation timeout: {}. Must be between 1 and 600 seconds",
                self.generation.timeout_secs
            )
            .into());
        }

        Ok(())
    }

    /// Reset to default configuration
    pub fn reset() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Self::default();
        config.save()?;
        Ok(config)
    }

    /// Fill settings left empty in the file from the environment
    fn apply_env_overrides(&mut self) {
        if self.generation.project.is_none() {
            self.generation.project = std::env::var("GOOGLE_CLOUD_PROJECT")
                .ok()
                .filter(|p| !p.trim().is_empty());
        }
    }

    /// Get the configuration file path
    pub fn get_config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| "Could not determine home directory")?;

        let mut path = PathBuf::from(home);
        path.push(".plank_coach");
        path.push("config");
        path.push("settings.json");

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pose::ModelComplexity;
    use std::fs;

    fn get_test_config_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("plank_coach_test_config_{}", name));
        path.push("settings.json");
        path
    }

    fn cleanup_test_config(path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.thresholds.hip_target, 165.0);
        assert_eq!(config.thresholds.hip_acceptable_min, 155.0);
        assert_eq!(config.thresholds.hip_acceptable_max, 170.0);
        assert_eq!(config.thresholds.knee_min, 160.0);
        assert_eq!(config.thresholds.torso_tilt_limit, 10.0);
        assert_eq!(config.detection.min_visibility, 0.5);
        assert_eq!(config.detection.model_complexity, ModelComplexity::Full);
        assert_eq!(config.generation.model, "gemini-1.5-flash-002");
        assert!(config.generation.enabled);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Invalid visibility threshold
        config.detection.min_visibility = 1.5;
        assert!(config.validate().is_err());
        config.detection.min_visibility = 0.5;

        // Invalid detection confidence
        config.detection.min_detection_confidence = -0.1;
        assert!(config.validate().is_err());
        config.detection.min_detection_confidence = 0.5;

        // Invalid timeout
        config.generation.timeout_secs = 0;
        assert!(config.validate().is_err());
        config.generation.timeout_secs = 30;

        // Inconsistent thresholds
        config.thresholds.hip_acceptable_max = 166.0;
        assert!(config.validate().is_err());
        config.thresholds.hip_acceptable_max = 170.0;

        config.generation.model = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_save_and_load_from_path() {
        let path = get_test_config_path("roundtrip");
        cleanup_test_config(&path);

        let mut config = Config::default();
        config.thresholds.hip_acceptable_max = 175.0;
        config.generation.project = Some("plank-test".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        cleanup_test_config(&path);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = get_test_config_path("invalid");
        cleanup_test_config(&path);

        let mut config = Config::default();
        config.detection.min_visibility = 3.0;
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
        assert!(Config::load_from(&path).is_err());

        cleanup_test_config(&path);
    }
}
