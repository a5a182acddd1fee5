use std::env;
use std::fmt;

use crate::workflows::admissions::AdmissionPolicy;
use crate::workflows::matching::{ExtractionMode, ScoringConfig};

/// Distinguishes runtime behavior for different deployments of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the engine and its command-line front end.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub engine: EngineConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("PLACEMENT_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let extraction_mode = match env::var("PLACEMENT_EXTRACTION_MODE") {
            Ok(raw) => ExtractionMode::parse(&raw)
                .ok_or(ConfigError::InvalidExtractionMode { value: raw })?,
            Err(_) => ExtractionMode::default(),
        };

        let defaults = ScoringConfig::default();
        let course_threshold = match env::var("PLACEMENT_COURSE_THRESHOLD") {
            Ok(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|threshold| *threshold <= 100)
                .ok_or(ConfigError::InvalidCourseThreshold { value: raw })?,
            Err(_) => defaults.course_threshold,
        };
        let minimum_skill_overlap = match env::var("PLACEMENT_SKILL_OVERLAP") {
            Ok(raw) => raw
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|overlap| (0.0..=1.0).contains(overlap))
                .ok_or(ConfigError::InvalidSkillOverlap { value: raw })?,
            Err(_) => defaults.minimum_skill_overlap,
        };

        let policy = AdmissionPolicy::default();
        let max_active_per_institution = match env::var("PLACEMENT_APPLICATION_CAP") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|cap| *cap >= 1)
                .ok_or(ConfigError::InvalidApplicationCap { value: raw })?,
            Err(_) => policy.max_active_per_institution,
        };
        let max_commit_attempts = match env::var("PLACEMENT_COMMIT_ATTEMPTS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|attempts| *attempts >= 1)
                .ok_or(ConfigError::InvalidCommitAttempts { value: raw })?,
            Err(_) => policy.max_commit_attempts,
        };

        let log_level = env::var("PLACEMENT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            engine: EngineConfig {
                extraction_mode,
                scoring: ScoringConfig {
                    course_threshold,
                    minimum_skill_overlap,
                    ..defaults
                },
                admission: AdmissionPolicy {
                    max_active_per_institution,
                    max_commit_attempts,
                },
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Matching and admission settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub extraction_mode: ExtractionMode,
    pub scoring: ScoringConfig,
    pub admission: AdmissionPolicy,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidExtractionMode { value: String },
    InvalidCourseThreshold { value: String },
    InvalidSkillOverlap { value: String },
    InvalidApplicationCap { value: String },
    InvalidCommitAttempts { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidExtractionMode { value } => write!(
                f,
                "PLACEMENT_EXTRACTION_MODE must be 'lenient' or 'strict', got '{value}'"
            ),
            ConfigError::InvalidCourseThreshold { value } => write!(
                f,
                "PLACEMENT_COURSE_THRESHOLD must be an integer between 0 and 100, got '{value}'"
            ),
            ConfigError::InvalidSkillOverlap { value } => write!(
                f,
                "PLACEMENT_SKILL_OVERLAP must be a fraction between 0 and 1, got '{value}'"
            ),
            ConfigError::InvalidApplicationCap { value } => write!(
                f,
                "PLACEMENT_APPLICATION_CAP must be a positive integer, got '{value}'"
            ),
            ConfigError::InvalidCommitAttempts { value } => write!(
                f,
                "PLACEMENT_COMMIT_ATTEMPTS must be a positive integer, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
