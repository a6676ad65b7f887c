//! Configuration management for regrid.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RegridError, Result};
use crate::interpolation::{BuildOptions, Method, OutsideHullPolicy, DEFAULT_MAX_DISTANCE_FACTOR};

/// Command-line arguments for regrid
#[derive(Parser, Debug)]
#[command(name = "regrid")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON regrid request
    pub request: PathBuf,

    /// Where to write the JSON result (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Interpolation method (nearest, linear)
    #[arg(short, long, env = "REGRID_METHOD")]
    pub method: Option<String>,

    /// Handling of targets outside the source hull (reject, nearest, extrapolate)
    #[arg(long, env = "REGRID_OUTSIDE_HULL")]
    pub outside_hull: Option<String>,

    /// Nearest neighbour sanity limit in multiples of the reference spacing
    #[arg(long, env = "REGRID_MAX_DISTANCE_FACTOR")]
    pub max_distance_factor: Option<f64>,

    /// Also emit the grid rotation angle field of the source grid
    #[arg(long)]
    pub rotation: bool,

    /// Path to JSON configuration file
    #[arg(short, long, env = "REGRID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "REGRID_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Interpolation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolationConfig {
    /// Default interpolation method
    #[serde(default = "default_method")]
    pub method: String,

    /// Linear method handling of targets outside the convex hull
    #[serde(default = "default_outside_hull")]
    pub outside_hull: String,

    /// Nearest neighbour sanity limit in multiples of the reference spacing
    #[serde(default = "default_max_distance_factor")]
    pub max_distance_factor: f64,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Interpolation configuration
    #[serde(default)]
    pub interpolation: InterpolationConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, Args)> {
        let args = Args::parse();
        let config = Self::from_args(&args)?;
        Ok((config, args))
    }

    /// Build a configuration from already parsed arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        if let Some(method) = &args.method {
            config.interpolation.method = method.clone();
        }
        if let Some(policy) = &args.outside_hull {
            config.interpolation.outside_hull = policy.clone();
        }
        if let Some(factor) = args.max_distance_factor {
            config.interpolation.max_distance_factor = factor;
        }
        if let Some(level) = &args.log_level {
            config.log_level = level.clone();
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.interpolation = other.interpolation;
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(RegridError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        // Validate interpolation method and policy
        self.method()?;
        self.outside_hull()?;

        let factor = self.interpolation.max_distance_factor;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(RegridError::Config {
                message: format!(
                    "Invalid max distance factor: {}. Must be a positive number",
                    factor
                ),
            });
        }

        Ok(())
    }

    /// The configured interpolation method
    pub fn method(&self) -> Result<Method> {
        self.interpolation
            .method
            .parse()
            .map_err(|_| RegridError::Config {
                message: format!(
                    "Invalid interpolation method: {}. Must be one of: nearest, linear",
                    self.interpolation.method
                ),
            })
    }

    /// The configured outside-hull policy
    pub fn outside_hull(&self) -> Result<OutsideHullPolicy> {
        self.interpolation
            .outside_hull
            .parse()
            .map_err(|_| RegridError::Config {
                message: format!(
                    "Invalid outside-hull policy: {}. Must be one of: reject, nearest, extrapolate",
                    self.interpolation.outside_hull
                ),
            })
    }

    /// Builder options derived from this configuration
    pub fn build_options(&self) -> Result<BuildOptions> {
        Ok(BuildOptions {
            max_distance_factor: self.interpolation.max_distance_factor,
            outside_hull: self.outside_hull()?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interpolation: InterpolationConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            outside_hull: default_outside_hull(),
            max_distance_factor: default_max_distance_factor(),
        }
    }
}

// Default value functions for serde
fn default_method() -> String {
    "nearest".to_string()
}

fn default_outside_hull() -> String {
    "reject".to_string()
}

fn default_max_distance_factor() -> f64 {
    DEFAULT_MAX_DISTANCE_FACTOR
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["regrid", "request.json"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.interpolation.method, "nearest");
        assert_eq!(config.interpolation.outside_hull, "reject");
        assert_eq!(config.interpolation.max_distance_factor, 1.5);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_merge() {
        let mut config1 = Config::default();
        let mut config2 = Config::default();

        config2.interpolation.method = "linear".to_string();
        config2.log_level = "debug".to_string();

        config1.merge(config2);

        assert_eq!(config1.method().unwrap(), Method::Linear);
        assert_eq!(config1.log_level, "debug");
    }

    #[test]
    fn test_config_validation() {
        // Test invalid log level
        let mut config = Config::default();
        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());

        // Test invalid interpolation method
        let mut config = Config::default();
        config.interpolation.method = "bicubic".to_string();
        assert!(config.validate().is_err());

        // Test invalid policy
        let mut config = Config::default();
        config.interpolation.outside_hull = "wrap".to_string();
        assert!(config.validate().is_err());

        // Test invalid distance factor
        let mut config = Config::default();
        config.interpolation.max_distance_factor = 0.0;
        assert!(config.validate().is_err());
        config.interpolation.max_distance_factor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_then_args_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"interpolation": {{"method": "linear", "outside_hull": "extrapolate"}}, "log_level": "warn"}}"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = Config::from_args(&args(&["--config", &path])).unwrap();
        assert_eq!(config.method().unwrap(), Method::Linear);
        assert_eq!(config.outside_hull().unwrap(), OutsideHullPolicy::Extrapolate);
        // Missing keys fall back to defaults
        assert_eq!(config.interpolation.max_distance_factor, 1.5);
        assert_eq!(config.log_level, "warn");

        let config = Config::from_args(&args(&[
            "--config",
            &path,
            "--method",
            "nearest",
            "--max-distance-factor",
            "3",
        ]))
        .unwrap();
        assert_eq!(config.method().unwrap(), Method::Nearest);
        assert_eq!(config.build_options().unwrap().max_distance_factor, 3.0);
        assert_eq!(
            config.build_options().unwrap().outside_hull,
            OutsideHullPolicy::Extrapolate
        );
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::from_args(&args(&["--config", "/nonexistent/regrid.json"]));
        assert!(matches!(result, Err(RegridError::Io(_))));
    }
}
