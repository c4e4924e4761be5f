// ABOUTME: Environment configuration for the engine's store, logging, and planning settings
// ABOUTME: Parses DATABASE_URL into a typed location and loads planning overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration for embedding the engine

use crate::logging::LoggingConfig;
use anyhow::{Context, Result};
use mealplan_intelligence::PlanningConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Default `SQLite` file when `DATABASE_URL` is unset
const DEFAULT_DATABASE_PATH: &str = "./data/mealplans.db";

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from a connection string; bare paths are treated as `SQLite` files
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        match s.strip_prefix("sqlite:") {
            Some(":memory:") => Self::Memory,
            Some(path) => Self::SQLite {
                path: PathBuf::from(path.trim_start_matches("//")),
            },
            None => Self::SQLite {
                path: PathBuf::from(s),
            },
        }
    }

    /// Convert to a sqlx connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Everything needed to stand up a `MealPlanService`
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Store location
    pub database: DatabaseUrl,
    /// Log output settings
    pub logging: LoggingConfig,
    /// Planning parameters
    pub planning: PlanningConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a planning override cannot be parsed or the
    /// resulting planning configuration is invalid
    pub fn from_env() -> Result<Self> {
        let database = env::var("DATABASE_URL")
            .map(|url| DatabaseUrl::parse_url(&url))
            .unwrap_or_default();
        let planning = PlanningConfig::load().context("Invalid planning configuration")?;
        let config = Self {
            database,
            logging: LoggingConfig::from_env(),
            planning,
        };
        config.log_summary();
        Ok(config)
    }

    /// Log the effective configuration at startup
    pub fn log_summary(&self) {
        info!(
            database = %self.database,
            tolerance_percent = self.planning.calorie_tolerance_percent,
            first_week_pool_size = self.planning.first_week_pool_size,
            max_pool_size = self.planning.max_pool_size,
            ignore_window_days = self.planning.ignore_window_days,
            "Meal plan engine configuration loaded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_parsing() {
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:./test.db"),
            DatabaseUrl::SQLite {
                path: PathBuf::from("./test.db")
            }
        );
        assert!(DatabaseUrl::parse_url("sqlite::memory:").is_memory());
        assert_eq!(
            DatabaseUrl::parse_url("./some/path.db").to_connection_string(),
            "sqlite:./some/path.db"
        );
    }

    #[test]
    fn test_default_is_file() {
        assert!(!DatabaseUrl::default().is_memory());
    }
}
