// ABOUTME: Main library entry point for the meal plan generation engine
// ABOUTME: Wires repositories, translation, and planning into a per-user service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Meal Plan Engine
//!
//! Generates calorie-bounded, variety-constrained daily meal plans from a
//! recipe catalog and a user's planning profile.
//!
//! ## Features
//!
//! - **Recipe pools**: each user plans from a bounded, growing subset of the catalog
//! - **Daily assembly**: one recipe per meal slot inside a calorie window
//! - **Variety**: no repeats within a day or a rolling window of preceding days
//! - **Substitution**: swap a single recipe without touching the rest of the day
//! - **Pluggable stores**: in-memory and `SQLite` repositories behind async traits
//!
//! ## Architecture
//!
//! - **`mealplan-core`**: errors, constants and domain models
//! - **`mealplan-intelligence`**: calorie splitting, selection conditions,
//!   calorie targets and the random source, with no I/O
//! - **database**: repository ports and their stores
//! - **planning**: pool building, growth, assembly and substitution
//! - **services**: `MealPlanService`, the per-user serialized entry point
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mealplan_engine::config::EngineConfig;
//! use mealplan_engine::errors::AppResult;
//! use mealplan_engine::models::PlanningProfile;
//! use mealplan_engine::services::MealPlanService;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = EngineConfig::from_env()
//!         .map_err(|e| mealplan_engine::errors::AppError::config(e.to_string()))?;
//!     let service = MealPlanService::from_config(&config).await?;
//!
//!     let profile = PlanningProfile::new(uuid::Uuid::new_v4())
//!         .with_biometrics(70.0, 170.0, 30)
//!         .with_meal_count(3);
//!     let today = chrono::Utc::now().date_naive();
//!     let outcome = service.generate_day(&profile, today).await?;
//!     println!("{} meals, {} anomalies", outcome.value.map_or(0, |p| p.entries.len()), outcome.anomalies.len());
//!     Ok(())
//! }
//! ```

/// Configuration from environment variables
pub mod config;

/// Repository ports with in-memory and `SQLite` stores
pub mod database;

/// Unified error handling re-exported from `mealplan-core`
pub mod errors;

/// Translation queue for recipes lacking localized text
pub mod external;

/// Structured logging setup and planning log helpers
pub mod logging;

/// Planning engine
pub mod planning;

/// Service facade
pub mod services;

pub use mealplan_core::constants;
pub use mealplan_core::models;
pub use mealplan_intelligence as intelligence;
