// ABOUTME: Meal planning algorithms extracted from the engine for modularity
// ABOUTME: Calorie splitting, selection conditions, calorie targets, and random sources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Meal Plan Intelligence
//!
//! Pure planning computations with no I/O. The engine crate wires these to
//! repositories, locks and logging.
//!
//! - **config**: `PlanningConfig` with environment overrides and validation
//! - **`meal_split`**: daily kcal target to per-slot budgets
//! - **conditions**: validated `SelectionConditions` for candidate draws
//! - **`calorie_target`**: biometrics to daily kcal (Mifflin-St Jeor)
//! - **random**: injectable random source for chance rolls and shuffles

/// Planning configuration and validation
pub mod config;

/// Daily calorie target to per-slot budgets
pub mod meal_split;

/// Candidate selection conditions
pub mod conditions;

/// Daily calorie target resolution from biometrics
pub mod calorie_target;

/// Random source abstraction
pub mod random;

pub use calorie_target::{CalorieTargetResolver, FixedCalorieTarget, MifflinStJeorResolver};
pub use conditions::{CalorieWindow, ConditionsError, SelectionConditions};
pub use config::{ConfigError, MealtimeRule, PlanningConfig, PoolProportions};
pub use meal_split::split_daily_calories;
pub use random::{shuffle, ChaChaRandom, RandomSource};
