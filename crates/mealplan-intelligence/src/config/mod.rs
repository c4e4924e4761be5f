// ABOUTME: Configuration module for mealplan-intelligence crate
// ABOUTME: Re-exports planning configuration types and errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Configuration error types
pub mod error;
/// Planning configuration (tolerances, pool sizing, chances, rules)
pub mod planning;

pub use error::ConfigError;
pub use planning::{MealtimeRule, MealtimeRules, MealtimeShares, PlanningConfig, PoolProportions};
