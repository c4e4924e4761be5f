// ABOUTME: Configuration module for embedding the meal plan engine
// ABOUTME: Re-exports environment parsing alongside the planning configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! - **Environment**: store location and logging from environment variables
//! - **Planning**: `PlanningConfig` lives in `mealplan-intelligence` and is
//!   re-exported here

/// Environment configuration
pub mod environment;

pub use environment::{DatabaseUrl, EngineConfig};
pub use mealplan_intelligence::config::{ConfigError, MealtimeRule, PlanningConfig};
