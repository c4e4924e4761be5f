// ABOUTME: Core types and constants for the meal plan generation engine
// ABOUTME: Foundation crate with error handling, domain models, and planning defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Meal Plan Core
//!
//! Foundation crate providing shared types and constants for the meal plan
//! generation engine. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `DatabaseError`
//! - **constants**: Planning defaults (tolerance band, pool sizes, chances)
//! - **models**: Mealtimes, meal slots, recipes, planning profiles, plans and pools

/// Unified error handling system with standard error codes
pub mod errors;

/// Planning defaults organized by concern
pub mod constants;

/// Core data models (Recipe, `PlanningProfile`, `MealPlan`, `RecipePool`, etc.)
pub mod models;
