// ABOUTME: Service layer exposing the planning engine to embedding applications
// ABOUTME: Serializes mutating calls per user and wraps results with their anomalies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services are protocol-agnostic. A REST handler, a job runner or a test
//! calls the same entry points and receives the same `PlanOutcome`s.

/// Meal plan generation, substitution, and pool management
pub mod meal_plans;

pub use meal_plans::MealPlanService;
