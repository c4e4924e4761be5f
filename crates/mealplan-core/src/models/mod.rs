// ABOUTME: Domain models for meal planning shared by every workspace crate
// ABOUTME: Re-exports mealtime, recipe, profile, and plan types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Mealtime tags and meal slots
pub mod mealtime;
/// Daily meal plans and recipe pools
pub mod plan;
/// Planning profile snapshot
pub mod profile;
/// Recipe catalog model
pub mod recipe;

pub use mealtime::{MealSlot, Mealtime, MealtimeTags};
pub use plan::{MealCalorieTarget, MealEntry, MealPlan, RecipePool};
pub use profile::{ActivityLevel, Gender, MealCount, PlanningProfile, WeightGoal};
pub use recipe::{
    CuisineId, DiseaseFlags, LocalizedText, Recipe, RecipeId, RecipeProjection, RecipeView,
};
