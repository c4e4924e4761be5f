// ABOUTME: Candidate-selection conditions shared by pool building, assembly, and substitution
// ABOUTME: Validated value type replacing loosely-typed condition arrays
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Selection Conditions
//!
//! A [`SelectionConditions`] value describes which catalog recipes may fill a
//! slot: the mealtime tag, a one-sided calorie window, quality limits, disease
//! conflicts and cuisine include/exclude lists, plus an optional bias list of
//! liked recipe identifiers. Values are validated at construction so stores
//! never see an inverted window or an empty bias list.

use crate::config::PlanningConfig;
use mealplan_core::errors::{AppError, ErrorCode};
use mealplan_core::models::{CuisineId, DiseaseFlags, Mealtime, PlanningProfile, Recipe, RecipeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a condition set cannot be built
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionsError {
    /// Calorie bounds are not finite or are negative
    #[error("calorie bounds must be finite and non-negative (min {min}, max {max})")]
    NonFiniteCalories {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// Lower calorie bound exceeds the upper bound
    #[error("calorie window is inverted: {min} > {max}")]
    InvertedWindow {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// Tolerance outside 0-100 percent
    #[error("calorie tolerance {0}% is outside 0-100")]
    ToleranceOutOfRange(f64),

    /// A bias restriction was requested with no identifiers
    #[error("bias list must not be empty")]
    EmptyBias,
}

impl From<ConditionsError> for AppError {
    fn from(error: ConditionsError) -> Self {
        Self::new(ErrorCode::ValueOutOfRange, error.to_string()).with_source(error)
    }
}

/// Inclusive calorie range a candidate must fall in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieWindow {
    min: f64,
    max: f64,
}

impl CalorieWindow {
    /// Build an explicit window
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is not finite, is negative, or `min > max`
    pub fn new(min: f64, max: f64) -> Result<Self, ConditionsError> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
            return Err(ConditionsError::NonFiniteCalories { min, max });
        }
        if min > max {
            return Err(ConditionsError::InvertedWindow { min, max });
        }
        Ok(Self { min, max })
    }

    /// Window `[target × (1 − tolerance/100), target]`
    ///
    /// The ceiling is the literal target; only the floor moves with tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerance is outside 0-100 or the target is invalid
    pub fn below_target(target_kcal: f64, tolerance_percent: f64) -> Result<Self, ConditionsError> {
        if !(0.0..=100.0).contains(&tolerance_percent) {
            return Err(ConditionsError::ToleranceOutOfRange(tolerance_percent));
        }
        Self::new(target_kcal * (1.0 - tolerance_percent / 100.0), target_kcal)
    }

    /// Lower bound (kcal)
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound (kcal)
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Whether a calorie value lies inside the window
    #[must_use]
    pub fn contains(&self, calories: f64) -> bool {
        calories >= self.min && calories <= self.max
    }
}

/// Explicit condition set for one candidate draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConditions {
    mealtime: Mealtime,
    calories: CalorieWindow,
    min_health_score: Option<u8>,
    max_prep_time_mins: Option<u16>,
    max_ingredients: u16,
    avoided_diseases: DiseaseFlags,
    cuisine_include: Option<Vec<CuisineId>>,
    cuisine_exclude: Vec<CuisineId>,
    bias_ids: Option<Vec<RecipeId>>,
}

impl SelectionConditions {
    /// Start a condition set for a mealtime and calorie window
    #[must_use]
    pub fn builder(mealtime: Mealtime, calories: CalorieWindow) -> SelectionConditionsBuilder {
        SelectionConditionsBuilder {
            conditions: Self {
                mealtime,
                calories,
                min_health_score: None,
                max_prep_time_mins: None,
                max_ingredients: u16::MAX,
                avoided_diseases: DiseaseFlags::empty(),
                cuisine_include: None,
                cuisine_exclude: Vec::new(),
                bias_ids: None,
            },
        }
    }

    /// Conditions for a profile's slot budget under a planning config
    ///
    /// # Errors
    ///
    /// Returns an error if the target or configured tolerance is invalid
    pub fn for_profile(
        profile: &PlanningProfile,
        config: &PlanningConfig,
        mealtime: Mealtime,
        kcal_target: f64,
    ) -> Result<Self, ConditionsError> {
        let window = CalorieWindow::below_target(kcal_target, config.calorie_tolerance_percent)?;
        let rule = config.mealtime_rules.for_mealtime(mealtime);

        let mut builder = Self::builder(mealtime, window)
            .max_ingredients(config.max_ingredients)
            .avoid_diseases(profile.avoided_diseases)
            .exclude_cuisines(profile.excluded_cuisines.clone())
            .include_cuisines(profile.preferred_cuisines.clone());
        if let Some(score) = rule.min_health_score {
            builder = builder.min_health_score(score);
        }
        if let Some(mins) = rule.max_prep_time_mins {
            builder = builder.max_prep_time(mins);
        }
        builder.build()
    }

    /// Mealtime tag required of candidates
    #[must_use]
    pub const fn mealtime(&self) -> Mealtime {
        self.mealtime
    }

    /// Calorie window
    #[must_use]
    pub const fn calories(&self) -> CalorieWindow {
        self.calories
    }

    /// Minimum health score
    #[must_use]
    pub const fn min_health_score(&self) -> Option<u8> {
        self.min_health_score
    }

    /// Maximum preparation time
    #[must_use]
    pub const fn max_prep_time_mins(&self) -> Option<u16> {
        self.max_prep_time_mins
    }

    /// Maximum ingredient count
    #[must_use]
    pub const fn max_ingredients(&self) -> u16 {
        self.max_ingredients
    }

    /// Diseases a candidate must not conflict with
    #[must_use]
    pub const fn avoided_diseases(&self) -> DiseaseFlags {
        self.avoided_diseases
    }

    /// Preferred cuisines, if restricted
    #[must_use]
    pub fn cuisine_include(&self) -> Option<&[CuisineId]> {
        self.cuisine_include.as_deref()
    }

    /// Excluded cuisines
    #[must_use]
    pub fn cuisine_exclude(&self) -> &[CuisineId] {
        &self.cuisine_exclude
    }

    /// Bias identifiers, if the draw is restricted to them
    #[must_use]
    pub fn bias_ids(&self) -> Option<&[RecipeId]> {
        self.bias_ids.as_deref()
    }

    /// Whether a preferred-cuisine restriction is active
    #[must_use]
    pub const fn has_cuisine_preference(&self) -> bool {
        self.cuisine_include.is_some()
    }

    /// Copy restricted to the given identifiers
    ///
    /// # Errors
    ///
    /// Returns [`ConditionsError::EmptyBias`] if `ids` is empty
    pub fn with_bias(&self, ids: Vec<RecipeId>) -> Result<Self, ConditionsError> {
        if ids.is_empty() {
            return Err(ConditionsError::EmptyBias);
        }
        let mut biased = self.clone();
        biased.bias_ids = Some(ids);
        Ok(biased)
    }

    /// Copy with the preferred-cuisine list dropped
    ///
    /// Excluded cuisines and avoided diseases are kept.
    #[must_use]
    pub fn without_cuisine_preference(&self) -> Self {
        let mut relaxed = self.clone();
        relaxed.cuisine_include = None;
        relaxed
    }

    /// Full catalog predicate used by stores for a random draw
    #[must_use]
    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.admits_pool_candidate(recipe)
            && self
                .min_health_score
                .is_none_or(|min| recipe.health_score >= min)
            && self
                .max_prep_time_mins
                .is_none_or(|max| recipe.prep_time_mins <= max)
            && recipe.ingredient_count <= self.max_ingredients
            && self.cuisine_include.as_ref().is_none_or(|include| {
                recipe.cuisine_id.is_some_and(|cuisine| include.contains(&cuisine))
            })
            && self
                .bias_ids
                .as_ref()
                .is_none_or(|bias| bias.contains(&recipe.id))
    }

    /// Predicate for recipes already in a user's pool
    ///
    /// Pool members passed the quality limits when they were drawn; at
    /// assembly time only the tag, the calorie window and the hard
    /// exclusions are rechecked.
    #[must_use]
    pub fn admits_pool_candidate(&self, recipe: &Recipe) -> bool {
        recipe.serves(self.mealtime)
            && self.calories.contains(recipe.calories)
            && !recipe.disease_conflicts.intersects(self.avoided_diseases)
            && recipe
                .cuisine_id
                .is_none_or(|cuisine| !self.cuisine_exclude.contains(&cuisine))
    }
}

/// Builder for [`SelectionConditions`]
#[derive(Debug, Clone)]
#[must_use]
pub struct SelectionConditionsBuilder {
    conditions: SelectionConditions,
}

impl SelectionConditionsBuilder {
    /// Require a minimum health score
    pub const fn min_health_score(mut self, score: u8) -> Self {
        self.conditions.min_health_score = Some(score);
        self
    }

    /// Cap preparation time
    pub const fn max_prep_time(mut self, mins: u16) -> Self {
        self.conditions.max_prep_time_mins = Some(mins);
        self
    }

    /// Cap ingredient count
    pub const fn max_ingredients(mut self, count: u16) -> Self {
        self.conditions.max_ingredients = count;
        self
    }

    /// Avoid recipes conflicting with these diseases
    pub const fn avoid_diseases(mut self, diseases: DiseaseFlags) -> Self {
        self.conditions.avoided_diseases = diseases;
        self
    }

    /// Restrict to preferred cuisines; an empty list means no restriction
    pub fn include_cuisines(mut self, cuisines: Vec<CuisineId>) -> Self {
        self.conditions.cuisine_include = (!cuisines.is_empty()).then_some(cuisines);
        self
    }

    /// Exclude cuisines
    pub fn exclude_cuisines(mut self, cuisines: Vec<CuisineId>) -> Self {
        self.conditions.cuisine_exclude = cuisines;
        self
    }

    /// Restrict the draw to bias identifiers
    pub fn bias(mut self, ids: Vec<RecipeId>) -> Self {
        self.conditions.bias_ids = Some(ids);
        self
    }

    /// Validate and finish
    ///
    /// # Errors
    ///
    /// Returns [`ConditionsError::EmptyBias`] if a bias list was set but is empty
    pub fn build(self) -> Result<SelectionConditions, ConditionsError> {
        if self
            .conditions
            .bias_ids
            .as_ref()
            .is_some_and(Vec::is_empty)
        {
            return Err(ConditionsError::EmptyBias);
        }
        Ok(self.conditions)
    }
}
