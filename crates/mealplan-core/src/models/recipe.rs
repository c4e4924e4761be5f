// ABOUTME: Read-only recipe catalog model consumed by the planning engine
// ABOUTME: Defines Recipe, DiseaseFlags, LocalizedText, and the RecipeView payload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::mealtime::{Mealtime, MealtimeTags};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catalog identifier of a recipe
pub type RecipeId = i64;

/// Catalog identifier of a cuisine
pub type CuisineId = i64;

bitflags! {
    /// Health conditions a recipe conflicts with
    ///
    /// A profile's avoided diseases and a recipe's conflicts must not
    /// intersect for the recipe to be eligible.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DiseaseFlags: u16 {
        /// Diabetes (high glycemic load)
        const DIABETES = 1 << 0;
        /// Hypertension (high sodium)
        const HYPERTENSION = 1 << 1;
        /// Celiac disease (gluten)
        const CELIAC = 1 << 2;
        /// Lactose intolerance (dairy)
        const LACTOSE_INTOLERANCE = 1 << 3;
        /// Gout (high purine)
        const GOUT = 1 << 4;
        /// Chronic kidney disease (high potassium/phosphorus)
        const KIDNEY_DISEASE = 1 << 5;
        /// Cardiovascular disease (saturated fat)
        const HEART_DISEASE = 1 << 6;
        /// Irritable bowel syndrome (high FODMAP)
        const IBS = 1 << 7;
    }
}

impl DiseaseFlags {
    /// Map a profile disease code to its flag
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "diabetes" => Some(Self::DIABETES),
            "hypertension" => Some(Self::HYPERTENSION),
            "celiac" => Some(Self::CELIAC),
            "lactose_intolerance" | "lactose" => Some(Self::LACTOSE_INTOLERANCE),
            "gout" => Some(Self::GOUT),
            "kidney_disease" | "kidney" => Some(Self::KIDNEY_DISEASE),
            "heart_disease" | "cardiovascular" => Some(Self::HEART_DISEASE),
            "ibs" => Some(Self::IBS),
            _ => None,
        }
    }

    /// Combine a list of disease codes, ignoring unknown ones
    #[must_use]
    pub fn from_codes<S: AsRef<str>>(codes: &[S]) -> Self {
        codes
            .iter()
            .filter_map(|code| Self::from_code(code.as_ref()))
            .fold(Self::empty(), |acc, flag| acc | flag)
    }
}

/// Name and preparation text of a recipe in one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// Display name
    pub name: String,
    /// Preparation steps, if translated
    pub preparation: Option<String>,
}

impl LocalizedText {
    /// Create localized text with a name only
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preparation: None,
        }
    }

    /// Add preparation text
    #[must_use]
    pub fn with_preparation(mut self, preparation: impl Into<String>) -> Self {
        self.preparation = Some(preparation.into());
        self
    }
}

/// How much of a recipe a batch fetch should load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecipeProjection {
    /// Planning attributes only (calories, tags, scores, conflicts)
    #[default]
    Planning,
    /// Planning attributes plus every localized text
    Full,
}

/// A catalog recipe as seen by the planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Catalog identifier
    pub id: RecipeId,
    /// Calories per serving (kcal)
    pub calories: f64,
    /// Mealtimes this recipe can serve
    pub mealtimes: MealtimeTags,
    /// Number of ingredients
    pub ingredient_count: u16,
    /// Preparation time in minutes
    pub prep_time_mins: u16,
    /// Health score (0-100)
    pub health_score: u8,
    /// Cuisine, if classified
    pub cuisine_id: Option<CuisineId>,
    /// Health conditions this recipe conflicts with
    pub disease_conflicts: DiseaseFlags,
    /// Localized text keyed by language code
    #[serde(default)]
    pub localized: BTreeMap<String, LocalizedText>,
}

impl Recipe {
    /// Create a recipe with its planning attributes
    #[must_use]
    pub fn new(id: RecipeId, calories: f64, mealtimes: MealtimeTags) -> Self {
        Self {
            id,
            calories,
            mealtimes,
            ingredient_count: 0,
            prep_time_mins: 0,
            health_score: 0,
            cuisine_id: None,
            disease_conflicts: DiseaseFlags::empty(),
            localized: BTreeMap::new(),
        }
    }

    /// Set ingredient count
    #[must_use]
    pub const fn with_ingredients(mut self, count: u16) -> Self {
        self.ingredient_count = count;
        self
    }

    /// Set preparation time
    #[must_use]
    pub const fn with_prep_time(mut self, mins: u16) -> Self {
        self.prep_time_mins = mins;
        self
    }

    /// Set health score
    #[must_use]
    pub const fn with_health_score(mut self, score: u8) -> Self {
        self.health_score = score;
        self
    }

    /// Set cuisine
    #[must_use]
    pub const fn with_cuisine(mut self, cuisine_id: CuisineId) -> Self {
        self.cuisine_id = Some(cuisine_id);
        self
    }

    /// Set disease conflicts
    #[must_use]
    pub const fn with_disease_conflicts(mut self, conflicts: DiseaseFlags) -> Self {
        self.disease_conflicts = conflicts;
        self
    }

    /// Add localized text for a language
    #[must_use]
    pub fn with_translation(mut self, language: impl Into<String>, text: LocalizedText) -> Self {
        self.localized.insert(language.into(), text);
        self
    }

    /// Whether the recipe can serve the given mealtime
    #[must_use]
    pub const fn serves(&self, mealtime: Mealtime) -> bool {
        self.mealtimes.serves(mealtime)
    }

    /// Whether a name exists in the given language
    #[must_use]
    pub fn has_translation(&self, language: &str) -> bool {
        self.localized.contains_key(language)
    }

    /// Localized text for a language, falling back to the given language, then any
    #[must_use]
    pub fn localized_text(&self, language: &str, fallback: &str) -> Option<&LocalizedText> {
        self.localized
            .get(language)
            .or_else(|| self.localized.get(fallback))
            .or_else(|| self.localized.values().next())
    }
}

/// Recipe payload shaped for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeView {
    /// Catalog identifier
    pub id: RecipeId,
    /// Calories per serving (kcal)
    pub calories: f64,
    /// Language the text is in (None when the recipe has no text at all)
    pub language: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Preparation text
    pub preparation: Option<String>,
}

impl RecipeView {
    /// Shape a recipe for the requested language
    #[must_use]
    pub fn localize(recipe: &Recipe, language: &str, fallback: &str) -> Self {
        let chosen = [language, fallback]
            .into_iter()
            .find(|lang| recipe.has_translation(lang))
            .map(str::to_owned)
            .or_else(|| recipe.localized.keys().next().cloned());
        let text = recipe.localized_text(language, fallback);

        Self {
            id: recipe.id,
            calories: recipe.calories,
            language: chosen,
            name: text.map(|t| t.name.clone()),
            preparation: text.and_then(|t| t.preparation.clone()),
        }
    }
}
