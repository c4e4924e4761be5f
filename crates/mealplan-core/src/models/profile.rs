// ABOUTME: Planning profile snapshot derived from the user entity
// ABOUTME: Carries biometrics, meal count, exclusions, and language for plan generation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::mealtime::MealSlot;
use super::recipe::{CuisineId, DiseaseFlags};
use crate::constants::DEFAULT_LANGUAGE;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Biological sex used by BMR formulas
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
}

/// Body weight goal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightGoal {
    /// Caloric deficit
    Lose,
    /// Caloric balance
    #[default]
    Maintain,
    /// Caloric surplus
    Gain,
}

/// Activity level for TDEE calculation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    #[default]
    Sedentary,
    /// 1-3 days/week
    LightlyActive,
    /// 3-5 days/week
    ModeratelyActive,
    /// 6-7 days/week
    VeryActive,
    /// Hard training twice a day
    ExtraActive,
}

/// Supported number of meals per day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MealCount {
    /// Breakfast, lunch, dinner
    Three,
    /// Adds an afternoon snack
    Four,
    /// Adds morning and afternoon snacks
    Five,
}

impl MealCount {
    /// Recognize a configured meal count
    #[must_use]
    pub const fn from_count(count: u8) -> Option<Self> {
        match count {
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            5 => Some(Self::Five),
            _ => None,
        }
    }

    /// Slots served in day order
    #[must_use]
    pub const fn slots(&self) -> &'static [MealSlot] {
        match self {
            Self::Three => &[MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner],
            Self::Four => &[
                MealSlot::Breakfast,
                MealSlot::Lunch,
                MealSlot::AfternoonSnack,
                MealSlot::Dinner,
            ],
            Self::Five => &[
                MealSlot::Breakfast,
                MealSlot::MorningSnack,
                MealSlot::Lunch,
                MealSlot::AfternoonSnack,
                MealSlot::Dinner,
            ],
        }
    }

    /// Whether the profile eats snacks
    #[must_use]
    pub const fn includes_snacks(&self) -> bool {
        !matches!(self, Self::Three)
    }
}

/// Read-only snapshot of the user attributes the planner needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningProfile {
    /// Owner of the plan and pool
    pub user_id: Uuid,
    /// Body weight in kilograms
    pub weight_kg: Option<f64>,
    /// Height in centimeters
    pub height_cm: Option<f64>,
    /// Birth date, used to derive age
    pub birth_date: Option<NaiveDate>,
    /// Age in years when no birth date is known
    pub age_years: Option<u32>,
    /// Biological sex
    pub gender: Option<Gender>,
    /// Weight goal (defaults to maintain)
    pub weight_goal: Option<WeightGoal>,
    /// Activity level (defaults to sedentary)
    pub activity_level: Option<ActivityLevel>,
    /// Configured meals per day (3, 4 or 5)
    pub meal_count: u8,
    /// Diseases whose conflicting recipes must be avoided
    pub avoided_diseases: DiseaseFlags,
    /// Cuisines to prefer
    pub preferred_cuisines: Vec<CuisineId>,
    /// Cuisines to exclude
    pub excluded_cuisines: Vec<CuisineId>,
    /// Language code for recipe text
    pub language: String,
}

impl PlanningProfile {
    /// Create an empty profile with three meals per day
    #[must_use]
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            weight_kg: None,
            height_cm: None,
            birth_date: None,
            age_years: None,
            gender: None,
            weight_goal: None,
            activity_level: None,
            meal_count: 3,
            avoided_diseases: DiseaseFlags::empty(),
            preferred_cuisines: Vec::new(),
            excluded_cuisines: Vec::new(),
            language: DEFAULT_LANGUAGE.to_owned(),
        }
    }

    /// Set biometrics
    #[must_use]
    pub fn with_biometrics(mut self, weight_kg: f64, height_cm: f64, age_years: u32) -> Self {
        self.weight_kg = Some(weight_kg);
        self.height_cm = Some(height_cm);
        self.age_years = Some(age_years);
        self
    }

    /// Set gender
    #[must_use]
    pub const fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Set weight goal
    #[must_use]
    pub const fn with_goal(mut self, goal: WeightGoal) -> Self {
        self.weight_goal = Some(goal);
        self
    }

    /// Set activity level
    #[must_use]
    pub const fn with_activity(mut self, level: ActivityLevel) -> Self {
        self.activity_level = Some(level);
        self
    }

    /// Set meals per day
    #[must_use]
    pub const fn with_meal_count(mut self, meal_count: u8) -> Self {
        self.meal_count = meal_count;
        self
    }

    /// Set avoided diseases
    #[must_use]
    pub const fn with_avoided_diseases(mut self, diseases: DiseaseFlags) -> Self {
        self.avoided_diseases = diseases;
        self
    }

    /// Set preferred cuisines
    #[must_use]
    pub fn with_preferred_cuisines(mut self, cuisines: Vec<CuisineId>) -> Self {
        self.preferred_cuisines = cuisines;
        self
    }

    /// Set excluded cuisines
    #[must_use]
    pub fn with_excluded_cuisines(mut self, cuisines: Vec<CuisineId>) -> Self {
        self.excluded_cuisines = cuisines;
        self
    }

    /// Set language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Recognized meal count, if any
    #[must_use]
    pub const fn meal_count(&self) -> Option<MealCount> {
        MealCount::from_count(self.meal_count)
    }

    /// Age in whole years on the given day
    ///
    /// The birth date wins over a stored age when both are present.
    #[must_use]
    pub fn age_on(&self, day: NaiveDate) -> Option<u32> {
        self.birth_date.map_or(self.age_years, |birth| {
            let mut years = day.year() - birth.year();
            if (day.month(), day.day()) < (birth.month(), birth.day()) {
                years -= 1;
            }
            u32::try_from(years).ok()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_from_birth_date_before_birthday() {
        let mut profile = PlanningProfile::new(Uuid::new_v4());
        profile.birth_date = NaiveDate::from_ymd_opt(1990, 6, 15);
        let day = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap_or_default();
        assert_eq!(profile.age_on(day), Some(34));
        let day = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap_or_default();
        assert_eq!(profile.age_on(day), Some(35));
    }

    #[test]
    fn test_unrecognized_meal_count() {
        let profile = PlanningProfile::new(Uuid::new_v4()).with_meal_count(6);
        assert!(profile.meal_count().is_none());
        assert_eq!(MealCount::Five.slots().len(), 5);
    }
}
