// ABOUTME: Daily calorie target resolution from a planning profile's biometrics
// ABOUTME: Mifflin-St Jeor BMR with activity factor and weight goal adjustment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use mealplan_core::models::{ActivityLevel, Gender, PlanningProfile, WeightGoal};
use tracing::debug;

/// Resolves a profile to a daily kcal target
///
/// Returns `None` when the profile lacks the data needed for a target; the
/// engine reports that as an incomplete profile and writes nothing.
pub trait CalorieTargetResolver: Send + Sync {
    /// Daily kcal target on a given day
    fn daily_calories(&self, profile: &PlanningProfile, day: NaiveDate) -> Option<f64>;
}

/// Resolver returning the same target for every profile
#[derive(Debug, Clone, Copy)]
pub struct FixedCalorieTarget(pub f64);

impl CalorieTargetResolver for FixedCalorieTarget {
    fn daily_calories(&self, _profile: &PlanningProfile, _day: NaiveDate) -> Option<f64> {
        Some(self.0)
    }
}

/// Mifflin-St Jeor (1990) resolver
///
/// `BMR = 10 × weight_kg + 6.25 × height_cm − 5 × age + s`, where `s` is +5
/// for men and −161 for women. TDEE multiplies BMR by the activity factor
/// (McArdle et al. 2010), then the weight goal shifts the result.
#[derive(Debug, Clone)]
pub struct MifflinStJeorResolver {
    /// Multiplier for a weight-loss goal
    pub lose_factor: f64,
    /// Multiplier for a weight-gain goal
    pub gain_factor: f64,
    /// Lowest target ever returned (kcal)
    pub minimum_kcal: f64,
}

impl Default for MifflinStJeorResolver {
    fn default() -> Self {
        Self {
            lose_factor: 0.80,
            gain_factor: 1.15,
            minimum_kcal: 1200.0,
        }
    }
}

const MALE_CONSTANT: f64 = 5.0;
const FEMALE_CONSTANT: f64 = -161.0;

impl MifflinStJeorResolver {
    /// Basal metabolic rate in kcal/day
    #[must_use]
    pub fn bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Option<Gender>) -> f64 {
        let sex_constant = match gender {
            Some(Gender::Male) => MALE_CONSTANT,
            Some(Gender::Female) => FEMALE_CONSTANT,
            None => (MALE_CONSTANT + FEMALE_CONSTANT) / 2.0,
        };
        10.0f64.mul_add(
            weight_kg,
            6.25f64.mul_add(height_cm, 5.0f64.mul_add(-f64::from(age), sex_constant)),
        )
    }

    /// Activity multiplier applied to BMR
    #[must_use]
    pub const fn activity_factor(level: ActivityLevel) -> f64 {
        match level {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    const fn goal_factor(&self, goal: WeightGoal) -> f64 {
        match goal {
            WeightGoal::Lose => self.lose_factor,
            WeightGoal::Maintain => 1.0,
            WeightGoal::Gain => self.gain_factor,
        }
    }
}

impl CalorieTargetResolver for MifflinStJeorResolver {
    fn daily_calories(&self, profile: &PlanningProfile, day: NaiveDate) -> Option<f64> {
        let weight = profile.weight_kg?;
        let height = profile.height_cm?;
        let age = profile.age_on(day)?;

        if !(weight > 0.0 && weight <= 300.0 && height > 0.0 && height <= 300.0) {
            debug!(user.id = %profile.user_id, weight, height, "Biometrics out of range");
            return None;
        }

        let bmr = Self::bmr(weight, height, age, profile.gender);
        let tdee = bmr * Self::activity_factor(profile.activity_level.unwrap_or_default());
        let target = tdee * self.goal_factor(profile.weight_goal.unwrap_or_default());

        Some(target.max(self.minimum_kcal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn test_missing_biometrics_yield_none() {
        let resolver = MifflinStJeorResolver::default();
        let profile = PlanningProfile::new(Uuid::new_v4());
        assert!(resolver.daily_calories(&profile, day()).is_none());

        let mut partial = PlanningProfile::new(Uuid::new_v4());
        partial.weight_kg = Some(70.0);
        partial.height_cm = Some(170.0);
        assert!(resolver.daily_calories(&partial, day()).is_none());
    }

    #[test]
    fn test_male_lose_sedentary() {
        let resolver = MifflinStJeorResolver::default();
        let profile = PlanningProfile::new(Uuid::new_v4())
            .with_biometrics(70.0, 170.0, 30)
            .with_gender(Gender::Male)
            .with_goal(WeightGoal::Lose);
        // BMR 1617.5, x1.2 = 1941, x0.8 = 1552.8
        let kcal = resolver.daily_calories(&profile, day()).unwrap();
        assert!((kcal - 1552.8).abs() < 0.01);
    }

    #[test]
    fn test_defaults_and_floor() {
        let resolver = MifflinStJeorResolver::default();
        let profile = PlanningProfile::new(Uuid::new_v4())
            .with_biometrics(40.0, 140.0, 80)
            .with_gender(Gender::Female)
            .with_goal(WeightGoal::Lose);
        let kcal = resolver.daily_calories(&profile, day()).unwrap();
        assert!((kcal - 1200.0).abs() < f64::EPSILON);

        let unknown_sex = PlanningProfile::new(Uuid::new_v4()).with_biometrics(70.0, 170.0, 30);
        let male = unknown_sex.clone().with_gender(Gender::Male);
        let female = unknown_sex.clone().with_gender(Gender::Female);
        let mid = resolver.daily_calories(&unknown_sex, day()).unwrap();
        assert!(mid < resolver.daily_calories(&male, day()).unwrap());
        assert!(mid > resolver.daily_calories(&female, day()).unwrap());
    }

    #[test]
    fn test_fixed_target() {
        let profile = PlanningProfile::new(Uuid::new_v4());
        assert_eq!(
            FixedCalorieTarget(1800.0).daily_calories(&profile, day()),
            Some(1800.0)
        );
    }
}
