// ABOUTME: Planning configuration for pool building, daily assembly, and substitution
// ABOUTME: Defaults plus MEALPLAN_* environment overrides, validated before use
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Planning Configuration
//!
//! Every tunable of the planning engine lives here. Values are loaded from
//! defaults, then overridden from `MEALPLAN_*` environment variables, then
//! validated. There is no global instance: callers own their config and hand
//! it to the engine.

use super::error::ConfigError;
use mealplan_core::constants::planning as defaults;
use mealplan_core::models::{MealCount, Mealtime};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Per-mealtime quality constraints applied when drawing candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealtimeRule {
    /// Minimum health score, if constrained
    pub min_health_score: Option<u8>,
    /// Maximum preparation time in minutes, if constrained
    pub max_prep_time_mins: Option<u16>,
}

/// Quality rules for each mealtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealtimeRules {
    /// Breakfast rule
    pub breakfast: MealtimeRule,
    /// Lunch rule
    pub lunch: MealtimeRule,
    /// Dinner rule
    pub dinner: MealtimeRule,
    /// Snack rule
    pub snack: MealtimeRule,
}

impl MealtimeRules {
    /// Rule for a mealtime
    #[must_use]
    pub const fn for_mealtime(&self, mealtime: Mealtime) -> MealtimeRule {
        match mealtime {
            Mealtime::Breakfast => self.breakfast,
            Mealtime::Lunch => self.lunch,
            Mealtime::Dinner => self.dinner,
            Mealtime::Snack => self.snack,
        }
    }
}

/// Fraction of the pool reserved for each mealtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MealtimeShares {
    /// Breakfast share
    pub breakfast: f64,
    /// Lunch share
    pub lunch: f64,
    /// Dinner share
    pub dinner: f64,
    /// Snack share
    pub snack: f64,
}

impl MealtimeShares {
    fn sum(&self) -> f64 {
        self.breakfast + self.lunch + self.dinner + self.snack
    }

    /// Non-zero shares in mealtime order
    #[must_use]
    pub fn entries(&self) -> Vec<(Mealtime, f64)> {
        [
            (Mealtime::Breakfast, self.breakfast),
            (Mealtime::Lunch, self.lunch),
            (Mealtime::Dinner, self.dinner),
            (Mealtime::Snack, self.snack),
        ]
        .into_iter()
        .filter(|(_, share)| *share > 0.0)
        .collect()
    }

    /// Split `total` draws across mealtimes by share
    ///
    /// Counts always sum to `total`. Floors are taken first and the
    /// remainder goes to the largest fractional parts, earlier mealtimes
    /// winning ties.
    #[must_use]
    pub fn apportion(&self, total: usize) -> Vec<(Mealtime, usize)> {
        let entries = self.entries();
        let sum: f64 = entries.iter().map(|(_, share)| share).sum();
        if entries.is_empty() || sum <= 0.0 {
            return Vec::new();
        }

        let quotas: Vec<f64> = entries
            .iter()
            .map(|(_, share)| total as f64 * share / sum)
            .collect();
        let mut counts: Vec<usize> = quotas.iter().map(|quota| quota.floor() as usize).collect();
        let assigned: usize = counts.iter().sum();

        let mut by_fraction: Vec<usize> = (0..quotas.len()).collect();
        by_fraction.sort_by(|&a, &b| {
            let fraction = |i: usize| quotas[i] - quotas[i].floor();
            fraction(b).total_cmp(&fraction(a))
        });
        for &index in by_fraction.iter().take(total.saturating_sub(assigned)) {
            counts[index] += 1;
        }

        entries
            .into_iter()
            .zip(counts)
            .map(|((mealtime, _), count)| (mealtime, count))
            .collect()
    }
}

/// Pool proportions keyed by meal count family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolProportions {
    /// Three meals a day (no snacks)
    pub three_meals: MealtimeShares,
    /// Four or five meals a day (with snacks)
    pub with_snacks: MealtimeShares,
}

impl PoolProportions {
    /// Shares for a meal count
    #[must_use]
    pub const fn for_meal_count(&self, meal_count: MealCount) -> &MealtimeShares {
        if meal_count.includes_snacks() {
            &self.with_snacks
        } else {
            &self.three_meals
        }
    }
}

/// Planning engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Width of the calorie band below each slot target, in percent
    pub calorie_tolerance_percent: f64,
    /// Identifiers drawn when a pool is first built
    pub first_week_pool_size: usize,
    /// Hard cap on pool size
    pub max_pool_size: usize,
    /// Identifiers requested per growth
    pub growth_batch_size: usize,
    /// Days of history excluded from reselection
    pub ignore_window_days: u32,
    /// Chance (0-100) that yesterday's dinner becomes today's lunch
    pub lunch_repeat_chance_percent: u8,
    /// Chance (0-100) that a draw first tries liked recipes
    pub like_bias_chance_percent: u8,
    /// Maximum ingredient count for any candidate
    pub max_ingredients: u16,
    /// Quality rules per mealtime
    pub mealtime_rules: MealtimeRules,
    /// Pool proportions per meal count family
    pub pool_proportions: PoolProportions,
    /// Draws slower than this are reported as slow queries (ms)
    pub query_budget_ms: u64,
    /// Repository calls are abandoned after this deadline (ms)
    pub query_deadline_ms: u64,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            calorie_tolerance_percent: defaults::CALORIE_TOLERANCE_PERCENT,
            first_week_pool_size: defaults::FIRST_WEEK_POOL_SIZE,
            max_pool_size: defaults::MAX_POOL_SIZE,
            growth_batch_size: defaults::GROWTH_BATCH_SIZE,
            ignore_window_days: defaults::IGNORE_WINDOW_DAYS,
            lunch_repeat_chance_percent: defaults::LUNCH_REPEAT_CHANCE_PERCENT,
            like_bias_chance_percent: defaults::LIKE_BIAS_CHANCE_PERCENT,
            max_ingredients: defaults::MAX_INGREDIENTS,
            mealtime_rules: Self::default_mealtime_rules(),
            pool_proportions: Self::default_pool_proportions(),
            query_budget_ms: defaults::QUERY_BUDGET_MS,
            query_deadline_ms: defaults::QUERY_DEADLINE_MS,
        }
    }
}

impl PlanningConfig {
    const fn default_mealtime_rules() -> MealtimeRules {
        MealtimeRules {
            breakfast: MealtimeRule {
                min_health_score: Some(50),
                max_prep_time_mins: Some(20),
            },
            lunch: MealtimeRule {
                min_health_score: Some(40),
                max_prep_time_mins: Some(45),
            },
            dinner: MealtimeRule {
                min_health_score: Some(40),
                max_prep_time_mins: Some(60),
            },
            snack: MealtimeRule {
                min_health_score: None,
                max_prep_time_mins: Some(15),
            },
        }
    }

    const fn default_pool_proportions() -> PoolProportions {
        PoolProportions {
            three_meals: MealtimeShares {
                breakfast: 0.30,
                lunch: 0.35,
                dinner: 0.35,
                snack: 0.0,
            },
            with_snacks: MealtimeShares {
                breakfast: 0.25,
                lunch: 0.30,
                dinner: 0.30,
                snack: 0.15,
            },
        }
    }

    /// Load configuration from defaults and environment
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an unparsable value
    /// or the resulting configuration fails validation
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Tolerance as a fraction (25% -> 0.25)
    #[must_use]
    pub fn tolerance_fraction(&self) -> f64 {
        self.calorie_tolerance_percent / 100.0
    }

    /// Slow-query budget
    #[must_use]
    pub const fn query_budget(&self) -> Duration {
        Duration::from_millis(self.query_budget_ms)
    }

    /// Hard deadline for repository calls
    #[must_use]
    pub const fn query_deadline(&self) -> Duration {
        Duration::from_millis(self.query_deadline_ms)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..100.0).contains(&self.calorie_tolerance_percent) {
            return Err(ConfigError::ValueOutOfRange(
                "calorie_tolerance_percent must be in [0, 100)",
            ));
        }
        if self.lunch_repeat_chance_percent > 100 || self.like_bias_chance_percent > 100 {
            return Err(ConfigError::ValueOutOfRange(
                "chance percentages must be in [0, 100]",
            ));
        }
        if self.max_pool_size == 0 {
            return Err(ConfigError::ValueOutOfRange("max_pool_size must be positive"));
        }
        if self.first_week_pool_size > self.max_pool_size {
            return Err(ConfigError::InvalidRange(
                "first_week_pool_size must be <= max_pool_size",
            ));
        }
        if self.max_ingredients == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "max_ingredients must be positive",
            ));
        }
        if self.query_budget_ms > self.query_deadline_ms {
            return Err(ConfigError::InvalidRange(
                "query_budget_ms must be <= query_deadline_ms",
            ));
        }

        for shares in [
            &self.pool_proportions.three_meals,
            &self.pool_proportions.with_snacks,
        ] {
            if [shares.breakfast, shares.lunch, shares.dinner, shares.snack]
                .iter()
                .any(|s| *s < 0.0)
            {
                return Err(ConfigError::ValueOutOfRange(
                    "pool proportions must not be negative",
                ));
            }
            if (shares.sum() - 1.0).abs() > 0.01 {
                return Err(ConfigError::InvalidWeights(
                    "pool proportions must sum to 1.0",
                ));
            }
        }

        if self.pool_proportions.three_meals.snack > 0.0 {
            return Err(ConfigError::InvalidWeights(
                "three-meal pool proportions cannot reserve snacks",
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        override_from_env(
            "MEALPLAN_CALORIE_TOLERANCE_PERCENT",
            &mut self.calorie_tolerance_percent,
        )?;
        override_from_env(
            "MEALPLAN_FIRST_WEEK_POOL_SIZE",
            &mut self.first_week_pool_size,
        )?;
        override_from_env("MEALPLAN_MAX_POOL_SIZE", &mut self.max_pool_size)?;
        override_from_env("MEALPLAN_GROWTH_BATCH_SIZE", &mut self.growth_batch_size)?;
        override_from_env("MEALPLAN_IGNORE_WINDOW_DAYS", &mut self.ignore_window_days)?;
        override_from_env(
            "MEALPLAN_LUNCH_REPEAT_CHANCE",
            &mut self.lunch_repeat_chance_percent,
        )?;
        override_from_env(
            "MEALPLAN_LIKE_BIAS_CHANCE",
            &mut self.like_bias_chance_percent,
        )?;
        override_from_env("MEALPLAN_MAX_INGREDIENTS", &mut self.max_ingredients)?;
        override_from_env("MEALPLAN_QUERY_BUDGET_MS", &mut self.query_budget_ms)?;
        override_from_env("MEALPLAN_QUERY_DEADLINE_MS", &mut self.query_deadline_ms)?;
        Ok(self)
    }
}

fn override_from_env<T: FromStr>(name: &str, target: &mut T) -> Result<(), ConfigError> {
    if let Ok(val) = env::var(name) {
        *target = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse(format!("Invalid {name}: {val}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(PlanningConfig::default().validate().is_ok());
    }

    #[test]
    fn test_budget_above_deadline_rejected() {
        let config = PlanningConfig {
            query_budget_ms: 10_000,
            query_deadline_ms: 1_000,
            ..PlanningConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_proportions_must_sum_to_one() {
        let mut config = PlanningConfig::default();
        config.pool_proportions.with_snacks.snack = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeights(_))
        ));
    }

    #[test]
    fn test_apportion_sums_to_total() {
        let config = PlanningConfig::default();
        let three = config.pool_proportions.three_meals.apportion(42);
        assert_eq!(
            three,
            vec![
                (Mealtime::Breakfast, 12),
                (Mealtime::Lunch, 15),
                (Mealtime::Dinner, 15),
            ]
        );

        let with_snacks = config.pool_proportions.with_snacks.apportion(42);
        assert_eq!(with_snacks.iter().map(|(_, n)| n).sum::<usize>(), 42);
        assert!(with_snacks.contains(&(Mealtime::Snack, 6)));

        for total in [0, 1, 3, 10, 43, 150] {
            let counts = config.pool_proportions.three_meals.apportion(total);
            assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), total);
        }
    }

    #[test]
    fn test_shares_for_meal_count() {
        let config = PlanningConfig::default();
        let three = config.pool_proportions.for_meal_count(MealCount::Three);
        assert!(three.entries().iter().all(|(m, _)| *m != Mealtime::Snack));
        let five = config.pool_proportions.for_meal_count(MealCount::Five);
        assert_eq!(five.entries().len(), 4);
    }
}
