// ABOUTME: Daily plan assembler selecting one pool recipe per meal slot for a calendar day
// ABOUTME: Honors calorie windows, exclusions, the rolling no-repeat window, and lunch repeats
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Daily Plan Assembler
//!
//! Assembly for one day:
//!
//! 1. Resolve the daily kcal target and split it into slot budgets.
//! 2. Load (or build) the user's pool and the ignore window of the
//!    preceding days.
//! 3. Optionally reuse yesterday's dinner as today's lunch.
//! 4. Fill every other slot with the first shuffled pool candidate inside the
//!    slot's calorie window that is not excluded, not used today and, except
//!    for snacks, not in the ignore window. A miss grows the pool once for
//!    that mealtime before the slot is given up.
//! 5. Upsert the day.

use super::observability::AnomalyLog;
use super::outcome::Anomaly;
use super::pool_builder::PoolBuilder;
use super::pool_grower::PoolGrower;
use super::resources::PlannerResources;
use crate::errors::AppResult;
use crate::logging::PlanningLogger;
use chrono::{Days, NaiveDate};
use mealplan_core::models::{
    MealCalorieTarget, MealEntry, MealPlan, MealSlot, Mealtime, PlanningProfile, Recipe,
    RecipeId, RecipeProjection,
};
use mealplan_intelligence::{random::shuffle, split_daily_calories, SelectionConditions};
use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

/// Picks the first recipe admitted by `conditions` that the day may still use
fn first_fit<'r>(
    candidates: impl IntoIterator<Item = &'r Recipe>,
    conditions: &SelectionConditions,
    used_today: &HashSet<RecipeId>,
    ignore_window: &HashSet<RecipeId>,
) -> Option<&'r Recipe> {
    let cross_day_repeat = conditions.mealtime().allows_cross_day_repeat();
    candidates.into_iter().find(|recipe| {
        conditions.admits_pool_candidate(recipe)
            && !used_today.contains(&recipe.id)
            && (cross_day_repeat || !ignore_window.contains(&recipe.id))
    })
}

/// Assembles and persists one day's meal plan
pub struct PlanAssembler<'a> {
    resources: &'a PlannerResources,
}

impl<'a> PlanAssembler<'a> {
    /// Assembler over shared resources
    #[must_use]
    pub const fn new(resources: &'a PlannerResources) -> Self {
        Self { resources }
    }

    /// Generate and persist the plan for `day`
    ///
    /// Returns `Ok(None)` when no target can be derived, no pool can be built
    /// or no slot could be filled; the reasons are recorded in `log`. Slots
    /// without a candidate are omitted from a partial day.
    ///
    /// # Errors
    ///
    /// Returns an error if a repository read fails or the plan cannot be persisted
    pub async fn assemble(
        &self,
        profile: &PlanningProfile,
        day: NaiveDate,
        log: &mut AnomalyLog<'_>,
    ) -> AppResult<Option<MealPlan>> {
        let resources = self.resources;
        let config = resources.config.as_ref();
        let user_id = profile.user_id;

        let Some(daily_kcal) = resources.resolver.daily_calories(profile, day) else {
            warn!(user.id = %user_id, plan.day = %day, "Profile incomplete, no calorie target");
            log.record(Anomaly::ProfileIncomplete);
            return Ok(None);
        };

        let targets = split_daily_calories(daily_kcal, profile.meal_count);
        if targets.is_empty() {
            log.record(Anomaly::UnsupportedMealCount {
                meal_count: profile.meal_count,
            });
            return Ok(None);
        }

        let Some(mut pool) = PoolBuilder::new(resources).ensure(profile, &targets, log).await?
        else {
            return Ok(None);
        };

        let (ignore_window, yesterday) = self.history(user_id, day, log).await?;

        let mut candidates = resources
            .timed(
                "recipes.find_by_ids",
                log,
                resources
                    .recipes
                    .find_by_ids(&pool.recipe_ids, RecipeProjection::Planning, pool.len()),
            )
            .await?
            .unwrap_or_default();
        shuffle(resources.random.as_ref(), &mut candidates);

        let mut used_today: HashSet<RecipeId> = HashSet::new();
        let mut chosen: Vec<(MealSlot, Recipe)> = Vec::with_capacity(targets.len());

        let lunch_repeat = self.lunch_repeat(yesterday.as_ref(), &candidates);
        if let Some(recipe) = &lunch_repeat {
            debug!(user.id = %user_id, recipe.id = recipe.id, "Repeating yesterday's dinner as lunch");
            used_today.insert(recipe.id);
        }

        for target in &targets {
            if target.slot == MealSlot::Lunch {
                if let Some(recipe) = lunch_repeat.clone() {
                    chosen.push((target.slot, recipe));
                    continue;
                }
            }

            let mealtime = target.slot.mealtime();
            let conditions =
                SelectionConditions::for_profile(profile, config, mealtime, target.kcal_target)?;

            let mut pick = first_fit(&candidates, &conditions, &used_today, &ignore_window).cloned();
            if pick.is_none() {
                let growth = PoolGrower::new(resources)
                    .grow(
                        profile,
                        &targets,
                        pool,
                        config.growth_batch_size,
                        Some(std::slice::from_ref(&mealtime)),
                        log,
                    )
                    .await?;
                pool = growth.pool;
                pick = first_fit(&growth.added, &conditions, &used_today, &ignore_window).cloned();
                candidates.extend(growth.added);
            }

            match pick {
                Some(recipe) => {
                    used_today.insert(recipe.id);
                    chosen.push((target.slot, recipe));
                }
                None => log.record(Anomaly::SlotUnfilled { slot: target.slot }),
            }
        }

        self.check_total(daily_kcal, &chosen, log);

        if chosen.is_empty() {
            return Ok(None);
        }

        let entries: Vec<MealEntry> = chosen
            .iter()
            .map(|(slot, recipe)| MealEntry::new(*slot, recipe.id))
            .collect();
        let plan = resources
            .timed_write(
                "plans.upsert",
                log,
                resources.plans.upsert(user_id, day, &entries),
            )
            .await?;

        PlanningLogger::log_plan_generated(
            user_id,
            day,
            plan.entries.len(),
            targets.len(),
            log.as_slice().len(),
        );
        Ok(Some(plan))
    }

    /// Recipe ids used in the ignore window, plus yesterday's plan
    async fn history(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        log: &mut AnomalyLog<'_>,
    ) -> AppResult<(HashSet<RecipeId>, Option<MealPlan>)> {
        let resources = self.resources;
        let Some(previous_day) = day.checked_sub_days(Days::new(1)) else {
            return Ok((HashSet::new(), None));
        };
        let window_days = u64::from(resources.config.ignore_window_days);

        if window_days == 0 {
            let yesterday = resources
                .timed("plans.get", log, resources.plans.get(user_id, previous_day))
                .await?
                .flatten();
            return Ok((HashSet::new(), yesterday));
        }

        let window_start = day
            .checked_sub_days(Days::new(window_days))
            .unwrap_or(NaiveDate::MIN);
        let plans = resources
            .timed(
                "plans.get_range",
                log,
                resources.plans.get_range(user_id, window_start, previous_day),
            )
            .await?
            .unwrap_or_default();

        let ignore_window: HashSet<RecipeId> =
            plans.iter().flat_map(MealPlan::recipe_ids).collect();
        let yesterday = plans.into_iter().find(|plan| plan.day == previous_day);
        Ok((ignore_window, yesterday))
    }

    /// Yesterday's dinner, when the roll succeeds and it is a lunch-tagged pool recipe
    fn lunch_repeat(&self, yesterday: Option<&MealPlan>, candidates: &[Recipe]) -> Option<Recipe> {
        let dinner_id = yesterday?.recipe_for(MealSlot::Dinner)?;
        if !self
            .resources
            .random
            .roll(self.resources.config.lunch_repeat_chance_percent)
        {
            return None;
        }
        candidates
            .iter()
            .find(|recipe| recipe.id == dinner_id && recipe.serves(Mealtime::Lunch))
            .cloned()
    }

    fn check_total(&self, daily_kcal: f64, chosen: &[(MealSlot, Recipe)], log: &mut AnomalyLog<'_>) {
        let total_kcal: f64 = chosen.iter().map(|(_, recipe)| recipe.calories).sum();
        let floor_kcal = daily_kcal * (1.0 - self.resources.config.tolerance_fraction());
        if total_kcal < floor_kcal {
            log.record(Anomaly::UnderTarget {
                total_kcal,
                floor_kcal,
            });
        }
    }
}

/// Slot budgets for a profile on a day, if a target can be derived
#[must_use]
pub fn slot_targets(
    resources: &PlannerResources,
    profile: &PlanningProfile,
    day: NaiveDate,
) -> Option<Vec<MealCalorieTarget>> {
    let daily_kcal = resources.resolver.daily_calories(profile, day)?;
    let targets = split_daily_calories(daily_kcal, profile.meal_count);
    (!targets.is_empty()).then_some(targets)
}
