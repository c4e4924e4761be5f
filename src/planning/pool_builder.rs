// ABOUTME: Recipe pool builder creating a user's first bounded candidate set
// ABOUTME: Proportions draws by mealtime and degrades to a partial pool when candidates run out
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Recipe Pool Builder
//!
//! On a user's first plan request, the builder draws `first_week_pool_size`
//! recipes split across mealtimes by the configured proportions, with the
//! counts summing exactly to that size. Each draw
//! uses the condition set of the first slot serving that mealtime. A mealtime
//! that runs out of candidates stops early and is reported; the pool is only
//! absent when nothing at all could be drawn.

use super::draw::CandidateDrawer;
use super::observability::AnomalyLog;
use super::outcome::Anomaly;
use super::resources::PlannerResources;
use crate::errors::AppResult;
use crate::logging::PlanningLogger;
use mealplan_core::models::{
    MealCalorieTarget, Mealtime, PlanningProfile, Recipe, RecipeId, RecipePool,
};
use mealplan_intelligence::SelectionConditions;
use std::collections::HashSet;

/// Kcal target of the first slot serving a mealtime
pub(crate) fn mealtime_target(
    targets: &[MealCalorieTarget],
    mealtime: Mealtime,
) -> Option<f64> {
    targets
        .iter()
        .find(|target| target.slot.mealtime() == mealtime)
        .map(|target| target.kcal_target)
}

/// Queue recipes lacking text in the profile language for translation
pub(crate) fn enqueue_untranslated(
    resources: &PlannerResources,
    profile: &PlanningProfile,
    recipes: &[Recipe],
) {
    let missing: Vec<RecipeId> = recipes
        .iter()
        .filter(|recipe| !recipe.has_translation(&profile.language))
        .map(|recipe| recipe.id)
        .collect();
    if !missing.is_empty() {
        resources.translations.enqueue(&missing, &profile.language);
    }
}

/// Builds a user's first recipe pool
pub struct PoolBuilder<'a> {
    resources: &'a PlannerResources,
}

impl<'a> PoolBuilder<'a> {
    /// Builder over shared resources
    #[must_use]
    pub const fn new(resources: &'a PlannerResources) -> Self {
        Self { resources }
    }

    /// Return the user's pool, building it if absent
    ///
    /// Building is a no-op when a pool already exists. When the pool read
    /// misses its deadline nothing is built and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if a repository read fails or the pool cannot be persisted
    pub async fn ensure(
        &self,
        profile: &PlanningProfile,
        targets: &[MealCalorieTarget],
        log: &mut AnomalyLog<'_>,
    ) -> AppResult<Option<RecipePool>> {
        let resources = self.resources;
        // a timed-out read says nothing about whether the pool exists
        let Some(existing) = resources
            .timed("pools.get", log, resources.pools.get(profile.user_id))
            .await?
        else {
            return Ok(None);
        };
        if existing.is_some() {
            return Ok(existing);
        }
        self.build(profile, targets, log).await
    }

    async fn build(
        &self,
        profile: &PlanningProfile,
        targets: &[MealCalorieTarget],
        log: &mut AnomalyLog<'_>,
    ) -> AppResult<Option<RecipePool>> {
        let resources = self.resources;
        let config = resources.config.as_ref();
        let Some(meal_count) = profile.meal_count() else {
            log.record(Anomaly::UnsupportedMealCount {
                meal_count: profile.meal_count,
            });
            return Ok(None);
        };

        let mut drawer = CandidateDrawer::new(resources, profile.user_id);
        let mut chosen: Vec<Recipe> = Vec::new();
        let mut chosen_ids: HashSet<RecipeId> = HashSet::new();
        let mut requested = 0;

        let counts = config
            .pool_proportions
            .for_meal_count(meal_count)
            .apportion(config.first_week_pool_size);
        for (mealtime, count) in counts {
            let Some(kcal_target) = mealtime_target(targets, mealtime) else {
                continue;
            };
            requested += count;
            let conditions =
                SelectionConditions::for_profile(profile, config, mealtime, kcal_target)?;

            for drawn in 0..count {
                if chosen.len() >= config.max_pool_size {
                    break;
                }
                let Some(recipe) = drawer.draw(&conditions, &chosen_ids, log).await? else {
                    log.record(Anomaly::NoCandidates {
                        mealtime,
                        unfilled: count - drawn,
                    });
                    break;
                };
                chosen_ids.insert(recipe.id);
                chosen.push(recipe);
            }
        }

        if chosen.is_empty() {
            log.record(Anomaly::EmptyPool);
            return Ok(None);
        }

        let ids: Vec<RecipeId> = chosen.iter().map(|recipe| recipe.id).collect();
        let pool = resources
            .timed_write(
                "pools.create",
                log,
                resources.pools.create(profile.user_id, &ids),
            )
            .await?;

        enqueue_untranslated(resources, profile, &chosen);
        PlanningLogger::log_pool_built(profile.user_id, pool.len(), requested);
        Ok(Some(pool))
    }
}
