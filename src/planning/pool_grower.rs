// ABOUTME: Incremental pool growth adding candidates in bounded-effort batches
// ABOUTME: Walks mealtimes in random order and drops a mealtime once it yields nothing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::draw::CandidateDrawer;
use super::observability::AnomalyLog;
use super::outcome::Anomaly;
use super::pool_builder::{enqueue_untranslated, mealtime_target};
use super::resources::PlannerResources;
use crate::errors::AppResult;
use crate::logging::PlanningLogger;
use mealplan_core::models::{
    MealCalorieTarget, Mealtime, PlanningProfile, Recipe, RecipeId, RecipePool,
};
use mealplan_intelligence::{random::shuffle, SelectionConditions};
use std::collections::HashSet;

/// Result of one growth batch
#[derive(Debug, Clone)]
pub struct PoolGrowth {
    /// Pool after the batch
    pub pool: RecipePool,
    /// Recipes appended by this batch, in draw order
    pub added: Vec<Recipe>,
}

/// Grows an existing pool toward its cap
pub struct PoolGrower<'a> {
    resources: &'a PlannerResources,
}

impl<'a> PoolGrower<'a> {
    /// Grower over shared resources
    #[must_use]
    pub const fn new(resources: &'a PlannerResources) -> Self {
        Self { resources }
    }

    /// Add up to `requested` recipes to `pool`
    ///
    /// `mealtimes` limits the batch to the given mealtimes; `None` uses every
    /// mealtime the profile's pool proportions cover. Growth stops at the
    /// pool cap. A mealtime whose draw fails is not retried in this batch.
    ///
    /// # Errors
    ///
    /// Returns an error if a repository read fails or the append cannot be persisted
    pub async fn grow(
        &self,
        profile: &PlanningProfile,
        targets: &[MealCalorieTarget],
        pool: RecipePool,
        requested: usize,
        mealtimes: Option<&[Mealtime]>,
        log: &mut AnomalyLog<'_>,
    ) -> AppResult<PoolGrowth> {
        let resources = self.resources;
        let config = resources.config.as_ref();
        let budget = requested.min(config.max_pool_size.saturating_sub(pool.len()));

        let mut active: Vec<Mealtime> = match (mealtimes, profile.meal_count()) {
            (Some(explicit), _) => explicit.to_vec(),
            (None, Some(count)) => config
                .pool_proportions
                .for_meal_count(count)
                .entries()
                .into_iter()
                .map(|(mealtime, _)| mealtime)
                .collect(),
            (None, None) => Vec::new(),
        };
        active.retain(|mealtime| mealtime_target(targets, *mealtime).is_some());
        shuffle(resources.random.as_ref(), &mut active);

        let mut drawer = CandidateDrawer::new(resources, profile.user_id);
        let mut exclude: HashSet<RecipeId> = pool.recipe_ids.iter().copied().collect();
        let mut added: Vec<Recipe> = Vec::new();

        while added.len() < budget && !active.is_empty() {
            let mut exhausted: Vec<Mealtime> = Vec::new();
            for &mealtime in &active {
                if added.len() >= budget {
                    break;
                }
                let Some(kcal_target) = mealtime_target(targets, mealtime) else {
                    exhausted.push(mealtime);
                    continue;
                };
                let conditions =
                    SelectionConditions::for_profile(profile, config, mealtime, kcal_target)?;
                match drawer.draw(&conditions, &exclude, log).await? {
                    Some(recipe) => {
                        exclude.insert(recipe.id);
                        added.push(recipe);
                    }
                    None => {
                        log.record(Anomaly::NoCandidates {
                            mealtime,
                            unfilled: budget - added.len(),
                        });
                        exhausted.push(mealtime);
                    }
                }
            }
            active.retain(|mealtime| !exhausted.contains(mealtime));
        }

        if added.is_empty() {
            return Ok(PoolGrowth { pool, added });
        }

        let ids: Vec<RecipeId> = added.iter().map(|recipe| recipe.id).collect();
        let grown = resources
            .timed_write(
                "pools.append_ids",
                log,
                resources.pools.append_ids(profile.user_id, &ids),
            )
            .await?;

        enqueue_untranslated(resources, profile, &added);
        PlanningLogger::log_pool_grown(profile.user_id, added.len(), grown.len());
        Ok(PoolGrowth { pool: grown, added })
    }
}
