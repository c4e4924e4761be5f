// ABOUTME: Single-recipe substitution within an already generated day
// ABOUTME: Swaps one entry and its pool member while leaving sibling meals untouched
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::assembler::slot_targets;
use super::draw::CandidateDrawer;
use super::observability::AnomalyLog;
use super::outcome::Anomaly;
use super::pool_builder::mealtime_target;
use super::resources::PlannerResources;
use crate::errors::AppResult;
use crate::logging::PlanningLogger;
use chrono::NaiveDate;
use mealplan_core::models::{MealEntry, MealPlan, PlanningProfile, RecipeId, RecipeView};
use mealplan_intelligence::SelectionConditions;
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

/// A successful substitution
#[derive(Debug, Clone, Serialize)]
pub struct Substitution {
    /// Day after the swap
    pub plan: MealPlan,
    /// Incoming recipe shaped for the requested language
    pub recipe: RecipeView,
}

/// Replaces one recipe of a day's plan
pub struct RecipeSubstitution<'a> {
    resources: &'a PlannerResources,
}

impl<'a> RecipeSubstitution<'a> {
    /// Substitution over shared resources
    #[must_use]
    pub const fn new(resources: &'a PlannerResources) -> Self {
        Self { resources }
    }

    /// Replace `old_id` in the plan for `day`
    ///
    /// The replacement is drawn under the same conditions as a pool draw for
    /// the entry's slot, excluding every pool member, the outgoing recipe and
    /// the day's other recipes. On success the entry is rewritten with its
    /// prepared flag cleared and the pool member is swapped in place. When no
    /// replacement exists, nothing is written. If the pool swap fails the
    /// day is restored to its previous entries before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if a repository read fails or a write cannot be persisted
    pub async fn substitute(
        &self,
        profile: &PlanningProfile,
        day: NaiveDate,
        old_id: RecipeId,
        language: Option<&str>,
        log: &mut AnomalyLog<'_>,
    ) -> AppResult<Option<Substitution>> {
        let resources = self.resources;
        let user_id = profile.user_id;

        let Some(plan) = resources
            .timed("plans.get", log, resources.plans.get(user_id, day))
            .await?
            .flatten()
        else {
            log.record(Anomaly::PlanMissing { day });
            return Ok(None);
        };

        let Some(position) = plan.position_of(old_id) else {
            log.record(Anomaly::RecipeNotInPlan { recipe_id: old_id });
            return Ok(None);
        };
        let slot = plan.entries[position].slot;
        let mealtime = slot.mealtime();

        let Some(targets) = slot_targets(resources, profile, day) else {
            log.record(Anomaly::ProfileIncomplete);
            return Ok(None);
        };
        let kcal_target = targets
            .iter()
            .find(|target| target.slot == slot)
            .map(|target| target.kcal_target)
            .or_else(|| mealtime_target(&targets, mealtime));
        let Some(kcal_target) = kcal_target else {
            log.record(Anomaly::SlotUnfilled { slot });
            return Ok(None);
        };

        // without the pool members the draw could return one of them
        let Some(pool) = resources
            .timed("pools.get", log, resources.pools.get(user_id))
            .await?
        else {
            return Ok(None);
        };
        let mut exclude: HashSet<RecipeId> = pool
            .map(|pool| pool.recipe_ids.into_iter().collect())
            .unwrap_or_default();
        exclude.extend(plan.recipe_ids());

        let conditions = SelectionConditions::for_profile(
            profile,
            resources.config.as_ref(),
            mealtime,
            kcal_target,
        )?;
        let Some(recipe) = CandidateDrawer::new(resources, user_id)
            .draw(&conditions, &exclude, log)
            .await?
        else {
            log.record(Anomaly::NoCandidates {
                mealtime,
                unfilled: 1,
            });
            PlanningLogger::log_substitution(user_id, day, old_id, None);
            return Ok(None);
        };

        let mut entries = plan.entries.clone();
        entries[position] = MealEntry::new(slot, recipe.id);
        let updated = resources
            .timed_write(
                "plans.upsert",
                log,
                resources.plans.upsert(user_id, day, &entries),
            )
            .await?;
        let swapped = resources
            .timed_write(
                "pools.replace_id",
                log,
                resources.pools.replace_id(user_id, old_id, recipe.id),
            )
            .await;
        if let Err(error) = swapped {
            // put the day back so it only references pool members
            if let Err(restore_error) = resources
                .timed_write(
                    "plans.upsert",
                    log,
                    resources.plans.upsert(user_id, day, &plan.entries),
                )
                .await
            {
                warn!(
                    user.id = %user_id,
                    plan.day = %day,
                    error = %restore_error,
                    "Failed to restore plan after pool swap failure"
                );
            }
            return Err(error);
        }

        let target_language = language.unwrap_or(&profile.language);
        if !recipe.has_translation(target_language) {
            resources
                .translations
                .enqueue(&[recipe.id], target_language);
        }

        PlanningLogger::log_substitution(user_id, day, old_id, Some(recipe.id));
        Ok(Some(Substitution {
            plan: updated,
            recipe: RecipeView::localize(&recipe, target_language, &profile.language),
        }))
    }
}
