// ABOUTME: Two-stage candidate draw shared by pool building, growth, and substitution
// ABOUTME: Like-biased draw first, then the full catalog, then without cuisine preferences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::observability::AnomalyLog;
use super::resources::PlannerResources;
use crate::errors::AppResult;
use mealplan_core::models::{Recipe, RecipeId};
use mealplan_intelligence::SelectionConditions;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Draws single recipes for one user, caching the liked sample per call
pub struct CandidateDrawer<'a> {
    resources: &'a PlannerResources,
    user_id: Uuid,
    liked: Option<Vec<RecipeId>>,
}

impl<'a> CandidateDrawer<'a> {
    /// Drawer for a user
    #[must_use]
    pub const fn new(resources: &'a PlannerResources, user_id: Uuid) -> Self {
        Self {
            resources,
            user_id,
            liked: None,
        }
    }

    async fn liked_ids(&mut self, log: &mut AnomalyLog<'_>) -> AppResult<&[RecipeId]> {
        if self.liked.is_none() {
            let sampled = self
                .resources
                .timed(
                    "recipes.random_liked_ids",
                    log,
                    self.resources.recipes.random_liked_ids(self.user_id),
                )
                .await?
                .unwrap_or_default();
            self.liked = Some(sampled);
        }
        Ok(self.liked.as_deref().unwrap_or_default())
    }

    async fn find(
        &self,
        conditions: &SelectionConditions,
        exclude: &HashSet<RecipeId>,
        log: &mut AnomalyLog<'_>,
    ) -> AppResult<Option<Recipe>> {
        Ok(self
            .resources
            .timed(
                "recipes.find_random_match",
                log,
                self.resources.recipes.find_random_match(conditions, exclude),
            )
            .await?
            .flatten())
    }

    /// Draw one recipe matching `conditions` and not in `exclude`
    ///
    /// With the configured like-bias chance, the user's liked recipes are
    /// tried first. If the catalog has no match, the draw is retried once
    /// without the preferred-cuisine list. Excluded cuisines and avoided
    /// diseases always hold.
    ///
    /// # Errors
    ///
    /// Returns an error if a repository read fails
    pub async fn draw(
        &mut self,
        conditions: &SelectionConditions,
        exclude: &HashSet<RecipeId>,
        log: &mut AnomalyLog<'_>,
    ) -> AppResult<Option<Recipe>> {
        let bias_chance = self.resources.config.like_bias_chance_percent;
        if self.resources.random.roll(bias_chance) {
            let liked: Vec<RecipeId> = self
                .liked_ids(log)
                .await?
                .iter()
                .copied()
                .filter(|id| !exclude.contains(id))
                .collect();
            if let Ok(biased) = conditions.with_bias(liked) {
                if let Some(recipe) = self.find(&biased, exclude, log).await? {
                    debug!(user.id = %self.user_id, recipe.id = recipe.id, "Drew liked recipe");
                    return Ok(Some(recipe));
                }
            }
        }

        if let Some(recipe) = self.find(conditions, exclude, log).await? {
            return Ok(Some(recipe));
        }

        if conditions.has_cuisine_preference() {
            debug!(
                user.id = %self.user_id,
                mealtime = %conditions.mealtime(),
                "Retrying draw without cuisine preference"
            );
            return self
                .find(&conditions.without_cuisine_preference(), exclude, log)
                .await;
        }
        Ok(None)
    }
}
