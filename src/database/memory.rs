// ABOUTME: In-memory implementation of the recipe, pool, and plan repositories
// ABOUTME: Lock-protected maps with catalog seeding, used by tests and embedded deployments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{DatabaseError, PlanRepository, PoolRepository, RecipeRepository};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use mealplan_core::constants::planning::LIKED_SAMPLE_LIMIT;
use mealplan_core::models::{
    MealEntry, MealPlan, MealSlot, Recipe, RecipeId, RecipePool, RecipeProjection,
};
use mealplan_intelligence::SelectionConditions;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct StoreState {
    recipes: BTreeMap<RecipeId, Recipe>,
    likes: HashMap<Uuid, Vec<RecipeId>>,
    pools: HashMap<Uuid, RecipePool>,
    plans: BTreeMap<(Uuid, NaiveDate), MealPlan>,
}

/// In-memory store implementing every repository port
///
/// Cloning shares the underlying state.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Empty store with an entropy-seeded draw order
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    /// Empty store with a reproducible draw order
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(rng: ChaCha8Rng) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Add or replace catalog recipes
    pub async fn insert_recipes(&self, recipes: impl IntoIterator<Item = Recipe>) {
        let mut state = self.state.write().await;
        for recipe in recipes {
            state.recipes.insert(recipe.id, recipe);
        }
    }

    /// Record that a user liked a recipe
    pub async fn like(&self, user_id: Uuid, recipe_id: RecipeId) {
        let mut state = self.state.write().await;
        let likes = state.likes.entry(user_id).or_default();
        if !likes.contains(&recipe_id) {
            likes.push(recipe_id);
        }
    }

    /// Number of catalog recipes
    pub async fn recipe_count(&self) -> usize {
        self.state.read().await.recipes.len()
    }

    fn pick<T: Clone>(&self, items: &[T]) -> Option<T> {
        let Ok(mut rng) = self.rng.lock() else {
            return items.first().cloned();
        };
        items.choose(&mut *rng).cloned()
    }

    fn sample(&self, mut items: Vec<RecipeId>, limit: usize) -> Vec<RecipeId> {
        if let Ok(mut rng) = self.rng.lock() {
            items.shuffle(&mut *rng);
        }
        items.truncate(limit);
        items
    }
}

fn project(recipe: &Recipe, projection: RecipeProjection) -> Recipe {
    match projection {
        RecipeProjection::Full => recipe.clone(),
        RecipeProjection::Planning => {
            let mut planning = recipe.clone();
            planning.localized.clear();
            planning
        }
    }
}

#[async_trait]
impl RecipeRepository for InMemoryStore {
    async fn find_random_match(
        &self,
        conditions: &SelectionConditions,
        exclude: &HashSet<RecipeId>,
    ) -> Result<Option<Recipe>, DatabaseError> {
        let state = self.state.read().await;
        let candidates: Vec<&Recipe> = state
            .recipes
            .values()
            .filter(|recipe| !exclude.contains(&recipe.id) && conditions.matches(recipe))
            .collect();
        Ok(self.pick(&candidates).cloned())
    }

    async fn find_by_ids(
        &self,
        ids: &[RecipeId],
        projection: RecipeProjection,
        limit: usize,
    ) -> Result<Vec<Recipe>, DatabaseError> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.recipes.get(id))
            .take(limit)
            .map(|recipe| project(recipe, projection))
            .collect())
    }

    async fn random_liked_ids(&self, user_id: Uuid) -> Result<Vec<RecipeId>, DatabaseError> {
        let liked = self
            .state
            .read()
            .await
            .likes
            .get(&user_id)
            .cloned()
            .unwrap_or_default();
        Ok(self.sample(liked, LIKED_SAMPLE_LIMIT))
    }
}

#[async_trait]
impl PoolRepository for InMemoryStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<RecipePool>, DatabaseError> {
        Ok(self.state.read().await.pools.get(&user_id).cloned())
    }

    async fn create(&self, user_id: Uuid, ids: &[RecipeId]) -> Result<RecipePool, DatabaseError> {
        let mut state = self.state.write().await;
        Ok(state
            .pools
            .entry(user_id)
            .or_insert_with(|| RecipePool::new(user_id, ids))
            .clone())
    }

    async fn append_ids(
        &self,
        user_id: Uuid,
        ids: &[RecipeId],
    ) -> Result<RecipePool, DatabaseError> {
        let mut state = self.state.write().await;
        let pool = state
            .pools
            .get_mut(&user_id)
            .ok_or_else(|| DatabaseError::not_found("recipe_pool", user_id.to_string()))?;
        pool.append(ids);
        Ok(pool.clone())
    }

    async fn replace_id(
        &self,
        user_id: Uuid,
        old_id: RecipeId,
        new_id: RecipeId,
    ) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if let Some(pool) = state.pools.get_mut(&user_id) {
            pool.replace(old_id, new_id);
        }
        Ok(())
    }
}

#[async_trait]
impl PlanRepository for InMemoryStore {
    async fn get(&self, user_id: Uuid, day: NaiveDate) -> Result<Option<MealPlan>, DatabaseError> {
        Ok(self.state.read().await.plans.get(&(user_id, day)).cloned())
    }

    async fn get_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MealPlan>, DatabaseError> {
        if from > to {
            return Ok(Vec::new());
        }
        let state = self.state.read().await;
        Ok(state
            .plans
            .range((user_id, from)..=(user_id, to))
            .map(|(_, plan)| plan.clone())
            .collect())
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        entries: &[MealEntry],
    ) -> Result<MealPlan, DatabaseError> {
        let plan = MealPlan {
            user_id,
            day,
            entries: entries.to_vec(),
            updated_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .plans
            .insert((user_id, day), plan.clone());
        Ok(plan)
    }

    async fn set_prepared(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        slot: MealSlot,
        prepared: bool,
    ) -> Result<Option<MealPlan>, DatabaseError> {
        let mut state = self.state.write().await;
        let Some(plan) = state.plans.get_mut(&(user_id, day)) else {
            return Ok(None);
        };
        let Some(entry) = plan.entries.iter_mut().find(|e| e.slot == slot) else {
            return Ok(None);
        };
        entry.prepared = prepared;
        plan.updated_at = Utc::now();
        Ok(Some(plan.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealplan_core::models::MealtimeTags;
    use mealplan_intelligence::CalorieWindow;

    #[tokio::test]
    async fn test_random_match_honours_exclusions() {
        let store = InMemoryStore::seeded(1);
        store
            .insert_recipes([
                Recipe::new(1, 450.0, MealtimeTags::BREAKFAST),
                Recipe::new(2, 480.0, MealtimeTags::BREAKFAST),
                Recipe::new(3, 480.0, MealtimeTags::DINNER),
            ])
            .await;
        let window = CalorieWindow::below_target(500.0, 25.0).unwrap();
        let conditions = SelectionConditions::builder(
            mealplan_core::models::Mealtime::Breakfast,
            window,
        )
        .build()
        .unwrap();

        let exclude = HashSet::from([1]);
        let drawn = store.find_random_match(&conditions, &exclude).await.unwrap();
        assert_eq!(drawn.map(|r| r.id), Some(2));

        let exclude = HashSet::from([1, 2]);
        assert!(store
            .find_random_match(&conditions, &exclude)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_plan_range_is_per_user_and_ordered() {
        let store = InMemoryStore::seeded(1);
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let day = |d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();

        for d in [3, 1, 2] {
            store
                .upsert(user, day(d), &[MealEntry::new(MealSlot::Lunch, i64::from(d))])
                .await
                .unwrap();
        }
        store
            .upsert(other, day(2), &[MealEntry::new(MealSlot::Lunch, 99)])
            .await
            .unwrap();

        let plans = store.get_range(user, day(1), day(2)).await.unwrap();
        let days: Vec<NaiveDate> = plans.iter().map(|p| p.day).collect();
        assert_eq!(days, vec![day(1), day(2)]);
    }
}
