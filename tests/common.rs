// ABOUTME: Shared test utilities and fixtures for meal plan engine integration tests
// ABOUTME: Provides catalog builders, a deterministic random source, and a recording translation queue
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `mealplan_engine`

use async_trait::async_trait;
use chrono::NaiveDate;
use mealplan_engine::database::{
    DatabaseError, InMemoryStore, PlanRepository, PoolRepository, RecipeRepository,
};
use mealplan_engine::external::{TranslationQueue, TranslationRequest};
use mealplan_engine::intelligence::{
    FixedCalorieTarget, PlanningConfig, RandomSource, SelectionConditions,
};
use mealplan_engine::models::{
    LocalizedText, MealEntry, MealPlan, MealSlot, MealtimeTags, PlanningProfile, Recipe,
    RecipeId, RecipePool, RecipeProjection,
};
use mealplan_engine::planning::PlannerResources;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

// ============================================================================
// Catalog fixtures
// ============================================================================

/// Recipe passing every default quality rule, with English text
pub fn recipe(id: RecipeId, calories: f64, mealtimes: MealtimeTags) -> Recipe {
    Recipe::new(id, calories, mealtimes)
        .with_ingredients(6)
        .with_prep_time(10)
        .with_health_score(80)
        .with_translation("en", LocalizedText::named(format!("Recipe {id}")))
}

/// `count` recipes with consecutive ids starting at `first_id`
pub fn recipes(first_id: RecipeId, count: i64, calories: f64, mealtimes: MealtimeTags) -> Vec<Recipe> {
    (first_id..first_id + count)
        .map(|id| recipe(id, calories, mealtimes))
        .collect()
}

/// Catalog covering a 2000 kcal three-meal day several times over
///
/// - 100..130: breakfasts at 450 kcal (window 375..=500)
/// - 200..230: lunches at 700 kcal (window 562.5..=750)
/// - 300..330: dinners at 700 kcal
/// - 400..430: snacks at 180 kcal
pub fn standard_catalog() -> Vec<Recipe> {
    let mut catalog = recipes(100, 30, 450.0, MealtimeTags::BREAKFAST);
    catalog.extend(recipes(200, 30, 700.0, MealtimeTags::LUNCH));
    catalog.extend(recipes(300, 30, 700.0, MealtimeTags::DINNER));
    catalog.extend(recipes(400, 30, 180.0, MealtimeTags::SNACK));
    catalog
}

/// Seeded in-memory store holding `catalog`
pub async fn store_with(catalog: Vec<Recipe>) -> Arc<InMemoryStore> {
    init_test_logging();
    let store = Arc::new(InMemoryStore::seeded(7));
    store.insert_recipes(catalog).await;
    store
}

// ============================================================================
// Collaborators
// ============================================================================

/// Random source where only certain events happen and shuffles keep order
///
/// `roll` succeeds only at 100 %, so tests control chance events through
/// the configured percentages.
#[derive(Debug, Default)]
pub struct DeterministicRandom;

impl RandomSource for DeterministicRandom {
    fn roll(&self, chance_percent: u8) -> bool {
        chance_percent >= 100
    }

    fn next_index(&self, upper: usize) -> usize {
        upper.saturating_sub(1)
    }
}

/// Translation queue remembering every request
#[derive(Debug, Default)]
pub struct RecordingTranslationQueue {
    requests: Mutex<Vec<TranslationRequest>>,
}

impl RecordingTranslationQueue {
    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_ids(&self) -> Vec<RecipeId> {
        self.requests()
            .into_iter()
            .flat_map(|request| request.recipe_ids)
            .collect()
    }
}

impl TranslationQueue for RecordingTranslationQueue {
    fn enqueue(&self, recipe_ids: &[RecipeId], language: &str) {
        self.requests.lock().unwrap().push(TranslationRequest {
            recipe_ids: recipe_ids.to_vec(),
            language: language.to_owned(),
        });
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Planning config with chance events switched off
pub fn quiet_config() -> PlanningConfig {
    PlanningConfig {
        like_bias_chance_percent: 0,
        lunch_repeat_chance_percent: 0,
        ..PlanningConfig::default()
    }
}

/// Test harness around a store
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub resources: PlannerResources,
    pub translations: Arc<RecordingTranslationQueue>,
}

impl Harness {
    pub fn new(store: Arc<InMemoryStore>, config: PlanningConfig, daily_kcal: f64) -> Self {
        let translations = Arc::new(RecordingTranslationQueue::default());
        let resources = PlannerResources::with_store(store.clone(), config)
            .with_random(Arc::new(DeterministicRandom))
            .with_resolver(Arc::new(FixedCalorieTarget(daily_kcal)))
            .with_translations(translations.clone());
        Self {
            store,
            resources,
            translations,
        }
    }
}

/// Profile for a fresh user with the given meal count
pub fn profile(meal_count: u8) -> PlanningProfile {
    PlanningProfile::new(Uuid::new_v4()).with_meal_count(meal_count)
}

// ============================================================================
// Fault injection
// ============================================================================

/// Store wrapper delaying or failing selected operations
///
/// Operations are named like the engine's timing labels, e.g.
/// `"pools.replace_id"` or `"plans.get_range"`. Faults can be switched on
/// after planning state has been set up through the same wrapper.
pub struct FaultyStore {
    inner: Arc<InMemoryStore>,
    delays: Mutex<HashMap<&'static str, Duration>>,
    failures: Mutex<HashSet<&'static str>>,
}

impl FaultyStore {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            delays: Mutex::default(),
            failures: Mutex::default(),
        }
    }

    /// Sleep for `delay` before running `operation`
    pub fn delay(&self, operation: &'static str, delay: Duration) {
        self.delays.lock().unwrap().insert(operation, delay);
    }

    /// Fail every call to `operation`
    pub fn fail(&self, operation: &'static str) {
        self.failures.lock().unwrap().insert(operation);
    }

    async fn enter(&self, operation: &'static str) -> Result<(), DatabaseError> {
        let delay = self.delays.lock().unwrap().get(operation).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failures.lock().unwrap().contains(operation) {
            return Err(DatabaseError::QueryError {
                context: format!("{operation} failed"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RecipeRepository for FaultyStore {
    async fn find_random_match(
        &self,
        conditions: &SelectionConditions,
        exclude: &HashSet<RecipeId>,
    ) -> Result<Option<Recipe>, DatabaseError> {
        self.enter("recipes.find_random_match").await?;
        self.inner.find_random_match(conditions, exclude).await
    }

    async fn find_by_ids(
        &self,
        ids: &[RecipeId],
        projection: RecipeProjection,
        limit: usize,
    ) -> Result<Vec<Recipe>, DatabaseError> {
        self.enter("recipes.find_by_ids").await?;
        self.inner.find_by_ids(ids, projection, limit).await
    }

    async fn random_liked_ids(&self, user_id: Uuid) -> Result<Vec<RecipeId>, DatabaseError> {
        self.enter("recipes.random_liked_ids").await?;
        self.inner.random_liked_ids(user_id).await
    }
}

#[async_trait]
impl PoolRepository for FaultyStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<RecipePool>, DatabaseError> {
        self.enter("pools.get").await?;
        PoolRepository::get(self.inner.as_ref(), user_id).await
    }

    async fn create(&self, user_id: Uuid, ids: &[RecipeId]) -> Result<RecipePool, DatabaseError> {
        self.enter("pools.create").await?;
        self.inner.create(user_id, ids).await
    }

    async fn append_ids(
        &self,
        user_id: Uuid,
        ids: &[RecipeId],
    ) -> Result<RecipePool, DatabaseError> {
        self.enter("pools.append_ids").await?;
        self.inner.append_ids(user_id, ids).await
    }

    async fn replace_id(
        &self,
        user_id: Uuid,
        old_id: RecipeId,
        new_id: RecipeId,
    ) -> Result<(), DatabaseError> {
        self.enter("pools.replace_id").await?;
        self.inner.replace_id(user_id, old_id, new_id).await
    }
}

#[async_trait]
impl PlanRepository for FaultyStore {
    async fn get(&self, user_id: Uuid, day: NaiveDate) -> Result<Option<MealPlan>, DatabaseError> {
        self.enter("plans.get").await?;
        PlanRepository::get(self.inner.as_ref(), user_id, day).await
    }

    async fn get_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MealPlan>, DatabaseError> {
        self.enter("plans.get_range").await?;
        self.inner.get_range(user_id, from, to).await
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        entries: &[MealEntry],
    ) -> Result<MealPlan, DatabaseError> {
        self.enter("plans.upsert").await?;
        self.inner.upsert(user_id, day, entries).await
    }

    async fn set_prepared(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        slot: MealSlot,
        prepared: bool,
    ) -> Result<Option<MealPlan>, DatabaseError> {
        self.enter("plans.set_prepared").await?;
        self.inner.set_prepared(user_id, day, slot, prepared).await
    }
}

/// Harness whose resources run through a [`FaultyStore`]
///
/// `store` on the harness is the wrapped in-memory store, for inspecting
/// state without faults.
pub fn faulty_harness(
    store: Arc<InMemoryStore>,
    config: PlanningConfig,
    daily_kcal: f64,
) -> (Harness, Arc<FaultyStore>) {
    let faults = Arc::new(FaultyStore::new(store.clone()));
    let translations = Arc::new(RecordingTranslationQueue::default());
    let resources = PlannerResources::with_store(faults.clone(), config)
        .with_random(Arc::new(DeterministicRandom))
        .with_resolver(Arc::new(FixedCalorieTarget(daily_kcal)))
        .with_translations(translations.clone());
    (
        Harness {
            store,
            resources,
            translations,
        },
        faults,
    )
}

/// Quiet config with a short query budget and deadline
pub fn tight_deadline_config(budget_ms: u64, deadline_ms: u64) -> PlanningConfig {
    PlanningConfig {
        query_budget_ms: budget_ms,
        query_deadline_ms: deadline_ms,
        ..quiet_config()
    }
}
