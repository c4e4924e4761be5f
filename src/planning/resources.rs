// ABOUTME: Shared planner resources bundling repositories, collaborators, and configuration
// ABOUTME: Created once and shared via Arc; also runs repository calls under a deadline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::observability::{AnomalyLog, PlanningObserver, TracingObserver};
use super::outcome::Anomaly;
use crate::database::{DatabaseError, PlanRepository, PoolRepository, RecipeRepository};
use crate::errors::{AppError, AppResult};
use crate::external::{NoopTranslationQueue, TranslationQueue};
use mealplan_intelligence::{
    CalorieTargetResolver, ChaChaRandom, MifflinStJeorResolver, PlanningConfig, RandomSource,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Everything the planning engine needs, shared by reference counting
///
/// Cloning is cheap: every field is an `Arc`.
#[derive(Clone)]
pub struct PlannerResources {
    /// Recipe catalog
    pub recipes: Arc<dyn RecipeRepository>,
    /// Recipe pool store
    pub pools: Arc<dyn PoolRepository>,
    /// Meal plan store
    pub plans: Arc<dyn PlanRepository>,
    /// Translation queue
    pub translations: Arc<dyn TranslationQueue>,
    /// Random source for rolls and shuffles
    pub random: Arc<dyn RandomSource>,
    /// Timing and anomaly observer
    pub observer: Arc<dyn PlanningObserver>,
    /// Daily calorie target resolver
    pub resolver: Arc<dyn CalorieTargetResolver>,
    /// Planning configuration
    pub config: Arc<PlanningConfig>,
}

impl PlannerResources {
    /// Resources over one store implementing every repository port
    ///
    /// Collaborators default to no translation, an entropy-seeded random
    /// source, tracing observation and the Mifflin-St Jeor resolver.
    #[must_use]
    pub fn with_store<S>(store: Arc<S>, config: PlanningConfig) -> Self
    where
        S: RecipeRepository + PoolRepository + PlanRepository + 'static,
    {
        Self {
            recipes: store.clone(),
            pools: store.clone(),
            plans: store,
            translations: Arc::new(NoopTranslationQueue),
            random: Arc::new(ChaChaRandom::from_entropy()),
            observer: Arc::new(TracingObserver),
            resolver: Arc::new(MifflinStJeorResolver::default()),
            config: Arc::new(config),
        }
    }

    /// Replace the translation queue
    #[must_use]
    pub fn with_translations(mut self, translations: Arc<dyn TranslationQueue>) -> Self {
        self.translations = translations;
        self
    }

    /// Replace the random source
    #[must_use]
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Replace the observer
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn PlanningObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replace the calorie target resolver
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn CalorieTargetResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Start an anomaly log for a user
    #[must_use]
    pub fn anomaly_log(&self, user_id: uuid::Uuid) -> AnomalyLog<'_> {
        AnomalyLog::new(user_id, self.observer.as_ref())
    }

    /// Run a repository call under the configured deadline
    ///
    /// Returns `Ok(None)` when the deadline passes; the caller treats that as
    /// an empty result. Calls slower than the budget record a slow-query
    /// anomaly but still return their value.
    ///
    /// # Errors
    ///
    /// Returns the store's error converted to `AppError`
    pub async fn timed<T, F>(
        &self,
        operation: &'static str,
        log: &mut AnomalyLog<'_>,
        call: F,
    ) -> AppResult<Option<T>>
    where
        F: Future<Output = Result<T, DatabaseError>> + Send,
    {
        let started = Instant::now();
        let result = tokio::time::timeout(self.config.query_deadline(), call).await;
        let elapsed = started.elapsed();
        self.observer.query_completed(operation, elapsed);

        let Ok(result) = result else {
            log.record(Anomaly::QueryTimedOut { operation });
            return Ok(None);
        };
        if elapsed > self.config.query_budget() {
            log.record(Anomaly::SlowQuery {
                operation,
                elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            });
        }
        result.map(Some).map_err(AppError::from)
    }

    /// Run a repository write under the configured deadline
    ///
    /// Unlike reads, a write that misses the deadline is a persistence
    /// failure: its effect is unknown, so the caller must not report success.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the deadline passes
    pub async fn timed_write<T, F>(
        &self,
        operation: &'static str,
        log: &mut AnomalyLog<'_>,
        call: F,
    ) -> AppResult<T>
    where
        F: Future<Output = Result<T, DatabaseError>> + Send,
    {
        self.timed(operation, log, call).await?.ok_or_else(|| {
            AppError::database(format!("{operation} exceeded its deadline"))
        })
    }
}
