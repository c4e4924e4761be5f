// ABOUTME: Meal plan service facade over the planning engine
// ABOUTME: Holds the user's lock around every read-modify-write and returns outcomes with anomalies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppResult;
use crate::planning::{
    slot_targets, Anomaly, PlanAssembler, PlanOutcome, PlannerResources, PoolBuilder, PoolGrower,
    PoolGrowth, RecipeSubstitution, Substitution, UserLocks,
};
use chrono::{Days, NaiveDate};
use mealplan_core::models::{MealPlan, MealSlot, PlanningProfile, RecipeId, RecipePool};
use tracing::instrument;
use uuid::Uuid;

#[cfg(feature = "sqlite")]
use crate::config::EngineConfig;
#[cfg(feature = "sqlite")]
use crate::database::SqliteStore;
#[cfg(feature = "sqlite")]
use std::sync::Arc;
#[cfg(feature = "sqlite")]
use tracing::info;

/// Entry point for generating and editing meal plans
///
/// Calls for the same user are serialized; calls for different users run
/// concurrently.
#[derive(Clone)]
pub struct MealPlanService {
    resources: PlannerResources,
    locks: UserLocks,
}

impl MealPlanService {
    /// Service over prepared resources
    #[must_use]
    pub fn new(resources: PlannerResources) -> Self {
        Self {
            resources,
            locks: UserLocks::new(),
        }
    }

    /// Connect the configured `SQLite` store and build a service over it
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated
    #[cfg(feature = "sqlite")]
    pub async fn from_config(config: &EngineConfig) -> AppResult<Self> {
        let store = SqliteStore::connect(&config.database.to_connection_string()).await?;
        info!(database = %config.database, "Meal plan store ready");
        Ok(Self::new(PlannerResources::with_store(
            Arc::new(store),
            config.planning.clone(),
        )))
    }

    /// Shared resources
    #[must_use]
    pub const fn resources(&self) -> &PlannerResources {
        &self.resources
    }

    /// Generate (or regenerate) the plan for one day
    ///
    /// # Errors
    ///
    /// Returns an error if a repository read fails or the plan cannot be persisted
    #[instrument(skip(self, profile), fields(user.id = %profile.user_id, plan.day = %day))]
    pub async fn generate_day(
        &self,
        profile: &PlanningProfile,
        day: NaiveDate,
    ) -> AppResult<PlanOutcome<MealPlan>> {
        let _guard = self.locks.acquire(profile.user_id).await;
        self.generate_locked(profile, day).await
    }

    /// Generate `count` consecutive days starting at `from`
    ///
    /// Days are generated in order under one lock hold, so each day's
    /// ignore window sees the days generated before it.
    ///
    /// # Errors
    ///
    /// Returns the first repository failure; days generated before it stay persisted
    #[instrument(skip(self, profile), fields(user.id = %profile.user_id))]
    pub async fn generate_days(
        &self,
        profile: &PlanningProfile,
        from: NaiveDate,
        count: u32,
    ) -> AppResult<Vec<PlanOutcome<MealPlan>>> {
        let _guard = self.locks.acquire(profile.user_id).await;
        let mut outcomes = Vec::with_capacity(count as usize);
        for offset in 0..count {
            let Some(day) = from.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };
            outcomes.push(self.generate_locked(profile, day).await?);
        }
        Ok(outcomes)
    }

    async fn generate_locked(
        &self,
        profile: &PlanningProfile,
        day: NaiveDate,
    ) -> AppResult<PlanOutcome<MealPlan>> {
        let mut log = self.resources.anomaly_log(profile.user_id);
        let plan = PlanAssembler::new(&self.resources)
            .assemble(profile, day, &mut log)
            .await?;
        Ok(PlanOutcome::new(plan, log.into_vec()))
    }

    /// Replace one recipe in the plan for `day`
    ///
    /// The returned recipe is shaped for `language`, falling back to the
    /// profile language.
    ///
    /// # Errors
    ///
    /// Returns an error if a repository read fails or a write cannot be persisted
    #[instrument(skip(self, profile), fields(user.id = %profile.user_id, plan.day = %day))]
    pub async fn substitute_recipe(
        &self,
        profile: &PlanningProfile,
        day: NaiveDate,
        old_id: RecipeId,
        language: Option<&str>,
    ) -> AppResult<PlanOutcome<Substitution>> {
        let _guard = self.locks.acquire(profile.user_id).await;
        let mut log = self.resources.anomaly_log(profile.user_id);
        let substitution = RecipeSubstitution::new(&self.resources)
            .substitute(profile, day, old_id, language, &mut log)
            .await?;
        Ok(PlanOutcome::new(substitution, log.into_vec()))
    }

    /// Set or clear the prepared flag of one slot
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn mark_prepared(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        slot: MealSlot,
        prepared: bool,
    ) -> AppResult<PlanOutcome<MealPlan>> {
        let _guard = self.locks.acquire(user_id).await;
        let resources = &self.resources;
        let mut log = resources.anomaly_log(user_id);
        let plan = resources
            .timed_write(
                "plans.set_prepared",
                &mut log,
                resources.plans.set_prepared(user_id, day, slot, prepared),
            )
            .await?;
        if plan.is_none() {
            log.record(Anomaly::PlanMissing { day });
        }
        Ok(PlanOutcome::new(plan, log.into_vec()))
    }

    /// Return the user's pool, building it on first use
    ///
    /// `day` only matters for age-dependent calorie targets.
    ///
    /// # Errors
    ///
    /// Returns an error if a repository read fails or the pool cannot be persisted
    pub async fn ensure_pool(
        &self,
        profile: &PlanningProfile,
        day: NaiveDate,
    ) -> AppResult<PlanOutcome<RecipePool>> {
        let _guard = self.locks.acquire(profile.user_id).await;
        let resources = &self.resources;
        let mut log = resources.anomaly_log(profile.user_id);
        let Some(targets) = slot_targets(resources, profile, day) else {
            log.record(Anomaly::ProfileIncomplete);
            return Ok(PlanOutcome::empty(log.into_vec()));
        };
        let pool = PoolBuilder::new(resources)
            .ensure(profile, &targets, &mut log)
            .await?;
        Ok(PlanOutcome::new(pool, log.into_vec()))
    }

    /// Add up to `requested` recipes to the user's pool
    ///
    /// A missing pool is built first; the growth batch then runs over it.
    ///
    /// # Errors
    ///
    /// Returns an error if a repository read fails or the pool cannot be persisted
    pub async fn grow_pool(
        &self,
        profile: &PlanningProfile,
        day: NaiveDate,
        requested: usize,
    ) -> AppResult<PlanOutcome<PoolGrowth>> {
        let _guard = self.locks.acquire(profile.user_id).await;
        let resources = &self.resources;
        let mut log = resources.anomaly_log(profile.user_id);
        let Some(targets) = slot_targets(resources, profile, day) else {
            log.record(Anomaly::ProfileIncomplete);
            return Ok(PlanOutcome::empty(log.into_vec()));
        };
        let Some(pool) = PoolBuilder::new(resources)
            .ensure(profile, &targets, &mut log)
            .await?
        else {
            return Ok(PlanOutcome::empty(log.into_vec()));
        };
        let growth = PoolGrower::new(resources)
            .grow(profile, &targets, pool, requested, None, &mut log)
            .await?;
        Ok(PlanOutcome::new(Some(growth), log.into_vec()))
    }

    /// Read the stored plan for one day
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn day_plan(&self, user_id: Uuid, day: NaiveDate) -> AppResult<PlanOutcome<MealPlan>> {
        let resources = &self.resources;
        let mut log = resources.anomaly_log(user_id);
        let plan = resources
            .timed("plans.get", &mut log, resources.plans.get(user_id, day))
            .await?
            .flatten();
        if plan.is_none() {
            log.record(Anomaly::PlanMissing { day });
        }
        Ok(PlanOutcome::new(plan, log.into_vec()))
    }

    /// Stored plans for an inclusive day range, ordered by day
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn plans_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<PlanOutcome<Vec<MealPlan>>> {
        let resources = &self.resources;
        let mut log = resources.anomaly_log(user_id);
        let plans = resources
            .timed(
                "plans.get_range",
                &mut log,
                resources.plans.get_range(user_id, from, to),
            )
            .await?;
        Ok(PlanOutcome::new(plans, log.into_vec()))
    }
}
