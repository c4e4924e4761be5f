// ABOUTME: Repository ports for the recipe catalog, recipe pools, and meal plans
// ABOUTME: Async traits implemented by the in-memory and SQLite stores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Persistence Ports
//!
//! The planning engine talks to three stores through these traits. Every
//! method returns [`DatabaseError`] on failure; the engine converts that into
//! a hard `AppError` because no meaningful plan can be produced from a broken
//! store.

/// Lock-protected in-memory store
pub mod memory;

/// `SQLite` store backed by `sqlx`
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryStore;
pub use mealplan_core::errors::DatabaseError;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use mealplan_core::models::{
    MealEntry, MealPlan, MealSlot, Recipe, RecipeId, RecipePool, RecipeProjection,
};
use mealplan_intelligence::SelectionConditions;
use std::collections::HashSet;
use uuid::Uuid;

/// Read-only access to the recipe catalog
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Draw one random recipe matching `conditions` whose id is not in `exclude`
    async fn find_random_match(
        &self,
        conditions: &SelectionConditions,
        exclude: &HashSet<RecipeId>,
    ) -> Result<Option<Recipe>, DatabaseError>;

    /// Fetch up to `limit` recipes by identifier, in no particular order
    ///
    /// Unknown identifiers are skipped.
    async fn find_by_ids(
        &self,
        ids: &[RecipeId],
        projection: RecipeProjection,
        limit: usize,
    ) -> Result<Vec<Recipe>, DatabaseError>;

    /// Random sample of recipe identifiers the user has liked
    async fn random_liked_ids(&self, user_id: Uuid) -> Result<Vec<RecipeId>, DatabaseError>;
}

/// Per-user recipe pool storage
#[async_trait]
pub trait PoolRepository: Send + Sync {
    /// Load a user's pool
    async fn get(&self, user_id: Uuid) -> Result<Option<RecipePool>, DatabaseError>;

    /// Create a user's pool; replaces nothing if one already exists
    async fn create(&self, user_id: Uuid, ids: &[RecipeId]) -> Result<RecipePool, DatabaseError>;

    /// Append identifiers not already present
    ///
    /// Returns [`DatabaseError::NotFound`] if the user has no pool.
    async fn append_ids(&self, user_id: Uuid, ids: &[RecipeId])
        -> Result<RecipePool, DatabaseError>;

    /// Swap `old_id` for `new_id` in place; a missing `old_id` is a no-op
    async fn replace_id(
        &self,
        user_id: Uuid,
        old_id: RecipeId,
        new_id: RecipeId,
    ) -> Result<(), DatabaseError>;
}

/// Per-user, per-day meal plan storage
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Load one day's plan
    async fn get(&self, user_id: Uuid, day: NaiveDate) -> Result<Option<MealPlan>, DatabaseError>;

    /// Load all plans in `[from, to]`, ordered by day
    async fn get_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MealPlan>, DatabaseError>;

    /// Insert or replace one day's entries
    async fn upsert(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        entries: &[MealEntry],
    ) -> Result<MealPlan, DatabaseError>;

    /// Set the prepared flag of one slot
    ///
    /// Returns `Ok(None)` when no plan or no entry for the slot exists.
    async fn set_prepared(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        slot: MealSlot,
        prepared: bool,
    ) -> Result<Option<MealPlan>, DatabaseError>;
}
