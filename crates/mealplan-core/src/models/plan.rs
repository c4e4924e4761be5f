// ABOUTME: Per-day meal plans and per-user recipe pools owned by the planning engine
// ABOUTME: Defines MealEntry, MealPlan, RecipePool, and MealCalorieTarget
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::mealtime::MealSlot;
use super::recipe::RecipeId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One assigned recipe within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealEntry {
    /// Position in the day
    pub slot: MealSlot,
    /// Assigned recipe
    pub recipe_id: RecipeId,
    /// Whether the user marked the meal as prepared
    #[serde(default)]
    pub prepared: bool,
}

impl MealEntry {
    /// Create an unprepared entry
    #[must_use]
    pub const fn new(slot: MealSlot, recipe_id: RecipeId) -> Self {
        Self {
            slot,
            recipe_id,
            prepared: false,
        }
    }
}

/// A user's meals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    /// Owner
    pub user_id: Uuid,
    /// Calendar day key
    pub day: NaiveDate,
    /// Entries in slot order
    pub entries: Vec<MealEntry>,
    /// Last write
    pub updated_at: DateTime<Utc>,
}

impl MealPlan {
    /// Recipe assigned to a slot
    #[must_use]
    pub fn recipe_for(&self, slot: MealSlot) -> Option<RecipeId> {
        self.entries
            .iter()
            .find(|e| e.slot == slot)
            .map(|e| e.recipe_id)
    }

    /// Position of the entry holding a recipe
    #[must_use]
    pub fn position_of(&self, recipe_id: RecipeId) -> Option<usize> {
        self.entries.iter().position(|e| e.recipe_id == recipe_id)
    }

    /// All recipe identifiers in the day
    pub fn recipe_ids(&self) -> impl Iterator<Item = RecipeId> + '_ {
        self.entries.iter().map(|e| e.recipe_id)
    }
}

/// Bounded, ordered, duplicate-free candidate set of recipes for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipePool {
    /// Owner
    pub user_id: Uuid,
    /// Candidate recipe identifiers
    pub recipe_ids: Vec<RecipeId>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation
    pub updated_at: DateTime<Utc>,
}

impl RecipePool {
    /// Create a pool from identifiers, dropping duplicates while keeping order
    #[must_use]
    pub fn new(user_id: Uuid, recipe_ids: &[RecipeId]) -> Self {
        let now = Utc::now();
        let mut pool = Self {
            user_id,
            recipe_ids: Vec::with_capacity(recipe_ids.len()),
            created_at: now,
            updated_at: now,
        };
        pool.append(recipe_ids);
        pool
    }

    /// Number of identifiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipe_ids.len()
    }

    /// Whether the pool holds no identifiers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipe_ids.is_empty()
    }

    /// Whether the pool holds an identifier
    #[must_use]
    pub fn contains(&self, recipe_id: RecipeId) -> bool {
        self.recipe_ids.contains(&recipe_id)
    }

    /// Append identifiers not already present; returns how many were added
    pub fn append(&mut self, recipe_ids: &[RecipeId]) -> usize {
        let before = self.recipe_ids.len();
        for id in recipe_ids {
            if !self.recipe_ids.contains(id) {
                self.recipe_ids.push(*id);
            }
        }
        self.updated_at = Utc::now();
        self.recipe_ids.len() - before
    }

    /// Swap one identifier in place; returns false when `old_id` is absent
    ///
    /// If `new_id` is already a member the old slot is removed instead, so the
    /// pool never holds duplicates.
    pub fn replace(&mut self, old_id: RecipeId, new_id: RecipeId) -> bool {
        let Some(index) = self.recipe_ids.iter().position(|id| *id == old_id) else {
            return false;
        };
        if old_id != new_id && self.recipe_ids.contains(&new_id) {
            self.recipe_ids.remove(index);
        } else {
            self.recipe_ids[index] = new_id;
        }
        self.updated_at = Utc::now();
        true
    }
}

/// Calorie budget for one slot of a day, recomputed on every generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MealCalorieTarget {
    /// Slot the budget applies to
    pub slot: MealSlot,
    /// Share of the daily target, in percent
    pub percent_of_daily: f64,
    /// Budget in kcal
    pub kcal_target: f64,
}
