// ABOUTME: Best-effort planning results carrying a value plus non-fatal anomalies
// ABOUTME: Anomalies describe shortfalls that degrade a result without failing the call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use mealplan_core::models::{MealSlot, Mealtime, RecipeId};
use serde::Serialize;
use std::fmt;

/// Non-fatal planning shortfall
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// No daily calorie target could be derived from the profile
    ProfileIncomplete,
    /// The profile's meal count has no split table
    UnsupportedMealCount {
        /// Configured count
        meal_count: u8,
    },
    /// A pool build found no candidates for any mealtime
    EmptyPool,
    /// No candidate was found for a mealtime during pool building or growth
    NoCandidates {
        /// Mealtime that ran dry
        mealtime: Mealtime,
        /// Draws left unfilled
        unfilled: usize,
    },
    /// No candidate satisfied a slot of the day; the slot was omitted
    SlotUnfilled {
        /// Omitted slot
        slot: MealSlot,
    },
    /// A repository call exceeded the query budget
    SlowQuery {
        /// Operation name
        operation: &'static str,
        /// Elapsed time
        elapsed_ms: u64,
    },
    /// A repository call exceeded the deadline and was abandoned
    QueryTimedOut {
        /// Operation name
        operation: &'static str,
    },
    /// The assembled day sums below the daily calorie floor
    UnderTarget {
        /// Summed calories of the assembled day
        total_kcal: f64,
        /// `daily_target × (1 − tolerance)`
        floor_kcal: f64,
    },
    /// No plan exists for the requested day
    PlanMissing {
        /// Requested day
        day: NaiveDate,
    },
    /// The recipe to replace is not part of the day's plan
    RecipeNotInPlan {
        /// Recipe the caller asked to replace
        recipe_id: RecipeId,
    },
}

impl Anomaly {
    /// Stable name of the anomaly kind, used as a log field
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::ProfileIncomplete => "profile_incomplete",
            Self::UnsupportedMealCount { .. } => "unsupported_meal_count",
            Self::EmptyPool => "empty_pool",
            Self::NoCandidates { .. } => "no_candidates",
            Self::SlotUnfilled { .. } => "slot_unfilled",
            Self::SlowQuery { .. } => "slow_query",
            Self::QueryTimedOut { .. } => "query_timed_out",
            Self::UnderTarget { .. } => "under_target",
            Self::PlanMissing { .. } => "plan_missing",
            Self::RecipeNotInPlan { .. } => "recipe_not_in_plan",
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProfileIncomplete => {
                f.write_str("profile lacks weight, height or age for a calorie target")
            }
            Self::UnsupportedMealCount { meal_count } => {
                write!(f, "meal count {meal_count} is not supported")
            }
            Self::EmptyPool => f.write_str("no candidates found for any mealtime"),
            Self::NoCandidates { mealtime, unfilled } => {
                write!(f, "no {mealtime} candidates, {unfilled} draws unfilled")
            }
            Self::SlotUnfilled { slot } => write!(f, "no candidate for {slot}, slot omitted"),
            Self::SlowQuery {
                operation,
                elapsed_ms,
            } => write!(f, "{operation} took {elapsed_ms} ms"),
            Self::QueryTimedOut { operation } => write!(f, "{operation} timed out"),
            Self::UnderTarget {
                total_kcal,
                floor_kcal,
            } => write!(f, "day totals {total_kcal:.0} kcal, below {floor_kcal:.0} kcal"),
            Self::PlanMissing { day } => write!(f, "no plan for {day}"),
            Self::RecipeNotInPlan { recipe_id } => {
                write!(f, "recipe {recipe_id} is not in the plan")
            }
        }
    }
}

/// A best-effort value plus the anomalies hit while producing it
#[derive(Debug, Clone)]
pub struct PlanOutcome<T> {
    /// Result, if one could be produced
    pub value: Option<T>,
    /// Non-fatal shortfalls in the order they occurred
    pub anomalies: Vec<Anomaly>,
}

impl<T> PlanOutcome<T> {
    /// Outcome with a value and the anomalies collected so far
    #[must_use]
    pub const fn new(value: Option<T>, anomalies: Vec<Anomaly>) -> Self {
        Self { value, anomalies }
    }

    /// Outcome with no value
    #[must_use]
    pub const fn empty(anomalies: Vec<Anomaly>) -> Self {
        Self {
            value: None,
            anomalies,
        }
    }

    /// Whether any anomaly of the given kind was recorded
    #[must_use]
    pub fn has(&self, kind: &str) -> bool {
        self.anomalies.iter().any(|a| a.kind_name() == kind)
    }

    /// Map the value, keeping anomalies
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PlanOutcome<U> {
        PlanOutcome {
            value: self.value.map(f),
            anomalies: self.anomalies,
        }
    }
}
