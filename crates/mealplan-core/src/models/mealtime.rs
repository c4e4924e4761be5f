// ABOUTME: Mealtime tags and meal slots used to key recipes and daily plans
// ABOUTME: A slot is a position in the day, a mealtime is the recipe tag it draws from
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named meal category a recipe can be tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mealtime {
    /// Morning meal
    Breakfast,
    /// Midday meal
    Lunch,
    /// Evening meal
    Dinner,
    /// Small meal between main meals
    Snack,
}

impl Mealtime {
    /// All mealtimes in day order
    pub const ALL: [Self; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Snack];

    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "dinner" => Some(Self::Dinner),
            "snack" => Some(Self::Snack),
            _ => None,
        }
    }

    /// Tag bit for this mealtime
    #[must_use]
    pub const fn tag(&self) -> MealtimeTags {
        match self {
            Self::Breakfast => MealtimeTags::BREAKFAST,
            Self::Lunch => MealtimeTags::LUNCH,
            Self::Dinner => MealtimeTags::DINNER,
            Self::Snack => MealtimeTags::SNACK,
        }
    }

    /// Whether slots of this mealtime may reuse recipes served on previous days
    #[must_use]
    pub const fn allows_cross_day_repeat(&self) -> bool {
        matches!(self, Self::Snack)
    }
}

impl fmt::Display for Mealtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Set of mealtimes a recipe can serve
    ///
    /// Stored as an integer bitmask so the catalog can be filtered with a
    /// single `&` predicate.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MealtimeTags: u8 {
        /// Suitable for breakfast
        const BREAKFAST = 0b0001;
        /// Suitable for lunch
        const LUNCH = 0b0010;
        /// Suitable for dinner
        const DINNER = 0b0100;
        /// Suitable as a snack
        const SNACK = 0b1000;
    }
}

impl MealtimeTags {
    /// Whether the set contains the given mealtime
    #[must_use]
    pub const fn serves(&self, mealtime: Mealtime) -> bool {
        self.contains(mealtime.tag())
    }
}

impl From<Mealtime> for MealtimeTags {
    fn from(mealtime: Mealtime) -> Self {
        mealtime.tag()
    }
}

/// Position of a meal within a day
///
/// Five-meal profiles need two snack positions, so plans are keyed by slot
/// rather than by mealtime. Each slot draws from exactly one mealtime tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    /// Breakfast
    Breakfast,
    /// Snack between breakfast and lunch
    MorningSnack,
    /// Lunch
    Lunch,
    /// Snack between lunch and dinner
    AfternoonSnack,
    /// Dinner
    Dinner,
}

impl MealSlot {
    /// Mealtime tag recipes for this slot must carry
    #[must_use]
    pub const fn mealtime(&self) -> Mealtime {
        match self {
            Self::Breakfast => Mealtime::Breakfast,
            Self::Lunch => Mealtime::Lunch,
            Self::Dinner => Mealtime::Dinner,
            Self::MorningSnack | Self::AfternoonSnack => Mealtime::Snack,
        }
    }

    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::MorningSnack => "morning_snack",
            Self::Lunch => "lunch",
            Self::AfternoonSnack => "afternoon_snack",
            Self::Dinner => "dinner",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "breakfast" => Some(Self::Breakfast),
            "morning_snack" => Some(Self::MorningSnack),
            "lunch" => Some(Self::Lunch),
            "afternoon_snack" | "snack" => Some(Self::AfternoonSnack),
            "dinner" => Some(Self::Dinner),
            _ => None,
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
