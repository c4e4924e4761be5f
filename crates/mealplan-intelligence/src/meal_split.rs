// ABOUTME: Meal calorie splitter turning a daily kcal target into per-slot budgets
// ABOUTME: Fixed percentage tables for 3, 4, and 5 meals per day
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use mealplan_core::models::{MealCalorieTarget, MealCount, MealSlot};

const THREE_MEALS: &[(MealSlot, f64)] = &[
    (MealSlot::Breakfast, 25.0),
    (MealSlot::Lunch, 37.5),
    (MealSlot::Dinner, 37.5),
];

const FOUR_MEALS: &[(MealSlot, f64)] = &[
    (MealSlot::Breakfast, 25.0),
    (MealSlot::Lunch, 35.0),
    (MealSlot::AfternoonSnack, 10.0),
    (MealSlot::Dinner, 30.0),
];

const FIVE_MEALS: &[(MealSlot, f64)] = &[
    (MealSlot::Breakfast, 20.0),
    (MealSlot::MorningSnack, 10.0),
    (MealSlot::Lunch, 30.0),
    (MealSlot::AfternoonSnack, 10.0),
    (MealSlot::Dinner, 30.0),
];

/// Percentage table for a meal count
#[must_use]
pub const fn split_table(meal_count: MealCount) -> &'static [(MealSlot, f64)] {
    match meal_count {
        MealCount::Three => THREE_MEALS,
        MealCount::Four => FOUR_MEALS,
        MealCount::Five => FIVE_MEALS,
    }
}

/// Split a daily kcal target into slot budgets in day order
///
/// An unrecognized meal count or a non-positive target yields an empty list,
/// which makes plan generation a no-op downstream.
#[must_use]
pub fn split_daily_calories(daily_kcal: f64, meal_count: u8) -> Vec<MealCalorieTarget> {
    let Some(count) = MealCount::from_count(meal_count) else {
        tracing::warn!(meal_count, "Unrecognized meal count, no calorie split produced");
        return Vec::new();
    };
    if !daily_kcal.is_finite() || daily_kcal <= 0.0 {
        return Vec::new();
    }

    split_table(count)
        .iter()
        .map(|&(slot, percent)| MealCalorieTarget {
            slot,
            percent_of_daily: percent,
            kcal_target: daily_kcal * percent / 100.0,
        })
        .collect()
}
