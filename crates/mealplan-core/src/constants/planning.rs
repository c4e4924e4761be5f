// ABOUTME: Default values for meal plan generation and recipe pool sizing
// ABOUTME: Used by PlanningConfig defaults and by the calorie splitter tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Width of the calorie band below a mealtime target, in percent
pub const CALORIE_TOLERANCE_PERCENT: f64 = 25.0;

/// Number of recipe identifiers drawn when a pool is first built
pub const FIRST_WEEK_POOL_SIZE: usize = 42;

/// Hard cap on the number of identifiers a pool may hold
pub const MAX_POOL_SIZE: usize = 150;

/// Identifiers requested per incremental growth
pub const GROWTH_BATCH_SIZE: usize = 6;

/// Days looked back when building the no-repeat ignore window
pub const IGNORE_WINDOW_DAYS: u32 = 2;

/// Chance that yesterday's dinner becomes today's lunch
pub const LUNCH_REPEAT_CHANCE_PERCENT: u8 = 100;

/// Chance that a draw first tries the user's liked recipes
pub const LIKE_BIAS_CHANCE_PERCENT: u8 = 30;

/// Maximum ingredient count for any drawn recipe
pub const MAX_INGREDIENTS: u16 = 12;

/// Repository draws slower than this are reported as slow queries
pub const QUERY_BUDGET_MS: u64 = 250;

/// Repository calls are abandoned after this deadline
pub const QUERY_DEADLINE_MS: u64 = 5_000;

/// Upper bound on liked recipe identifiers sampled per draw batch
pub const LIKED_SAMPLE_LIMIT: usize = 50;
