// ABOUTME: Planning constants organized by concern for the meal plan engine
// ABOUTME: Groups default tolerances, pool sizing, and randomized-branch chances
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Default values for meal plan generation
pub mod planning;

/// Language used when a profile does not carry one
pub const DEFAULT_LANGUAGE: &str = "en";
