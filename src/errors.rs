// ABOUTME: Unified error handling for the engine crate, re-exported from mealplan-core
// ABOUTME: Error types live in the core crate so every workspace member shares them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use mealplan_core::errors::{AppError, AppResult, DatabaseError, ErrorCode, ErrorContext};
