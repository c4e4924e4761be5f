// ABOUTME: Planning engine turning a user profile and a recipe catalog into daily meal plans
// ABOUTME: Pool building and growth, daily assembly, substitution, and per-user locking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Planning Engine
//!
//! Each user owns a bounded recipe pool drawn from the catalog. Daily plans
//! are assembled from the pool, one recipe per meal slot, and individual
//! entries can later be swapped out. Every component works over a shared
//! [`PlannerResources`] and reports non-fatal conditions into an
//! [`AnomalyLog`] instead of failing.

/// Liked-first catalog draws with cuisine relaxation
pub mod draw;
/// Per-user async locks
pub mod locks;
/// Observability port and anomaly collection
pub mod observability;
/// Anomaly kinds and outcome wrapper
pub mod outcome;
/// Shared engine dependencies
pub mod resources;

/// Daily plan assembly
pub mod assembler;
/// First pool build
pub mod pool_builder;
/// Incremental pool growth
pub mod pool_grower;
/// Single recipe substitution
pub mod substitution;

pub use assembler::{slot_targets, PlanAssembler};
pub use draw::CandidateDrawer;
pub use locks::UserLocks;
pub use observability::{AnomalyLog, PlanningObserver, TracingObserver};
pub use outcome::{Anomaly, PlanOutcome};
pub use pool_builder::PoolBuilder;
pub use pool_grower::{PoolGrower, PoolGrowth};
pub use resources::PlannerResources;
pub use substitution::{RecipeSubstitution, Substitution};
