// ABOUTME: External collaborator ports used by the planning engine
// ABOUTME: Provides the fire-and-forget recipe translation queue
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! External Collaborators
//!
//! Ports for services owned outside the engine.

/// Recipe translation queue port and its implementations
pub mod translation;

// Re-export commonly used types
pub use translation::{
    ChannelTranslationQueue, NoopTranslationQueue, TranslationQueue, TranslationRequest,
};
