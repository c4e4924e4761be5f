// ABOUTME: Fire-and-forget translation queue for recipes missing text in a user's language
// ABOUTME: Channel-backed implementation plus a no-op queue for deployments without translation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use mealplan_core::models::RecipeId;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// One batch of recipes to translate into a language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    /// Recipes lacking text in `language`
    pub recipe_ids: Vec<RecipeId>,
    /// Target language code
    pub language: String,
}

/// Queue accepting translation requests without waiting for them
pub trait TranslationQueue: Send + Sync {
    /// Enqueue recipes for translation; never fails the caller
    fn enqueue(&self, recipe_ids: &[RecipeId], language: &str);
}

/// Queue that drops every request
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTranslationQueue;

impl TranslationQueue for NoopTranslationQueue {
    fn enqueue(&self, recipe_ids: &[RecipeId], language: &str) {
        debug!(
            recipe.count = recipe_ids.len(),
            language, "Translation queue disabled, request dropped"
        );
    }
}

/// Queue forwarding requests over an unbounded tokio channel
///
/// A worker outside the engine drains the receiver. If the receiver has been
/// dropped, requests are logged and discarded.
#[derive(Debug, Clone)]
pub struct ChannelTranslationQueue {
    tx: UnboundedSender<TranslationRequest>,
}

impl ChannelTranslationQueue {
    /// Create a queue and the receiver its worker should drain
    #[must_use]
    pub fn new() -> (Self, UnboundedReceiver<TranslationRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TranslationQueue for ChannelTranslationQueue {
    fn enqueue(&self, recipe_ids: &[RecipeId], language: &str) {
        if recipe_ids.is_empty() {
            return;
        }
        let request = TranslationRequest {
            recipe_ids: recipe_ids.to_vec(),
            language: language.to_owned(),
        };
        if self.tx.send(request).is_err() {
            warn!(
                recipe.count = recipe_ids.len(),
                language, "Translation worker is gone, request discarded"
            );
        }
    }
}
