// ABOUTME: Structured error types for recipe, pool, and plan store operations
// ABOUTME: Provides domain-specific errors with context for persistence failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use thiserror::Error;

/// Errors raised by the recipe, pool and plan stores
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Entity does not exist
    #[error("Entity not found: {entity_type} with id {entity_id}")]
    NotFound {
        /// Kind of entity looked up
        entity_type: &'static str,
        /// Identifier used for the lookup
        entity_id: String,
    },

    /// Query execution failed
    #[error("Query failed: {context}")]
    QueryError {
        /// What the query was doing
        context: String,
    },

    /// Could not reach the store
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Stored payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Schema bootstrap failed
    #[error("Migration failed: {0}")]
    MigrationError(String),
}

impl DatabaseError {
    /// Create a "not found" error
    #[must_use]
    pub fn not_found(entity_type: &'static str, entity_id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            entity_id: entity_id.into(),
        }
    }

    /// Create a query error with context
    #[must_use]
    pub fn query(context: impl Into<String>) -> Self {
        Self::QueryError {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(error: serde_json::Error) -> Self {
        Self::SerializationError(error.to_string())
    }
}

#[cfg(feature = "database-errors")]
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => Self::NotFound {
                entity_type: "row",
                entity_id: String::new(),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::ConnectionError(error.to_string())
            }
            _ => Self::QueryError {
                context: error.to_string(),
            },
        }
    }
}
