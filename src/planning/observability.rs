// ABOUTME: Injected observability port for repository timings and planning anomalies
// ABOUTME: Replaces process-wide counters with a per-engine observer and anomaly log
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::outcome::Anomaly;
use crate::logging::PlanningLogger;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Receives timing and anomaly events from the engine
pub trait PlanningObserver: Send + Sync {
    /// A repository call finished (successfully or not) after `elapsed`
    fn query_completed(&self, operation: &'static str, elapsed: Duration);

    /// A non-fatal anomaly was recorded for a user
    fn anomaly_recorded(&self, user_id: Uuid, anomaly: &Anomaly);
}

/// Observer writing events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PlanningObserver for TracingObserver {
    fn query_completed(&self, operation: &'static str, elapsed: Duration) {
        debug!(
            query.operation = operation,
            query.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Repository call completed"
        );
    }

    fn anomaly_recorded(&self, user_id: Uuid, anomaly: &Anomaly) {
        PlanningLogger::log_anomaly(user_id, anomaly);
    }
}

/// Anomalies collected during one engine call
pub struct AnomalyLog<'a> {
    user_id: Uuid,
    observer: &'a dyn PlanningObserver,
    anomalies: Vec<Anomaly>,
}

impl<'a> AnomalyLog<'a> {
    /// Empty log for a user
    #[must_use]
    pub fn new(user_id: Uuid, observer: &'a dyn PlanningObserver) -> Self {
        Self {
            user_id,
            observer,
            anomalies: Vec::new(),
        }
    }

    /// Record an anomaly and notify the observer
    pub fn record(&mut self, anomaly: Anomaly) {
        self.observer.anomaly_recorded(self.user_id, &anomaly);
        self.anomalies.push(anomaly);
    }

    /// Recorded anomalies so far
    #[must_use]
    pub fn as_slice(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Take the recorded anomalies
    #[must_use]
    pub fn into_vec(self) -> Vec<Anomaly> {
        self.anomalies
    }
}
