// ABOUTME: Integration tests for repository calls run under the planner's budget and deadline
// ABOUTME: Covers slow-query reporting, timed-out reads as empty results, and timed-out writes as failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use chrono::NaiveDate;
use common::{faulty_harness, profile, standard_catalog, store_with, tight_deadline_config};
use mealplan_engine::database::{PlanRepository, PoolRepository};
use mealplan_engine::errors::ErrorCode;
use mealplan_engine::planning::{Anomaly, PlanAssembler};
use std::time::Duration;
use uuid::Uuid;

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, n).unwrap()
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_read_over_budget_is_reported_but_returned() -> Result<()> {
    let (harness, faults) = faulty_harness(
        store_with(standard_catalog()).await,
        tight_deadline_config(10, 1_000),
        2000.0,
    );
    faults.delay("pools.get", Duration::from_millis(40));
    let user_id = Uuid::new_v4();
    let resources = &harness.resources;
    let mut log = resources.anomaly_log(user_id);

    let pool = resources
        .timed("pools.get", &mut log, resources.pools.get(user_id))
        .await?;

    assert_eq!(pool, Some(None));
    let anomalies = log.into_vec();
    assert_eq!(anomalies.len(), 1);
    assert!(matches!(
        anomalies[0],
        Anomaly::SlowQuery {
            operation: "pools.get",
            elapsed_ms,
        } if elapsed_ms >= 40
    ));
    Ok(())
}

#[tokio::test]
async fn test_read_past_deadline_yields_nothing() -> Result<()> {
    let (harness, faults) = faulty_harness(
        store_with(standard_catalog()).await,
        tight_deadline_config(100, 100),
        2000.0,
    );
    faults.delay("pools.get", Duration::from_millis(400));
    let user_id = Uuid::new_v4();
    let resources = &harness.resources;
    let mut log = resources.anomaly_log(user_id);

    let pool = resources
        .timed("pools.get", &mut log, resources.pools.get(user_id))
        .await?;

    assert_eq!(pool, None);
    assert_eq!(
        log.into_vec(),
        vec![Anomaly::QueryTimedOut {
            operation: "pools.get"
        }]
    );
    Ok(())
}

#[tokio::test]
async fn test_failing_read_is_a_database_error() -> Result<()> {
    let (harness, faults) = faulty_harness(
        store_with(standard_catalog()).await,
        tight_deadline_config(100, 100),
        2000.0,
    );
    faults.fail("pools.get");
    let user_id = Uuid::new_v4();
    let resources = &harness.resources;
    let mut log = resources.anomaly_log(user_id);

    let error = resources
        .timed("pools.get", &mut log, resources.pools.get(user_id))
        .await
        .expect_err("store failure");

    assert_eq!(error.code, ErrorCode::DatabaseError);
    assert!(log.as_slice().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_timed_out_history_still_plans_the_day() -> Result<()> {
    let (harness, faults) = faulty_harness(
        store_with(standard_catalog()).await,
        tight_deadline_config(100, 100),
        2000.0,
    );
    faults.delay("plans.get_range", Duration::from_millis(400));
    let profile = profile(3);
    let mut log = harness.resources.anomaly_log(profile.user_id);

    let plan = PlanAssembler::new(&harness.resources)
        .assemble(&profile, day(2), &mut log)
        .await?
        .expect("plan without history");

    assert_eq!(plan.entries.len(), 3);
    assert!(log.as_slice().contains(&Anomaly::QueryTimedOut {
        operation: "plans.get_range"
    }));
    let stored = PlanRepository::get(harness.store.as_ref(), profile.user_id, day(2)).await?;
    assert_eq!(stored.map(|plan| plan.entries), Some(plan.entries));
    Ok(())
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn test_write_past_deadline_fails_the_day() -> Result<()> {
    let (harness, faults) = faulty_harness(
        store_with(standard_catalog()).await,
        tight_deadline_config(100, 100),
        2000.0,
    );
    faults.delay("plans.upsert", Duration::from_millis(400));
    let profile = profile(3);
    let mut log = harness.resources.anomaly_log(profile.user_id);

    let error = PlanAssembler::new(&harness.resources)
        .assemble(&profile, day(2), &mut log)
        .await
        .expect_err("write past its deadline");

    assert_eq!(error.code, ErrorCode::DatabaseError);
    assert!(log.as_slice().contains(&Anomaly::QueryTimedOut {
        operation: "plans.upsert"
    }));
    assert!(PlanRepository::get(harness.store.as_ref(), profile.user_id, day(2))
        .await?
        .is_none());
    Ok(())
}
