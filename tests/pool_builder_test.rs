// ABOUTME: Integration tests for first-time recipe pool construction
// ABOUTME: Covers mealtime proportions, partial pools, empty catalogs, and hard exclusions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use common::{
    faulty_harness, profile, quiet_config, recipe, recipes, standard_catalog, store_with,
    tight_deadline_config, Harness,
};
use mealplan_engine::database::{PoolRepository, RecipeRepository};
use mealplan_engine::intelligence::{split_daily_calories, PlanningConfig};
use mealplan_engine::models::{DiseaseFlags, Mealtime, MealtimeTags, RecipeProjection};
use mealplan_engine::planning::{Anomaly, PoolBuilder};
use std::time::Duration;

// ============================================================================
// Proportions
// ============================================================================

#[tokio::test]
async fn test_first_pool_follows_mealtime_proportions() -> Result<()> {
    let harness = Harness::new(store_with(standard_catalog()).await, quiet_config(), 2000.0);
    let profile = profile(3);
    let targets = split_daily_calories(2000.0, 3);
    let mut log = harness.resources.anomaly_log(profile.user_id);

    let pool = PoolBuilder::new(&harness.resources)
        .ensure(&profile, &targets, &mut log)
        .await?
        .expect("pool should be built");

    // 42 × 0.30 = 12.6 and 42 × 0.35 = 14.7: the two spare draws go to lunch and dinner
    assert_eq!(pool.len(), 42);
    let members = harness
        .store
        .find_by_ids(&pool.recipe_ids, RecipeProjection::Planning, pool.len())
        .await?;
    let count = |mealtime: Mealtime| members.iter().filter(|r| r.serves(mealtime)).count();
    assert_eq!(count(Mealtime::Breakfast), 12);
    assert_eq!(count(Mealtime::Lunch), 15);
    assert_eq!(count(Mealtime::Dinner), 15);
    assert_eq!(count(Mealtime::Snack), 0);
    assert!(log.as_slice().is_empty());

    let stored = PoolRepository::get(harness.store.as_ref(), profile.user_id).await?.expect("stored pool");
    assert_eq!(stored.recipe_ids, pool.recipe_ids);
    Ok(())
}

#[tokio::test]
async fn test_snack_profiles_reserve_snack_share() -> Result<()> {
    let harness = Harness::new(store_with(standard_catalog()).await, quiet_config(), 2000.0);
    let profile = profile(5);
    let targets = split_daily_calories(2000.0, 5);
    let mut log = harness.resources.anomaly_log(profile.user_id);

    let pool = PoolBuilder::new(&harness.resources)
        .ensure(&profile, &targets, &mut log)
        .await?
        .expect("pool should be built");

    let members = harness
        .store
        .find_by_ids(&pool.recipe_ids, RecipeProjection::Planning, pool.len())
        .await?;
    // 42 × 0.15 → 6 snacks at the 200 kcal morning-snack budget
    assert_eq!(members.iter().filter(|r| r.serves(Mealtime::Snack)).count(), 6);
    Ok(())
}

#[tokio::test]
async fn test_pool_size_matches_first_week_size() -> Result<()> {
    for first_week in [10, 41, 42, 43, 50] {
        let config = PlanningConfig {
            first_week_pool_size: first_week,
            ..quiet_config()
        };
        let harness = Harness::new(store_with(standard_catalog()).await, config, 2000.0);
        for meal_count in [3, 5] {
            let profile = profile(meal_count);
            let targets = split_daily_calories(2000.0, meal_count);
            let mut log = harness.resources.anomaly_log(profile.user_id);

            let pool = PoolBuilder::new(&harness.resources)
                .ensure(&profile, &targets, &mut log)
                .await?
                .unwrap();

            assert_eq!(pool.len(), first_week, "{meal_count} meals, size {first_week}");
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_existing_pool_is_returned_unchanged() -> Result<()> {
    let harness = Harness::new(store_with(standard_catalog()).await, quiet_config(), 2000.0);
    let profile = profile(3);
    let targets = split_daily_calories(2000.0, 3);
    let builder = PoolBuilder::new(&harness.resources);

    let mut log = harness.resources.anomaly_log(profile.user_id);
    let first = builder.ensure(&profile, &targets, &mut log).await?.unwrap();
    let second = builder.ensure(&profile, &targets, &mut log).await?.unwrap();

    assert_eq!(first.recipe_ids, second.recipe_ids);
    assert_eq!(first.created_at, second.created_at);
    Ok(())
}

// ============================================================================
// Degraded catalogs
// ============================================================================

#[tokio::test]
async fn test_scarce_mealtime_yields_partial_pool() -> Result<()> {
    let mut catalog = recipes(100, 5, 450.0, MealtimeTags::BREAKFAST);
    catalog.extend(recipes(200, 30, 700.0, MealtimeTags::LUNCH));
    catalog.extend(recipes(300, 30, 700.0, MealtimeTags::DINNER));
    let harness = Harness::new(store_with(catalog).await, quiet_config(), 2000.0);
    let profile = profile(3);
    let targets = split_daily_calories(2000.0, 3);
    let mut log = harness.resources.anomaly_log(profile.user_id);

    let pool = PoolBuilder::new(&harness.resources)
        .ensure(&profile, &targets, &mut log)
        .await?
        .expect("partial pool");

    assert_eq!(pool.len(), 5 + 15 + 15);
    assert!(log.as_slice().contains(&Anomaly::NoCandidates {
        mealtime: Mealtime::Breakfast,
        unfilled: 7,
    }));
    Ok(())
}

#[tokio::test]
async fn test_empty_catalog_builds_no_pool() -> Result<()> {
    let harness = Harness::new(store_with(Vec::new()).await, quiet_config(), 2000.0);
    let profile = profile(3);
    let targets = split_daily_calories(2000.0, 3);
    let mut log = harness.resources.anomaly_log(profile.user_id);

    let pool = PoolBuilder::new(&harness.resources)
        .ensure(&profile, &targets, &mut log)
        .await?;

    assert!(pool.is_none());
    assert!(log.as_slice().contains(&Anomaly::EmptyPool));
    assert!(PoolRepository::get(harness.store.as_ref(), profile.user_id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_unsupported_meal_count_builds_no_pool() -> Result<()> {
    let harness = Harness::new(store_with(standard_catalog()).await, quiet_config(), 2000.0);
    let profile = profile(7);
    let mut log = harness.resources.anomaly_log(profile.user_id);

    let pool = PoolBuilder::new(&harness.resources)
        .ensure(&profile, &[], &mut log)
        .await?;

    assert!(pool.is_none());
    assert_eq!(
        log.as_slice(),
        &[Anomaly::UnsupportedMealCount { meal_count: 7 }]
    );
    Ok(())
}

// ============================================================================
// Exclusions and translations
// ============================================================================

#[tokio::test]
async fn test_pool_never_holds_conflicting_recipes() -> Result<()> {
    let mut catalog = standard_catalog();
    catalog.extend((500..520).map(|id| {
        recipe(id, 450.0, MealtimeTags::BREAKFAST).with_disease_conflicts(DiseaseFlags::DIABETES)
    }));
    catalog.extend((600..620).map(|id| recipe(id, 700.0, MealtimeTags::LUNCH).with_cuisine(9)));
    let harness = Harness::new(store_with(catalog).await, quiet_config(), 2000.0);
    let profile = profile(3)
        .with_avoided_diseases(DiseaseFlags::DIABETES)
        .with_excluded_cuisines(vec![9]);
    let targets = split_daily_calories(2000.0, 3);
    let mut log = harness.resources.anomaly_log(profile.user_id);

    let pool = PoolBuilder::new(&harness.resources)
        .ensure(&profile, &targets, &mut log)
        .await?
        .unwrap();

    assert!(pool.recipe_ids.iter().all(|id| *id < 500));
    Ok(())
}

#[tokio::test]
async fn test_untranslated_members_are_queued() -> Result<()> {
    let harness = Harness::new(store_with(standard_catalog()).await, quiet_config(), 2000.0);
    let profile = profile(3).with_language("fr");
    let targets = split_daily_calories(2000.0, 3);
    let mut log = harness.resources.anomaly_log(profile.user_id);

    let pool = PoolBuilder::new(&harness.resources)
        .ensure(&profile, &targets, &mut log)
        .await?
        .unwrap();

    let requests = harness.translations.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].language, "fr");
    assert_eq!(requests[0].recipe_ids.len(), pool.len());
    Ok(())
}

// ============================================================================
// Likes and cuisine preferences
// ============================================================================

fn liking_config() -> PlanningConfig {
    PlanningConfig {
        like_bias_chance_percent: 100,
        ..quiet_config()
    }
}

#[tokio::test]
async fn test_liked_recipes_are_drawn_first() -> Result<()> {
    let harness = Harness::new(store_with(standard_catalog()).await, liking_config(), 2000.0);
    let profile = profile(3);
    harness.store.like(profile.user_id, 117).await;
    harness.store.like(profile.user_id, 223).await;
    let targets = split_daily_calories(2000.0, 3);
    let mut log = harness.resources.anomaly_log(profile.user_id);

    let pool = PoolBuilder::new(&harness.resources)
        .ensure(&profile, &targets, &mut log)
        .await?
        .unwrap();

    // breakfasts are drawn first (12 of them), then lunches
    assert_eq!(pool.recipe_ids[0], 117);
    assert_eq!(pool.recipe_ids[12], 223);
    assert_eq!(pool.len(), 42);
    Ok(())
}

#[tokio::test]
async fn test_unusable_likes_fall_back_to_the_catalog() -> Result<()> {
    let mut catalog = standard_catalog();
    // outside every calorie window of a 2000 kcal day
    catalog.push(recipe(900, 1500.0, MealtimeTags::LUNCH));
    let harness = Harness::new(store_with(catalog).await, liking_config(), 2000.0);
    let profile = profile(3);
    harness.store.like(profile.user_id, 900).await;
    let targets = split_daily_calories(2000.0, 3);
    let mut log = harness.resources.anomaly_log(profile.user_id);

    let pool = PoolBuilder::new(&harness.resources)
        .ensure(&profile, &targets, &mut log)
        .await?
        .unwrap();

    assert_eq!(pool.len(), 42);
    assert!(!pool.contains(900));
    assert!(log.as_slice().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_preferred_cuisine_is_used_then_relaxed() -> Result<()> {
    let mut catalog = standard_catalog();
    catalog.extend((600..610).map(|id| recipe(id, 700.0, MealtimeTags::LUNCH).with_cuisine(5)));
    let harness = Harness::new(store_with(catalog).await, quiet_config(), 2000.0);
    let profile = profile(3).with_preferred_cuisines(vec![5]);
    let targets = split_daily_calories(2000.0, 3);
    let mut log = harness.resources.anomaly_log(profile.user_id);

    let pool = PoolBuilder::new(&harness.resources)
        .ensure(&profile, &targets, &mut log)
        .await?
        .unwrap();

    // all ten preferred lunches first, then the rest of the day without the preference
    assert_eq!(pool.len(), 42);
    assert!((600..610).all(|id| pool.contains(id)));
    let lunches: Vec<i64> = pool.recipe_ids[12..27].to_vec();
    assert!(lunches[..10].iter().all(|id| (600..610).contains(id)));
    assert!(lunches[10..].iter().all(|id| (200..230).contains(id)));
    assert!(pool.recipe_ids[..12].iter().all(|id| (100..130).contains(id)));
    assert!(log.as_slice().is_empty());
    Ok(())
}

// ============================================================================
// Deadlines
// ============================================================================

#[tokio::test]
async fn test_timed_out_pool_read_does_not_rebuild() -> Result<()> {
    let (harness, faults) = faulty_harness(
        store_with(standard_catalog()).await,
        tight_deadline_config(20, 50),
        2000.0,
    );
    faults.delay("pools.get", Duration::from_millis(300));
    let profile = profile(3);
    let targets = split_daily_calories(2000.0, 3);
    let mut log = harness.resources.anomaly_log(profile.user_id);

    let pool = PoolBuilder::new(&harness.resources)
        .ensure(&profile, &targets, &mut log)
        .await?;

    assert!(pool.is_none());
    assert_eq!(
        log.as_slice(),
        &[Anomaly::QueryTimedOut {
            operation: "pools.get"
        }]
    );
    assert!(PoolRepository::get(harness.store.as_ref(), profile.user_id)
        .await?
        .is_none());
    assert!(harness.translations.requests().is_empty());
    Ok(())
}
