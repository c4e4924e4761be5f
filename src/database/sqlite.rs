// ABOUTME: SQLite implementation of the recipe, pool, and plan repositories using sqlx
// ABOUTME: Schema bootstrap, condition-driven random draws, and JSON-encoded pools and plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{DatabaseError, PlanRepository, PoolRepository, RecipeRepository};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mealplan_core::constants::planning::LIKED_SAMPLE_LIMIT;
use mealplan_core::models::{
    DiseaseFlags, LocalizedText, MealEntry, MealPlan, MealSlot, MealtimeTags, Recipe, RecipeId,
    RecipePool, RecipeProjection,
};
use mealplan_intelligence::SelectionConditions;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

const RECIPE_COLUMNS: &str = "id, calories, mealtimes, ingredient_count, prep_time_mins, \
                              health_score, cuisine_id, disease_conflicts";

/// Value bound into a dynamically built query
enum BindValue {
    Int(i64),
    Real(f64),
}

/// `SQLite` store implementing every repository port
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and bootstrap the schema
    ///
    /// In-memory databases are held on a single connection so every query
    /// sees the same database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema bootstrap fails
    pub async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        let is_memory = database_url.contains(":memory:");
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if !is_memory && database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(if is_memory { 1 } else { 5 })
            .connect(&connection_options)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Wrap an existing pool without touching the schema
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if missing
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        let statements = [
            r"
            CREATE TABLE IF NOT EXISTS recipes (
                id INTEGER PRIMARY KEY,
                calories REAL NOT NULL,
                mealtimes INTEGER NOT NULL,
                ingredient_count INTEGER NOT NULL DEFAULT 0,
                prep_time_mins INTEGER NOT NULL DEFAULT 0,
                health_score INTEGER NOT NULL DEFAULT 0,
                cuisine_id INTEGER,
                disease_conflicts INTEGER NOT NULL DEFAULT 0
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS recipe_translations (
                recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                language TEXT NOT NULL,
                name TEXT NOT NULL,
                preparation TEXT,
                PRIMARY KEY (recipe_id, language)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS recipe_likes (
                user_id TEXT NOT NULL,
                recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                PRIMARY KEY (user_id, recipe_id)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS recipe_pools (
                user_id TEXT PRIMARY KEY,
                recipe_ids TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS meal_plans (
                user_id TEXT NOT NULL,
                day TEXT NOT NULL,
                entries TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, day)
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_recipes_mealtimes_calories ON recipes(mealtimes, calories)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
        }
        Ok(())
    }

    /// Insert or replace a catalog recipe with its translations
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn insert_recipe(&self, recipe: &Recipe) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT OR REPLACE INTO recipes
                (id, calories, mealtimes, ingredient_count, prep_time_mins,
                 health_score, cuisine_id, disease_conflicts)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(recipe.id)
        .bind(recipe.calories)
        .bind(i64::from(recipe.mealtimes.bits()))
        .bind(i64::from(recipe.ingredient_count))
        .bind(i64::from(recipe.prep_time_mins))
        .bind(i64::from(recipe.health_score))
        .bind(recipe.cuisine_id)
        .bind(i64::from(recipe.disease_conflicts.bits()))
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM recipe_translations WHERE recipe_id = ?")
            .bind(recipe.id)
            .execute(&mut *tx)
            .await?;

        for (language, text) in &recipe.localized {
            sqlx::query(
                "INSERT INTO recipe_translations (recipe_id, language, name, preparation) VALUES (?, ?, ?, ?)",
            )
            .bind(recipe.id)
            .bind(language)
            .bind(&text.name)
            .bind(&text.preparation)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Record that a user liked a recipe
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn like(&self, user_id: Uuid, recipe_id: RecipeId) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT OR IGNORE INTO recipe_likes (user_id, recipe_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id.to_string())
        .bind(recipe_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_translations(
        &self,
        ids: &[RecipeId],
    ) -> Result<HashMap<RecipeId, BTreeMap<String, LocalizedText>>, DatabaseError> {
        let mut translations: HashMap<RecipeId, BTreeMap<String, LocalizedText>> = HashMap::new();
        if ids.is_empty() {
            return Ok(translations);
        }

        let query = format!(
            "SELECT recipe_id, language, name, preparation FROM recipe_translations WHERE recipe_id IN ({})",
            placeholders(ids.len())
        );
        let mut sql_query = sqlx::query(&query);
        for id in ids {
            sql_query = sql_query.bind(id);
        }

        for row in sql_query.fetch_all(&self.pool).await? {
            let recipe_id: RecipeId = row.try_get("recipe_id")?;
            let language: String = row.try_get("language")?;
            let text = LocalizedText {
                name: row.try_get("name")?,
                preparation: row.try_get("preparation")?,
            };
            translations
                .entry(recipe_id)
                .or_default()
                .insert(language, text);
        }
        Ok(translations)
    }

    async fn load_pool(
        executor: &mut sqlx::SqliteConnection,
        user_id: Uuid,
    ) -> Result<Option<RecipePool>, DatabaseError> {
        let row = sqlx::query(
            "SELECT user_id, recipe_ids, created_at, updated_at FROM recipe_pools WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(executor)
        .await?;

        row.as_ref().map(row_to_pool).transpose()
    }

    async fn store_pool(
        executor: &mut sqlx::SqliteConnection,
        pool: &RecipePool,
    ) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE recipe_pools SET recipe_ids = ?, updated_at = ? WHERE user_id = ?")
            .bind(serde_json::to_string(&pool.recipe_ids)?)
            .bind(pool.updated_at.to_rfc3339())
            .bind(pool.user_id.to_string())
            .execute(executor)
            .await?;
        Ok(())
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::SerializationError(format!("Invalid datetime: {e}")))
}

fn parse_uuid(value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value)
        .map_err(|e| DatabaseError::SerializationError(format!("Invalid user id: {e}")))
}

/// Convert a database row to a `Recipe` without translations
fn row_to_recipe(row: &SqliteRow) -> Result<Recipe, DatabaseError> {
    let mealtimes: i64 = row.try_get("mealtimes")?;
    let ingredient_count: i64 = row.try_get("ingredient_count")?;
    let prep_time_mins: i64 = row.try_get("prep_time_mins")?;
    let health_score: i64 = row.try_get("health_score")?;
    let disease_conflicts: i64 = row.try_get("disease_conflicts")?;

    Ok(Recipe {
        id: row.try_get("id")?,
        calories: row.try_get("calories")?,
        mealtimes: MealtimeTags::from_bits_truncate(u8::try_from(mealtimes).unwrap_or(0)),
        ingredient_count: u16::try_from(ingredient_count).unwrap_or(u16::MAX),
        prep_time_mins: u16::try_from(prep_time_mins).unwrap_or(u16::MAX),
        health_score: u8::try_from(health_score).unwrap_or(0),
        cuisine_id: row.try_get("cuisine_id")?,
        disease_conflicts: DiseaseFlags::from_bits_truncate(
            u16::try_from(disease_conflicts).unwrap_or(u16::MAX),
        ),
        localized: BTreeMap::new(),
    })
}

/// Convert a database row to a `RecipePool`
fn row_to_pool(row: &SqliteRow) -> Result<RecipePool, DatabaseError> {
    let user_id: String = row.try_get("user_id")?;
    let ids_json: String = row.try_get("recipe_ids")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(RecipePool {
        user_id: parse_uuid(&user_id)?,
        recipe_ids: serde_json::from_str(&ids_json)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Convert a database row to a `MealPlan`
fn row_to_plan(row: &SqliteRow) -> Result<MealPlan, DatabaseError> {
    let user_id: String = row.try_get("user_id")?;
    let day: String = row.try_get("day")?;
    let entries_json: String = row.try_get("entries")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(MealPlan {
        user_id: parse_uuid(&user_id)?,
        day: NaiveDate::parse_from_str(&day, "%Y-%m-%d")
            .map_err(|e| DatabaseError::SerializationError(format!("Invalid day: {e}")))?,
        entries: serde_json::from_str(&entries_json)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Build the WHERE clause and bind values for a condition set
fn match_clause(
    conditions: &SelectionConditions,
    exclude: &HashSet<RecipeId>,
) -> (String, Vec<BindValue>) {
    let window = conditions.calories();
    let mut clauses = vec![
        "(mealtimes & ?) != 0".to_owned(),
        "calories >= ?".to_owned(),
        "calories <= ?".to_owned(),
        "ingredient_count <= ?".to_owned(),
        "(disease_conflicts & ?) = 0".to_owned(),
    ];
    let mut binds = vec![
        BindValue::Int(i64::from(conditions.mealtime().tag().bits())),
        BindValue::Real(window.min()),
        BindValue::Real(window.max()),
        BindValue::Int(i64::from(conditions.max_ingredients())),
        BindValue::Int(i64::from(conditions.avoided_diseases().bits())),
    ];

    if let Some(score) = conditions.min_health_score() {
        clauses.push("health_score >= ?".to_owned());
        binds.push(BindValue::Int(i64::from(score)));
    }
    if let Some(mins) = conditions.max_prep_time_mins() {
        clauses.push("prep_time_mins <= ?".to_owned());
        binds.push(BindValue::Int(i64::from(mins)));
    }

    let mut push_list = |clause: String, ids: &[i64]| {
        clauses.push(clause);
        binds.extend(ids.iter().map(|id| BindValue::Int(*id)));
    };

    let excluded_cuisines = conditions.cuisine_exclude();
    if !excluded_cuisines.is_empty() {
        push_list(
            format!(
                "(cuisine_id IS NULL OR cuisine_id NOT IN ({}))",
                placeholders(excluded_cuisines.len())
            ),
            excluded_cuisines,
        );
    }
    if let Some(included) = conditions.cuisine_include() {
        push_list(
            format!("cuisine_id IN ({})", placeholders(included.len())),
            included,
        );
    }
    if let Some(bias) = conditions.bias_ids() {
        push_list(format!("id IN ({})", placeholders(bias.len())), bias);
    }
    if !exclude.is_empty() {
        let ids: Vec<RecipeId> = exclude.iter().copied().collect();
        push_list(format!("id NOT IN ({})", placeholders(ids.len())), &ids);
    }

    (clauses.join(" AND "), binds)
}

#[async_trait]
impl RecipeRepository for SqliteStore {
    async fn find_random_match(
        &self,
        conditions: &SelectionConditions,
        exclude: &HashSet<RecipeId>,
    ) -> Result<Option<Recipe>, DatabaseError> {
        let (where_clause, binds) = match_clause(conditions, exclude);
        let query = format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE {where_clause} ORDER BY RANDOM() LIMIT 1"
        );

        let mut sql_query = sqlx::query(&query);
        for value in binds {
            sql_query = match value {
                BindValue::Int(v) => sql_query.bind(v),
                BindValue::Real(v) => sql_query.bind(v),
            };
        }

        let Some(row) = sql_query.fetch_optional(&self.pool).await? else {
            debug!(mealtime = %conditions.mealtime(), "No recipe matched draw conditions");
            return Ok(None);
        };

        let mut recipe = row_to_recipe(&row)?;
        if let Some(localized) = self.load_translations(&[recipe.id]).await?.remove(&recipe.id) {
            recipe.localized = localized;
        }
        Ok(Some(recipe))
    }

    async fn find_by_ids(
        &self,
        ids: &[RecipeId],
        projection: RecipeProjection,
        limit: usize,
    ) -> Result<Vec<Recipe>, DatabaseError> {
        if ids.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id IN ({}) LIMIT ?",
            placeholders(ids.len())
        );
        let mut sql_query = sqlx::query(&query);
        for id in ids {
            sql_query = sql_query.bind(id);
        }
        let rows = sql_query
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let mut recipes = rows
            .iter()
            .map(row_to_recipe)
            .collect::<Result<Vec<_>, _>>()?;

        if projection == RecipeProjection::Full {
            let found: Vec<RecipeId> = recipes.iter().map(|r| r.id).collect();
            let mut translations = self.load_translations(&found).await?;
            for recipe in &mut recipes {
                if let Some(localized) = translations.remove(&recipe.id) {
                    recipe.localized = localized;
                }
            }
        }
        Ok(recipes)
    }

    async fn random_liked_ids(&self, user_id: Uuid) -> Result<Vec<RecipeId>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT recipe_id FROM recipe_likes WHERE user_id = ? ORDER BY RANDOM() LIMIT ?",
        )
        .bind(user_id.to_string())
        .bind(i64::try_from(LIKED_SAMPLE_LIMIT).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get("recipe_id").map_err(DatabaseError::from))
            .collect()
    }
}

#[async_trait]
impl PoolRepository for SqliteStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<RecipePool>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        Self::load_pool(&mut conn, user_id).await
    }

    async fn create(&self, user_id: Uuid, ids: &[RecipeId]) -> Result<RecipePool, DatabaseError> {
        let pool = RecipePool::new(user_id, ids);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO recipe_pools (user_id, recipe_ids, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO NOTHING
            ",
        )
        .bind(user_id.to_string())
        .bind(serde_json::to_string(&pool.recipe_ids)?)
        .bind(pool.created_at.to_rfc3339())
        .bind(pool.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        let stored = Self::load_pool(&mut tx, user_id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("recipe_pool", user_id.to_string()))?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn append_ids(
        &self,
        user_id: Uuid,
        ids: &[RecipeId],
    ) -> Result<RecipePool, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut pool = Self::load_pool(&mut tx, user_id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("recipe_pool", user_id.to_string()))?;

        if pool.append(ids) > 0 {
            Self::store_pool(&mut tx, &pool).await?;
        }
        tx.commit().await?;
        Ok(pool)
    }

    async fn replace_id(
        &self,
        user_id: Uuid,
        old_id: RecipeId,
        new_id: RecipeId,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        if let Some(mut pool) = Self::load_pool(&mut tx, user_id).await? {
            if pool.replace(old_id, new_id) {
                Self::store_pool(&mut tx, &pool).await?;
            }
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl PlanRepository for SqliteStore {
    async fn get(&self, user_id: Uuid, day: NaiveDate) -> Result<Option<MealPlan>, DatabaseError> {
        let row = sqlx::query(
            "SELECT user_id, day, entries, updated_at FROM meal_plans WHERE user_id = ? AND day = ?",
        )
        .bind(user_id.to_string())
        .bind(day.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_plan).transpose()
    }

    async fn get_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MealPlan>, DatabaseError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, day, entries, updated_at FROM meal_plans
            WHERE user_id = ? AND day >= ? AND day <= ?
            ORDER BY day ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_plan).collect()
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        entries: &[MealEntry],
    ) -> Result<MealPlan, DatabaseError> {
        let plan = MealPlan {
            user_id,
            day,
            entries: entries.to_vec(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO meal_plans (user_id, day, entries, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id, day) DO UPDATE SET
                entries = excluded.entries,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id.to_string())
        .bind(day.to_string())
        .bind(serde_json::to_string(&plan.entries)?)
        .bind(plan.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(plan)
    }

    async fn set_prepared(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        slot: MealSlot,
        prepared: bool,
    ) -> Result<Option<MealPlan>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            "SELECT user_id, day, entries, updated_at FROM meal_plans WHERE user_id = ? AND day = ?",
        )
        .bind(user_id.to_string())
        .bind(day.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut plan) = row.as_ref().map(row_to_plan).transpose()? else {
            return Ok(None);
        };
        let Some(entry) = plan.entries.iter_mut().find(|e| e.slot == slot) else {
            return Ok(None);
        };
        entry.prepared = prepared;
        plan.updated_at = Utc::now();

        sqlx::query("UPDATE meal_plans SET entries = ?, updated_at = ? WHERE user_id = ? AND day = ?")
            .bind(serde_json::to_string(&plan.entries)?)
            .bind(plan.updated_at.to_rfc3339())
            .bind(user_id.to_string())
            .bind(day.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(plan))
    }
}
