use anyhow::Context;
use sqlx::{types::Json, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    dto::LogMealRequest,
    repo_types::{MealLog, NutritionTotals},
};

const LOG_COLUMNS: &str =
    "id, user_id, meal_details, calories, protein, carbs, fats, meal_type, logged_at";

pub async fn insert(db: &PgPool, user_id: Uuid, req: &LogMealRequest) -> anyhow::Result<MealLog> {
    let sql = format!(
        r#"
        INSERT INTO meal_logs (user_id, meal_details, calories, protein, carbs, fats, meal_type)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {LOG_COLUMNS}
        "#
    );
    let log = sqlx::query_as::<_, MealLog>(&sql)
        .bind(user_id)
        .bind(Json(&req.meal_details))
        .bind(req.calories)
        .bind(req.protein)
        .bind(req.carbs)
        .bind(req.fats)
        .bind(req.meal_type)
        .fetch_one(db)
        .await
        .context("insert meal log")?;
    Ok(log)
}

/// Logs with `from <= logged_at <= to`, newest first.
pub async fn list_between(
    db: &PgPool,
    user_id: Uuid,
    from: OffsetDateTime,
    to: OffsetDateTime,
) -> anyhow::Result<Vec<MealLog>> {
    let sql = format!(
        r#"
        SELECT {LOG_COLUMNS}
        FROM meal_logs
        WHERE user_id = $1 AND logged_at >= $2 AND logged_at <= $3
        ORDER BY logged_at DESC
        "#
    );
    let rows = sqlx::query_as::<_, MealLog>(&sql)
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await
        .context("list meal logs")?;
    Ok(rows)
}

/// Sums over `[from, until)`.
pub async fn totals_between(
    db: &PgPool,
    user_id: Uuid,
    from: OffsetDateTime,
    until: OffsetDateTime,
) -> anyhow::Result<NutritionTotals> {
    let totals = sqlx::query_as::<_, NutritionTotals>(
        r#"
        SELECT COALESCE(SUM(calories), 0)::float8 AS calories,
               COALESCE(SUM(protein), 0)::float8  AS protein,
               COALESCE(SUM(carbs), 0)::float8    AS carbs,
               COALESCE(SUM(fats), 0)::float8     AS fats
        FROM meal_logs
        WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(until)
    .fetch_one(db)
    .await
    .context("sum meal logs")?;
    Ok(totals)
}

/// Returns false when no log with that id belongs to the user.
pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(r#"DELETE FROM meal_logs WHERE id = $1 AND user_id = $2"#)
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete meal log")?;
    Ok(res.rows_affected() > 0)
}
