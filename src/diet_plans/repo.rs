use anyhow::Context;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::dto::{DietPlan, NewDietPlan};

const PLAN_COLUMNS: &str = r#"
    id, user_id, daily_calories, protein_g, carbs_g, fat_g, bmr, tdee,
    meal_plan, shopping_list, source, is_active, created_at, updated_at
"#;

pub async fn find_active(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<DietPlan>> {
    let sql = format!(
        r#"
        SELECT {PLAN_COLUMNS}
        FROM diet_plans
        WHERE user_id = $1 AND is_active
        ORDER BY created_at DESC
        LIMIT 1
        "#
    );
    let plan = sqlx::query_as::<_, DietPlan>(&sql)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("load active diet plan")?;
    Ok(plan)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.is_unique_violation())
}

/// Deactivates the user's current plan and stores `plan` as the active one.
/// Replacements for one user are serialized on their `users` row; `None`
/// means another plan became active first.
pub async fn replace_active(
    db: &PgPool,
    user_id: Uuid,
    plan: &NewDietPlan,
) -> anyhow::Result<Option<DietPlan>> {
    let mut tx = db.begin().await?;

    sqlx::query(r#"SELECT 1 FROM users WHERE id = $1 FOR UPDATE"#)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("lock user for plan replacement")?;

    sqlx::query(
        r#"
        UPDATE diet_plans
        SET is_active = FALSE, updated_at = now()
        WHERE user_id = $1 AND is_active
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .context("deactivate diet plans")?;

    let sql = format!(
        r#"
        INSERT INTO diet_plans (
            user_id, daily_calories, protein_g, carbs_g, fat_g, bmr, tdee,
            meal_plan, shopping_list, source, is_active
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE)
        RETURNING {PLAN_COLUMNS}
        "#
    );
    let t = &plan.targets;
    let inserted = sqlx::query_as::<_, DietPlan>(&sql)
        .bind(user_id)
        .bind(t.daily_calories)
        .bind(t.protein_g)
        .bind(t.carbs_g)
        .bind(t.fat_g)
        .bind(t.bmr)
        .bind(t.tdee)
        .bind(Json(&plan.meal_plan))
        .bind(Json(&plan.shopping_list))
        .bind(plan.source)
        .fetch_one(&mut *tx)
        .await;
    let saved = match inserted {
        Ok(saved) => saved,
        Err(e) if is_unique_violation(&e) => return Ok(None),
        Err(e) => return Err(anyhow::Error::from(e).context("insert diet plan")),
    };

    tx.commit().await?;
    Ok(Some(saved))
}
