use anyhow::Context;
use sqlx::{types::Json, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{OnboardingForm, Profile};

const PROFILE_COLUMNS: &str = r#"
    user_id, name, age, gender, height, current_weight, desired_weight,
    current_body_fat, desired_body_fat, duration, workout_details,
    meal_preferences, food_allergies, food_restrictions, medical_conditions,
    additional_info, created_at, updated_at
"#;

pub async fn profile_exists(db: &PgPool, user_id: Uuid) -> anyhow::Result<bool> {
    let (exists,): (bool,) =
        sqlx::query_as(r#"SELECT EXISTS (SELECT 1 FROM profiles WHERE user_id = $1)"#)
            .bind(user_id)
            .fetch_one(db)
            .await
            .context("check profile")?;
    Ok(exists)
}

pub async fn find_profile(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1");
    let profile = sqlx::query_as::<_, Profile>(&sql)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("load profile")?;
    Ok(profile)
}

/// Returns `None` when the user already has a profile.
pub async fn insert_profile(
    db: &PgPool,
    user_id: Uuid,
    form: &OnboardingForm,
) -> anyhow::Result<Option<Profile>> {
    let sql = format!(
        r#"
        INSERT INTO profiles (
            user_id, name, age, gender, height, current_weight, desired_weight,
            current_body_fat, desired_body_fat, duration, workout_details,
            meal_preferences, food_allergies, food_restrictions, medical_conditions,
            additional_info
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        ON CONFLICT (user_id) DO NOTHING
        RETURNING {PROFILE_COLUMNS}
        "#
    );
    let profile = sqlx::query_as::<_, Profile>(&sql)
        .bind(user_id)
        .bind(&form.name)
        .bind(form.age)
        .bind(form.gender)
        .bind(form.height)
        .bind(form.current_weight)
        .bind(form.desired_weight)
        .bind(form.current_body_fat)
        .bind(form.desired_body_fat)
        .bind(form.duration)
        .bind(Json(form.workout_details()))
        .bind(form.meal_preferences)
        .bind(&form.food_allergies)
        .bind(&form.food_restrictions)
        .bind(&form.medical_conditions)
        .bind(&form.additional_info)
        .fetch_optional(db)
        .await
        .context("insert profile")?;
    Ok(profile)
}

/// Returns `None` when there is no profile to update.
pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    form: &OnboardingForm,
) -> anyhow::Result<Option<Profile>> {
    let sql = format!(
        r#"
        UPDATE profiles
           SET name = $2, age = $3, gender = $4, height = $5, current_weight = $6,
               desired_weight = $7, current_body_fat = $8, desired_body_fat = $9,
               duration = $10, workout_details = $11, meal_preferences = $12,
               food_allergies = $13, food_restrictions = $14, medical_conditions = $15,
               additional_info = $16, updated_at = now()
         WHERE user_id = $1
        RETURNING {PROFILE_COLUMNS}
        "#
    );
    let profile = sqlx::query_as::<_, Profile>(&sql)
        .bind(user_id)
        .bind(&form.name)
        .bind(form.age)
        .bind(form.gender)
        .bind(form.height)
        .bind(form.current_weight)
        .bind(form.desired_weight)
        .bind(form.current_body_fat)
        .bind(form.desired_body_fat)
        .bind(form.duration)
        .bind(Json(form.workout_details()))
        .bind(form.meal_preferences)
        .bind(&form.food_allergies)
        .bind(&form.food_restrictions)
        .bind(&form.medical_conditions)
        .bind(&form.additional_info)
        .fetch_optional(db)
        .await
        .context("update profile")?;
    Ok(profile)
}

// ---- drafts ----

pub async fn find_draft(
    db: &PgPool,
    user_id: Uuid,
) -> anyhow::Result<Option<(serde_json::Value, OffsetDateTime)>> {
    let row: Option<(Json<serde_json::Value>, OffsetDateTime)> = sqlx::query_as(
        r#"SELECT data, updated_at FROM onboarding_drafts WHERE user_id = $1"#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("load onboarding draft")?;
    Ok(row.map(|(Json(data), updated_at)| (data, updated_at)))
}

/// Merges one step's fields into the stored draft in a single statement, so
/// concurrent step saves never drop each other's keys. Returns the merged draft.
pub async fn merge_draft(
    db: &PgPool,
    user_id: Uuid,
    fields: &serde_json::Map<String, serde_json::Value>,
) -> anyhow::Result<(serde_json::Value, OffsetDateTime)> {
    let (Json(data), updated_at): (Json<serde_json::Value>, OffsetDateTime) = sqlx::query_as(
        r#"
        INSERT INTO onboarding_drafts (user_id, data, updated_at)
        VALUES ($1, $2, now())
        ON CONFLICT (user_id) DO UPDATE
            SET data = onboarding_drafts.data || EXCLUDED.data, updated_at = now()
        RETURNING data, updated_at
        "#,
    )
    .bind(user_id)
    .bind(Json(fields))
    .fetch_one(db)
    .await
    .context("merge onboarding draft")?;
    Ok((data, updated_at))
}

pub async fn delete_draft(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM onboarding_drafts WHERE user_id = $1"#)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete onboarding draft")?;
    Ok(())
}
