use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::{calc::EnergyTargets, plan::WeeklyMealPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "plan_source", rename_all = "lowercase")]
pub enum PlanSource {
    Ai,
    Fallback,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DietPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub daily_calories: i32,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
    pub bmr: i32,
    pub tdee: i32,
    pub meal_plan: Json<WeeklyMealPlan>,
    pub shopping_list: Option<Json<Vec<String>>>,
    pub source: PlanSource,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields written for a freshly generated plan.
#[derive(Debug, Clone)]
pub struct NewDietPlan {
    pub targets: EnergyTargets,
    pub meal_plan: WeeklyMealPlan,
    pub shopping_list: Vec<String>,
    pub source: PlanSource,
}
