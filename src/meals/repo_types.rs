use serde::Serialize;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{MealDetails, MealType};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MealLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meal_details: Json<MealDetails>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub meal_type: MealType,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}

/// Summed intake. Also used for plan targets and what is left of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, FromRow)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl NutritionTotals {
    /// Component-wise `self - eaten`; negative once a target is exceeded.
    pub fn minus(&self, eaten: &NutritionTotals) -> NutritionTotals {
        NutritionTotals {
            calories: self.calories - eaten.calories,
            protein: self.protein - eaten.protein,
            carbs: self.carbs - eaten.carbs,
            fats: self.fats - eaten.fats,
        }
    }
}
