use serde::{Deserialize, Serialize};
use validator::Validate;

use super::repo_types::{MealLog, NutritionTotals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "meal_type", rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MealDetails {
    #[validate(length(min = 1, message = "Meal name is required"))]
    pub name: String,
    pub ingredients: Vec<String>,
    pub portion_size: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LogMealRequest {
    #[validate]
    pub meal_details: MealDetails,
    #[validate(range(min = 0.0))]
    pub calories: f64,
    #[validate(range(min = 0.0))]
    pub protein: f64,
    #[validate(range(min = 0.0))]
    pub carbs: f64,
    #[validate(range(min = 0.0))]
    pub fats: f64,
    pub meal_type: MealType,
}

/// `date` selects daily totals; otherwise `startDate`/`endDate` select logs.
#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub date: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MealLogsResponse {
    Totals(NutritionTotals),
    Logs(Vec<MealLog>),
}
