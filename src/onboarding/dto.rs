use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "meal_preference", rename_all = "kebab-case")]
pub enum MealPreference {
    Vegetarian,
    NonVegetarian,
}

impl MealPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealPreference::Vegetarian => "vegetarian",
            MealPreference::NonVegetarian => "non-vegetarian",
        }
    }
}

pub(crate) fn positive(value: f64) -> Result<(), ValidationError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("positive"))
    }
}

/// The complete questionnaire, flat as the client submits it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OnboardingForm {
    // basic information
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(range(min = 1))]
    pub age: i32,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[validate(custom = "positive")]
    pub height: f64,
    #[validate(custom = "positive")]
    pub current_weight: f64,
    #[validate(custom = "positive")]
    pub desired_weight: f64,

    // body composition goals
    #[validate(range(min = 0.0, max = 100.0))]
    pub current_body_fat: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub desired_body_fat: f64,
    /// Weeks.
    #[validate(range(min = 1))]
    pub duration: i32,

    // workout details
    #[validate(range(min = 1, max = 7))]
    pub workout_frequency: i32,
    pub workout_schedule: Vec<String>,
    #[serde(default)]
    pub cardio_type: Option<String>,
    #[serde(default)]
    pub cardio_duration: Option<f64>,
    #[serde(default)]
    pub cardio_intensity: Option<String>,

    // dietary preferences
    pub meal_preferences: MealPreference,
    #[serde(default)]
    pub food_allergies: Option<String>,
    #[serde(default)]
    pub food_restrictions: Option<String>,

    // health information
    #[serde(default)]
    pub medical_conditions: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardioDetails {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub duration_minutes: Option<f64>,
    pub intensity: Option<String>,
}

/// Stored as JSONB on the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDetails {
    pub frequency: i32,
    pub schedule: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardio: Option<CardioDetails>,
}

impl OnboardingForm {
    /// Nests the flat workout fields; cardio is omitted when none were given.
    pub fn workout_details(&self) -> WorkoutDetails {
        let cardio = if self.cardio_type.is_some()
            || self.cardio_duration.is_some()
            || self.cardio_intensity.is_some()
        {
            Some(CardioDetails {
                kind: self.cardio_type.clone(),
                duration_minutes: self.cardio_duration,
                intensity: self.cardio_intensity.clone(),
            })
        } else {
            None
        };
        WorkoutDetails {
            frequency: self.workout_frequency,
            schedule: self.workout_schedule.clone(),
            cardio,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: Option<Gender>,
    pub height: f64,
    pub current_weight: f64,
    pub desired_weight: f64,
    pub current_body_fat: f64,
    pub desired_body_fat: f64,
    pub duration: i32,
    pub workout_details: Json<WorkoutDetails>,
    pub meal_preferences: MealPreference,
    pub food_allergies: Option<String>,
    pub food_restrictions: Option<String>,
    pub medical_conditions: Option<String>,
    pub additional_info: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

// ---- wizard steps ----

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BasicStep {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(range(min = 1))]
    pub age: i32,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[validate(custom = "positive")]
    pub height: f64,
    #[validate(custom = "positive")]
    pub current_weight: f64,
    #[validate(custom = "positive")]
    pub desired_weight: f64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BodyStep {
    #[validate(range(min = 0.0, max = 100.0))]
    pub current_body_fat: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub desired_body_fat: f64,
    #[validate(range(min = 1))]
    pub duration: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct WorkoutStep {
    #[validate(range(min = 1, max = 7))]
    pub workout_frequency: i32,
    pub workout_schedule: Vec<String>,
    #[serde(default)]
    pub cardio_type: Option<String>,
    #[serde(default)]
    pub cardio_duration: Option<f64>,
    #[serde(default)]
    pub cardio_intensity: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct DietStep {
    pub meal_preferences: MealPreference,
    #[serde(default)]
    pub food_allergies: Option<String>,
    #[serde(default)]
    pub food_restrictions: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct HealthStep {
    #[serde(default)]
    pub medical_conditions: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OnboardingDraft {
    pub data: serde_json::Value,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}
