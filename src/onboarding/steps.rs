use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use validator::Validate;

use super::dto::{BasicStep, BodyStep, DietStep, HealthStep, OnboardingForm, WorkoutStep};
use crate::error::AppError;

/// The five pages of the questionnaire, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    Basic,
    Body,
    Workout,
    Diet,
    Health,
}

impl FromStr for OnboardingStep {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" | "basic-information" => Ok(Self::Basic),
            "body" | "body-composition" => Ok(Self::Body),
            "workout" | "workout-details" => Ok(Self::Workout),
            "diet" | "dietary-preferences" => Ok(Self::Diet),
            "health" | "health-info" => Ok(Self::Health),
            other => Err(AppError::NotFound(format!("Unknown onboarding step: {other}"))),
        }
    }
}

fn checked_fields<T>(body: Value) -> Result<Map<String, Value>, AppError>
where
    T: DeserializeOwned + Serialize + Validate,
{
    let step: T =
        serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    step.validate()?;
    match serde_json::to_value(&step).map_err(anyhow::Error::from)? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::BadRequest("step body must be a JSON object".into())),
    }
}

impl OnboardingStep {
    /// Validates `body` against this step's rules and returns the fields to store.
    pub fn fields(self, body: Value) -> Result<Map<String, Value>, AppError> {
        match self {
            Self::Basic => checked_fields::<BasicStep>(body),
            Self::Body => checked_fields::<BodyStep>(body),
            Self::Workout => checked_fields::<WorkoutStep>(body),
            Self::Diet => checked_fields::<DietStep>(body),
            Self::Health => checked_fields::<HealthStep>(body),
        }
    }
}

/// Turns an accumulated draft into a full form, or explains what is missing.
pub fn finish(draft: Value) -> Result<OnboardingForm, AppError> {
    let form: OnboardingForm = serde_json::from_value(draft)
        .map_err(|e| AppError::BadRequest(format!("Onboarding is incomplete: {e}")))?;
    form.validate()?;
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::dto::MealPreference;
    use serde_json::json;

    /// Same result as jsonb `||` on two objects: a shallow merge where the
    /// right-hand side wins.
    fn merge_into(draft: &mut Value, fields: Map<String, Value>) {
        if let Value::Object(existing) = draft {
            existing.extend(fields);
        }
    }

    #[test]
    fn parses_step_names_and_page_slugs() {
        assert_eq!("basic".parse::<OnboardingStep>().unwrap(), OnboardingStep::Basic);
        assert_eq!(
            "dietary-preferences".parse::<OnboardingStep>().unwrap(),
            OnboardingStep::Diet
        );
        assert!(matches!(
            "payment".parse::<OnboardingStep>(),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn step_rules_are_enforced() {
        let err = OnboardingStep::Workout
            .fields(json!({ "workout_frequency": 9, "workout_schedule": [] }))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = OnboardingStep::Basic
            .fields(json!({ "name": "Al", "age": 30, "height": 0, "current_weight": 80, "desired_weight": 75 }))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn all_five_steps_make_a_complete_form() {
        let mut draft = json!({});
        let pages = [
            (OnboardingStep::Basic, json!({ "name": "Alex", "age": 31, "gender": "female", "height": 168, "current_weight": 72, "desired_weight": 66 })),
            (OnboardingStep::Body, json!({ "current_body_fat": 30, "desired_body_fat": 24, "duration": 12 })),
            (OnboardingStep::Workout, json!({ "workout_frequency": 3, "workout_schedule": ["Monday", "Wednesday", "Friday"], "cardio_type": "Cycling" })),
            (OnboardingStep::Diet, json!({ "meal_preferences": "vegetarian" })),
            (OnboardingStep::Health, json!({ "medical_conditions": "None" })),
        ];

        for (i, (step, body)) in pages.into_iter().enumerate() {
            merge_into(&mut draft, step.fields(body).unwrap());
            // health fields are optional, so only the first three pages leave gaps
            if i < 3 {
                assert!(matches!(finish(draft.clone()), Err(AppError::BadRequest(_))));
            }
        }

        let form = finish(draft).unwrap();
        assert_eq!(form.name, "Alex");
        assert_eq!(form.meal_preferences, MealPreference::Vegetarian);
        let workout = form.workout_details();
        assert_eq!(workout.frequency, 3);
        assert_eq!(workout.cardio.unwrap().kind.as_deref(), Some("Cycling"));
    }

    #[test]
    fn resubmitting_a_step_overwrites_it() {
        let mut draft = json!({ "duration": 4, "name": "Sam" });
        merge_into(
            &mut draft,
            OnboardingStep::Body
                .fields(json!({ "current_body_fat": 20, "desired_body_fat": 15, "duration": 8 }))
                .unwrap(),
        );
        assert_eq!(draft["duration"], 8);
        assert_eq!(draft["name"], "Sam");
    }
}
