use super::calc::EnergyTargets;
use crate::onboarding::dto::{Gender, Profile};

pub const SYSTEM_PROMPT: &str = "You are a professional nutritionist and dietitian specializing in \
creating personalized meal plans. Create a detailed, practical and healthy plan based on the \
user's information. Ensure the plan is realistic, varied and aligned with the user's goals and \
preferences. Always respond with a single valid JSON object and nothing else.";

const RESPONSE_SHAPE: &str = r#"{
  "daily_calories": number,
  "macronutrients": { "protein": number, "carbs": number, "fat": number },
  "meal_plan": {
    "monday": { "breakfast": string, "lunch": string, "dinner": string, "snacks": [string] },
    "tuesday": { ... },
    "wednesday": { ... },
    "thursday": { ... },
    "friday": { ... },
    "saturday": { ... },
    "sunday": { ... }
  },
  "shopping_list": [string]
}"#;

#[derive(Debug, Clone, PartialEq)]
pub struct PlanPrompt {
    pub system: String,
    pub user: String,
}

fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => default,
    }
}

pub fn build(profile: &Profile, targets: &EnergyTargets) -> PlanPrompt {
    let workout = &profile.workout_details.0;
    let cardio = workout.cardio.as_ref();
    let who = match profile.gender {
        Some(Gender::Male) => "man",
        Some(Gender::Female) => "woman",
        None => "person",
    };
    let schedule = if workout.schedule.is_empty() {
        "Not specified".to_string()
    } else {
        workout.schedule.join(", ")
    };
    let cardio_minutes = cardio
        .and_then(|c| c.duration_minutes)
        .map(|m| format!("{m} minutes"))
        .unwrap_or_else(|| "Not specified".into());

    let user = format!(
        "Create a personalized weekly diet plan for a {who} with the following characteristics:\n\
         \n\
         Basic Information:\n\
         - Age: {age} years\n\
         - Height: {height} cm\n\
         - Current Weight: {current_weight} kg\n\
         - Desired Weight: {desired_weight} kg\n\
         \n\
         Body Composition Goals:\n\
         - Current Body Fat: {current_body_fat}%\n\
         - Desired Body Fat: {desired_body_fat}%\n\
         - Duration of Diet Plan: {duration} weeks\n\
         \n\
         Workout Details:\n\
         - Workout Frequency: {frequency} times per week\n\
         - Workout Schedule: {schedule}\n\
         - Cardio Type: {cardio_type}\n\
         - Cardio Duration: {cardio_minutes}\n\
         - Cardio Intensity: {cardio_intensity}\n\
         \n\
         Dietary Preferences:\n\
         - Meal Preferences: {meal_preferences}\n\
         - Food Allergies: {allergies}\n\
         - Food Restrictions: {restrictions}\n\
         \n\
         Health Information:\n\
         - Medical Conditions: {medical}\n\
         - Additional Information: {additional}\n\
         \n\
         Computed Targets:\n\
         - BMR: {bmr} calories\n\
         - TDEE: {tdee} calories\n\
         - Target daily calories: {daily_calories} calories\n\
         - Protein: {protein}g, Carbs: {carbs}g, Fats: {fat}g\n\
         \n\
         Please provide a detailed weekly meal plan:\n\
         1. Keep daily intake close to the target calories and macronutrients above\n\
         2. Create a 7-day meal plan with breakfast, lunch, dinner, and snacks\n\
         3. Include portion sizes and approximate calorie counts for each meal\n\
         4. Provide a shopping list for the week\n\
         \n\
         Format the response as a JSON object with the following structure:\n\
         {RESPONSE_SHAPE}",
        age = profile.age,
        height = profile.height,
        current_weight = profile.current_weight,
        desired_weight = profile.desired_weight,
        current_body_fat = profile.current_body_fat,
        desired_body_fat = profile.desired_body_fat,
        duration = profile.duration,
        frequency = workout.frequency,
        cardio_type = or_default(cardio.and_then(|c| c.kind.as_deref()), "Not specified"),
        cardio_intensity = or_default(cardio.and_then(|c| c.intensity.as_deref()), "Not specified"),
        meal_preferences = profile.meal_preferences.as_str(),
        allergies = or_default(profile.food_allergies.as_deref(), "None"),
        restrictions = or_default(profile.food_restrictions.as_deref(), "None"),
        medical = or_default(profile.medical_conditions.as_deref(), "None"),
        additional = or_default(profile.additional_info.as_deref(), "None"),
        bmr = targets.bmr,
        tdee = targets.tdee,
        daily_calories = targets.daily_calories,
        protein = targets.protein_g,
        carbs = targets.carbs_g,
        fat = targets.fat_g,
    );

    PlanPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::nutrition::calc;
    use crate::onboarding::dto::{CardioDetails, MealPreference, WorkoutDetails};
    use sqlx::types::Json;
    use time::OffsetDateTime;
    use uuid::Uuid;

    pub(crate) fn profile() -> Profile {
        Profile {
            user_id: Uuid::new_v4(),
            name: "Jordan".into(),
            age: 34,
            gender: None,
            height: 172.0,
            current_weight: 78.0,
            desired_weight: 72.0,
            current_body_fat: 26.0,
            desired_body_fat: 20.0,
            duration: 12,
            workout_details: Json(WorkoutDetails {
                frequency: 4,
                schedule: vec!["Monday".into(), "Thursday".into()],
                cardio: Some(CardioDetails {
                    kind: Some("Running".into()),
                    duration_minutes: Some(30.0),
                    intensity: None,
                }),
            }),
            meal_preferences: MealPreference::Vegetarian,
            food_allergies: Some("  ".into()),
            food_restrictions: None,
            medical_conditions: Some("Asthma".into()),
            additional_info: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn prompt_mentions_profile_and_targets() {
        let profile = profile();
        let targets = calc::compute(&(&profile).into());
        let prompt = build(&profile, &targets);

        assert_eq!(prompt.system, SYSTEM_PROMPT);
        assert!(prompt.user.contains("for a person"));
        assert!(prompt.user.contains("- Workout Schedule: Monday, Thursday"));
        assert!(prompt.user.contains("- Cardio Type: Running"));
        assert!(prompt.user.contains("- Cardio Duration: 30 minutes"));
        assert!(prompt.user.contains("- Cardio Intensity: Not specified"));
        assert!(prompt.user.contains("- Meal Preferences: vegetarian"));
        assert!(prompt.user.contains("- Food Allergies: None"));
        assert!(prompt.user.contains("- Medical Conditions: Asthma"));
        assert!(prompt
            .user
            .contains(&format!("- Target daily calories: {} calories", targets.daily_calories)));
        assert!(prompt.user.contains("\"shopping_list\""));
    }

    #[test]
    fn prompt_lines_are_unindented_sections() {
        let profile = profile();
        let prompt = build(&profile, &calc::compute(&(&profile).into()));

        assert!(prompt
            .user
            .contains(":\n\nBasic Information:\n- Age: 34 years\n- Height: 172 cm\n"));
        assert!(prompt.user.contains("\n\nHealth Information:\n- Medical Conditions: Asthma\n"));
        let (body, _) = prompt.user.split_once(RESPONSE_SHAPE).unwrap();
        assert!(body.lines().all(|l| !l.starts_with(' ')));
        assert!(prompt.user.ends_with(RESPONSE_SHAPE));
    }
}
