use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{DietPlan, NewDietPlan, PlanSource},
    repo,
};
use crate::{
    error::AppError,
    nutrition::{
        calc::{self, EnergyTargets},
        fallback,
        plan::GeneratedPlan,
        prompt, MealPlanGenerator,
    },
    onboarding::{self, dto::Profile},
    state::AppState,
};

pub(crate) async fn load_profile(state: &AppState, user_id: Uuid) -> Result<Profile, AppError> {
    onboarding::repo::find_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found; complete onboarding first".into()))
}

/// Asks the generator for a plan, using the built-in week when there is no
/// generator or its call fails.
pub async fn plan_or_fallback(
    planner: Option<&dyn MealPlanGenerator>,
    profile: &Profile,
    targets: &EnergyTargets,
) -> (GeneratedPlan, PlanSource) {
    let pref = profile.meal_preferences;
    let Some(planner) = planner else {
        warn!(user_id = %profile.user_id, "no meal plan generator configured; using fallback plan");
        return (fallback::plan(pref, targets), PlanSource::Fallback);
    };

    let prompt = prompt::build(profile, targets);
    match planner.generate(&prompt).await {
        Ok(plan) => (plan, PlanSource::Ai),
        Err(e) => {
            warn!(user_id = %profile.user_id, error = ?e, "meal plan generation failed; using fallback plan");
            (fallback::plan(pref, targets), PlanSource::Fallback)
        }
    }
}

#[instrument(skip(state))]
pub async fn generate(state: &AppState, user_id: Uuid) -> Result<DietPlan, AppError> {
    let profile = load_profile(state, user_id).await?;
    let targets = calc::compute(&(&profile).into());

    let (generated, source) = plan_or_fallback(state.planner.as_deref(), &profile, &targets).await;
    if source == PlanSource::Ai {
        let drift = generated.daily_calories - f64::from(targets.daily_calories);
        if drift.abs() > 200.0 {
            // stored targets are always the calculator's
            warn!(%user_id, suggested = generated.daily_calories, target = targets.daily_calories, "generated plan disagrees with computed calories");
        }
    }

    let plan = repo::replace_active(
        &state.db,
        user_id,
        &NewDietPlan {
            targets,
            meal_plan: generated.meal_plan,
            shopping_list: generated.shopping_list,
            source,
        },
    )
    .await?
    .ok_or_else(|| {
        warn!(%user_id, "concurrent diet plan generation");
        AppError::Conflict("A diet plan is already being generated".into())
    })?;

    info!(%user_id, plan_id = %plan.id, ?source, "diet plan generated");
    Ok(plan)
}
