use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    auth::AuthUser,
    diet_plans::{self, dto::DietPlan},
    error::AppError,
    meals::{self, repo_types::{MealLog, NutritionTotals}},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub date: String,
    pub totals: NutritionTotals,
    pub targets: Option<NutritionTotals>,
    pub remaining: Option<NutritionTotals>,
    pub logs: Vec<MealLog>,
}

fn plan_targets(plan: &DietPlan) -> NutritionTotals {
    NutritionTotals {
        calories: f64::from(plan.daily_calories),
        protein: f64::from(plan.protein_g),
        carbs: f64::from(plan.carbs_g),
        fats: f64::from(plan.fat_g),
    }
}

/// GET /dashboard?date=YYYY-MM-DD (defaults to today, UTC)
#[instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    AuthUser { user_id, .. }: AuthUser,
    Query(q): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let (day, (from, until)) = match meals::services::present(q.date.as_deref()) {
        Some(raw) => meals::services::required_day(raw)?,
        None => {
            let today = OffsetDateTime::now_utc().date();
            let bounds = meals::services::day_bounds(today)
                .ok_or_else(|| anyhow::anyhow!("no day follows {today}"))?;
            (today, bounds)
        }
    };

    let totals = meals::repo::totals_between(&state.db, user_id, from, until).await?;
    let last = until - time::Duration::microseconds(1);
    let logs = meals::repo::list_between(&state.db, user_id, from, last).await?;
    let targets = diet_plans::repo::find_active(&state.db, user_id)
        .await?
        .as_ref()
        .map(plan_targets);

    Ok(Json(Dashboard {
        date: day.to_string(),
        totals,
        remaining: targets.map(|t| t.minus(&totals)),
        targets,
        logs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_goes_negative_past_target() {
        let target = NutritionTotals { calories: 2000.0, protein: 150.0, carbs: 200.0, fats: 60.0 };
        let eaten = NutritionTotals { calories: 2150.0, protein: 90.0, carbs: 210.5, fats: 60.0 };
        let left = target.minus(&eaten);
        assert_eq!(left.calories, -150.0);
        assert_eq!(left.protein, 60.0);
        assert_eq!(left.carbs, -10.5);
        assert_eq!(left.fats, 0.0);
    }

    #[test]
    fn dashboard_serializes_missing_plan_as_null() {
        let body = serde_json::to_value(Dashboard {
            date: "2024-05-01".into(),
            totals: NutritionTotals::default(),
            targets: None,
            remaining: None,
            logs: vec![],
        })
        .unwrap();
        assert!(body["targets"].is_null());
        assert_eq!(body["totals"]["calories"], 0.0);
    }
}
