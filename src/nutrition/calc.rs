//! Daily energy and macro targets.
//!
//! BMR uses Mifflin-St Jeor, TDEE scales it by an activity factor derived
//! from weekly workout frequency, and the calorie target spreads the
//! requested weight change over the plan duration at 7700 kcal per kg.

use serde::Serialize;

use crate::onboarding::dto::{Gender, Profile};

pub const KCAL_PER_KG: f64 = 7700.0;
pub const MIN_DAILY_CALORIES: f64 = 1200.0;
const PROTEIN_G_PER_KG: f64 = 2.0;
const FAT_SHARE: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMetrics {
    pub age: i32,
    pub gender: Option<Gender>,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub desired_weight_kg: f64,
    pub duration_weeks: i32,
    pub workouts_per_week: i32,
}

impl From<&Profile> for BodyMetrics {
    fn from(p: &Profile) -> Self {
        Self {
            age: p.age,
            gender: p.gender,
            height_cm: p.height,
            weight_kg: p.current_weight,
            desired_weight_kg: p.desired_weight,
            duration_weeks: p.duration,
            workouts_per_week: p.workout_details.frequency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyTargets {
    pub bmr: i32,
    pub tdee: i32,
    /// Positive for a deficit, negative for a surplus.
    pub daily_adjustment: i32,
    pub daily_calories: i32,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
}

pub fn bmr(m: &BodyMetrics) -> f64 {
    let offset = match m.gender {
        Some(Gender::Male) => 5.0,
        Some(Gender::Female) => -161.0,
        None => -78.0,
    };
    10.0 * m.weight_kg + 6.25 * m.height_cm - 5.0 * f64::from(m.age) + offset
}

pub fn activity_factor(workouts_per_week: i32) -> f64 {
    match workouts_per_week {
        i32::MIN..=0 => 1.2,
        1..=2 => 1.375,
        3..=4 => 1.55,
        5..=6 => 1.725,
        _ => 1.9,
    }
}

/// kcal/day to remove from TDEE to reach the desired weight on time.
pub fn daily_adjustment(m: &BodyMetrics) -> f64 {
    let days = f64::from(m.duration_weeks.max(1)) * 7.0;
    (m.weight_kg - m.desired_weight_kg) * KCAL_PER_KG / days
}

pub fn compute(m: &BodyMetrics) -> EnergyTargets {
    let bmr = bmr(m);
    let tdee = bmr * activity_factor(m.workouts_per_week);
    let adjustment = daily_adjustment(m);
    let calories = (tdee - adjustment).max(MIN_DAILY_CALORIES);

    let protein_g = m.weight_kg * PROTEIN_G_PER_KG;
    let fat_g = calories * FAT_SHARE / 9.0;
    let carbs_g = ((calories - protein_g * 4.0 - fat_g * 9.0) / 4.0).max(0.0);

    EnergyTargets {
        bmr: bmr.round() as i32,
        tdee: tdee.round() as i32,
        daily_adjustment: adjustment.round() as i32,
        daily_calories: calories.round() as i32,
        protein_g: protein_g.round() as i32,
        carbs_g: carbs_g.round() as i32,
        fat_g: fat_g.round() as i32,
    }
}
