use serde::{Deserialize, Deserializer, Serialize};

/// One day of the weekly plan. Meals are short free-text descriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayMeals {
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub snacks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMealPlan {
    pub monday: DayMeals,
    pub tuesday: DayMeals,
    pub wednesday: DayMeals,
    pub thursday: DayMeals,
    pub friday: DayMeals,
    pub saturday: DayMeals,
    pub sunday: DayMeals,
}

impl WeeklyMealPlan {
    pub fn days(&self) -> [(&'static str, &DayMeals); 7] {
        [
            ("monday", &self.monday),
            ("tuesday", &self.tuesday),
            ("wednesday", &self.wednesday),
            ("thursday", &self.thursday),
            ("friday", &self.friday),
            ("saturday", &self.saturday),
            ("sunday", &self.sunday),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macronutrients {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Shape the model is asked to answer with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPlan {
    pub daily_calories: f64,
    pub macronutrients: Macronutrients,
    pub meal_plan: WeeklyMealPlan,
    #[serde(default)]
    pub shopping_list: Vec<String>,
}

// Models sometimes answer `"snacks": "apple"` instead of a list.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
        None => Vec::new(),
    })
}
