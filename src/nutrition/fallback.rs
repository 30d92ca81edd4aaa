//! Built-in weekly plan used when no generator is configured or it fails.

use super::{
    calc::EnergyTargets,
    plan::{DayMeals, GeneratedPlan, Macronutrients, WeeklyMealPlan},
};
use crate::onboarding::dto::MealPreference;

type Menu = (&'static str, &'static str, &'static str, &'static [&'static str]);

const VEGETARIAN: [Menu; 7] = [
    (
        "Oatmeal with banana, chia seeds and peanut butter",
        "Chickpea and quinoa salad with cucumber and feta",
        "Lentil curry with brown rice",
        &["Greek yogurt with honey", "Handful of almonds"],
    ),
    (
        "Scrambled eggs with spinach on wholegrain toast",
        "Black bean burrito bowl with salsa and avocado",
        "Tofu stir-fry with vegetables and noodles",
        &["Apple with peanut butter"],
    ),
    (
        "Greek yogurt parfait with berries and granola",
        "Caprese sandwich on wholegrain bread",
        "Vegetable and paneer tikka with quinoa",
        &["Hummus with carrot sticks"],
    ),
    (
        "Protein smoothie with milk, oats and berries",
        "Lentil soup with wholegrain roll",
        "Stuffed bell peppers with rice, beans and cheese",
        &["Cottage cheese with pineapple"],
    ),
    (
        "Vegetable omelette with toast",
        "Falafel wrap with tahini and salad",
        "Whole wheat pasta with tomato sauce and white beans",
        &["Trail mix", "Orange"],
    ),
    (
        "Wholegrain pancakes with yogurt and fruit",
        "Quinoa Buddha bowl with roasted vegetables",
        "Chickpea and spinach curry with naan",
        &["Edamame"],
    ),
    (
        "Avocado toast with poached eggs",
        "Tomato and lentil soup with cheese toastie",
        "Vegetable lasagne with side salad",
        &["Banana", "Dark chocolate square"],
    ),
];

const NON_VEGETARIAN: [Menu; 7] = [
    (
        "Scrambled eggs with wholegrain toast and avocado",
        "Grilled chicken breast with quinoa and roasted vegetables",
        "Baked salmon with sweet potato and broccoli",
        &["Greek yogurt with berries", "Handful of almonds"],
    ),
    (
        "Oatmeal with whey protein and blueberries",
        "Turkey and hummus wholegrain wrap with salad",
        "Lean beef stir-fry with vegetables and brown rice",
        &["Apple with peanut butter"],
    ),
    (
        "Greek yogurt parfait with granola",
        "Tuna salad with mixed greens and chickpeas",
        "Chicken fajitas with peppers and wholegrain tortillas",
        &["Boiled eggs"],
    ),
    (
        "Protein smoothie with banana and oats",
        "Chicken and vegetable soup with wholegrain bread",
        "Grilled cod with potatoes and green beans",
        &["Cottage cheese with pineapple"],
    ),
    (
        "Egg and vegetable omelette",
        "Beef and bean chilli with rice",
        "Shrimp pasta with tomato and spinach",
        &["Beef jerky", "Orange"],
    ),
    (
        "Wholegrain pancakes with eggs and fruit",
        "Grilled chicken Caesar salad",
        "Pork tenderloin with roasted vegetables and couscous",
        &["Trail mix"],
    ),
    (
        "Smoked salmon bagel with cream cheese",
        "Turkey meatballs with wholegrain spaghetti",
        "Roast chicken with potatoes and carrots",
        &["Banana", "Protein bar"],
    ),
];

const SHARED_SHOPPING: &[&str] = &[
    "Oats",
    "Wholegrain bread",
    "Brown rice",
    "Quinoa",
    "Sweet potatoes",
    "Broccoli",
    "Spinach",
    "Mixed salad greens",
    "Bell peppers",
    "Tomatoes",
    "Bananas",
    "Berries",
    "Apples",
    "Greek yogurt",
    "Almonds",
    "Peanut butter",
    "Olive oil",
];

const VEGETARIAN_SHOPPING: &[&str] = &[
    "Eggs",
    "Tofu",
    "Paneer",
    "Lentils",
    "Chickpeas",
    "Black beans",
    "Feta cheese",
    "Hummus",
];

const NON_VEGETARIAN_SHOPPING: &[&str] = &[
    "Eggs",
    "Chicken breast",
    "Salmon fillets",
    "Lean beef",
    "Turkey",
    "Canned tuna",
    "Cod fillets",
    "Shrimp",
];

fn day(menu: &Menu) -> DayMeals {
    let (breakfast, lunch, dinner, snacks) = menu;
    DayMeals {
        breakfast: breakfast.to_string(),
        lunch: lunch.to_string(),
        dinner: dinner.to_string(),
        snacks: snacks.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn weekly_plan(pref: MealPreference) -> WeeklyMealPlan {
    let m = match pref {
        MealPreference::Vegetarian => &VEGETARIAN,
        MealPreference::NonVegetarian => &NON_VEGETARIAN,
    };
    WeeklyMealPlan {
        monday: day(&m[0]),
        tuesday: day(&m[1]),
        wednesday: day(&m[2]),
        thursday: day(&m[3]),
        friday: day(&m[4]),
        saturday: day(&m[5]),
        sunday: day(&m[6]),
    }
}

pub fn shopping_list(pref: MealPreference) -> Vec<String> {
    let specific = match pref {
        MealPreference::Vegetarian => VEGETARIAN_SHOPPING,
        MealPreference::NonVegetarian => NON_VEGETARIAN_SHOPPING,
    };
    specific
        .iter()
        .chain(SHARED_SHOPPING)
        .map(|s| s.to_string())
        .collect()
}

/// A complete plan carrying the calculator's targets.
pub fn plan(pref: MealPreference, targets: &EnergyTargets) -> GeneratedPlan {
    GeneratedPlan {
        daily_calories: f64::from(targets.daily_calories),
        macronutrients: Macronutrients {
            protein: f64::from(targets.protein_g),
            carbs: f64::from(targets.carbs_g),
            fat: f64::from(targets.fat_g),
        },
        meal_plan: weekly_plan(pref),
        shopping_list: shopping_list(pref),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEAT: [&str; 6] = ["chicken", "beef", "salmon", "tuna", "turkey", "shrimp"];

    #[test]
    fn vegetarian_plan_has_no_meat() {
        let week = weekly_plan(MealPreference::Vegetarian);
        for (name, meals) in week.days() {
            for item in [&meals.breakfast, &meals.lunch, &meals.dinner]
                .into_iter()
                .chain(meals.snacks.iter())
            {
                let lower = item.to_lowercase();
                assert!(
                    !MEAT.iter().any(|m| lower.contains(m)),
                    "{name}: {item}"
                );
            }
        }
        let list = shopping_list(MealPreference::Vegetarian);
        assert!(list.iter().all(|i| !MEAT.iter().any(|m| i.to_lowercase().contains(m))));
    }

    #[test]
    fn every_day_has_meals_and_snacks() {
        let week = weekly_plan(MealPreference::NonVegetarian);
        for (_, meals) in week.days() {
            assert!(!meals.breakfast.is_empty());
            assert!(!meals.snacks.is_empty());
        }
    }

    #[test]
    fn fallback_plan_uses_given_targets() {
        let targets = EnergyTargets {
            bmr: 1700,
            tdee: 2400,
            daily_adjustment: 400,
            daily_calories: 2000,
            protein_g: 150,
            carbs_g: 194,
            fat_g: 56,
        };
        let plan = plan(MealPreference::NonVegetarian, &targets);
        assert_eq!(plan.daily_calories, 2000.0);
        assert_eq!(plan.macronutrients.fat, 56.0);
        assert!(plan.shopping_list.contains(&"Chicken breast".to_string()));
    }
}
