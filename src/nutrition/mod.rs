pub mod calc;
pub mod fallback;
pub mod llm;
pub mod plan;
pub mod prompt;

pub use llm::{MealPlanGenerator, OpenAiPlanner};
