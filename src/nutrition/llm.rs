use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::{plan::GeneratedPlan, prompt::PlanPrompt};
use crate::config::LlmConfig;

#[async_trait]
pub trait MealPlanGenerator: Send + Sync {
    async fn generate(&self, prompt: &PlanPrompt) -> Result<GeneratedPlan>;
}

/// Calls an OpenAI-compatible `/chat/completions` endpoint in JSON mode.
#[derive(Clone)]
pub struct OpenAiPlanner {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiPlanner {
    pub fn new(cfg: &LlmConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl MealPlanGenerator for OpenAiPlanner {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &PlanPrompt) -> Result<GeneratedPlan> {
        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": prompt.system },
                    { "role": "user", "content": prompt.user },
                ],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens,
                "response_format": { "type": "json_object" },
            }))
            .send()
            .await
            .context("chat completion request failed")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            bail!("chat completion returned {status}: {body}");
        }

        let body: ChatResponse = res.json().await.context("decode chat completion")?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| anyhow!("chat completion returned no content"))?;
        debug!(len = content.len(), "received meal plan");

        parse_plan_content(&content)
    }
}

/// Parses the model's reply. Some providers wrap the object in prose or a
/// code fence, so the outermost `{...}` is tried when a direct parse fails.
pub fn parse_plan_content(content: &str) -> Result<GeneratedPlan> {
    let plan = match serde_json::from_str::<GeneratedPlan>(content) {
        Ok(plan) => plan,
        Err(direct) => {
            let object = match (content.find('{'), content.rfind('}')) {
                (Some(start), Some(end)) if start < end => &content[start..=end],
                _ => return Err(anyhow!(direct).context("reply contains no JSON object")),
            };
            serde_json::from_str(object).context("reply is not a valid meal plan")?
        }
    };
    ensure_meals(&plan)?;
    Ok(plan)
}

fn ensure_meals(plan: &GeneratedPlan) -> Result<()> {
    for (day, meals) in plan.meal_plan.days() {
        if [&meals.breakfast, &meals.lunch, &meals.dinner]
            .iter()
            .any(|m| m.trim().is_empty())
        {
            bail!("meal plan has an empty meal on {day}");
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{
        http::{header::AUTHORIZATION, HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    pub(crate) fn plan_json() -> Value {
        let day = json!({
            "breakfast": "Greek yogurt with berries",
            "lunch": "Chicken salad",
            "dinner": "Salmon with rice",
            "snacks": ["Almonds"]
        });
        json!({
            "daily_calories": 2200,
            "macronutrients": { "protein": 150, "carbs": 220, "fat": 70 },
            "meal_plan": {
                "monday": day, "tuesday": day, "wednesday": day, "thursday": day,
                "friday": day, "saturday": day, "sunday": day
            },
            "shopping_list": ["Salmon", "Rice"]
        })
    }

    #[test]
    fn parses_plain_json() {
        let plan = parse_plan_content(&plan_json().to_string()).unwrap();
        assert_eq!(plan.daily_calories, 2200.0);
        assert_eq!(plan.meal_plan.friday.lunch, "Chicken salad");
        assert_eq!(plan.shopping_list.len(), 2);
    }

    #[test]
    fn extracts_object_from_surrounding_text() {
        let reply = format!("Here is your plan:\n```json\n{}\n```\nEnjoy!", plan_json());
        let plan = parse_plan_content(&reply).unwrap();
        assert_eq!(plan.meal_plan.sunday.snacks, vec!["Almonds".to_string()]);
    }

    #[test]
    fn rejects_incomplete_week() {
        let mut value = plan_json();
        value["meal_plan"].as_object_mut().unwrap().remove("sunday");
        assert!(parse_plan_content(&value.to_string()).is_err());
    }

    #[test]
    fn rejects_blank_meals() {
        let mut value = plan_json();
        value["meal_plan"]["wednesday"]["dinner"] = json!("  ");
        let err = parse_plan_content(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("wednesday"));
    }

    #[test]
    fn rejects_text_without_json() {
        assert!(parse_plan_content("I cannot help with that").is_err());
        assert!(parse_plan_content("} backwards {").is_err());
    }

    type Received = Arc<Mutex<Option<(HeaderMap, Value)>>>;

    /// Serves one canned `/chat/completions` reply on a local port and
    /// records the request it was sent.
    async fn stub_provider(status: StatusCode, reply: String) -> (OpenAiPlanner, Received) {
        let received: Received = Arc::default();
        let record = received.clone();
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let record = record.clone();
                let reply = reply.clone();
                async move {
                    *record.lock().unwrap() = Some((headers, body));
                    (status, reply)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let planner = OpenAiPlanner::new(&LlmConfig {
            api_key: "sk-test".into(),
            base_url: format!("http://{addr}/v1/"),
            model: "gpt-test".into(),
            max_tokens: 3000,
            temperature: 0.5,
        });
        (planner, received)
    }

    fn prompt() -> PlanPrompt {
        PlanPrompt {
            system: "You are a nutritionist.".into(),
            user: "Plan my week.".into(),
        }
    }

    fn reply_with(content: Value) -> String {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }).to_string()
    }

    #[tokio::test]
    async fn sends_bearer_auth_and_json_mode() {
        let (planner, received) =
            stub_provider(StatusCode::OK, reply_with(json!(plan_json().to_string()))).await;

        let plan = planner.generate(&prompt()).await.unwrap();
        assert_eq!(plan.daily_calories, 2200.0);

        let (headers, body) = received.lock().unwrap().take().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer sk-test");
        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["max_tokens"], 3000);
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are a nutritionist.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Plan my week.");
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let (planner, _) =
            stub_provider(StatusCode::INTERNAL_SERVER_ERROR, "model overloaded".into()).await;
        let err = planner.generate(&prompt()).await.unwrap_err().to_string();
        assert!(err.contains("500"), "{err}");
        assert!(err.contains("model overloaded"), "{err}");
    }

    #[tokio::test]
    async fn missing_choices_are_an_error() {
        let (planner, _) = stub_provider(StatusCode::OK, json!({ "choices": [] }).to_string()).await;
        let err = planner.generate(&prompt()).await.unwrap_err();
        assert!(err.to_string().contains("no content"));
    }

    #[tokio::test]
    async fn blank_content_is_an_error() {
        let (planner, _) = stub_provider(StatusCode::OK, reply_with(json!("   "))).await;
        let err = planner.generate(&prompt()).await.unwrap_err();
        assert!(err.to_string().contains("no content"));

        let (planner, _) = stub_provider(StatusCode::OK, reply_with(Value::Null)).await;
        assert!(planner.generate(&prompt()).await.is_err());
    }
}
