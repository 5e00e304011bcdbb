//! Chatbot lifecycle probes: create, list, and conversational test.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{preview, probe_missing_fields, record_server_error, Check, CheckContext};
use crate::probe::{missing_fields, ProbeOutcome};
use crate::report::{Category, RunReport};

const CREATE_REQUIRED_FIELDS: [&str; 7] = [
    "id",
    "name",
    "description",
    "knowledgeBase",
    "color",
    "userId",
    "createdAt",
];

const LIST_REQUIRED_FIELDS: [&str; 6] = ["id", "name", "description", "color", "createdAt", "userId"];

const TEST_MESSAGES: [&str; 3] = [
    "What are your business hours?",
    "Do you offer refunds?",
    "Tell me about your products",
];

const KNOWLEDGE_BASE: &str = "Our company offers premium software solutions for businesses. \
We provide 24/7 support, have a 30-day money-back guarantee, and offer enterprise-level \
security. Our main products include CRM software, project management tools, and analytics \
dashboards.";

pub struct ChatbotCreateCheck;

#[async_trait]
impl Check for ChatbotCreateCheck {
    fn category(&self) -> Category {
        Category::ChatbotCreate
    }

    async fn run(&self, ctx: &CheckContext<'_>, report: &mut RunReport) {
        let category = self.category();
        let payload = json!({
            "name": "Customer Support Bot",
            "description": "AI-powered customer support chatbot for e-commerce",
            "knowledgeBase": KNOWLEDGE_BASE,
            "color": "#3B82F6",
            "userId": "probe_user_chatbot_123",
        });

        let outcome = ctx
            .probe
            .post_json("/api/chatbots", &payload, ctx.config.timeouts.generate())
            .await;

        let (status, body) = match outcome {
            ProbeOutcome::Response { status, body } => (status, body),
            ProbeOutcome::Fault(fault) => {
                report.record(category, false, &format!("chatbot creation: {}", fault), None);
                return;
            }
        };

        match status.as_u16() {
            200 => {
                let chatbot = serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| v.get("chatbot").cloned());
                let Some(chatbot) = chatbot else {
                    report.record(category, false, "response missing 'chatbot' field", None);
                    return;
                };

                let missing = missing_fields(&chatbot, &CREATE_REQUIRED_FIELDS);
                if !missing.is_empty() {
                    report.record(
                        category,
                        false,
                        &format!("missing fields in chatbot: {:?}", missing),
                        None,
                    );
                    return;
                }

                let returned_kb = chatbot
                    .get("knowledgeBase")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                report.record(
                    category,
                    true,
                    "chatbot created successfully",
                    Some(json!({
                        "chatbot_id": chatbot.get("id"),
                        "name": chatbot.get("name"),
                        "original_knowledge_preserved": chatbot.get("originalKnowledge").is_some(),
                    })),
                );

                if returned_kb != KNOWLEDGE_BASE {
                    report.record(
                        category,
                        true,
                        "knowledge base processed with AI enhancement",
                        None,
                    );
                } else {
                    report.record(category, false, "knowledge base not processed by AI", None);
                }
            }
            500 => record_server_error(ctx, report, category, "chatbot creation", status, &body),
            code => report.record(
                category,
                false,
                &format!("chatbot creation unexpected status: {}", code),
                None,
            ),
        }
    }
}

pub struct ChatbotListCheck;

#[async_trait]
impl Check for ChatbotListCheck {
    fn category(&self) -> Category {
        Category::ChatbotList
    }

    async fn run(&self, ctx: &CheckContext<'_>, report: &mut RunReport) {
        let category = self.category();
        let outcome = ctx
            .probe
            .get("/api/chatbots", ctx.config.timeouts.read())
            .await;

        let (status, body) = match outcome {
            ProbeOutcome::Response { status, body } => (status, body),
            ProbeOutcome::Fault(fault) => {
                report.record(category, false, &format!("chatbot list: {}", fault), None);
                return;
            }
        };

        if status.as_u16() == 500 {
            record_server_error(ctx, report, category, "chatbot list", status, &body);
            return;
        }
        if status.as_u16() != 200 {
            report.record(
                category,
                false,
                &format!("chatbot list unexpected status: {}", status.as_u16()),
                None,
            );
            return;
        }

        let chatbots = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("chatbots").and_then(Value::as_array).cloned());
        let Some(chatbots) = chatbots else {
            report.record(category, false, "response missing 'chatbots' field", None);
            return;
        };

        report.record(
            category,
            true,
            &format!("retrieved {} chatbots", chatbots.len()),
            Some(json!({ "chatbot_count": chatbots.len(), "sample_chatbot": chatbots.first() })),
        );

        match chatbots.first() {
            Some(sample) => {
                let missing = missing_fields(sample, &LIST_REQUIRED_FIELDS);
                if missing.is_empty() {
                    report.record(category, true, "chatbot list structure is valid", None);
                } else {
                    report.record(
                        category,
                        false,
                        &format!("missing fields in chatbot list: {:?}", missing),
                        None,
                    );
                }
            }
            None => {
                report.record(category, true, "empty chatbot list returned", None);
            }
        }
    }
}

pub struct ChatbotTestCheck;

#[async_trait]
impl Check for ChatbotTestCheck {
    fn category(&self) -> Category {
        Category::ChatbotTest
    }

    async fn run(&self, ctx: &CheckContext<'_>, report: &mut RunReport) {
        let category = self.category();

        for message in TEST_MESSAGES {
            let payload = json!({
                "chatbotId": "probe_bot_123",
                "message": message,
                "userId": "probe_user_123",
            });
            let outcome = ctx
                .probe
                .post_json("/api/chatbots/test", &payload, ctx.config.timeouts.agent())
                .await;

            let what = format!("message '{}'", preview(message, 30));
            let (status, body) = match outcome {
                ProbeOutcome::Response { status, body } => (status, body),
                ProbeOutcome::Fault(fault) => {
                    report.record(category, false, &format!("{}: {}", what, fault), None);
                    continue;
                }
            };

            match status.as_u16() {
                200 => {
                    let response = serde_json::from_str::<Value>(&body)
                        .ok()
                        .and_then(|v| v.get("response").and_then(Value::as_str).map(str::to_string));
                    match response {
                        Some(response) if !response.is_empty() => report.record(
                            category,
                            true,
                            &format!("chatbot responded to {}", what),
                            Some(json!({
                                "response_length": response.len(),
                                "response_preview": preview(&response, 100),
                            })),
                        ),
                        _ => report.record(
                            category,
                            false,
                            &format!("empty response for {}", what),
                            None,
                        ),
                    }
                }
                500 => record_server_error(ctx, report, category, &what, status, &body),
                code => report.record(
                    category,
                    false,
                    &format!("{} unexpected status: {}", what, code),
                    None,
                ),
            }
        }

        probe_missing_fields(
            ctx,
            report,
            category,
            "/api/chatbots/test",
            &json!({ "chatbotId": "probe_bot" }),
            "response",
        )
        .await;
    }
}
