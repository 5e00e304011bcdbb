//! AI tool listing: response shape and date-sorting checks.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{record_server_error, Check, CheckContext};
use crate::probe::{missing_fields, newest_first, present_fields, ProbeOutcome};
use crate::report::{Category, RunReport};

const REQUIRED_FIELDS: [&str; 5] = ["id", "name", "description", "url", "votes"];
const ENHANCED_FIELDS: [&str; 4] = ["createdAt", "featuredAt", "date", "topics"];

pub struct AiToolsCheck;

#[async_trait]
impl Check for AiToolsCheck {
    fn category(&self) -> Category {
        Category::AiTools
    }

    async fn run(&self, ctx: &CheckContext<'_>, report: &mut RunReport) {
        let category = self.category();
        let outcome = ctx
            .probe
            .get("/api/ai-tools", ctx.config.timeouts.read())
            .await;

        let (status, body) = match outcome {
            ProbeOutcome::Response { status, body } => (status, body),
            ProbeOutcome::Fault(fault) => {
                report.record(category, false, &fault.to_string(), None);
                return;
            }
        };

        report.record(
            category,
            true,
            &format!("API responded with status {}", status.as_u16()),
            None,
        );

        if status.as_u16() == 500 {
            record_server_error(ctx, report, category, "tool listing", status, &body);
            return;
        }
        if status.as_u16() != 200 {
            report.record(
                category,
                false,
                &format!("unexpected status code: {}", status.as_u16()),
                None,
            );
            return;
        }

        let data: Value = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(e) => {
                report.record(category, false, &format!("response is not valid JSON: {}", e), None);
                return;
            }
        };

        let tools = match data.get("tools").and_then(Value::as_array) {
            Some(tools) => tools,
            None => {
                report.record(
                    category,
                    false,
                    "response missing 'tools' field",
                    Some(json!({ "response": data })),
                );
                return;
            }
        };

        report.record(
            category,
            true,
            &format!("received {} AI tools", tools.len()),
            Some(json!({ "tool_count": tools.len(), "sample_tool": tools.first() })),
        );

        let Some(sample) = tools.first() else {
            return;
        };

        let missing = missing_fields(sample, &REQUIRED_FIELDS);
        if !missing.is_empty() {
            report.record(
                category,
                false,
                &format!("missing fields in tool: {:?}", missing),
                None,
            );
            return;
        }
        report.record(category, true, "tool structure is valid", None);

        // Enhanced date fields are reported separately; their absence does
        // not fail the base shape check.
        let enhanced = present_fields(sample, &ENHANCED_FIELDS);
        if enhanced.is_empty() {
            report.record(category, true, "no enhanced date fields present", None);
            return;
        }
        report.record(
            category,
            true,
            "enhanced date fields present",
            Some(json!({ "enhanced_fields_found": enhanced })),
        );

        if tools.len() > 1 {
            match newest_first(tools) {
                Some(true) => {
                    report.record(category, true, "date sorting correct (newest first)", None)
                }
                Some(false) => {
                    report.record(category, false, "date sorting not newest-first", None)
                }
                None => report.record(
                    category,
                    true,
                    "date ordering not comparable on first pair",
                    None,
                ),
            }
        }
    }
}
