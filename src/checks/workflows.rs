//! Workflow generation probes for both automation targets.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{record_server_error, Check, CheckContext};
use crate::probe::ProbeOutcome;
use crate::report::{Category, RunReport};

const WORKFLOW_PROMPTS: [(&str, &str); 2] = [
    (
        "n8n",
        "Create a workflow that sends a Slack notification when a new email arrives in Gmail, then creates a task in Asana",
    ),
    (
        "make",
        "Build an automation that creates a Trello card when a form is submitted on a website, then sends a welcome email",
    ),
];

// Generation failures the backend's JSON parser guard reports inside an
// otherwise-200 workflow object.
const PARSER_GUARD_ERRORS: [&str; 2] = ["Failed to parse workflow JSON", "Invalid JSON generated"];

const N8N_KEYS: [&str; 3] = ["name", "nodes", "connections"];
const MAKE_KEYS: [&str; 4] = ["name", "modules", "connections", "routes"];

pub struct WorkflowsCheck;

#[async_trait]
impl Check for WorkflowsCheck {
    fn category(&self) -> Category {
        Category::Workflows
    }

    async fn run(&self, ctx: &CheckContext<'_>, report: &mut RunReport) {
        let category = self.category();

        for (workflow_type, prompt) in WORKFLOW_PROMPTS {
            let payload = json!({
                "prompt": prompt,
                "type": workflow_type,
                "userId": "probe_user_123",
            });
            let outcome = ctx
                .probe
                .post_json("/api/workflows", &payload, ctx.config.timeouts.generate())
                .await;

            let what = format!("{} workflow", workflow_type);
            let (status, body) = match outcome {
                ProbeOutcome::Response { status, body } => (status, body),
                ProbeOutcome::Fault(fault) => {
                    report.record(category, false, &format!("{}: {}", what, fault), None);
                    continue;
                }
            };

            match status.as_u16() {
                200 => {
                    let workflow = serde_json::from_str::<Value>(&body)
                        .ok()
                        .and_then(|v| v.get("workflow").cloned());
                    match workflow {
                        Some(workflow) if workflow.is_object() => {
                            self.check_workflow_body(report, workflow_type, &what, &workflow)
                        }
                        Some(_) => report.record(
                            category,
                            false,
                            &format!("{} is not a JSON object", what),
                            None,
                        ),
                        None => report.record(
                            category,
                            false,
                            &format!("{} response missing 'workflow' field", what),
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
    }
}

impl WorkflowsCheck {
    fn check_workflow_body(
        &self,
        report: &mut RunReport,
        workflow_type: &str,
        what: &str,
        workflow: &Value,
    ) {
        let category = self.category();
        let keys: Vec<&str> = workflow
            .as_object()
            .map(|o| o.keys().map(String::as_str).collect())
            .unwrap_or_default();

        report.record(
            category,
            true,
            &format!("{} generated", what),
            Some(json!({
                "type": workflow_type,
                "workflow_keys": keys,
                "has_error": workflow.get("error").is_some(),
            })),
        );

        if let Some(error) = workflow.get("error").and_then(Value::as_str) {
            if PARSER_GUARD_ERRORS.iter().any(|e| error.contains(e)) {
                report.record(
                    category,
                    true,
                    &format!("{}: parser guard caught malformed generation", what),
                    Some(json!({
                        "error": error,
                        "raw_response_available": workflow.get("raw_response").is_some(),
                    })),
                );
            } else {
                report.record(
                    category,
                    false,
                    &format!("{} has unexpected error: {}", what, error),
                    None,
                );
            }
            return;
        }

        let expected: &[&str] = if workflow_type == "make" {
            &MAKE_KEYS
        } else {
            &N8N_KEYS
        };
        if expected.iter().any(|key| workflow.get(key).is_some()) {
            report.record(category, true, &format!("{} has proper structure", what), None);
        } else {
            report.record(
                category,
                false,
                &format!("{} missing expected structure (none of {:?})", what, expected),
                None,
            );
        }
    }
}
