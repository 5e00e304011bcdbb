//! Error-path probes: unknown routes, bad methods, malformed bodies.

use async_trait::async_trait;
use serde_json::json;

use super::{probe_missing_fields, Check, CheckContext};
use crate::probe::ProbeOutcome;
use crate::report::{Category, RunReport};

pub struct ErrorHandlingCheck;

#[async_trait]
impl Check for ErrorHandlingCheck {
    fn category(&self) -> Category {
        Category::ErrorHandling
    }

    async fn run(&self, ctx: &CheckContext<'_>, report: &mut RunReport) {
        let category = self.category();
        let timeout = ctx.config.timeouts.quick();

        // Unknown endpoint must 404.
        match ctx.probe.get("/api/invalid-endpoint", timeout).await {
            ProbeOutcome::Response { status, .. } if status.as_u16() == 404 => {
                report.record(category, true, "invalid endpoint returns 404", None);
            }
            ProbeOutcome::Response { status, .. } => {
                report.record(
                    category,
                    false,
                    &format!("invalid endpoint returned {} instead of 404", status.as_u16()),
                    None,
                );
            }
            ProbeOutcome::Fault(fault) => {
                report.record(category, false, &format!("invalid-endpoint probe: {}", fault), None);
            }
        }

        // Unsupported method must 405, exactly.
        match ctx.probe.put("/api/ai-tools", timeout).await {
            ProbeOutcome::Response { status, .. } if status.as_u16() == 405 => {
                report.record(category, true, "PUT method returns 405 Method Not Allowed", None);
            }
            ProbeOutcome::Response { status, .. } => {
                report.record(
                    category,
                    false,
                    &format!("PUT method returned {} instead of 405", status.as_u16()),
                    None,
                );
            }
            ProbeOutcome::Fault(fault) => {
                report.record(category, false, &format!("PUT probe: {}", fault), None);
            }
        }

        // A body that is not JSON must be rejected, not crash the route.
        match ctx.probe.post_raw("/api/ai-agents", "invalid json", timeout).await {
            ProbeOutcome::Response { status, .. }
                if matches!(status.as_u16(), 400 | 500) =>
            {
                report.record(
                    category,
                    true,
                    &format!("malformed JSON handled with status {}", status.as_u16()),
                    None,
                );
            }
            ProbeOutcome::Response { status, .. } => {
                report.record(
                    category,
                    false,
                    &format!("malformed JSON returned unexpected status {}", status.as_u16()),
                    None,
                );
            }
            ProbeOutcome::Fault(fault) => {
                report.record(category, false, &format!("malformed-JSON probe: {}", fault), None);
            }
        }

        probe_missing_fields(
            ctx,
            report,
            category,
            "/api/ai-agents",
            &json!({ "agentId": "resume" }),
            "output",
        )
        .await;
    }
}
