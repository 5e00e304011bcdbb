//! Run Report: per-category result accumulation and summary rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// The fixed probe categories, in battery order.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Environment,
    AiTools,
    AiAgents,
    Workflows,
    ChatbotCreate,
    ChatbotList,
    ChatbotTest,
    ErrorHandling,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Environment,
        Category::AiTools,
        Category::AiAgents,
        Category::Workflows,
        Category::ChatbotCreate,
        Category::ChatbotList,
        Category::ChatbotTest,
        Category::ErrorHandling,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Environment => "environment",
            Category::AiTools => "ai_tools",
            Category::AiAgents => "ai_agents",
            Category::Workflows => "workflows",
            Category::ChatbotCreate => "chatbot_create",
            Category::ChatbotList => "chatbot_list",
            Category::ChatbotTest => "chatbot_test",
            Category::ErrorHandling => "error_handling",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    Pending,
    Success,
    Failed,
}

/// One probe observation. Append-only once recorded.
#[derive(Debug, Serialize, Clone)]
pub struct ResultRecord {
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResult {
    pub status: CategoryStatus,
    pub records: Vec<ResultRecord>,
}

/// Aggregated results for one harness run. Owned by the run, discarded
/// after the summary is printed; the exit code is the only survivor.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub categories: Vec<(Category, CategoryResult)>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            categories: Category::ALL
                .iter()
                .map(|c| {
                    (
                        *c,
                        CategoryResult {
                            status: CategoryStatus::Pending,
                            records: Vec::new(),
                        },
                    )
                })
                .collect(),
        }
    }

    /// Append a record and apply the status transition: the first success
    /// promotes a pending category, any failure demotes it terminally.
    pub fn record(&mut self, category: Category, success: bool, message: &str, detail: Option<Value>) {
        let label = if success { "SUCCESS" } else { "FAILED" };
        println!("[{}] {}: {}", label, category, message);
        if let Some(d) = &detail {
            println!("  Details: {}", d);
        }

        let entry = self
            .categories
            .iter_mut()
            .find(|(c, _)| *c == category)
            .map(|(_, r)| r)
            .expect("all categories are pre-registered");

        entry.records.push(ResultRecord {
            timestamp: Utc::now(),
            success,
            message: message.to_string(),
            detail,
        });

        if !success {
            entry.status = CategoryStatus::Failed;
        } else if entry.status == CategoryStatus::Pending {
            entry.status = CategoryStatus::Success;
        }
    }

    pub fn status_of(&self, category: Category) -> CategoryStatus {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, r)| r.status)
            .expect("all categories are pre-registered")
    }

    /// True iff no category ended the run failed.
    pub fn overall_success(&self) -> bool {
        self.categories
            .iter()
            .all(|(_, r)| r.status != CategoryStatus::Failed)
    }

    pub fn passed_count(&self) -> usize {
        self.categories
            .iter()
            .filter(|(_, r)| r.status == CategoryStatus::Success)
            .count()
    }

    /// Render the end-of-run summary table with per-category failure excerpts.
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("PROBE SUMMARY");
        println!("{}", "=".repeat(60));

        for (category, result) in &self.categories {
            let icon = match result.status {
                CategoryStatus::Success => "✅",
                CategoryStatus::Failed => "❌",
                CategoryStatus::Pending => "⏳",
            };
            let status = match result.status {
                CategoryStatus::Success => "success",
                CategoryStatus::Failed => "failed",
                CategoryStatus::Pending => "pending",
            };
            println!("{} {:<16} : {}", icon, category.to_string(), status);

            // First few failures only; the full log already went to stdout.
            for rec in result.records.iter().filter(|r| !r.success).take(3) {
                println!("    - {}", rec.message);
            }
        }

        println!(
            "\nOverall: {}/{} categories passed",
            self.passed_count(),
            self.categories.len()
        );
        if self.overall_success() {
            println!("All probe categories PASSED");
        } else {
            let failed = self
                .categories
                .iter()
                .filter(|(_, r)| r.status == CategoryStatus::Failed)
                .count();
            println!("{} categories FAILED", failed);
        }
    }
}
