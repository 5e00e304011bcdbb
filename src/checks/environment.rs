//! Credential presence checks against the backend's env file.

use async_trait::async_trait;

use super::{Check, CheckContext};
use crate::report::{Category, RunReport};

pub struct EnvironmentCheck;

#[async_trait]
impl Check for EnvironmentCheck {
    fn category(&self) -> Category {
        Category::Environment
    }

    async fn run(&self, ctx: &CheckContext<'_>, report: &mut RunReport) {
        let path = &ctx.config.env_file;
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                report.record(
                    self.category(),
                    false,
                    &format!("env file not found: {}", path.display()),
                    None,
                );
                return;
            }
            Err(e) => {
                report.record(
                    self.category(),
                    false,
                    &format!("failed to read env file {}: {}", path.display(), e),
                    None,
                );
                return;
            }
        };

        report.record(
            self.category(),
            true,
            &format!("env file exists: {}", path.display()),
            None,
        );

        for var in &ctx.config.required_env_vars {
            if read_env_var(&content, var).is_some() {
                report.record(self.category(), true, &format!("{} is configured", var), None);
            } else {
                report.record(
                    self.category(),
                    false,
                    &format!("{} is missing or empty", var),
                    None,
                );
            }
        }
    }
}

/// Extract `var` from dotenv-style content. Returns None when the variable
/// is absent or its value is empty.
pub fn read_env_var(content: &str, var: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let value = line
            .trim()
            .strip_prefix(var)
            .and_then(|rest| rest.strip_prefix('='))?;
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    })
}
