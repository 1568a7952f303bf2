//! Schedule generation.
//!
//! Turns a free-text task list into a [`Schedule`] with one model call:
//! build the prompt, send it through an [`LlmBackend`], parse the reply,
//! then run the consistency checks.

mod llm;
mod prompt;

pub use llm::{LlmBackend, OpenAiBackend};
pub use prompt::{build_system_prompt, PromptPolicy};

use chrono::NaiveDateTime;

use crate::error::{Result, ValidationError};
use crate::schedule::{Schedule, ScheduleIssue};

/// Output of a successful generation.
#[derive(Debug, Clone)]
pub struct Generated {
    pub schedule: Schedule,
    /// Consistency problems found in the model's answer (empty in strict mode).
    pub issues: Vec<ScheduleIssue>,
}

pub struct ScheduleGenerator<B> {
    backend: B,
    policy: PromptPolicy,
    strict: bool,
}

impl<B: LlmBackend> ScheduleGenerator<B> {
    pub fn new(backend: B, policy: PromptPolicy) -> Self {
        Self {
            backend,
            policy,
            strict: false,
        }
    }

    /// Reject schedules with consistency issues instead of warning.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn policy(&self) -> &PromptPolicy {
        &self.policy
    }

    /// Plan the rest of the day starting at `now`.
    ///
    /// # Errors
    ///
    /// `Transport` if the model call fails, `Parse` if the answer is not a
    /// schedule, `Validation` in strict mode when checks fail.
    pub async fn generate(&self, task_text: &str, now: NaiveDateTime) -> Result<Generated> {
        let system_prompt = build_system_prompt(&self.policy, now);
        let raw = self.backend.complete(&system_prompt, task_text).await?;
        tracing::debug!(bytes = raw.len(), "received LLM response");

        let schedule = Schedule::from_llm_response(&raw)?;
        let issues = schedule.validate(self.policy.day_end);

        if !issues.is_empty() {
            if self.strict {
                return Err(ValidationError::ScheduleRejected(
                    issues.iter().map(ToString::to_string).collect(),
                )
                .into());
            }
            for issue in &issues {
                tracing::warn!(%issue, "generated schedule issue");
            }
        }

        tracing::info!(
            tasks = schedule.len(),
            minutes = schedule.total_minutes(),
            "schedule generated"
        );
        Ok(Generated { schedule, issues })
    }
}
