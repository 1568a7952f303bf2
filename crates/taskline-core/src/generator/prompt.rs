//! System prompt construction.

use chrono::{NaiveDateTime, NaiveTime};
use indoc::formatdoc;

/// Fixed planning rules handed to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPolicy {
    pub day_end: NaiveTime,
    /// Focused work block bounds, minutes.
    pub min_work_block: u32,
    pub max_work_block: u32,
    /// Break between tasks, minutes.
    pub short_break: u32,
    /// Ask for at least one longer meal break.
    pub meal_break: bool,
}

impl Default for PromptPolicy {
    fn default() -> Self {
        Self {
            day_end: NaiveTime::from_hms_opt(23, 0, 0).unwrap_or(NaiveTime::MIN),
            min_work_block: 60,
            max_work_block: 90,
            short_break: 15,
            meal_break: true,
        }
    }
}

/// Build the system prompt for a planning request made at `now`.
pub fn build_system_prompt(policy: &PromptPolicy, now: NaiveDateTime) -> String {
    let current_date = now.format("%Y-%m-%d");
    let current_time = now.format("%H:%M");
    let day_end_24h = policy.day_end.format("%H:%M");
    let day_end_12h = policy.day_end.format("%-I:%M %p");
    let meal = if policy.meal_break {
        " and at least one longer break (e.g., for dinner)"
    } else {
        ""
    };

    formatdoc! {r#"
        You are an expert scheduling assistant. Your task is to convert a user's unstructured to-do list into a structured JSON timeline.

        **Current Context:**
        - Today's Date: {current_date}
        - Current Time: {current_time}

        **Your Instructions:**
        1.  **Define Working Hours**: The user's workday ends at **{day_end_12h} ({day_end_24h})**. Schedule focused work blocks and necessary breaks up until this time.
        2.  **Analyze and Prioritize**: Scrutinize the user's entire input to identify the highest-priority tasks that must be done *today*. Priority is determined by the closest deadlines (e.g., "due tomorrow" is higher priority than "due next week") and explicit user commands (e.g., "do this today").
        3.  **Build a Logical Schedule**: Create a realistic schedule for the rest of the day, starting from the **Current Time** ({current_time}) and ending at **{day_end_24h}**. Tasks must be in chronological order and must not overlap.
        4.  **Structure Time Blocks**: Allocate focused work blocks (typically {min_block}-{max_block} minutes) for demanding tasks and shorter blocks for minor ones. Place short breaks ({short_break} mins) between tasks{meal}.
        5.  **Enrich Task Names**: Make the `task_name` in the JSON descriptive. If a task has a deadline, mention it (e.g., "Work on Presentation (Due Sep 26th)").
        6.  **Strict JSON Output**: Your final output MUST be a valid JSON object and nothing else. Do not include any explanatory text, markdown, or comments.

        **JSON Output Schema:**
        {{
          "schedule_date": "YYYY-MM-DD",
          "tasks": [
            {{
              "task_name": "Descriptive name of the task",
              "start_time": "HH:MM",
              "end_time": "HH:MM",
              "duration_minutes": integer
            }}
          ]
        }}
        "#,
        current_date = current_date,
        current_time = current_time,
        day_end_12h = day_end_12h,
        day_end_24h = day_end_24h,
        meal = meal,
        min_block = policy.min_work_block,
        max_block = policy.max_work_block,
        short_break = policy.short_break,
    }
}
