//! Prompt templates for each generation operation
//!
//! Pure, deterministic string builders. Each builder is total over its
//! declared inputs: empty or missing optional fields render as a fixed
//! placeholder ("N/A", "None", "Untitled") instead of failing.

use serde::{Deserialize, Serialize};

/// Task categories the category suggestion is allowed to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Work,
    Personal,
    Learning,
    Meeting,
    Break,
    Other,
}

impl Category {
    /// All valid categories, in match priority order
    pub const ALL: [Category; 6] = [
        Category::Work,
        Category::Personal,
        Category::Learning,
        Category::Meeting,
        Category::Break,
        Category::Other,
    ];

    /// Canonical category name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Learning => "Learning",
            Category::Meeting => "Meeting",
            Category::Break => "Break",
            Category::Other => "Other",
        }
    }

    /// Narrow raw generated text to a valid category
    ///
    /// Case-insensitive substring scan over the fixed set, first match wins;
    /// anything that matches nothing maps to `Other`. Free-form model output
    /// is never trusted to be a category name on its own.
    pub fn from_raw(raw: &str) -> Category {
        let lowered = raw.to_lowercase();
        for category in Category::ALL {
            if lowered.contains(&category.as_str().to_lowercase()) {
                return category;
            }
        }
        Category::Other
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal view of a task used by the summary prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskBrief {
    /// Task title, missing titles render as "Untitled"
    #[serde(default)]
    pub title: Option<String>,
    /// Duration in minutes
    #[serde(default)]
    pub duration: f64,
}

/// Productivity counters for one time window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatSnapshot {
    /// Number of tasks tracked
    #[serde(default)]
    pub tasks_count: u64,
    /// Minutes tracked
    #[serde(default)]
    pub total_time: f64,
}

/// Context the chat prompt folds into its preamble
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatContext {
    /// Today's productivity stats
    #[serde(default)]
    pub today_stats: StatSnapshot,
    /// All-time productivity stats
    #[serde(default)]
    pub alltime_stats: StatSnapshot,
    /// Titles of recently tracked tasks
    #[serde(default)]
    pub recent_tasks: Vec<String>,
    /// Title of the task currently being tracked, if any
    #[serde(default)]
    pub current_task: Option<String>,
}

/// Render minutes the way the tracker reports them: whole numbers without a
/// trailing ".0", fractional values as-is
fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{}", minutes as i64)
    } else {
        minutes.to_string()
    }
}

/// Prompt for generating a task title from a free-text description
pub fn title_prompt(description: &str) -> String {
    format!(
        r#"You are a task title generator. Create a clear, professional task title.

User input: "{description}"

Generate a concise task title (3-8 words) that:
- Starts with an action verb (e.g., "Design", "Implement", "Review", "Fix", "Update")
- Is specific and clear
- Follows best practices for task naming

Examples:
Input: "working on the new login page"
Output: Design New Login Page

Input: "fixing bugs in the payment system"
Output: Fix Payment System Bugs

Input: "meeting with the team about Q4 planning"
Output: Team Meeting - Q4 Planning

Now generate a title for: "{description}"

Return ONLY the title, no explanations or quotes."#
    )
}

/// Prompt for expanding free-text input into a detailed task description
pub fn description_prompt(user_input: &str) -> String {
    format!(
        r#"You are a task description enhancer. Create a clear, professional task description.

User input: "{user_input}"

Generate a detailed description (1-2 sentences) that:
- Provides context and clarity
- Is professional and specific
- Adds helpful details without assumptions
- Remains concise

Examples:
Input: "working on the new login page"
Output: Designing and implementing the new login page interface with improved UX and security features.

Input: "fixing bugs in payment"
Output: Investigating and resolving reported bugs in the payment processing system to ensure reliable transactions.

Input: "team meeting q4"
Output: Attending team meeting to discuss Q4 planning, goals, and project priorities.

Now generate a description for: "{user_input}"

Return ONLY the description, no explanations or quotes."#
    )
}

/// Prompt for suggesting a category, constrained to the fixed set
pub fn category_prompt(title: &str, description: Option<&str>) -> String {
    let description = match description {
        Some(text) if !text.is_empty() => text,
        _ => "N/A",
    };
    format!(
        "Based on this task, suggest ONE category from: Work, Personal, Learning, Meeting, Break, Other\n\n\
         Task: {title}\n\
         Description: {description}\n\n\
         Return ONLY the category name, nothing else."
    )
}

/// Prompt for summarizing a work session from its task list
pub fn summary_prompt(tasks: &[TaskBrief]) -> String {
    let tasks_text = tasks
        .iter()
        .map(|task| {
            format!(
                "- {} ({:.1} min)",
                task.title.as_deref().unwrap_or("Untitled"),
                task.duration
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Summarize this work session in 2-3 sentences:\n\n\
         Tasks completed:\n{tasks_text}\n\n\
         Provide a brief, professional summary of what was accomplished."
    )
}

/// Prompt for the productivity chat assistant
///
/// Folds the caller-provided context (today's stats, all-time stats, recent
/// task titles, current task) into a fixed preamble followed by the user's
/// message.
pub fn chat_prompt(message: &str, context: &ChatContext) -> String {
    let recent_tasks = if context.recent_tasks.is_empty() {
        "None".to_string()
    } else {
        context.recent_tasks.join(", ")
    };
    let current_task = context.current_task.as_deref().unwrap_or("None");

    format!(
        "Current Context:\n\
         - Today's Stats: {today_count} tasks, {today_time} minutes tracked\n\
         - All Time: {alltime_count} tasks, {alltime_time} minutes total\n\
         - Recent Tasks: {recent_tasks}\n\
         - Current Task: {current_task}\n\n\n\
         User Question: {message}\n\n\
         You are a helpful productivity assistant for the TRAK time tracking app. \
         Provide concise, friendly, and actionable insights based on the user's tasks \
         and productivity data. Keep responses brief (2-3 sentences max). \
         Be encouraging and supportive.",
        today_count = context.today_stats.tasks_count,
        today_time = format_minutes(context.today_stats.total_time),
        alltime_count = context.alltime_stats.tasks_count,
        alltime_time = format_minutes(context.alltime_stats.total_time),
    )
}

/// Clean up a generated title: strip quotes and a leading "Title:" style
/// prefix the model sometimes adds despite instructions
pub fn clean_title(raw: &str) -> String {
    let title = raw.replace(['"', '\''], "");
    let title = title.trim();
    match title.split_once(':') {
        Some((_, rest)) => rest.trim().to_string(),
        None => title.to_string(),
    }
}

/// Clean up a generated description: strip quotes, and a leading prefix only
/// when it is short enough to be a label rather than part of the sentence
pub fn clean_description(raw: &str) -> String {
    let description = raw.replace(['"', '\''], "");
    let description = description.trim();
    match description.split_once(':') {
        Some((prefix, rest)) if prefix.len() < 20 => rest.trim().to_string(),
        _ => description.to_string(),
    }
}
