//! Substring search and completion filtering over the task collection.
//!
//! Results keep the collection's insertion order.

use std::fmt;
use std::str::FromStr;
use todo_core::Task;

/// Completion-state filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.is_completed,
            Self::Completed => task.is_completed,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" | "open" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(format!("Invalid status filter: {}", s)),
        }
    }
}

/// Search query plus completion filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring; empty matches everything
    pub query: String,

    pub status: StatusFilter,
}

impl TaskFilter {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            status: StatusFilter::All,
        }
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }
}

/// Tasks whose title or description contains `query`, ignoring case.
/// An empty query returns the whole collection.
pub fn search<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    filter_tasks(tasks, &TaskFilter::query(query))
}

pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    let needle = filter.query.to_lowercase();
    tasks
        .iter()
        .filter(|t| filter.status.matches(t))
        .filter(|t| needle.is_empty() || t.matches_lowercase(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use todo_core::TaskDraft;

    fn task(title: &str, description: &str, completed: bool) -> Task {
        let mut task = Task::new(TaskDraft::new(title, description, Utc::now()), None);
        task.is_completed = completed;
        task
    }

    fn sample() -> Vec<Task> {
        vec![
            task("Buy milk", "2 liters", false),
            task("Call mom", "About the MILKshake recipe", true),
            task("Dentist", "Tuesday 9am", false),
            task("Pay rent", "Before the 1st", true),
        ]
    }

    fn titles(found: &[&Task]) -> Vec<String> {
        found.iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn test_empty_query_returns_all_in_order() {
        let tasks = sample();
        let found = search(&tasks, "");
        assert_eq!(
            titles(&found),
            vec!["Buy milk", "Call mom", "Dentist", "Pay rent"]
        );
    }

    #[test]
    fn test_case_insensitive_title_and_description() {
        let tasks = sample();
        let found = search(&tasks, "Milk");
        assert_eq!(titles(&found), vec!["Buy milk", "Call mom"]);
    }

    #[test]
    fn test_results_are_exactly_the_matching_tasks() {
        let tasks = sample();
        for query in ["e", "PAY", "the", "tuesday", "zzz", " "] {
            let found = search(&tasks, query);
            let needle = query.to_lowercase();
            let expected: Vec<&Task> = tasks
                .iter()
                .filter(|t| {
                    t.title.to_lowercase().contains(&needle)
                        || t.description.to_lowercase().contains(&needle)
                })
                .collect();
            assert_eq!(found, expected, "query {:?}", query);
        }
    }

    #[test]
    fn test_status_filter() {
        let tasks = sample();

        let pending = filter_tasks(&tasks, &TaskFilter::default().with_status(StatusFilter::Pending));
        assert_eq!(titles(&pending), vec!["Buy milk", "Dentist"]);

        let done_milk = filter_tasks(
            &tasks,
            &TaskFilter::query("milk").with_status(StatusFilter::Completed),
        );
        assert_eq!(titles(&done_milk), vec!["Call mom"]);
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("done".parse::<StatusFilter>().unwrap(), StatusFilter::Completed);
        assert_eq!("Pending".parse::<StatusFilter>().unwrap(), StatusFilter::Pending);
        assert!("later".parse::<StatusFilter>().is_err());
    }
}
