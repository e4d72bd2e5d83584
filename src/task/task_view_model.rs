use tokio::sync::broadcast;

use crate::error::{ClientError, Result};
use crate::gateway::TaskGateway;
use crate::notification::Notification;

use super::task_dto::{CreateTaskRequest, UpdateDescriptionRequest};
use super::task_models::{DayOfWeek, Task, TaskStatistics};

/// Which subset of the cached list is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl Filter {
    pub fn label(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Completed => "completed",
            Filter::Incomplete => "incomplete",
        }
    }
}

/// Select the tasks a filter makes visible, preserving backend order.
///
/// An empty result is a normal outcome, not an error; the front-end renders
/// it as an empty-state message.
pub fn filter_tasks(tasks: &[Task], filter: Filter) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| match filter {
            Filter::All => true,
            Filter::Completed => task.completed,
            Filter::Incomplete => !task.completed,
        })
        .collect()
}

const NOTIFICATION_CAPACITY: usize = 100;

/// Holds the task list cache and the active filter, and drives every
/// user-initiated action against the gateway.
///
/// The cache is invalidated and fully reloaded after each mutating action
/// rather than patched in place. Actions require `&mut self`, so there is
/// exactly one in-flight action at a time.
pub struct TaskListViewModel {
    gateway: TaskGateway,
    tasks: Vec<Task>,
    filter: Filter,
    notify_tx: broadcast::Sender<Notification>,
}

impl TaskListViewModel {
    pub fn new(gateway: TaskGateway) -> Self {
        let (notify_tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            gateway,
            tasks: Vec::new(),
            filter: Filter::All,
            notify_tx,
        }
    }

    /// Subscribe to success/error notifications emitted by actions.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notify_tx.subscribe()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Switch the visible subset. Recomputation only; never re-fetches.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// The cached tasks the active filter makes visible, in backend order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        filter_tasks(&self.tasks, self.filter)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed).count()
    }

    /// Reload the cache from the backend. On failure the cache is discarded,
    /// so stale rows cannot linger on screen under any filter.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.gateway.list_all().await {
            Ok(tasks) => {
                self.tasks = tasks;
                Ok(())
            }
            Err(err) => {
                self.tasks.clear();
                self.notify_error(format!("Failed to load tasks: {err}"));
                Err(err)
            }
        }
    }

    /// Create a task from user input. Blank input is rejected here, before
    /// any network traffic.
    pub async fn add_task(&mut self, description: &str, day_of_week: Option<DayOfWeek>) -> Result<()> {
        let description = description.trim();
        if description.is_empty() {
            let err = ClientError::Validation("task description must not be empty".into());
            self.notify_error(err.to_string());
            return Err(err);
        }

        let payload = CreateTaskRequest {
            description: description.to_owned(),
            day_of_week,
        };
        match self.gateway.create(&payload).await {
            Ok(task) => {
                self.notify_success(format!("Task #{} added", task.id));
                self.refresh().await
            }
            Err(err) => {
                self.notify_error(format!("Failed to add task: {err}"));
                Err(err)
            }
        }
    }

    pub async fn complete_task(&mut self, id: i64) -> Result<()> {
        match self.gateway.complete(id).await {
            Ok(()) => {
                self.notify_success(format!("Task #{id} marked as completed"));
                self.refresh().await
            }
            Err(err) => {
                self.notify_error(format!("Failed to complete task #{id}: {err}"));
                Err(err)
            }
        }
    }

    pub async fn uncomplete_task(&mut self, id: i64) -> Result<()> {
        match self.gateway.uncomplete(id).await {
            Ok(()) => {
                self.notify_success(format!("Task #{id} moved back to incomplete"));
                self.refresh().await
            }
            Err(err) => {
                self.notify_error(format!("Failed to uncomplete task #{id}: {err}"));
                Err(err)
            }
        }
    }

    /// Replace a task's description. Blank input is rejected client-side,
    /// same as [`Self::add_task`].
    pub async fn update_description(&mut self, id: i64, description: &str) -> Result<()> {
        let description = description.trim();
        if description.is_empty() {
            let err = ClientError::Validation("task description must not be empty".into());
            self.notify_error(err.to_string());
            return Err(err);
        }

        let payload = UpdateDescriptionRequest {
            description: description.to_owned(),
        };
        match self.gateway.update_description(id, &payload).await {
            Ok(_) => {
                self.notify_success(format!("Task #{id} updated"));
                self.refresh().await
            }
            Err(err) => {
                self.notify_error(format!("Failed to update task #{id}: {err}"));
                Err(err)
            }
        }
    }

    /// Delete one task. Confirmation is the caller's concern; this assumes
    /// the user already agreed.
    pub async fn delete_task(&mut self, id: i64) -> Result<()> {
        match self.gateway.delete(id).await {
            Ok(()) => {
                self.notify_success(format!("Task #{id} deleted"));
                self.refresh().await
            }
            Err(err) => {
                self.notify_error(format!("Failed to delete task #{id}: {err}"));
                Err(err)
            }
        }
    }

    /// Bulk-delete every completed task. Refused locally when the cache
    /// holds none, without any network traffic.
    pub async fn delete_all_completed(&mut self) -> Result<()> {
        if self.completed_count() == 0 {
            let err = ClientError::NothingToDelete;
            self.notify_error(err.to_string());
            return Err(err);
        }

        match self.gateway.delete_completed().await {
            Ok(outcome) => {
                self.notify_success(format!("Deleted {} completed tasks", outcome.deleted));
                self.refresh().await
            }
            Err(err) => {
                self.notify_error(format!("Failed to delete completed tasks: {err}"));
                Err(err)
            }
        }
    }

    /// Fetch a single task; read-only, bypasses the cache.
    pub async fn task_details(&self, id: i64) -> Result<Task> {
        self.gateway.get_by_id(id).await
    }

    /// Fetch the tasks scheduled for one weekday; read-only, bypasses the cache.
    pub async fn tasks_for_day(&self, day: DayOfWeek) -> Result<Vec<Task>> {
        self.gateway.list_by_day(day).await
    }

    pub async fn statistics(&self) -> Result<TaskStatistics> {
        self.gateway.get_statistics().await
    }

    fn notify_success(&self, message: impl Into<String>) {
        let _ = self.notify_tx.send(Notification::success(message));
    }

    fn notify_error(&self, message: impl Into<String>) {
        let _ = self.notify_tx.send(Notification::error(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: i64, completed: bool) -> Task {
        let created_at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Task {
            id,
            description: format!("task {id}"),
            day_of_week: None,
            completed,
            created_at,
            completed_at: completed.then_some(created_at),
            updated_at: None,
        }
    }

    #[test]
    fn test_all_filter_is_an_order_preserving_identity() {
        let tasks = vec![task(1, false), task(2, true), task(3, false)];
        let visible = filter_tasks(&tasks, Filter::All);
        let ids: Vec<i64> = visible.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_completed_and_incomplete_filters_are_complementary() {
        let tasks = vec![task(1, false), task(2, true), task(3, false)];

        let completed: Vec<i64> = filter_tasks(&tasks, Filter::Completed)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(completed, vec![2]);

        let incomplete: Vec<i64> = filter_tasks(&tasks, Filter::Incomplete)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(incomplete, vec![1, 3]);

        assert_eq!(completed.len() + incomplete.len(), tasks.len());
    }

    #[test]
    fn test_empty_list_yields_empty_visible_set() {
        assert!(filter_tasks(&[], Filter::All).is_empty());
        assert!(filter_tasks(&[], Filter::Completed).is_empty());
    }

    #[test]
    fn test_filter_defaults_to_all() {
        assert_eq!(Filter::default(), Filter::All);
    }

    #[test]
    fn test_filter_labels() {
        assert_eq!(Filter::All.label(), "all");
        assert_eq!(Filter::Completed.label(), "completed");
        assert_eq!(Filter::Incomplete.label(), "incomplete");
    }
}
