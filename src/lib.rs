//! Typed client for the task-tracking REST backend.
//!
//! Two pieces do the work: [`TaskGateway`] issues the `/tasks` collection
//! operations over HTTP and translates non-success responses into typed
//! failures, and [`TaskListViewModel`] owns the in-memory task list plus the
//! active filter, derives the visible subset, and pushes success/error
//! notifications to observers after every action.

pub mod config;
pub mod error;
pub mod gateway;
pub mod notification;
pub mod task;

pub use config::Config;
pub use error::{ClientError, Result};
pub use gateway::TaskGateway;
pub use notification::{Notification, NotificationLevel};
pub use task::{DayOfWeek, Filter, Task, TaskListViewModel, TaskStatistics};
