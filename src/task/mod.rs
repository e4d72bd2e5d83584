pub mod task_dto;
pub mod task_models;
pub mod task_view_model;

pub use task_dto::{CreateTaskRequest, DeleteCompletedResponse, UpdateDescriptionRequest};
pub use task_models::{DayOfWeek, Task, TaskStatistics};
pub use task_view_model::{filter_tasks, Filter, TaskListViewModel};
