//! Categories and their task lists.

mod model;
mod store;

pub use model::{default_categories, Category, Task, TaskId, DEFAULT_COLOR};
pub use store::{Confirm, Removal, TodoStore, DELETE_CATEGORY_PROMPT, DELETE_TASK_PROMPT};
