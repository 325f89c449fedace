pub mod task;
pub mod user;

pub use task::{Task, TaskPayload, TaskSearchQuery, TaskStatus};
pub use user::{User, UserPayload, UserView};
