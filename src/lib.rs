pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod mutation;
pub mod ui;

pub use api::{ApiClient, ApiError, NewTask, Task, TaskId, TaskPatch};
pub use app::{AppEvent, Focus, LoadState, TaskApp};
pub use cache::QueryCache;
pub use config::AppConfig;
pub use mutation::MutationState;
