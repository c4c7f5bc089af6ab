//! Siftly Core Library
//!
//! Wire types and configuration shared by the Siftly client, including:
//! - Asynchronous task records and their status lifecycle
//! - Index, document, key and settings payloads
//! - Structured service errors
//! - Client configuration and task wait defaults

pub mod config;
pub mod models;
pub mod task;

// Re-export commonly used types
pub use config::{ClientConfig, WaitConfig};
pub use models::*;
pub use task::{AsTaskUid, Task, TaskInfo, TaskStatus, TaskType, TasksQuery, TasksResults};
