//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services are stateless and share the database handle.

mod account;
mod task;

pub use account::AccountService;
pub use task::{TaskService, TaskUpdate};
