//! Query modules for the waste-reporting database.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) and returns typed models.

pub mod notifications;
pub mod reports;
pub mod rewards;
pub mod tasks;
pub mod users;

pub use notifications::NotificationQuery;
pub use reports::ReportQuery;
pub use rewards::RewardQuery;
pub use tasks::TaskQuery;
pub use users::UserQuery;
