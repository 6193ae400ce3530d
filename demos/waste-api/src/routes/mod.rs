pub mod dashboard;
pub mod notifications;
pub mod reports;
pub mod users;
