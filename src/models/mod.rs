pub mod impact;
pub mod notification;
pub mod report;
pub mod reward;
pub mod task;
pub mod user;
pub mod verification;

pub use impact::*;
pub use notification::*;
pub use report::*;
pub use reward::*;
pub use task::*;
pub use user::*;
pub use verification::*;
