//! Achievement templates and grants.

pub mod model;

pub use model::{Achievement, COURSE_COMPLETER, EarnedAchievement, UserAchievement};
