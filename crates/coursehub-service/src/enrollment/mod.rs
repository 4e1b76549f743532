//! Enrollment lifecycle: enroll, list, inspect, drop, statistics.

pub mod service;
pub mod views;

pub use service::EnrollmentService;
pub use views::{CourseOutline, EnrollmentDetail, EnrollmentStats, ModuleOutline, MyCourse};
