//! # coursehub-entity
//!
//! Domain entity models for CourseHub. Every struct in this crate
//! represents a database table row or a row joined for a read view.
//! Database entities derive `sqlx::FromRow` and serialize with camelCase
//! keys for the web client.

pub mod achievement;
pub mod activity;
pub mod course;
pub mod enrollment;
pub mod lesson;
pub mod notification;
pub mod progress;
pub mod user;
