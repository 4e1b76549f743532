//! # coursehub-auth
//!
//! HS256 bearer tokens for CourseHub. Token issuance belongs to the
//! identity service; this crate verifies tokens on every request and
//! can mint them for tests and local tooling.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
