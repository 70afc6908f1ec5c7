//! Catalog domain core.
//!
//! Pure domain types, request validation and the course-part lifecycle
//! engine. Storage is reached only through the traits in [`store`]; the
//! PostgreSQL implementation lives in `catalog-db` and an in-process one in
//! [`memory`].

pub mod context;
pub mod course;
pub mod course_part;
pub mod error;
pub mod memory;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;
pub mod video;
