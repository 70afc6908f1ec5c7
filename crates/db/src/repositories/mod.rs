//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept any `PgExecutor` as the first argument.

pub mod course_part_repo;
pub mod course_repo;

pub use course_part_repo::CoursePartRepo;
pub use course_repo::CourseRepo;
