//! Row structs.
//!
//! Each submodule holds a `FromRow` struct matching a table and its
//! conversion into the domain type from `catalog-core`.

pub mod course_part;
