pub mod course_part;
