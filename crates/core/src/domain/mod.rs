pub mod course;
pub mod recommendation;
