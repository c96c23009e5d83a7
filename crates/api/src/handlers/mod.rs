pub mod feedback;
pub mod generation;
pub mod learning;
pub mod profile;
