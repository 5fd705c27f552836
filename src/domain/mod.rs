pub mod merge;
pub mod model;
