pub mod browser;
pub mod clock;
pub mod repo;
pub mod seed;
