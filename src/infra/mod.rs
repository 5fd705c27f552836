pub mod bootstrap;
pub mod chromium;
pub mod config;
pub mod logging;
pub mod probe;
pub mod sqlite_repo;
pub mod system_clock;
