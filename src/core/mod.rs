pub mod config;
mod responses;
mod telementry;
pub mod validation;

pub use self::config::AppConfig;
pub use responses::*;
pub use telementry::*;
pub use validation::*;
