pub mod credits;
pub mod logging;

pub use credits::parse_credits;
