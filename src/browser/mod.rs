pub mod headless;
pub mod locator;
pub mod session;

pub use locator::Locator;
pub use session::Session;
