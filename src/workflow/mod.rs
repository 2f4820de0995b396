pub mod claim;
pub mod login;
pub mod renewal;

pub use claim::{ClaimFlow, ClaimOutcome};
pub use login::LoginFlow;
pub use renewal::{RenewalFlow, RenewalOutcome};
