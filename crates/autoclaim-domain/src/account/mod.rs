pub mod aggregate;
pub mod value_objects;

pub use aggregate::{Account, AccountUpdate};
pub use value_objects::{AuthMethod, CheckinMode, Platform};
