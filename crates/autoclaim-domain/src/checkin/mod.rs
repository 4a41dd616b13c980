pub mod adapter;
pub mod outcome;

pub use adapter::{AuthAdapter, CachePurge, LoginPayload, ProviderUserInfo};
#[cfg(any(test, feature = "mocks"))]
pub use adapter::{MockAuthAdapter, MockCachePurge};
pub use outcome::{CheckinOutcome, PlatformOutcome};

#[cfg(test)]
mod outcome_test;
