//! Cached authentication artifacts for the third-party login methods.
//!
//! LinuxDo logins keep a per-username cookie jar as a JSON file; GitHub
//! logins keep a per-username profile directory holding session state.
//! Both expose the standalone purge capability the orchestrator invokes
//! after repeated failures.

mod cookie_cache;
mod profile_dir;

pub use cookie_cache::{CookieCache, LinuxDoCachePurge};
pub use profile_dir::{GithubCachePurge, ProfileDir};

/// Make a username safe to use as a file or directory name.
pub(crate) fn sanitize(username: &str) -> String {
    username
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
