use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Authentication strategy configured on an account.
///
/// Wire format is an integer code (`account_type`). Unknown codes are kept
/// as a distinct variant at parse time instead of failing deserialization;
/// the orchestrator turns them into a failure result when dispatching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Password,
    LinuxDo,
    Github,
    Unknown(i64),
}

impl AuthMethod {
    pub fn code(&self) -> i64 {
        match self {
            AuthMethod::Password => 0,
            AuthMethod::LinuxDo => 1,
            AuthMethod::Github => 2,
            AuthMethod::Unknown(code) => *code,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            0 => AuthMethod::Password,
            1 => AuthMethod::LinuxDo,
            2 => AuthMethod::Github,
            other => AuthMethod::Unknown(other),
        }
    }

    /// Result-facing method label (e.g. "password", "linuxdo").
    pub fn label(&self) -> &'static str {
        match self {
            AuthMethod::Password => "password",
            AuthMethod::LinuxDo => "linuxdo",
            AuthMethod::Github => "github",
            AuthMethod::Unknown(_) => "unknown",
        }
    }

    /// Third-party identity-provider methods may target both platforms
    /// and participate in the consecutive-error / cache-purge policy.
    pub fn is_third_party(&self) -> bool {
        matches!(self, AuthMethod::LinuxDo | AuthMethod::Github)
    }
}

impl Default for AuthMethod {
    fn default() -> Self {
        AuthMethod::Password
    }
}

impl Serialize for AuthMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for AuthMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        Ok(AuthMethod::from_code(code))
    }
}

/// Target platform for a check-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    AnyRouter,
    AgentRouter,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Platform::AnyRouter => "AnyRouter",
            Platform::AgentRouter => "AgentRouter",
        }
    }

    /// AnyRouter is the primary platform: it owns session/account-id/balance
    /// updates and gates the secondary attempt in Both mode.
    pub fn is_primary(&self) -> bool {
        matches!(self, Platform::AnyRouter)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which subset of the two platforms a third-party method targets.
///
/// Wire format is an integer (`checkin_mode`); anything other than 1 or 2
/// falls back to Both, the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckinMode {
    AnyRouterOnly,
    AgentRouterOnly,
    Both,
}

impl CheckinMode {
    pub fn code(&self) -> i64 {
        match self {
            CheckinMode::AnyRouterOnly => 1,
            CheckinMode::AgentRouterOnly => 2,
            CheckinMode::Both => 3,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            1 => CheckinMode::AnyRouterOnly,
            2 => CheckinMode::AgentRouterOnly,
            _ => CheckinMode::Both,
        }
    }

    /// Target platforms in attempt order. Both mode is AnyRouter first,
    /// AgentRouter second; the order is load-bearing for early termination.
    pub fn platforms(&self) -> &'static [Platform] {
        match self {
            CheckinMode::AnyRouterOnly => &[Platform::AnyRouter],
            CheckinMode::AgentRouterOnly => &[Platform::AgentRouter],
            CheckinMode::Both => &[Platform::AnyRouter, Platform::AgentRouter],
        }
    }
}

impl Default for CheckinMode {
    fn default() -> Self {
        CheckinMode::Both
    }
}

impl Serialize for CheckinMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for CheckinMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        Ok(CheckinMode::from_code(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_method_codes() {
        assert_eq!(AuthMethod::from_code(0), AuthMethod::Password);
        assert_eq!(AuthMethod::from_code(1), AuthMethod::LinuxDo);
        assert_eq!(AuthMethod::from_code(2), AuthMethod::Github);
        assert_eq!(AuthMethod::from_code(9), AuthMethod::Unknown(9));
        assert_eq!(AuthMethod::Unknown(9).code(), 9);
    }

    #[test]
    fn test_auth_method_default_is_password() {
        assert_eq!(AuthMethod::default(), AuthMethod::Password);
    }

    #[test]
    fn test_unknown_code_survives_serde() {
        let method: AuthMethod = serde_json::from_str("7").unwrap();
        assert_eq!(method, AuthMethod::Unknown(7));
        assert_eq!(serde_json::to_string(&method).unwrap(), "7");
    }

    #[test]
    fn test_checkin_mode_platform_order() {
        assert_eq!(CheckinMode::AnyRouterOnly.platforms(), &[Platform::AnyRouter]);
        assert_eq!(
            CheckinMode::AgentRouterOnly.platforms(),
            &[Platform::AgentRouter]
        );
        assert_eq!(
            CheckinMode::Both.platforms(),
            &[Platform::AnyRouter, Platform::AgentRouter]
        );
    }

    #[test]
    fn test_checkin_mode_unknown_falls_back_to_both() {
        assert_eq!(CheckinMode::from_code(0), CheckinMode::Both);
        assert_eq!(CheckinMode::from_code(42), CheckinMode::Both);
    }

    #[test]
    fn test_only_third_party_methods_are_multi_platform() {
        assert!(AuthMethod::LinuxDo.is_third_party());
        assert!(AuthMethod::Github.is_third_party());
        assert!(!AuthMethod::Password.is_third_party());
        assert!(!AuthMethod::Unknown(5).is_third_party());
    }
}
