use std::sync::Arc;

use autoclaim_domain::account::{Account, AuthMethod, CheckinMode, Platform};
use autoclaim_domain::checkin::{
    LoginPayload, MockAuthAdapter, MockCachePurge, ProviderUserInfo,
};
use autoclaim_domain::registry::MockAccountRegistry;
use autoclaim_domain::shared::DomainError;

use super::{AdapterSet, CheckinOrchestrator, PurgeSet};

fn never_adapter() -> Arc<MockAuthAdapter> {
    let mut adapter = MockAuthAdapter::new();
    adapter.expect_login().never();
    Arc::new(adapter)
}

fn never_purge() -> Arc<MockCachePurge> {
    let mut purge = MockCachePurge::new();
    purge.expect_purge().never();
    Arc::new(purge)
}

fn payload(
    session: Option<&str>,
    api_user: Option<&str>,
    quota: f64,
    used_quota: Option<f64>,
) -> LoginPayload {
    LoginPayload {
        session: session.map(str::to_string),
        api_user: api_user.map(str::to_string),
        user_info: Some(ProviderUserInfo {
            quota,
            used_quota,
            aff_code: None,
            tokens: None,
        }),
    }
}

struct Mocks {
    session: Arc<MockAuthAdapter>,
    password: Arc<MockAuthAdapter>,
    linuxdo: Arc<MockAuthAdapter>,
    github: Arc<MockAuthAdapter>,
    linuxdo_purge: Arc<MockCachePurge>,
    github_purge: Arc<MockCachePurge>,
    registry: Option<Arc<MockAccountRegistry>>,
}

impl Default for Mocks {
    fn default() -> Self {
        Self {
            session: never_adapter(),
            password: never_adapter(),
            linuxdo: never_adapter(),
            github: never_adapter(),
            linuxdo_purge: never_purge(),
            github_purge: never_purge(),
            registry: None,
        }
    }
}

impl Mocks {
    fn orchestrator(self) -> CheckinOrchestrator {
        CheckinOrchestrator::new(
            AdapterSet {
                session: self.session,
                password: self.password,
                linuxdo: self.linuxdo,
                github: self.github,
            },
            PurgeSet {
                linuxdo: self.linuxdo_purge,
                github: self.github_purge,
            },
            self.registry
                .map(|r| r as Arc<dyn autoclaim_domain::registry::AccountRegistry>),
        )
    }
}

#[tokio::test]
async fn test_session_attempted_first_regardless_of_method() {
    let mut session = MockAuthAdapter::new();
    session
        .expect_login()
        .times(1)
        .withf(|_, platform| *platform == Platform::AnyRouter)
        .returning(|_, _| Ok(payload(None, None, 1_000_000.0, None)));

    let orchestrator = Mocks {
        session: Arc::new(session),
        ..Default::default()
    }
    .orchestrator();

    // Configured for LinuxDo, but the stored session must win.
    let mut account = Account::builder("a1")
        .username("a")
        .password("p")
        .session("s1")
        .external_account_id("u1")
        .auth_method(AuthMethod::LinuxDo)
        .build();

    let outcome = orchestrator.execute_check_in(&mut account).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.method, "session");
}

#[tokio::test]
async fn test_missing_credentials_makes_no_adapter_calls() {
    let orchestrator = Mocks::default().orchestrator();

    let mut account = Account::builder("a1").username("a").build();

    let outcome = orchestrator.execute_check_in(&mut account).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.method, "password");
    assert!(outcome.error.unwrap().contains("Missing credentials"));
}

#[tokio::test]
async fn test_session_rejection_falls_through_to_password() {
    let mut session = MockAuthAdapter::new();
    session
        .expect_login()
        .times(1)
        .returning(|_, _| Err(DomainError::ProviderLogin("session expired".to_string())));

    let mut password = MockAuthAdapter::new();
    password
        .expect_login()
        .times(1)
        .returning(|_, _| Ok(payload(Some("s2"), Some("u1"), 1_000_000.0, None)));

    let orchestrator = Mocks {
        session: Arc::new(session),
        password: Arc::new(password),
        ..Default::default()
    }
    .orchestrator();

    let mut account = Account::builder("a1")
        .username("a")
        .password("p")
        .session("s1")
        .external_account_id("u1")
        .build();

    let outcome = orchestrator.execute_check_in(&mut account).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.method, "password");
    assert_eq!(account.session(), Some("s2"));
}

#[tokio::test]
async fn test_password_scenario_persists_derived_fields() {
    let mut password = MockAuthAdapter::new();
    password.expect_login().times(1).returning(|_, _| {
        Ok(payload(
            Some("s1"),
            Some("u1"),
            2_500_000.0,
            Some(500_000.0),
        ))
    });

    let mut registry = MockAccountRegistry::new();
    registry
        .expect_update_account_info()
        .times(1)
        .withf(|id, update| {
            id.as_str() == "a1"
                && update.balance == Some(5)
                && update.used == Some(1)
                && update.session.as_deref() == Some("s1")
                && update.account_id.as_deref() == Some("u1")
                && update.checkin_date.is_some()
        })
        .returning(|_, _| Ok(()));

    let orchestrator = Mocks {
        password: Arc::new(password),
        registry: Some(Arc::new(registry)),
        ..Default::default()
    }
    .orchestrator();

    let mut account = Account::builder("a1").username("a").password("p").build();

    let outcome = orchestrator.execute_check_in(&mut account).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.method, "password");
    assert_eq!(
        outcome.summary.as_deref(),
        Some("💰 当前余额: $5.00, 已使用: $1.00")
    );
}

#[tokio::test]
async fn test_both_mode_primary_failure_skips_secondary() {
    let mut linuxdo = MockAuthAdapter::new();
    linuxdo
        .expect_login()
        .times(1)
        .withf(|_, platform| *platform == Platform::AnyRouter)
        .returning(|_, _| Err(DomainError::ProviderLogin("login failed".to_string())));

    let orchestrator = Mocks {
        linuxdo: Arc::new(linuxdo),
        ..Default::default()
    }
    .orchestrator();

    let mut account = Account::builder("a1")
        .username("a")
        .password("p")
        .auth_method(AuthMethod::LinuxDo)
        .checkin_mode(CheckinMode::Both)
        .build();

    let outcome = orchestrator.execute_check_in(&mut account).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.method, "linuxdo");
    assert_eq!(outcome.platform_results.len(), 1);
    assert_eq!(outcome.platform_results[0].platform, Platform::AnyRouter);
    assert!(!outcome.platform_results[0].success);

    assert_eq!(account.checkin_error_count(), 1);
    assert!(account.checkin_date().is_none());
}

#[tokio::test]
async fn test_both_mode_full_success() {
    let mut linuxdo = MockAuthAdapter::new();
    linuxdo
        .expect_login()
        .times(2)
        .returning(|_, platform| match platform {
            Platform::AnyRouter => Ok(payload(
                Some("s1"),
                Some("u1"),
                2_500_000.0,
                Some(500_000.0),
            )),
            Platform::AgentRouter => Ok(payload(None, None, 1_000_000.0, None)),
        });

    let mut registry = MockAccountRegistry::new();
    registry
        .expect_update_account_info()
        .times(1)
        .withf(|_, update| {
            update.balance == Some(5)
                && update.agent_balance == Some(2)
                && update.checkin_error_count == Some(0)
                && update.checkin_date.is_some()
        })
        .returning(|_, _| Ok(()));

    let orchestrator = Mocks {
        linuxdo: Arc::new(linuxdo),
        registry: Some(Arc::new(registry)),
        ..Default::default()
    }
    .orchestrator();

    let mut account = Account::builder("a1")
        .username("a")
        .password("p")
        .auth_method(AuthMethod::LinuxDo)
        .checkin_error_count(2)
        .build();

    let outcome = orchestrator.execute_check_in(&mut account).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.platform_results.len(), 2);
    assert_eq!(
        outcome.summary.as_deref(),
        Some("AnyRouter: 💰 当前余额: $5.00, 已使用: $1.00\nAgentRouter: 💰 当前余额: $2.00, 已使用: $0.00")
    );
    assert_eq!(account.checkin_error_count(), 0);
}

#[tokio::test]
async fn test_secondary_only_mode_updates_agent_balance_only() {
    let mut github = MockAuthAdapter::new();
    github
        .expect_login()
        .times(1)
        .withf(|_, platform| *platform == Platform::AgentRouter)
        .returning(|_, _| Ok(payload(None, None, 1_000_000.0, None)));

    let mut registry = MockAccountRegistry::new();
    registry
        .expect_update_account_info()
        .times(1)
        .withf(|_, update| {
            update.agent_balance == Some(2) && update.balance.is_none() && update.session.is_none()
        })
        .returning(|_, _| Ok(()));

    let orchestrator = Mocks {
        github: Arc::new(github),
        registry: Some(Arc::new(registry)),
        ..Default::default()
    }
    .orchestrator();

    let mut account = Account::builder("a1")
        .username("a")
        .password("p")
        .auth_method(AuthMethod::Github)
        .checkin_mode(CheckinMode::AgentRouterOnly)
        .build();

    let outcome = orchestrator.execute_check_in(&mut account).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.platform_results.len(), 1);
}

#[tokio::test]
async fn test_purge_fires_above_threshold_and_resets_counter() {
    let mut linuxdo = MockAuthAdapter::new();
    linuxdo
        .expect_login()
        .times(1)
        .returning(|_, _| Err(DomainError::ProviderLogin("still broken".to_string())));

    let mut purge = MockCachePurge::new();
    purge
        .expect_purge()
        .times(1)
        .withf(|username| username == "a")
        .returning(|_| ());

    let orchestrator = Mocks {
        linuxdo: Arc::new(linuxdo),
        linuxdo_purge: Arc::new(purge),
        ..Default::default()
    }
    .orchestrator();

    let mut account = Account::builder("a1")
        .username("a")
        .password("p")
        .auth_method(AuthMethod::LinuxDo)
        .checkin_mode(CheckinMode::AnyRouterOnly)
        .checkin_error_count(3)
        .build();

    let outcome = orchestrator.execute_check_in(&mut account).await.unwrap();
    assert!(!outcome.success);
    // Counter was reset by the purge, then incremented by this run's failure.
    assert_eq!(account.checkin_error_count(), 1);
}

#[tokio::test]
async fn test_no_purge_at_or_below_threshold() {
    let mut linuxdo = MockAuthAdapter::new();
    linuxdo
        .expect_login()
        .times(1)
        .returning(|_, _| Err(DomainError::ProviderLogin("nope".to_string())));

    // Default never_purge() asserts purge is not invoked.
    let orchestrator = Mocks {
        linuxdo: Arc::new(linuxdo),
        ..Default::default()
    }
    .orchestrator();

    let mut account = Account::builder("a1")
        .username("a")
        .password("p")
        .auth_method(AuthMethod::LinuxDo)
        .checkin_mode(CheckinMode::AnyRouterOnly)
        .checkin_error_count(2)
        .build();

    let outcome = orchestrator.execute_check_in(&mut account).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(account.checkin_error_count(), 3);
}

#[tokio::test]
async fn test_registry_failure_does_not_flip_outcome() {
    let mut password = MockAuthAdapter::new();
    password
        .expect_login()
        .times(1)
        .returning(|_, _| Ok(payload(Some("s1"), Some("u1"), 1_000_000.0, None)));

    let mut registry = MockAccountRegistry::new();
    registry
        .expect_update_account_info()
        .times(1)
        .returning(|_, _| Err(DomainError::Registry("backend down".to_string())));

    let orchestrator = Mocks {
        password: Arc::new(password),
        registry: Some(Arc::new(registry)),
        ..Default::default()
    }
    .orchestrator();

    let mut account = Account::builder("a1").username("a").password("p").build();

    let outcome = orchestrator.execute_check_in(&mut account).await.unwrap();
    assert!(outcome.success);
}

#[tokio::test]
async fn test_unknown_auth_method_is_a_failure_result() {
    let orchestrator = Mocks::default().orchestrator();

    let mut account = Account::builder("a1")
        .username("a")
        .password("p")
        .auth_method(AuthMethod::Unknown(9))
        .build();

    let outcome = orchestrator.execute_check_in(&mut account).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.method, "unknown");
    assert!(outcome.error.unwrap().contains("Unknown auth method"));
}

#[tokio::test]
async fn test_password_failure_does_not_touch_error_counter() {
    let mut password = MockAuthAdapter::new();
    password
        .expect_login()
        .times(1)
        .returning(|_, _| Err(DomainError::ProviderLogin("wrong password".to_string())));

    let orchestrator = Mocks {
        password: Arc::new(password),
        ..Default::default()
    }
    .orchestrator();

    let mut account = Account::builder("a1")
        .username("a")
        .password("p")
        .checkin_error_count(2)
        .build();

    let outcome = orchestrator.execute_check_in(&mut account).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(account.checkin_error_count(), 2);
}

#[tokio::test]
async fn test_rotated_tokens_are_stripped_and_persisted_as_session() {
    let mut session = MockAuthAdapter::new();
    session.expect_login().times(1).returning(|_, _| {
        Ok(LoginPayload {
            session: None,
            api_user: None,
            user_info: Some(ProviderUserInfo {
                quota: 1_000_000.0,
                used_quota: None,
                aff_code: None,
                tokens: Some(serde_json::json!({"session": "rotated"})),
            }),
        })
    });

    let mut registry = MockAccountRegistry::new();
    registry
        .expect_update_account_info()
        .times(1)
        .withf(|_, update| update.session.as_deref() == Some("rotated"))
        .returning(|_, _| Ok(()));

    let orchestrator = Mocks {
        session: Arc::new(session),
        registry: Some(Arc::new(registry)),
        ..Default::default()
    }
    .orchestrator();

    let mut account = Account::builder("a1")
        .session("s1")
        .external_account_id("u1")
        .build();

    let outcome = orchestrator.execute_check_in(&mut account).await.unwrap();
    assert!(outcome.success);
    assert_eq!(account.session(), Some("rotated"));
}
