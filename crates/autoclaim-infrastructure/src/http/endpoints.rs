use autoclaim_domain::account::Platform;

/// Endpoint table for a target platform. Both platforms run the same API
/// surface; only the domain differs.
#[derive(Debug, Clone, Copy)]
pub struct PlatformEndpoints {
    domain: &'static str,
    api_user_key: &'static str,
}

const ANYROUTER: PlatformEndpoints = PlatformEndpoints {
    domain: "https://anyrouter.top",
    api_user_key: "new-api-user",
};

const AGENTROUTER: PlatformEndpoints = PlatformEndpoints {
    domain: "https://agentrouter.org",
    api_user_key: "new-api-user",
};

impl PlatformEndpoints {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::AnyRouter => ANYROUTER,
            Platform::AgentRouter => AGENTROUTER,
        }
    }

    pub fn domain(&self) -> &'static str {
        self.domain
    }

    /// Header key carrying the external api-user id.
    pub fn api_user_key(&self) -> &'static str {
        self.api_user_key
    }

    pub fn login_url(&self) -> String {
        format!("{}/api/user/login", self.domain)
    }

    pub fn sign_in_url(&self) -> String {
        format!("{}/api/user/sign_in", self.domain)
    }

    pub fn user_info_url(&self) -> String {
        format!("{}/api/user/self", self.domain)
    }

    /// OAuth completion endpoint for a third-party identity provider.
    pub fn oauth_url(&self, provider: &str) -> String {
        format!("{}/api/oauth/{}", self.domain, provider)
    }
}
