use autoclaim_domain::checkin::CheckinOutcome;

/// Check-in result for a single account, as collected by the batch runner.
#[derive(Debug, Clone)]
pub struct AccountCheckinResult {
    pub account_id: String,
    pub username: Option<String>,
    pub notify_email: Option<String>,
    pub outcome: CheckinOutcome,
}

impl AccountCheckinResult {
    pub fn success(&self) -> bool {
        self.outcome.success
    }
}
