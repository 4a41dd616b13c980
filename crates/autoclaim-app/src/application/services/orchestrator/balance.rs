use autoclaim_domain::checkin::ProviderUserInfo;

/// Quota units per dollar, fixed across both platforms.
pub const QUOTA_PER_DOLLAR: f64 = 500_000.0;

/// Rescale a raw quota value to whole dollars.
pub fn derive_balance(quota: f64) -> i64 {
    (quota / QUOTA_PER_DOLLAR).round() as i64
}

/// Human-readable balance line for a successful check-in.
pub fn balance_line(info: &ProviderUserInfo) -> String {
    let balance = derive_balance(info.quota);
    let used = derive_balance(info.used_quota.unwrap_or(0.0));
    format!(
        "💰 当前余额: ${:.2}, 已使用: ${:.2}",
        balance as f64, used as f64
    )
}
