//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

use crate::config::ProvisioningConfig;

/// Calculate exponential backoff delay with jitter.
///
/// `attempt` is 1-based; attempt 0 yields no delay.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let capped_delay = base_ms.saturating_mul(exponential_base).min(max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

/// Delay before the attempt following `attempt`, per the provisioning policy.
pub fn provisioning_delay(attempt: u32, policy: &ProvisioningConfig) -> Duration {
    calculate_backoff(attempt, policy.base_delay_ms, policy.max_delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        assert_eq!(calculate_backoff(0, 100, 2000), Duration::ZERO);

        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100 && b1.as_millis() < 110);

        let b3 = calculate_backoff(3, 100, 2000);
        assert!(b3.as_millis() >= 400 && b3.as_millis() < 440);

        let capped = calculate_backoff(30, 100, 1000);
        assert!(capped.as_millis() >= 1000 && capped.as_millis() < 1100);
    }

    #[test]
    fn test_provisioning_delay_uses_policy() {
        let policy = ProvisioningConfig {
            max_attempts: 3,
            base_delay_ms: 50,
            max_delay_ms: 50,
        };
        let delay = provisioning_delay(4, &policy);
        assert!(delay.as_millis() >= 50 && delay.as_millis() < 55);
    }
}
