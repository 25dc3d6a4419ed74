//! Per-channel cooldown gate
//!
//! Admits at most one candidate per channel within any cooldown window
//! measured from the previous admission for that channel.

use super::types::AlertCandidate;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Default cooldown window
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5 * 60);

/// Outcome of presenting a candidate to the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The candidate may be notified
    Admitted,
    /// The channel fired recently; `remaining` until the window closes
    Suppressed { remaining: Duration },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Cooldown gate keyed by channel name
///
/// A candidate is admitted when its channel has never fired, or when
/// strictly more than the cooldown has elapsed since the last admission.
/// Elapsed time exactly equal to the cooldown is still suppressed.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    cooldown: Duration,
    last_fired: HashMap<String, Instant>,
}

impl CooldownGate {
    /// Create a gate with the given cooldown window
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fired: HashMap::new(),
        }
    }

    /// Cooldown window applied to every channel
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Decide on `candidate` at `now`, recording the admission if granted
    pub fn admit(&mut self, candidate: &AlertCandidate<'_>, now: Instant) -> Admission {
        self.admit_channel(candidate.channel(), now)
    }

    /// Same as [`admit`](Self::admit) for a bare channel name
    pub fn admit_channel(&mut self, channel: &str, now: Instant) -> Admission {
        if let Some(&last) = self.last_fired.get(channel) {
            let elapsed = now.saturating_duration_since(last);
            if elapsed <= self.cooldown {
                return Admission::Suppressed {
                    remaining: self.cooldown - elapsed,
                };
            }
        }

        self.last_fired.insert(channel.to_string(), now);
        Admission::Admitted
    }

    /// Instant of the last admission for `channel`
    pub fn last_fired(&self, channel: &str) -> Option<Instant> {
        self.last_fired.get(channel).copied()
    }

    /// Forget all admissions
    pub fn reset(&mut self) {
        self.last_fired.clear();
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::types::{AlertSeverity, Comparator, ThresholdRule};
    use chrono::Utc;

    fn gas_rule() -> ThresholdRule {
        ThresholdRule::new(
            "gas",
            "field1",
            Comparator::GreaterThan,
            20.0,
            AlertSeverity::Critical,
        )
    }

    fn candidate(rule: &ThresholdRule, value: f64) -> AlertCandidate<'_> {
        AlertCandidate {
            rule,
            value,
            sampled_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_admission() {
        let rule = gas_rule();
        let mut gate = CooldownGate::default();
        let now = Instant::now();

        assert_eq!(gate.admit(&candidate(&rule, 25.0), now), Admission::Admitted);
        assert_eq!(gate.last_fired("gas"), Some(now));
    }

    #[test]
    fn test_immediate_repeat_suppressed() {
        let rule = gas_rule();
        let mut gate = CooldownGate::default();
        let now = Instant::now();

        assert!(gate.admit(&candidate(&rule, 25.0), now).is_admitted());
        assert!(!gate.admit(&candidate(&rule, 25.0), now).is_admitted());
        assert_eq!(gate.last_fired("gas"), Some(now));
    }

    #[test]
    fn test_expiry_around_boundary() {
        let rule = gas_rule();
        let cooldown = Duration::from_secs(300);
        let epsilon = Duration::from_millis(1);
        let t0 = Instant::now();

        let mut gate = CooldownGate::new(cooldown);
        gate.admit(&candidate(&rule, 25.0), t0);
        assert!(!gate
            .admit(&candidate(&rule, 25.0), t0 + cooldown - epsilon)
            .is_admitted());

        let mut gate = CooldownGate::new(cooldown);
        gate.admit(&candidate(&rule, 25.0), t0);
        assert!(gate
            .admit(&candidate(&rule, 25.0), t0 + cooldown + epsilon)
            .is_admitted());
    }

    #[test]
    fn test_exact_boundary_suppressed() {
        let mut gate = CooldownGate::new(Duration::from_secs(300));
        let t0 = Instant::now();

        gate.admit_channel("gas", t0);
        assert_eq!(
            gate.admit_channel("gas", t0 + Duration::from_secs(300)),
            Admission::Suppressed {
                remaining: Duration::ZERO
            }
        );
    }

    #[test]
    fn test_suppression_does_not_extend_window() {
        let mut gate = CooldownGate::new(Duration::from_secs(300));
        let t0 = Instant::now();

        gate.admit_channel("gas", t0);
        gate.admit_channel("gas", t0 + Duration::from_secs(200));
        assert_eq!(gate.last_fired("gas"), Some(t0));
        assert!(gate
            .admit_channel("gas", t0 + Duration::from_secs(301))
            .is_admitted());
    }

    #[test]
    fn test_channels_are_independent() {
        let mut gate = CooldownGate::new(Duration::from_secs(300));
        let t0 = Instant::now();

        assert!(gate.admit_channel("gas", t0).is_admitted());
        assert!(gate.admit_channel("vibration", t0).is_admitted());
        assert!(!gate.admit_channel("gas", t0).is_admitted());
    }

    #[test]
    fn test_gas_scenario() {
        let rule = gas_rule();
        let mut gate = CooldownGate::new(Duration::from_secs(300));
        let t0 = Instant::now();

        assert!(gate.admit(&candidate(&rule, 25.0), t0).is_admitted());
        assert_eq!(
            gate.admit(&candidate(&rule, 30.0), t0 + Duration::from_secs(60)),
            Admission::Suppressed {
                remaining: Duration::from_secs(240)
            }
        );
        assert!(gate
            .admit(&candidate(&rule, 22.0), t0 + Duration::from_secs(301))
            .is_admitted());
    }

    #[test]
    fn test_reset() {
        let mut gate = CooldownGate::default();
        let t0 = Instant::now();
        gate.admit_channel("gas", t0);
        gate.reset();
        assert!(gate.last_fired("gas").is_none());
        assert!(gate.admit_channel("gas", t0).is_admitted());
    }
}
