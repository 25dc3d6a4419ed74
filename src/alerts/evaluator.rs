//! Threshold evaluation
//!
//! Pure mapping from a sample and a rule set to alert candidates.

use super::types::{AlertCandidate, ThresholdRule};
use crate::domain::Sample;

/// Evaluate `rules` against `sample`
///
/// Yields one candidate per enabled rule whose field holds a numeric value
/// crossing the rule's threshold, in rule order. Fields that are missing,
/// null or not numeric are skipped without error.
pub fn evaluate<'a>(sample: &Sample, rules: &'a [ThresholdRule]) -> Vec<AlertCandidate<'a>> {
    rules
        .iter()
        .filter(|rule| rule.enabled)
        .filter_map(|rule| {
            let Some(value) = sample.numeric(&rule.field) else {
                log::debug!(
                    "Skipping {}: no numeric value in {}",
                    rule.channel,
                    rule.field
                );
                return None;
            };

            rule.matches(value).then_some(AlertCandidate {
                rule,
                value,
                sampled_at: sample.created_at(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::types::{AlertSeverity, Comparator};
    use chrono::Utc;
    use serde_json::Value;

    fn rules() -> Vec<ThresholdRule> {
        vec![
            ThresholdRule::new(
                "gas",
                "field1",
                Comparator::GreaterThan,
                20.0,
                AlertSeverity::Critical,
            ),
            ThresholdRule::new(
                "vibration",
                "field2",
                Comparator::GreaterOrEqual,
                1.0,
                AlertSeverity::Warning,
            ),
        ]
    }

    #[test]
    fn test_single_channel_crossing() {
        let rules = rules();
        let sample = Sample::new(Utc::now())
            .with_field("field1", "25.0")
            .with_field("field2", "0.2");

        let candidates = evaluate(&sample, &rules);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].channel(), "gas");
        assert_eq!(candidates[0].value, 25.0);
        assert_eq!(candidates[0].threshold(), 20.0);
    }

    #[test]
    fn test_both_channels_in_rule_order() {
        let rules = rules();
        let sample = Sample::new(Utc::now())
            .with_field("field2", "3")
            .with_field("field1", "30");

        let channels: Vec<&str> = evaluate(&sample, &rules)
            .iter()
            .map(|c| c.channel())
            .collect();
        assert_eq!(channels, vec!["gas", "vibration"]);
    }

    #[test]
    fn test_comparator_asymmetry_at_threshold() {
        let rules = rules();
        let sample = Sample::new(Utc::now())
            .with_field("field1", "20.0")
            .with_field("field2", "1.0");

        let candidates = evaluate(&sample, &rules);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].channel(), "vibration");
    }

    #[test]
    fn test_null_field_yields_nothing() {
        let rules = rules();
        let sample = Sample::new(Utc::now())
            .with_field("field1", Value::Null)
            .with_field("field2", "abc");

        assert!(evaluate(&sample, &rules).is_empty());
    }

    #[test]
    fn test_disabled_rule_skipped() {
        let rules = vec![ThresholdRule::new(
            "gas",
            "field1",
            Comparator::GreaterThan,
            20.0,
            AlertSeverity::Critical,
        )
        .disabled()];
        let sample = Sample::new(Utc::now()).with_field("field1", "99");

        assert!(evaluate(&sample, &rules).is_empty());
    }

    #[test]
    fn test_candidate_carries_sample_time() {
        let rules = rules();
        let now = Utc::now();
        let sample = Sample::new(now).with_field("field1", "21");

        let candidates = evaluate(&sample, &rules);
        assert_eq!(candidates[0].sampled_at, now);
    }
}
