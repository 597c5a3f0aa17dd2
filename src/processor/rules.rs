//! Rule-based AML checks.
//!
//! Each rule is evaluated against a transaction together with the account's
//! recent window. A triggered rule yields a descriptor that the processor
//! turns into a published alert.

use super::ProcessorConfig;
use crate::model::{Direction, Severity, Transaction};

/// FATF-style high-risk jurisdiction list keyed by ISO country code.
pub const HIGH_RISK_COUNTRIES: [&str; 8] = ["RU", "BZ", "CY", "PA", "KP", "IR", "SY", "VE"];

// Structuring watches its own band floor rather than the configurable
// reporting floor, so amounts parked between the two do not trigger it.
const STRUCTURING_BAND_FLOOR: f64 = 8_000.0;

/// Account window handed to rule evaluation. The transaction under
/// evaluation has already been appended to `recent`.
pub struct RuleContext<'a> {
    pub recent: &'a [Transaction],
}

/// Outcome of a triggered rule, before alert identity is attached.
#[derive(Clone, Debug)]
pub struct AlertDescriptor {
    pub rule_name: &'static str,
    pub severity: Severity,
    pub description: String,
    pub indicators: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DetectionRule {
    /// Repeated amounts parked just under the currency-transaction-report
    /// threshold.
    Structuring { floor: f64, ctr_threshold: f64 },
    /// Too many transactions inside the sliding window.
    Velocity { threshold: usize, window_minutes: u64 },
    /// Destination country on the high-risk list.
    HighRiskJurisdiction,
    /// Funds received and dispersed in near-equal volume within the window.
    RapidMovement,
    /// Repeated round-thousand amounts.
    RoundAmount,
}

pub fn default_rules(config: &ProcessorConfig) -> Vec<DetectionRule> {
    vec![
        DetectionRule::Structuring {
            floor: STRUCTURING_BAND_FLOOR,
            ctr_threshold: config.ctr_threshold,
        },
        DetectionRule::Velocity {
            threshold: config.velocity_threshold,
            window_minutes: config.velocity_window_minutes,
        },
        DetectionRule::HighRiskJurisdiction,
        DetectionRule::RapidMovement,
        DetectionRule::RoundAmount,
    ]
}

impl DetectionRule {
    pub fn name(&self) -> &'static str {
        match self {
            DetectionRule::Structuring { .. } => "Structuring Detection",
            DetectionRule::Velocity { .. } => "Velocity Anomaly",
            DetectionRule::HighRiskJurisdiction => "High Risk Jurisdiction",
            DetectionRule::RapidMovement => "Rapid Fund Movement",
            DetectionRule::RoundAmount => "Round Amount Pattern",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DetectionRule::Velocity { .. } => Severity::Medium,
            DetectionRule::RoundAmount => Severity::Low,
            _ => Severity::High,
        }
    }

    pub fn evaluate(&self, txn: &Transaction, context: &RuleContext) -> Option<AlertDescriptor> {
        match self {
            DetectionRule::Structuring {
                floor,
                ctr_threshold,
            } => {
                if txn.amount < *floor || txn.amount >= *ctr_threshold {
                    return None;
                }
                let near_threshold = context
                    .recent
                    .iter()
                    .filter(|other| other.id != txn.id)
                    .filter(|other| other.amount >= *floor && other.amount < *ctr_threshold)
                    .count();
                (near_threshold >= 2).then(|| AlertDescriptor {
                    rule_name: self.name(),
                    severity: self.severity(),
                    description: format!(
                        "Multiple transactions near CTR threshold detected. Amount: ${}",
                        money(txn.amount)
                    ),
                    indicators: vec![
                        format!(
                            "Transaction amount ${} just under $10,000 threshold",
                            money(txn.amount)
                        ),
                        format!("{near_threshold} similar transactions in recent history"),
                    ],
                })
            }
            DetectionRule::Velocity {
                threshold,
                window_minutes,
            } => {
                let count = context.recent.len();
                (count >= *threshold).then(|| AlertDescriptor {
                    rule_name: self.name(),
                    severity: self.severity(),
                    description: format!(
                        "Unusual transaction velocity: {count} transactions in {window_minutes} minutes"
                    ),
                    indicators: vec![
                        format!("{count} transactions detected in short window"),
                        "Velocity exceeds normal account behavior".to_string(),
                    ],
                })
            }
            DetectionRule::HighRiskJurisdiction => {
                let code = txn.destination_country.as_deref().unwrap_or("");
                if !HIGH_RISK_COUNTRIES.contains(&code) {
                    return None;
                }
                let shown = txn.destination_country_name.as_deref().unwrap_or(code);
                Some(AlertDescriptor {
                    rule_name: self.name(),
                    severity: self.severity(),
                    description: format!("Transfer to high-risk jurisdiction: {shown}"),
                    indicators: vec![
                        format!("Destination country {code} on high-risk list"),
                        format!("Amount: ${}", money(txn.amount)),
                    ],
                })
            }
            DetectionRule::RapidMovement => {
                let mut incoming = 0.0_f64;
                let mut outgoing = 0.0_f64;
                let mut seen_incoming = false;
                let mut seen_outgoing = false;
                for other in context.recent {
                    match other.direction {
                        Direction::Incoming => {
                            incoming += other.amount;
                            seen_incoming = true;
                        }
                        Direction::Outgoing => {
                            outgoing += other.amount;
                            seen_outgoing = true;
                        }
                    }
                }
                if !seen_incoming || !seen_outgoing {
                    return None;
                }
                let ratio = outgoing / incoming.max(1.0);
                if !(0.8..=1.2).contains(&ratio) || outgoing <= 5_000.0 {
                    return None;
                }
                Some(AlertDescriptor {
                    rule_name: self.name(),
                    severity: self.severity(),
                    description: format!(
                        "Rapid fund movement detected. In: ${}, Out: ${}",
                        money(incoming),
                        money(outgoing)
                    ),
                    indicators: vec![
                        "Funds received and dispersed within short timeframe".to_string(),
                        "Characteristic of layering activity".to_string(),
                    ],
                })
            }
            DetectionRule::RoundAmount => {
                if txn.amount < 1_000.0 || txn.amount % 1_000.0 != 0.0 {
                    return None;
                }
                let round_count = context
                    .recent
                    .iter()
                    .filter(|other| other.id != txn.id)
                    .filter(|other| other.amount % 1_000.0 == 0.0)
                    .count();
                (round_count >= 3).then(|| AlertDescriptor {
                    rule_name: self.name(),
                    severity: self.severity(),
                    description: format!(
                        "Multiple round amount transactions detected. Amount: ${}",
                        money(txn.amount)
                    ),
                    indicators: vec![
                        format!("Transaction amount is round number: ${}", money(txn.amount)),
                        format!("{round_count} round amount transactions in history"),
                    ],
                })
            }
        }
    }
}

/// Dollar amount with thousands separators, e.g. `12,345.67`.
fn money(amount: f64) -> String {
    let text = format!("{amount:.2}");
    match text.split_once('.') {
        Some((whole, frac)) => {
            let mut grouped = String::with_capacity(text.len() + whole.len() / 3);
            for (i, ch) in whole.chars().enumerate() {
                if i > 0 && (whole.len() - i) % 3 == 0 {
                    grouped.push(',');
                }
                grouped.push(ch);
            }
            format!("{grouped}.{frac}")
        }
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(id: &str, amount: f64) -> Transaction {
        Transaction {
            id: id.into(),
            account_id: "acc-1".into(),
            amount,
            ..Transaction::default()
        }
    }

    fn flow(id: &str, amount: f64, direction: Direction) -> Transaction {
        Transaction {
            direction,
            ..txn(id, amount)
        }
    }

    fn structuring() -> DetectionRule {
        DetectionRule::Structuring {
            floor: 8_000.0,
            ctr_threshold: 10_000.0,
        }
    }

    #[test]
    fn test_that_structuring_needs_two_other_near_threshold_transactions() {
        let rule = structuring();
        let current = txn("t3", 9_500.0);

        let short = vec![txn("t1", 9_200.0), current.clone()];
        assert!(rule
            .evaluate(&current, &RuleContext { recent: &short })
            .is_none());

        let full = vec![txn("t1", 9_200.0), txn("t2", 8_750.0), current.clone()];
        let descriptor = rule
            .evaluate(&current, &RuleContext { recent: &full })
            .unwrap();
        assert_eq!(descriptor.rule_name, "Structuring Detection");
        assert_eq!(descriptor.severity, Severity::High);
        assert!(descriptor.description.contains("9,500.00"));
        assert!(descriptor.indicators[1].starts_with("2 similar"));
    }

    #[test]
    fn test_that_structuring_ignores_amounts_outside_the_band() {
        let rule = structuring();
        let low = txn("t1", 7_999.99);
        let high = txn("t2", 10_000.0);
        let window = vec![txn("a", 9_000.0), txn("b", 9_100.0), txn("c", 9_200.0)];
        let context = RuleContext { recent: &window };

        assert!(rule.evaluate(&low, &context).is_none());
        assert!(rule.evaluate(&high, &context).is_none());
    }

    #[test]
    fn test_that_velocity_triggers_on_window_length() {
        let rule = DetectionRule::Velocity {
            threshold: 3,
            window_minutes: 30,
        };
        let current = txn("t3", 50.0);

        let short = vec![txn("t1", 10.0), current.clone()];
        assert!(rule
            .evaluate(&current, &RuleContext { recent: &short })
            .is_none());

        let full = vec![txn("t1", 10.0), txn("t2", 20.0), current.clone()];
        let descriptor = rule
            .evaluate(&current, &RuleContext { recent: &full })
            .unwrap();
        assert_eq!(descriptor.severity, Severity::Medium);
        assert_eq!(
            descriptor.description,
            "Unusual transaction velocity: 3 transactions in 30 minutes"
        );
    }

    #[test]
    fn test_that_high_risk_jurisdiction_flags_listed_countries() {
        let rule = DetectionRule::HighRiskJurisdiction;
        let empty = RuleContext { recent: &[] };

        let mut wire = txn("t1", 30_000.0);
        wire.destination_country = Some("RU".into());
        wire.destination_country_name = Some("Russia".into());
        let descriptor = rule.evaluate(&wire, &empty).unwrap();
        assert_eq!(descriptor.severity, Severity::High);
        assert!(descriptor
            .description
            .ends_with("high-risk jurisdiction: Russia"));
        assert!(descriptor.indicators[1].contains("30,000.00"));

        let mut named_only_by_code = txn("t2", 30_000.0);
        named_only_by_code.destination_country = Some("KP".into());
        let descriptor = rule.evaluate(&named_only_by_code, &empty).unwrap();
        assert!(descriptor.description.ends_with("jurisdiction: KP"));

        let mut safe = txn("t3", 30_000.0);
        safe.destination_country = Some("GB".into());
        assert!(rule.evaluate(&safe, &empty).is_none());

        let domestic = txn("t4", 30_000.0);
        assert!(rule.evaluate(&domestic, &empty).is_none());
    }

    #[test]
    fn test_that_rapid_movement_requires_balanced_flows() {
        let rule = DetectionRule::RapidMovement;
        let current = flow("out-2", 4_000.0, Direction::Outgoing);

        let balanced = vec![
            flow("in-1", 6_000.0, Direction::Incoming),
            flow("in-2", 4_000.0, Direction::Incoming),
            flow("out-1", 5_000.0, Direction::Outgoing),
            current.clone(),
        ];
        let descriptor = rule
            .evaluate(&current, &RuleContext { recent: &balanced })
            .unwrap();
        assert_eq!(descriptor.rule_name, "Rapid Fund Movement");
        assert!(descriptor
            .description
            .contains("In: $10,000.00, Out: $9,000.00"));

        let one_sided = vec![
            flow("out-1", 5_000.0, Direction::Outgoing),
            current.clone(),
        ];
        assert!(rule
            .evaluate(&current, &RuleContext { recent: &one_sided })
            .is_none());

        let skewed = vec![
            flow("in-1", 40_000.0, Direction::Incoming),
            flow("out-1", 5_000.0, Direction::Outgoing),
            current.clone(),
        ];
        assert!(rule
            .evaluate(&current, &RuleContext { recent: &skewed })
            .is_none());

        let too_small = vec![
            flow("in-1", 4_500.0, Direction::Incoming),
            flow("out-1", 1_000.0, Direction::Outgoing),
            flow("out-2", 3_500.0, Direction::Outgoing),
        ];
        let small_current = flow("out-2", 3_500.0, Direction::Outgoing);
        assert!(rule
            .evaluate(&small_current, &RuleContext { recent: &too_small })
            .is_none());
    }

    #[test]
    fn test_that_round_amounts_need_three_other_round_transactions() {
        let rule = DetectionRule::RoundAmount;
        let current = txn("t4", 5_000.0);

        let short = vec![txn("t1", 2_000.0), txn("t2", 3_000.0), current.clone()];
        assert!(rule
            .evaluate(&current, &RuleContext { recent: &short })
            .is_none());

        let full = vec![
            txn("t1", 2_000.0),
            txn("t2", 3_000.0),
            txn("t3", 7_000.0),
            current.clone(),
        ];
        let descriptor = rule
            .evaluate(&current, &RuleContext { recent: &full })
            .unwrap();
        assert_eq!(descriptor.severity, Severity::Low);
        assert!(descriptor.indicators[1].starts_with("3 round amount"));

        let uneven = txn("t5", 5_500.0);
        assert!(rule
            .evaluate(&uneven, &RuleContext { recent: &full })
            .is_none());
    }

    #[test]
    fn test_that_money_formats_with_thousands_separators() {
        assert_eq!(money(0.0), "0.00");
        assert_eq!(money(999.9), "999.90");
        assert_eq!(money(9_500.0), "9,500.00");
        assert_eq!(money(12_345.67), "12,345.67");
        assert_eq!(money(1_000_000.0), "1,000,000.00");
    }

    #[test]
    fn test_that_default_rules_cover_all_checks() {
        let rules = default_rules(&ProcessorConfig::default());
        let names: Vec<_> = rules.iter().map(|rule| rule.name()).collect();
        assert_eq!(
            names,
            vec![
                "Structuring Detection",
                "Velocity Anomaly",
                "High Risk Jurisdiction",
                "Rapid Fund Movement",
                "Round Amount Pattern",
            ]
        );
        assert_eq!(
            rules[0],
            DetectionRule::Structuring {
                floor: 8_000.0,
                ctr_threshold: 10_000.0,
            }
        );
        assert_eq!(
            rules[1],
            DetectionRule::Velocity {
                threshold: 10,
                window_minutes: 30,
            }
        );
    }
}
