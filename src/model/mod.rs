//! Domain records shared by the generator, processor, and pipeline.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub(crate) fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub(crate) fn rfc3339_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    WireDomestic,
    WireInternational,
    AchCredit,
    AchDebit,
    #[default]
    CardPurchase,
    CardAtm,
    P2pTransfer,
    CashDeposit,
    CashWithdrawal,
    BillPayment,
    CheckDeposit,
}

impl TransactionType {
    pub const ALL: [TransactionType; 11] = [
        TransactionType::WireDomestic,
        TransactionType::WireInternational,
        TransactionType::AchCredit,
        TransactionType::AchDebit,
        TransactionType::CardPurchase,
        TransactionType::CardAtm,
        TransactionType::P2pTransfer,
        TransactionType::CashDeposit,
        TransactionType::CashWithdrawal,
        TransactionType::BillPayment,
        TransactionType::CheckDeposit,
    ];

    pub fn direction(&self) -> Direction {
        match self {
            TransactionType::AchDebit
            | TransactionType::CardPurchase
            | TransactionType::CashWithdrawal => Direction::Outgoing,
            _ => Direction::Incoming,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Incoming,
    Outgoing,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Branch,
    #[default]
    Online,
    Pos,
    Atm,
    Mobile,
}

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuspiciousPattern {
    Structuring,
    Smurfing,
    Layering,
    RoundTripping,
    VelocityAnomaly,
    HighRiskJurisdiction,
    UnusualAmount,
}

impl SuspiciousPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuspiciousPattern::Structuring => "structuring",
            SuspiciousPattern::Smurfing => "smurfing",
            SuspiciousPattern::Layering => "layering",
            SuspiciousPattern::RoundTripping => "round_tripping",
            SuspiciousPattern::VelocityAnomaly => "velocity_anomaly",
            SuspiciousPattern::HighRiskJurisdiction => "high_risk_jurisdiction",
            SuspiciousPattern::UnusualAmount => "unusual_amount",
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct DeviceInfo {
    pub device_id: String,
    pub device_type: String,
    pub os: String,
    pub browser: String,
    pub ip_address: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Merchant {
    pub name: String,
    pub category: String,
    pub mcc: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Counterparty {
    pub name: String,
    pub account_number: String,
    pub bank: String,
}

/// Account-side context attached by the processor during enrichment.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AccountContext {
    pub name: String,
    pub risk_score: f64,
    pub account_type: String,
    pub is_mule_suspect: bool,
    pub mule_network_id: Option<String>,
    pub cluster_id: Option<String>,
}

// A non-integer timestamp reads as zero.
fn lenient_ms<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw.as_i64().unwrap_or(0))
}

/// A single bank transaction as published on the wire.
///
/// Deserialization is lenient: any missing field takes its default so a
/// partial record still flows through the pipeline.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub account_number: String,
    pub account_name: String,
    #[serde(rename = "type")]
    pub txn_type: TransactionType,
    pub amount: f64,
    pub currency: String,
    #[serde(deserialize_with = "lenient_ms")]
    pub timestamp: i64,
    pub status: String,
    pub direction: Direction,
    pub channel: Channel,
    pub location: Location,
    pub device: DeviceInfo,
    pub risk_indicators: Vec<String>,
    pub is_suspicious: bool,
    pub aml_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<Merchant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<Counterparty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_country_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swift_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p2p_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspicious_pattern: Option<SuspiciousPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterparty_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_context: Option<AccountContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TransactionDetails {
    #[serde(rename = "type")]
    pub txn_type: TransactionType,
    pub amount: f64,
    pub timestamp: i64,
    pub location: Location,
}

/// An AML alert, either synthesized directly by the generator for
/// high-scoring transactions or raised by a processor detection rule.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Alert {
    pub id: String,
    pub transaction_id: String,
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    pub severity: Severity,
    pub description: String,
    pub risk_indicators: Vec<String>,
    pub amount: f64,
    pub created_at: String,
    pub status: String,
    pub aml_score: f64,
    pub requires_review: bool,
    pub requires_sar: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_details: Option<TransactionDetails>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub account_number: String,
    pub account_type: String,
    pub risk_score: f64,
    pub mule_network_id: Option<String>,
    pub cluster_id: Option<String>,
}

/// Account pool shared between the generator and the processor.
///
/// Mule suspects are members of any mule network plus standalone accounts
/// with a risk score above 75.
#[derive(Clone, Debug, Default)]
pub struct AccountDirectory {
    accounts: Vec<Account>,
    index: HashMap<String, usize>,
    networks: HashMap<String, Vec<String>>,
    suspects: Vec<String>,
}

impl AccountDirectory {
    pub fn new(accounts: Vec<Account>) -> Self {
        let mut directory = Self::default();
        directory.replace(accounts);
        directory
    }

    pub fn replace(&mut self, accounts: Vec<Account>) {
        self.index.clear();
        self.networks.clear();
        self.suspects.clear();

        for (pos, account) in accounts.iter().enumerate() {
            self.index.insert(account.id.clone(), pos);
            if let Some(network_id) = &account.mule_network_id {
                self.networks
                    .entry(network_id.clone())
                    .or_default()
                    .push(account.id.clone());
            }
            if account.mule_network_id.is_some() || account.risk_score > 75.0 {
                self.suspects.push(account.id.clone());
            }
        }
        self.accounts = accounts;
    }

    pub fn get(&self, id: &str) -> Option<&Account> {
        self.index.get(id).and_then(|pos| self.accounts.get(*pos))
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn mule_suspects(&self) -> &[String] {
        &self.suspects
    }

    pub fn network_members(&self, network_id: &str) -> &[String] {
        self.networks
            .get(network_id)
            .map(|members| members.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_that_partial_record_deserializes_with_defaults() {
        let raw = r#"{"id":"txn-1","type":"wire_international","amount":2500.5}"#;
        let txn: Transaction = serde_json::from_str(raw).unwrap();
        assert_eq!(txn.id, "txn-1");
        assert_eq!(txn.txn_type, TransactionType::WireInternational);
        assert_eq!(txn.amount, 2500.5);
        assert_eq!(txn.account_id, "");
        assert_eq!(txn.timestamp, 0);
        assert!(txn.risk_indicators.is_empty());
        assert!(txn.merchant.is_none());
    }

    #[test]
    fn test_that_malformed_timestamp_reads_as_zero() {
        let raw = r#"{"id":"txn-2","timestamp":"yesterday-ish"}"#;
        let txn: Transaction = serde_json::from_str(raw).unwrap();
        assert_eq!(txn.timestamp, 0);
    }

    #[test]
    fn test_that_optional_fields_are_skipped_when_absent() {
        let txn = Transaction {
            id: "txn-3".into(),
            ..Transaction::default()
        };
        let value = serde_json::to_value(&txn).unwrap();
        assert!(value.get("merchant").is_none());
        assert!(value.get("suspicious_pattern").is_none());
        assert!(value.get("account_context").is_none());
    }

    #[test]
    fn test_that_severity_orders_by_escalation() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
        assert!(Severity::Critical >= Severity::High);
    }

    #[test]
    fn test_that_directory_groups_mule_networks_and_suspects() {
        let accounts = vec![
            Account {
                id: "a1".into(),
                mule_network_id: Some("network_0".into()),
                ..Account::default()
            },
            Account {
                id: "a2".into(),
                mule_network_id: Some("network_0".into()),
                ..Account::default()
            },
            Account {
                id: "a3".into(),
                risk_score: 80.0,
                ..Account::default()
            },
            Account {
                id: "a4".into(),
                risk_score: 10.0,
                ..Account::default()
            },
        ];

        let directory = AccountDirectory::new(accounts);
        assert_eq!(directory.len(), 4);
        assert_eq!(directory.network_members("network_0").len(), 2);
        assert!(directory.network_members("network_9").is_empty());
        assert_eq!(directory.mule_suspects().len(), 3);
        assert!(directory.get("a3").is_some());
        assert!(directory.get("zz").is_none());
    }

    #[test]
    fn test_that_direction_follows_transaction_type() {
        assert_eq!(
            TransactionType::CashWithdrawal.direction(),
            Direction::Outgoing
        );
        assert_eq!(TransactionType::AchDebit.direction(), Direction::Outgoing);
        assert_eq!(
            TransactionType::WireDomestic.direction(),
            Direction::Incoming
        );
        assert_eq!(TransactionType::CardAtm.direction(), Direction::Incoming);
    }
}
