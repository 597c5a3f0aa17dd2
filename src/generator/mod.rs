//! Synthetic bank-transaction stream.
//!
//! One transaction is synthesized per tick at a configured rate, shaped by
//! business hours and jitter, and published to `transactions.raw` (keyed by
//! account) and `transactions` (keyed by transaction id). A configurable
//! share of the stream carries injected AML red-flag patterns; when an
//! injected transaction scores 75 or higher an alert is published directly to
//! `alerts`, bypassing the processor.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

mod pools;

use crate::broker::{Broker, Producer};
use crate::model::{
    now_ms, rfc3339_now, Account, AccountDirectory, Alert, Channel, Counterparty, DeviceInfo,
    Location, Merchant, Severity, SuspiciousPattern, Transaction, TransactionType,
};
use crate::pipeline::tap::TapSlot;
use pools::{
    amount_range, CountryRisk, BROWSERS, CITIES, COUNTERPARTY_BANKS, DEVICE_OS, DEVICE_TYPES,
    FIRST_NAMES, INTERNATIONAL_COUNTRIES, LAST_NAMES, MERCHANT_CATEGORIES, P2P_SERVICES,
    SWIFT_PREFIXES,
};

const INJECTED_PATTERNS: [SuspiciousPattern; 5] = [
    SuspiciousPattern::Structuring,
    SuspiciousPattern::Layering,
    SuspiciousPattern::HighRiskJurisdiction,
    SuspiciousPattern::VelocityAnomaly,
    SuspiciousPattern::UnusualAmount,
];

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StreamConfig {
    pub transactions_per_second: f64,
    pub suspicious_rate: f64,
    pub business_hours_multiplier: f64,
    /// Fixed seed for a reproducible stream; `None` draws entropy.
    pub seed: Option<u64>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            transactions_per_second: 5.0,
            suspicious_rate: 0.15,
            business_hours_multiplier: 2.0,
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct GeneratorStats {
    pub running: bool,
    pub generated_count: u64,
    pub suspicious_count: u64,
    pub suspicious_rate: f64,
    pub uptime_seconds: f64,
    pub tps_actual: f64,
    pub tps_configured: f64,
    pub accounts_loaded: usize,
    pub mule_accounts: usize,
}

/// Shared control and observation surface for a running generator.
pub struct StreamHandle {
    config: StreamConfig,
    directory: Arc<RwLock<AccountDirectory>>,
    running: AtomicBool,
    generated: AtomicU64,
    suspicious: AtomicU64,
    started_at_ms: AtomicI64,
    pub(crate) txn_tap: TapSlot<Transaction>,
    pub(crate) alert_tap: TapSlot<Alert>,
}

impl StreamHandle {
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn stats(&self) -> GeneratorStats {
        let started = self.started_at_ms.load(Ordering::Relaxed);
        let uptime = if started > 0 {
            ((now_ms() - started) as f64 / 1000.0).max(0.0)
        } else {
            0.0
        };
        let generated = self.generated.load(Ordering::Relaxed);
        let suspicious = self.suspicious.load(Ordering::Relaxed);
        let directory = self.directory.read().unwrap();
        GeneratorStats {
            running: self.is_running(),
            generated_count: generated,
            suspicious_count: suspicious,
            suspicious_rate: suspicious as f64 / (generated as f64).max(1.0),
            uptime_seconds: uptime,
            tps_actual: generated as f64 / uptime.max(1.0),
            tps_configured: self.config.transactions_per_second,
            accounts_loaded: directory.len(),
            mule_accounts: directory.mule_suspects().len(),
        }
    }
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

fn dollars(rng: &mut StdRng, low: f64, high: f64) -> f64 {
    let draw = Uniform::new(low, high).sample(rng);
    (draw * 100.0).round() / 100.0
}

fn random_name(rng: &mut StdRng) -> String {
    format!(
        "{} {}",
        pick(rng, &FIRST_NAMES),
        pick(rng, &LAST_NAMES)
    )
}

fn random_account_number(rng: &mut StdRng) -> String {
    let mut number = String::with_capacity(12);
    for _ in 0..12 {
        number.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }
    number
}

fn random_device(rng: &mut StdRng) -> DeviceInfo {
    DeviceInfo {
        device_id: format!("DEV-{:012X}", rng.gen_range(0..0x1_0000_0000_0000u64)),
        device_type: pick(rng, &DEVICE_TYPES).to_string(),
        os: pick(rng, &DEVICE_OS).to_string(),
        browser: pick(rng, &BROWSERS).to_string(),
        ip_address: format!(
            "{}.{}.{}.{}",
            rng.gen_range(1..=255),
            rng.gen_range(0..=255),
            rng.gen_range(0..=255),
            rng.gen_range(1..=254)
        ),
    }
}

/// Sample account pool used when no accounts are supplied: 50 accounts with
/// the first 15 spread over 5 mule networks.
pub fn sample_accounts(rng: &mut StdRng) -> Vec<Account> {
    (0..50)
        .map(|i| Account {
            id: Uuid::new_v4().to_string(),
            name: random_name(rng),
            account_number: random_account_number(rng),
            account_type: "checking".to_string(),
            risk_score: rng.gen_range(0..=100) as f64,
            mule_network_id: (i < 15).then(|| format!("network_{}", i % 5)),
            cluster_id: None,
        })
        .collect()
}

pub struct TransactionGenerator {
    producer: Producer,
    directory: Arc<RwLock<AccountDirectory>>,
    handle: Arc<StreamHandle>,
    rng: StdRng,
}

impl TransactionGenerator {
    pub fn new(
        broker: Arc<Broker>,
        config: StreamConfig,
        directory: Arc<RwLock<AccountDirectory>>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let producer = Producer::new(broker, Some("transaction-generator".to_string()));
        let handle = Arc::new(StreamHandle {
            config,
            directory: Arc::clone(&directory),
            running: AtomicBool::new(false),
            generated: AtomicU64::new(0),
            suspicious: AtomicU64::new(0),
            started_at_ms: AtomicI64::new(0),
            txn_tap: TapSlot::new("transaction"),
            alert_tap: TapSlot::new("alert"),
        });
        Self {
            producer,
            directory,
            handle,
            rng,
        }
    }

    pub fn handle(&self) -> Arc<StreamHandle> {
        Arc::clone(&self.handle)
    }

    /// Mark the stream running, seeding the sample account pool if the
    /// directory is empty.
    pub fn start(&mut self) {
        if self.directory.read().unwrap().is_empty() {
            log::warn!("no accounts loaded - generating sample accounts");
            let samples = sample_accounts(&mut self.rng);
            self.directory.write().unwrap().replace(samples);
        }
        self.handle.running.store(true, Ordering::SeqCst);
        self.handle.started_at_ms.store(now_ms(), Ordering::Relaxed);
        log::info!(
            "transaction stream started at {} TPS",
            self.handle.config.transactions_per_second
        );
    }

    /// Synthesize and publish one transaction, returning it together with the
    /// directly raised alert when the injected pattern scored high enough.
    pub fn tick(&mut self) -> anyhow::Result<(Transaction, Option<Alert>)> {
        let (txn, alert) = self.synthesize();
        self.producer.send(
            "transactions.raw",
            serde_json::to_value(&txn)?,
            Some(txn.account_id.clone()),
        )?;
        self.producer.send(
            "transactions",
            serde_json::to_value(&txn)?,
            Some(txn.id.clone()),
        )?;
        if let Some(alert) = &alert {
            self.producer
                .send("alerts", serde_json::to_value(alert)?, Some(alert.id.clone()))?;
        }
        self.handle.generated.fetch_add(1, Ordering::Relaxed);
        Ok((txn, alert))
    }

    /// Tick until stopped, sleeping the shaped inter-arrival delay between
    /// transactions. Publish failures are logged and the loop backs off for a
    /// second rather than exiting.
    pub async fn run(mut self) {
        loop {
            if !self.handle.running.load(Ordering::SeqCst) {
                break;
            }
            let delay = self.next_interval();
            match self.tick() {
                Ok((txn, alert)) => {
                    self.handle.txn_tap.send(txn).await;
                    if let Some(alert) = alert {
                        self.handle.alert_tap.send(alert).await;
                    }
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    log::error!("generation error: {err:#}");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
        log::info!(
            "transaction stream stopped. generated {} transactions",
            self.handle.generated.load(Ordering::Relaxed)
        );
    }

    // Base interval shaped by business hours (09:00-17:00 UTC runs faster,
    // nights run slower) with 20% jitter either way.
    fn next_interval(&mut self) -> Duration {
        let tps = self.handle.config.transactions_per_second.max(0.001);
        let base = 1.0 / tps;
        let hour = OffsetDateTime::now_utc().hour();
        let shaped = if (9..=17).contains(&hour) {
            base / self.handle.config.business_hours_multiplier
        } else {
            base * 1.5
        };
        let jitter = Uniform::new(0.8, 1.2).sample(&mut self.rng);
        Duration::from_secs_f64(shaped * jitter)
    }

    fn synthesize(&mut self) -> (Transaction, Option<Alert>) {
        if self.rng.gen::<f64>() < self.handle.config.suspicious_rate {
            self.synthesize_suspicious()
        } else {
            (self.synthesize_normal(), None)
        }
    }

    fn synthesize_normal(&mut self) -> Transaction {
        let (account_id, account_number, account_name) = {
            let directory = self.directory.read().unwrap();
            let account = pick(&mut self.rng, directory.accounts());
            let number = if account.account_number.is_empty() {
                random_account_number(&mut self.rng)
            } else {
                account.account_number.clone()
            };
            let name = if account.name.is_empty() {
                random_name(&mut self.rng)
            } else {
                account.name.clone()
            };
            (account.id.clone(), number, name)
        };

        let txn_type = *pick(&mut self.rng, &TransactionType::ALL);
        let (low, high) = amount_range(txn_type);
        let city = pick(&mut self.rng, &CITIES);

        let mut txn = Transaction {
            id: Uuid::new_v4().to_string(),
            account_id,
            account_number,
            account_name,
            txn_type,
            amount: dollars(&mut self.rng, low, high),
            currency: "USD".to_string(),
            timestamp: now_ms(),
            status: "completed".to_string(),
            direction: txn_type.direction(),
            channel: self.channel_for(txn_type),
            location: Location {
                city: city.name.to_string(),
                state: city.state.to_string(),
                country: "US".to_string(),
                lat: city.lat,
                lng: city.lng,
            },
            device: random_device(&mut self.rng),
            risk_indicators: Vec::new(),
            is_suspicious: false,
            aml_score: self.rng.gen_range(0..=30) as f64,
            ..Transaction::default()
        };
        self.enrich_for_type(&mut txn);
        txn
    }

    fn synthesize_suspicious(&mut self) -> (Transaction, Option<Alert>) {
        self.handle.suspicious.fetch_add(1, Ordering::Relaxed);
        let pattern = *pick(&mut self.rng, &INJECTED_PATTERNS);

        // Mule accounts attract most of the injected activity.
        let account_id = {
            let directory = self.directory.read().unwrap();
            let suspects = directory.mule_suspects();
            if !suspects.is_empty() && self.rng.gen::<f64>() > 0.3 {
                pick(&mut self.rng, suspects).clone()
            } else {
                pick(&mut self.rng, directory.accounts()).id.clone()
            }
        };

        let mut txn = self.synthesize_normal();
        txn.account_id = account_id;
        txn.is_suspicious = true;
        txn.suspicious_pattern = Some(pattern);
        txn.aml_score = self.rng.gen_range(60..=95) as f64;

        match pattern {
            SuspiciousPattern::Structuring => {
                txn.amount = dollars(&mut self.rng, 8_000.0, 10_000.0);
                txn.txn_type = TransactionType::CashDeposit;
                txn.risk_indicators
                    .push("Amount just under CTR threshold ($10,000)".to_string());
            }
            SuspiciousPattern::Layering => {
                txn.txn_type = TransactionType::WireDomestic;
                txn.amount = dollars(&mut self.rng, 15_000.0, 75_000.0);
                txn.risk_indicators
                    .push("Rapid fund movement detected".to_string());
                self.link_mule_counterparty(&mut txn);
            }
            SuspiciousPattern::HighRiskJurisdiction => {
                txn.txn_type = TransactionType::WireInternational;
                let high_risk: Vec<_> = INTERNATIONAL_COUNTRIES
                    .iter()
                    .filter(|country| country.risk == CountryRisk::High)
                    .collect();
                let country = *pick(&mut self.rng, &high_risk);
                txn.destination_country = Some(country.code.to_string());
                txn.destination_country_name = Some(country.name.to_string());
                txn.amount = dollars(&mut self.rng, 25_000.0, 150_000.0);
                txn.risk_indicators.push(format!(
                    "Transfer to high-risk jurisdiction: {}",
                    country.name
                ));
            }
            SuspiciousPattern::VelocityAnomaly => {
                txn.risk_indicators
                    .push("Unusual transaction frequency".to_string());
                txn.velocity_score = Some(Uniform::new(0.7, 1.0).sample(&mut self.rng));
            }
            SuspiciousPattern::UnusualAmount => {
                txn.amount = *pick(&mut self.rng, &[5_000.0, 10_000.0, 25_000.0, 50_000.0]);
                txn.risk_indicators
                    .push("Suspicious round amount pattern".to_string());
            }
            _ => {}
        }

        let alert = (txn.aml_score >= 75.0).then(|| Self::direct_alert(&txn));
        (txn, alert)
    }

    // A layering transaction inside a mule network names another member as
    // its counterparty. Drawing the source account itself leaves the link
    // unset.
    fn link_mule_counterparty(&mut self, txn: &mut Transaction) {
        let directory = self.directory.read().unwrap();
        let Some(account) = directory.get(&txn.account_id) else {
            return;
        };
        let Some(network_id) = &account.mule_network_id else {
            return;
        };
        let members = directory.network_members(network_id);
        if members.is_empty() {
            return;
        }
        let other = pick(&mut self.rng, members);
        if other != &txn.account_id {
            txn.counterparty_account_id = Some(other.clone());
            txn.risk_indicators
                .push("Connected to mule network cluster".to_string());
        }
    }

    fn channel_for(&mut self, txn_type: TransactionType) -> Channel {
        match txn_type {
            TransactionType::WireDomestic | TransactionType::WireInternational => Channel::Branch,
            TransactionType::AchCredit
            | TransactionType::AchDebit
            | TransactionType::BillPayment => Channel::Online,
            TransactionType::CardPurchase => Channel::Pos,
            TransactionType::CardAtm => Channel::Atm,
            TransactionType::P2pTransfer => Channel::Mobile,
            TransactionType::CashDeposit | TransactionType::CashWithdrawal => {
                *pick(&mut self.rng, &[Channel::Atm, Channel::Branch])
            }
            TransactionType::CheckDeposit => {
                *pick(&mut self.rng, &[Channel::Mobile, Channel::Branch])
            }
        }
    }

    fn enrich_for_type(&mut self, txn: &mut Transaction) {
        match txn.txn_type {
            TransactionType::CardPurchase => {
                let (category, merchants) = pick(&mut self.rng, &MERCHANT_CATEGORIES);
                txn.merchant = Some(Merchant {
                    name: pick(&mut self.rng, merchants).to_string(),
                    category: category.to_string(),
                    mcc: self.rng.gen_range(1000..=9999).to_string(),
                });
            }
            TransactionType::WireDomestic
            | TransactionType::AchCredit
            | TransactionType::AchDebit => {
                txn.counterparty = Some(Counterparty {
                    name: random_name(&mut self.rng),
                    account_number: random_account_number(&mut self.rng),
                    bank: pick(&mut self.rng, &COUNTERPARTY_BANKS).to_string(),
                });
            }
            TransactionType::WireInternational => {
                let country = pick(&mut self.rng, &INTERNATIONAL_COUNTRIES);
                txn.destination_country = Some(country.code.to_string());
                txn.destination_country_name = Some(country.name.to_string());
                txn.destination_currency = Some(country.currency.to_string());
                txn.swift_code = Some(format!(
                    "{}{}XX",
                    pick(&mut self.rng, &SWIFT_PREFIXES),
                    country.code
                ));
            }
            TransactionType::P2pTransfer => {
                txn.p2p_service = Some(pick(&mut self.rng, &P2P_SERVICES).to_string());
                txn.recipient = Some(random_name(&mut self.rng));
            }
            _ => {}
        }
    }

    fn direct_alert(txn: &Transaction) -> Alert {
        Alert {
            id: Uuid::new_v4().to_string(),
            transaction_id: txn.id.clone(),
            account_id: txn.account_id.clone(),
            alert_type: Some(
                txn.suspicious_pattern
                    .map(|pattern| pattern.as_str())
                    .unwrap_or("suspicious_activity")
                    .to_string(),
            ),
            rule_name: None,
            severity: if txn.aml_score >= 85.0 {
                Severity::High
            } else {
                Severity::Medium
            },
            description: format!(
                "Suspicious transaction detected: {}",
                txn.risk_indicators.join(", ")
            ),
            risk_indicators: txn.risk_indicators.clone(),
            amount: txn.amount,
            created_at: rfc3339_now(),
            status: "new".to_string(),
            aml_score: txn.aml_score,
            requires_review: false,
            requires_sar: txn.aml_score >= 80.0,
            transaction_details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_accounts() -> Vec<Account> {
        vec![
            Account {
                id: "acc-1".into(),
                name: "Test One".into(),
                account_number: "111111111111".into(),
                account_type: "checking".into(),
                risk_score: 10.0,
                mule_network_id: Some("network_0".into()),
                cluster_id: None,
            },
            Account {
                id: "acc-2".into(),
                name: "Test Two".into(),
                account_number: "222222222222".into(),
                account_type: "checking".into(),
                risk_score: 20.0,
                mule_network_id: Some("network_0".into()),
                cluster_id: None,
            },
        ]
    }

    fn generator(seed: u64, suspicious_rate: f64) -> TransactionGenerator {
        let broker = Arc::new(Broker::new());
        let config = StreamConfig {
            suspicious_rate,
            seed: Some(seed),
            ..StreamConfig::default()
        };
        let directory = Arc::new(RwLock::new(AccountDirectory::new(fixed_accounts())));
        TransactionGenerator::new(broker, config, directory)
    }

    fn stripped(txn: &Transaction) -> serde_json::Value {
        let mut value = serde_json::to_value(txn).unwrap();
        let map = value.as_object_mut().unwrap();
        map.remove("id");
        map.remove("timestamp");
        value
    }

    #[test]
    fn test_that_seeded_generators_replay_identically() {
        let mut first = generator(7, 0.5);
        let mut second = generator(7, 0.5);

        for _ in 0..40 {
            let (txn_a, _) = first.synthesize();
            let (txn_b, _) = second.synthesize();
            assert_eq!(stripped(&txn_a), stripped(&txn_b));
        }
    }

    #[test]
    fn test_that_structuring_pattern_forces_band_and_cash_deposit() {
        let mut generator = generator(11, 1.0);
        let txn = (0..200)
            .map(|_| generator.synthesize().0)
            .find(|txn| txn.suspicious_pattern == Some(SuspiciousPattern::Structuring))
            .unwrap();

        assert!(txn.is_suspicious);
        assert_eq!(txn.txn_type, TransactionType::CashDeposit);
        assert!(txn.amount >= 8_000.0 && txn.amount < 10_000.0);
        assert!(txn.aml_score >= 60.0 && txn.aml_score <= 95.0);
        assert!(txn
            .risk_indicators
            .iter()
            .any(|indicator| indicator.contains("CTR threshold")));
    }

    #[test]
    fn test_that_high_risk_pattern_targets_listed_countries() {
        let mut generator = generator(13, 1.0);
        let txn = (0..200)
            .map(|_| generator.synthesize().0)
            .find(|txn| txn.suspicious_pattern == Some(SuspiciousPattern::HighRiskJurisdiction))
            .unwrap();

        assert_eq!(txn.txn_type, TransactionType::WireInternational);
        assert!(txn.amount >= 25_000.0 && txn.amount <= 150_000.0);
        let code = txn.destination_country.unwrap();
        assert!(["RU", "BZ", "CY", "PA"].contains(&code.as_str()));
    }

    #[test]
    fn test_that_unusual_amount_pattern_uses_fixed_amounts() {
        let mut generator = generator(17, 1.0);
        let txn = (0..200)
            .map(|_| generator.synthesize().0)
            .find(|txn| txn.suspicious_pattern == Some(SuspiciousPattern::UnusualAmount))
            .unwrap();

        assert!([5_000.0, 10_000.0, 25_000.0, 50_000.0].contains(&txn.amount));
    }

    #[test]
    fn test_that_layering_links_counterparties_within_the_network() {
        let mut generator = generator(19, 1.0);
        let linked = (0..400)
            .map(|_| generator.synthesize().0)
            .find(|txn| txn.counterparty_account_id.is_some())
            .unwrap();

        assert_eq!(
            linked.suspicious_pattern,
            Some(SuspiciousPattern::Layering)
        );
        assert_eq!(linked.txn_type, TransactionType::WireDomestic);
        let other = linked.counterparty_account_id.unwrap();
        assert!(["acc-1", "acc-2"].contains(&other.as_str()));
        assert_ne!(other, linked.account_id);
    }

    #[test]
    fn test_that_direct_alerts_follow_score_thresholds() {
        let mut generator = generator(23, 1.0);
        let mut alerts = Vec::new();
        for _ in 0..200 {
            let (txn, alert) = generator.synthesize();
            if let Some(alert) = alert {
                assert!(txn.aml_score >= 75.0);
                alerts.push(alert);
            } else {
                assert!(txn.aml_score < 75.0);
            }
        }

        assert!(!alerts.is_empty());
        for alert in &alerts {
            if alert.aml_score >= 85.0 {
                assert_eq!(alert.severity, Severity::High);
            } else {
                assert_eq!(alert.severity, Severity::Medium);
            }
            assert_eq!(alert.requires_sar, alert.aml_score >= 80.0);
            assert!(alert.alert_type.is_some());
            assert!(alert.rule_name.is_none());
            assert_eq!(alert.status, "new");
        }
    }

    #[test]
    fn test_that_tick_publishes_to_both_transaction_topics() {
        let broker = Arc::new(Broker::new());
        let config = StreamConfig {
            suspicious_rate: 0.0,
            seed: Some(3),
            ..StreamConfig::default()
        };
        let directory = Arc::new(RwLock::new(AccountDirectory::new(fixed_accounts())));
        let mut generator = TransactionGenerator::new(Arc::clone(&broker), config, directory);

        let (txn, alert) = generator.tick().unwrap();
        assert!(alert.is_none());

        let raw = broker.get_topic("transactions.raw").unwrap();
        let stored = raw.read_at(0, 0).unwrap();
        assert_eq!(stored.key.as_deref(), Some(txn.account_id.as_str()));

        let main = broker.get_topic("transactions").unwrap();
        let stored = main.read_at(0, 0).unwrap();
        assert_eq!(stored.key.as_deref(), Some(txn.id.as_str()));

        assert_eq!(generator.handle().stats().generated_count, 1);
    }

    #[test]
    fn test_that_start_seeds_sample_accounts_when_directory_is_empty() {
        let broker = Arc::new(Broker::new());
        let directory = Arc::new(RwLock::new(AccountDirectory::default()));
        let mut generator = TransactionGenerator::new(
            broker,
            StreamConfig {
                seed: Some(5),
                ..StreamConfig::default()
            },
            Arc::clone(&directory),
        );

        generator.start();

        let directory = directory.read().unwrap();
        assert_eq!(directory.len(), 50);
        assert!(directory.mule_suspects().len() >= 15);
        assert!(!directory.network_members("network_0").is_empty());
        assert!(generator.handle().is_running());
    }
}
