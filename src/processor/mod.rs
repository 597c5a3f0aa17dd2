//! Real-time AML detection over the transaction stream.
//!
//! The processor consumes `transactions.raw` under the `aml-processor` group
//! and runs each record through enrichment, per-account history upkeep, and
//! the detection rules. Triggered rules become alerts routed by severity, and
//! every record is re-published enriched to `transactions.enriched`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod rules;

use crate::broker::{Broker, Consumer, Envelope, Producer};
use crate::model::{
    now_ms, rfc3339_now, AccountContext, AccountDirectory, Alert, Severity, Transaction,
    TransactionDetails,
};
use crate::pipeline::tap::TapSlot;
use rules::{AlertDescriptor, DetectionRule, RuleContext};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ProcessorConfig {
    pub alert_threshold: f64,
    pub sar_threshold: f64,
    pub velocity_window_minutes: u64,
    pub velocity_threshold: usize,
    /// Currency Transaction Report line. Doubles as the structuring band top.
    pub ctr_threshold: f64,
    pub structuring_floor: f64,
    pub enable_pattern_detection: bool,
    pub enable_network_analysis: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            alert_threshold: 70.0,
            sar_threshold: 80.0,
            velocity_window_minutes: 30,
            velocity_threshold: 10,
            ctr_threshold: 10_000.0,
            structuring_floor: 7_500.0,
            enable_pattern_detection: true,
            enable_network_analysis: true,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ProcessorStats {
    pub running: bool,
    pub processed_count: u64,
    pub alerts_generated: u64,
    pub alert_rate: f64,
    pub uptime_seconds: f64,
    pub tps: f64,
    pub accounts_tracked: usize,
    pub active_histories: usize,
}

/// Shared control and observation surface for a running processor.
pub struct ProcessorHandle {
    config: ProcessorConfig,
    directory: Arc<RwLock<AccountDirectory>>,
    running: AtomicBool,
    processed: AtomicU64,
    alerts_generated: AtomicU64,
    histories: AtomicU64,
    started_at_ms: AtomicI64,
    pub(crate) alert_tap: TapSlot<Alert>,
    pub(crate) processed_tap: TapSlot<Transaction>,
}

impl ProcessorHandle {
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn stats(&self) -> ProcessorStats {
        let started = self.started_at_ms.load(Ordering::Relaxed);
        let uptime = if started > 0 {
            ((now_ms() - started) as f64 / 1000.0).max(0.0)
        } else {
            0.0
        };
        let processed = self.processed.load(Ordering::Relaxed);
        let alerts = self.alerts_generated.load(Ordering::Relaxed);
        ProcessorStats {
            running: self.is_running(),
            processed_count: processed,
            alerts_generated: alerts,
            alert_rate: alerts as f64 / (processed as f64).max(1.0),
            uptime_seconds: uptime,
            tps: processed as f64 / uptime.max(1.0),
            accounts_tracked: self.directory.read().unwrap().len(),
            active_histories: self.histories.load(Ordering::Relaxed) as usize,
        }
    }
}

pub struct StreamProcessor {
    consumer: Consumer,
    producer: Producer,
    directory: Arc<RwLock<AccountDirectory>>,
    history: HashMap<String, Vec<Transaction>>,
    rules: Vec<DetectionRule>,
    handle: Arc<ProcessorHandle>,
}

impl StreamProcessor {
    pub fn new(
        broker: Arc<Broker>,
        config: ProcessorConfig,
        directory: Arc<RwLock<AccountDirectory>>,
    ) -> Self {
        let consumer = Consumer::new(Arc::clone(&broker), "aml-processor");
        let producer = Producer::new(broker, Some("aml-processor".to_string()));
        let rules = rules::default_rules(&config);
        let handle = Arc::new(ProcessorHandle {
            config,
            directory: Arc::clone(&directory),
            running: AtomicBool::new(false),
            processed: AtomicU64::new(0),
            alerts_generated: AtomicU64::new(0),
            histories: AtomicU64::new(0),
            started_at_ms: AtomicI64::new(0),
            alert_tap: TapSlot::new("alert"),
            processed_tap: TapSlot::new("processed"),
        });
        Self {
            consumer,
            producer,
            directory,
            history: HashMap::new(),
            rules,
            handle,
        }
    }

    pub fn handle(&self) -> Arc<ProcessorHandle> {
        Arc::clone(&self.handle)
    }

    /// Subscribe to the raw feed and mark the processor running. The group
    /// cursor starts at the current log end, so only traffic published after
    /// this call is consumed.
    pub fn start(&mut self) {
        self.consumer.subscribe(&["transactions.raw"]);
        self.handle.running.store(true, Ordering::SeqCst);
        self.handle.started_at_ms.store(now_ms(), Ordering::Relaxed);
        log::info!("stream processor started");
    }

    /// Run one envelope through all stages, returning the enriched
    /// transaction and any alerts raised. Alerts and the enriched record are
    /// published before this returns.
    pub fn process(&mut self, envelope: &Envelope) -> anyhow::Result<(Transaction, Vec<Alert>)> {
        let mut txn: Transaction = serde_json::from_value(envelope.value.clone())?;

        self.enrich(&mut txn);
        self.update_history(&txn);

        let alerts = if self.handle.config.enable_pattern_detection {
            self.detect(&txn)
        } else {
            Vec::new()
        };
        for alert in &alerts {
            self.publish_alert(alert)?;
        }

        self.producer.send(
            "transactions.enriched",
            serde_json::to_value(&txn)?,
            Some(txn.id.clone()),
        )?;
        self.handle.processed.fetch_add(1, Ordering::Relaxed);
        Ok((txn, alerts))
    }

    /// Poll and process until stopped. A record that fails a stage is logged
    /// and dropped without stalling the stream.
    pub async fn run(mut self) {
        loop {
            if !self.handle.running.load(Ordering::SeqCst) {
                break;
            }
            let batch = self.consumer.poll(Duration::from_millis(100)).await;
            for envelope in batch {
                match self.process(&envelope) {
                    Ok((txn, alerts)) => {
                        for alert in alerts {
                            self.handle.alert_tap.send(alert).await;
                        }
                        self.handle.processed_tap.send(txn).await;
                    }
                    Err(err) => log::error!("transaction processing error: {err:#}"),
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.consumer.stop();
        log::info!(
            "stream processor stopped. processed {} transactions",
            self.handle.processed.load(Ordering::Relaxed)
        );
    }

    fn enrich(&self, txn: &mut Transaction) {
        let directory = self.directory.read().unwrap();
        if let Some(account) = directory.get(&txn.account_id) {
            let network = self.handle.config.enable_network_analysis;
            txn.account_context = Some(AccountContext {
                name: account.name.clone(),
                risk_score: account.risk_score,
                account_type: account.account_type.clone(),
                is_mule_suspect: network && account.mule_network_id.is_some(),
                mule_network_id: if network {
                    account.mule_network_id.clone()
                } else {
                    None
                },
                cluster_id: if network {
                    account.cluster_id.clone()
                } else {
                    None
                },
            });
        }
        txn.processed_at = Some(rfc3339_now());
    }

    // The record under processing joins the window before rules run, and the
    // window is pruned to the configured horizon on every insert. A missing
    // timestamp is back-filled with arrival time so the record ages out
    // normally.
    fn update_history(&mut self, txn: &Transaction) {
        if txn.account_id.is_empty() {
            return;
        }
        let mut entry = txn.clone();
        if entry.timestamp == 0 {
            entry.timestamp = now_ms();
        }
        let cutoff = now_ms() - self.handle.config.velocity_window_minutes as i64 * 60_000;
        let window = self.history.entry(txn.account_id.clone()).or_default();
        window.push(entry);
        window.retain(|kept| kept.timestamp > cutoff);
        self.handle
            .histories
            .store(self.history.len() as u64, Ordering::Relaxed);
    }

    fn detect(&self, txn: &Transaction) -> Vec<Alert> {
        let recent = self
            .history
            .get(&txn.account_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let context = RuleContext { recent };
        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(txn, &context))
            .map(|descriptor| Self::create_alert(txn, descriptor))
            .collect()
    }

    fn create_alert(txn: &Transaction, descriptor: AlertDescriptor) -> Alert {
        let severity = descriptor.severity;
        Alert {
            id: Uuid::new_v4().to_string(),
            transaction_id: txn.id.clone(),
            account_id: txn.account_id.clone(),
            alert_type: None,
            rule_name: Some(descriptor.rule_name.to_string()),
            severity,
            description: descriptor.description,
            risk_indicators: descriptor.indicators,
            amount: txn.amount,
            created_at: rfc3339_now(),
            status: "new".to_string(),
            aml_score: txn.aml_score + 20.0,
            requires_review: severity >= Severity::High,
            requires_sar: false,
            transaction_details: Some(TransactionDetails {
                txn_type: txn.txn_type,
                amount: txn.amount,
                timestamp: txn.timestamp,
                location: txn.location.clone(),
            }),
        }
    }

    fn publish_alert(&mut self, alert: &Alert) -> anyhow::Result<()> {
        let topic = if alert.severity == Severity::High {
            "alerts.high-priority"
        } else {
            "alerts"
        };
        let value = serde_json::to_value(alert)?;
        self.producer.send(topic, value.clone(), Some(alert.id.clone()))?;
        self.handle.alerts_generated.fetch_add(1, Ordering::Relaxed);
        self.producer
            .send("aml-detections", value, Some(alert.transaction_id.clone()))?;
        Ok(())
    }
}
