//! Wires broker, generator, and processor into one runnable pipeline.
//!
//! The pipeline owns the shared account directory and spawns the generator
//! and processor as tokio tasks. Shutdown is cooperative: `stop` flips the
//! component flags and awaits both tasks, so in-flight work finishes and
//! unread envelopes stay addressable in the broker log.

use std::sync::{Arc, RwLock};

use derive_more::{Display, Error};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub(crate) mod tap;

use crate::broker::{Broker, BrokerStats, TopicConfig};
use crate::generator::{GeneratorStats, StreamConfig, StreamHandle, TransactionGenerator};
use crate::model::{Account, AccountDirectory, Alert, Transaction};
use crate::processor::{ProcessorConfig, ProcessorHandle, ProcessorStats, StreamProcessor};

const TAP_CAPACITY: usize = 256;

#[derive(Debug, Display, Error)]
pub enum PipelineError {
    #[display("pipeline already running")]
    AlreadyRunning,
    #[display("pipeline not running")]
    NotRunning,
    #[display("pipeline already finished; build a new one")]
    Finished,
}

#[derive(Clone, Debug, Serialize)]
pub struct PipelineStatus {
    pub running: bool,
    pub generator: GeneratorStats,
    pub processor: ProcessorStats,
    pub broker: BrokerStats,
}

#[derive(Default)]
pub struct PipelineBuilder {
    stream_config: StreamConfig,
    processor_config: ProcessorConfig,
    accounts: Vec<Account>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stream_config(mut self, config: StreamConfig) -> Self {
        self.stream_config = config;
        self
    }

    pub fn with_processor_config(mut self, config: ProcessorConfig) -> Self {
        self.processor_config = config;
        self
    }

    pub fn with_accounts(mut self, accounts: Vec<Account>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn build(self) -> Pipeline {
        let broker = Arc::new(Broker::new());
        let directory = Arc::new(RwLock::new(AccountDirectory::new(self.accounts)));
        let generator = TransactionGenerator::new(
            Arc::clone(&broker),
            self.stream_config,
            Arc::clone(&directory),
        );
        let processor = StreamProcessor::new(
            Arc::clone(&broker),
            self.processor_config,
            Arc::clone(&directory),
        );
        let stream = generator.handle();
        let detection = processor.handle();
        Pipeline {
            broker,
            directory,
            generator: Some(generator),
            processor: Some(processor),
            stream,
            detection,
            tasks: Vec::new(),
        }
    }
}

pub struct Pipeline {
    broker: Arc<Broker>,
    directory: Arc<RwLock<AccountDirectory>>,
    generator: Option<TransactionGenerator>,
    processor: Option<StreamProcessor>,
    stream: Arc<StreamHandle>,
    detection: Arc<ProcessorHandle>,
    tasks: Vec<JoinHandle<()>>,
}

impl Pipeline {
    /// Start the broker and spawn the component tasks. The processor
    /// subscribes before the generator publishes its first transaction, so
    /// the raw feed is consumed from the beginning of the run.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        if self.stream.is_running() || self.detection.is_running() {
            return Err(PipelineError::AlreadyRunning);
        }
        let (Some(mut generator), Some(mut processor)) =
            (self.generator.take(), self.processor.take())
        else {
            return Err(PipelineError::Finished);
        };

        self.broker.start();
        processor.start();
        generator.start();
        self.tasks.push(tokio::spawn(processor.run()));
        self.tasks.push(tokio::spawn(generator.run()));
        log::info!("pipeline started");
        Ok(())
    }

    /// Flip the component flags, await both tasks, stop the broker, and
    /// report the final status.
    pub async fn stop(&mut self) -> Result<PipelineStatus, PipelineError> {
        if self.tasks.is_empty() {
            return Err(PipelineError::NotRunning);
        }
        self.stream.stop();
        self.detection.stop();
        for task in self.tasks.drain(..) {
            if let Err(err) = task.await {
                log::error!("pipeline task join error: {err}");
            }
        }
        self.broker.stop();
        log::info!("pipeline stopped");
        Ok(self.status())
    }

    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            running: self.stream.is_running() || self.detection.is_running(),
            generator: self.stream.stats(),
            processor: self.detection.stats(),
            broker: self.broker.get_stats(),
        }
    }

    /// Topic catalog with per-topic configuration.
    pub fn topics(&self) -> Vec<TopicConfig> {
        self.broker
            .list_topics()
            .iter()
            .filter_map(|name| self.broker.get_topic(name))
            .map(|topic| topic.config().clone())
            .collect()
    }

    /// Swap the account directory. Both running components observe the new
    /// accounts on their next transaction.
    pub fn set_accounts(&self, accounts: Vec<Account>) {
        let count = accounts.len();
        self.directory.write().unwrap().replace(accounts);
        log::info!("account directory replaced: {count} accounts");
    }

    pub fn broker(&self) -> Arc<Broker> {
        Arc::clone(&self.broker)
    }

    pub fn stream_handle(&self) -> Arc<StreamHandle> {
        Arc::clone(&self.stream)
    }

    pub fn processor_handle(&self) -> Arc<ProcessorHandle> {
        Arc::clone(&self.detection)
    }

    /// Tap of every generated transaction, pre-enrichment.
    pub fn transactions(&self) -> mpsc::Receiver<Transaction> {
        let (sender, receiver) = mpsc::channel(TAP_CAPACITY);
        self.stream.txn_tap.install(sender);
        receiver
    }

    /// Tap of every alert, both the generator's direct alerts and the
    /// processor's rule alerts.
    pub fn alerts(&self) -> mpsc::Receiver<Alert> {
        let (sender, receiver) = mpsc::channel(TAP_CAPACITY);
        self.stream.alert_tap.install(sender.clone());
        self.detection.alert_tap.install(sender);
        receiver
    }

    /// Tap of enriched transactions leaving the processor.
    pub fn processed(&self) -> mpsc::Receiver<Transaction> {
        let (sender, receiver) = mpsc::channel(TAP_CAPACITY);
        self.detection.processed_tap.install(sender);
        receiver
    }
}

/// Build and start a pipeline with default configuration at the given rate.
pub fn start_stream(tps: f64, suspicious_rate: f64) -> Result<Pipeline, PipelineError> {
    let config = StreamConfig {
        transactions_per_second: tps,
        suspicious_rate,
        ..StreamConfig::default()
    };
    let mut pipeline = PipelineBuilder::new().with_stream_config(config).build();
    pipeline.start()?;
    Ok(pipeline)
}
