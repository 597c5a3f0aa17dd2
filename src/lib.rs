//! # What is Moneta?
//!
//! Moneta is an in-process streaming pipeline for real-time AML transaction
//! monitoring. It generates a synthetic retail-bank transaction stream,
//! moves it through a Kafka-style in-memory broker, and runs every record
//! through rule-based detection, producing alerts on dedicated topics. The
//! whole pipeline runs inside one process with no external services, which
//! makes it suitable for demos, load experiments, and testing detection
//! logic in Rust.
//!
//! # Implementation
//!
//! The pipeline is composed of:
//! - A broker, [Broker](crate::broker::Broker): named topics backed by
//!   partitioned append-only logs with per-group read cursors. Producers and
//!   consumers register with the broker; consuming advances a group cursor
//!   and never removes the envelope from the log.
//! - A generator, [TransactionGenerator](crate::generator::TransactionGenerator):
//!   synthesizes transactions at a configured rate, injects AML red-flag
//!   patterns into a configurable share of them, and publishes to the raw
//!   and main transaction topics. A fixed seed replays an identical stream.
//! - A processor, [StreamProcessor](crate::processor::StreamProcessor):
//!   consumes the raw feed, enriches each record with account context, keeps
//!   a per-account sliding window, and evaluates the detection rules in
//!   [rules](crate::processor::rules). Triggered rules become alerts routed
//!   by severity.
//! - A facade, [Pipeline](crate::pipeline::Pipeline): builder-constructed
//!   wiring of the above plus lifecycle control, stats, and bounded observer
//!   taps.
//!
//! The broker gives no ordering guarantee across partitions or topics, only
//! within a single partition. Topic logs grow for the lifetime of the
//! process; a stalled consumer group accumulates lag but loses nothing.
//!
//! ``
//! cargo run --bin aml_pipeline [tps] [suspicious_rate] [run_seconds]
//! ``
pub mod broker;
pub mod generator;
pub mod model;
pub mod pipeline;
pub mod processor;
