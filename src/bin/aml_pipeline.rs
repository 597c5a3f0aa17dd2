use std::env;
use std::time::Duration;

use moneta::broker::Consumer;
use moneta::pipeline::start_stream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let tps: f64 = args[1].parse().unwrap();
    let suspicious_rate: f64 = args[2].parse().unwrap();
    let run_seconds: u64 = args[3].parse().unwrap();

    let mut pipeline = start_stream(tps, suspicious_rate)?;
    let mut alerts = pipeline.alerts();

    // Tail the detection feed through a plain broker consumer. The broker
    // flips this consumer's flag on shutdown, which ends the spawned loop.
    let mut tail = Consumer::new(pipeline.broker(), "detection-tail");
    tail.subscribe(&["aml-detections"]);
    tail.on_message("aml-detections", |envelope| {
        if let Some(rule) = envelope.value.get("rule_name").and_then(|value| value.as_str()) {
            println!("detection: {rule}");
        }
        Ok(())
    });
    let tail_task = tokio::spawn(async move { tail.run().await });

    let deadline = tokio::time::sleep(Duration::from_secs(run_seconds));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            received = alerts.recv() => {
                if let Some(alert) = received {
                    let label = alert
                        .rule_name
                        .as_deref()
                        .or(alert.alert_type.as_deref())
                        .unwrap_or("suspicious_activity");
                    println!(
                        "alert: {} (score {:.0}) {}",
                        label, alert.aml_score, alert.description
                    );
                }
            }
        }
    }

    // Release the tap before stopping so a full channel cannot hold the
    // generator mid-send while its task is awaited.
    drop(alerts);
    let status = pipeline.stop().await?;
    if let Err(err) = tail_task.await {
        log::error!("detection tail join error: {err}");
    }
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
