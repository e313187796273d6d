//! NetShield - batch traffic analysis host
//!
//! Đọc TrafficBatch JSON từ file (argument) hoặc stdin, in alerts ra stdout.

use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::AsyncReadExt;

use netshield_core::constants::{APP_NAME, APP_VERSION};
use netshield_core::logic::features::LayoutInfo;
use netshield_core::logic::model::load_classifier;
use netshield_core::{ClassifierAdapter, DetectorConfig, DetectorResult, TrafficAnalyzer, TrafficBatch};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{} failed: {}", APP_NAME, e);
            eprintln!("{}: {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> DetectorResult<()> {
    let config = DetectorConfig::from_env();
    log::info!("Model: {} ({:?})", config.model_path.display(), config.model_format);

    let layout = LayoutInfo::current();
    log::info!("Feature layout v{} ({:08x}): {:?}", layout.version, layout.hash, layout.feature_names);

    let adapter = Arc::new(ClassifierAdapter::with_model(load_classifier(&config)?));
    let analyzer = TrafficAnalyzer::new(adapter);

    let input = match std::env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            buffer
        }
    };

    let batch = TrafficBatch::from_json_str(&input)?;
    let alerts = analyzer.analyze_traffic(&batch).await?;

    println!("{}", serde_json::to_string_pretty(&alerts)?);
    Ok(())
}
