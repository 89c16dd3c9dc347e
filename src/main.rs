//! AI Salary Predictor - Main Entry Point

mod api;
mod logic;
mod ui;
pub mod constants;

use logic::config::AppConfig;
use logic::model::PredictionDispatcher;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    log::info!("Starting {} v{}...", constants::APP_NAME, constants::APP_VERSION);

    let config = AppConfig::from_env();
    log::info!(
        "Model dir: {} (simulated latency {}ms, fallback on error: {})",
        config.model_dir.display(),
        config.simulated_latency_ms,
        config.fallback_on_error
    );

    let dispatcher = PredictionDispatcher::start(&config);
    log::info!("Prediction backend: {}", dispatcher.backend().as_str());

    if let Err(e) = ui::run::run(&dispatcher) {
        log::error!("Terminal UI failed: {}", e);
        std::process::exit(1);
    }
}
