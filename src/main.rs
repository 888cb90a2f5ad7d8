use clap::Parser;
use review_etl::config::cli::ServeArgs;
use review_etl::server::{self, AppState};
use review_etl::utils::{logger, validation::Validate};
use review_etl::{BatchPipeline, GoogleMapsClient};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ServeArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting review-server");

    // 缺少 API key 等配置錯誤：直接結束程序
    let config = match args.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!("Config: {:?}", config);

    let client = match GoogleMapsClient::new(&config.google) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("❌ Could not build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let batch = BatchPipeline::new(Arc::new(client), config.batch_options());
    let state = AppState::new(batch, config.server.max_upload_bytes);

    server::serve(&config, state).await?;
    Ok(())
}
