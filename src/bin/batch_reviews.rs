use clap::Parser;
use review_etl::config::cli::BatchArgs;
use review_etl::utils::error::ErrorSeverity;
use review_etl::utils::{logger, validation::Validate};
use review_etl::{
    BatchPipeline, EtlEngine, EtlError, FileReviewPipeline, GoogleMapsClient, LocalStorage,
};
use std::sync::Arc;

fn exit_with(e: &EtlError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Review extraction failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 2,      // 輸入檔問題
        ErrorSeverity::Medium => 2,   // 服務暫時無法使用
        ErrorSeverity::High => 1,     // 處理錯誤
        ErrorSeverity::Critical => 3, // 配置錯誤
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = BatchArgs::parse();

    logger::init_cli_logger(args.verbose);
    tracing::info!("🚀 Starting batch_reviews on {}", args.input);

    let config = match args.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let client = match GoogleMapsClient::new(&config.google) {
        Ok(client) => client,
        Err(e) => exit_with(&e),
    };

    let batch = BatchPipeline::new(Arc::new(client), config.batch_options());
    let storage = LocalStorage::new(args.data_dir.clone());
    let pipeline = FileReviewPipeline::new(storage, batch, args.input.clone(), args.output.clone());
    let engine = EtlEngine::new(pipeline);

    let report = match engine.run().await {
        Ok(report) => report,
        Err(e) => exit_with(&e),
    };

    println!(
        "\n✅ {} reviews from {} rows ({} skipped, {} not found, {} failed)",
        report.summary.reviews,
        report.summary.rows_total,
        report.summary.rows_skipped,
        report.summary.rows_not_found,
        report.summary.rows_failed
    );
    println!("📁 Output saved to: {}/{}", args.data_dir, report.output_path);
    if args.summary_json {
        match report.summary.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => exit_with(&e),
        }
    }

    Ok(())
}
