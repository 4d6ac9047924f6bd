use preventivatore::services::run_quotation_process;
use preventivatore::Config;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenvy::dotenv() {
        Ok(path) => eprintln!("✅ .env loaded from: {:?}", path),
        Err(e) => eprintln!("⚠️  .env not found: {}", e),
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,preventivatore=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);
    tracing::info!("🚀 preventivatore starting");
    tracing::info!("   Portal: {}", config.prima_login_url);
    tracing::info!("   WebDriver URL: {}", config.webdriver_url);
    tracing::info!("   Headless: {}", config.headless);
    tracing::info!("   Customers table: {}", config.customers_path);
    tracing::info!("   Quotations table: {}", config.quotations_path);

    let summary = run_quotation_process(config, None).await;

    println!("{}", summary);

    Ok(())
}
