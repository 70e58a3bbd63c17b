use std::env;
use std::time::Duration;

use dotenv::dotenv;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paywatch::{Config, ContainerBuilder, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    let config = Config::load();
    print_startup_banner(&config);

    let container = ContainerBuilder::new().with_config(config).build().await?;
    container.start().await?;

    run_demo(&container).await?;

    container.shutdown().await?;
    info!("Shutdown complete");
    Ok(())
}

/// Initialize structured logging
fn init_tracing() {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "paywatch=info,info".to_string());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

fn print_startup_banner(config: &Config) {
    println!(
        "
╭─────────────────────────────────────────────╮
│                  paywatch                   │
│                   v{}                    │
├─────────────────────────────────────────────┤
│ Feed panel limit: {:<4}                      │
│ Toast duration:   {:<6}ms                  │
│ Billing cycle:    {:<4}days                  │
╰─────────────────────────────────────────────╯
",
        paywatch::VERSION,
        config.ui.feed_panel_limit,
        config.ui.toast_duration_ms,
        config.billing.billing_cycle_days,
    );
}

/// Scripted walkthrough of the full flow against the in-memory store.
async fn run_demo(container: &paywatch::AppContainer) -> Result<()> {
    let session = container.session();
    let billing = container.billing();
    let shell = container.shell();

    let pause = Duration::from_millis(250);

    info!("--- signing up ---");
    let _ = session
        .signup("Demo User", "demo@example.com", "password123")
        .await;
    tokio::time::sleep(pause).await;

    info!("--- subscribing to the Basic plan ---");
    let _ = billing.start_subscription("plan_basic").await;
    tokio::time::sleep(pause).await;

    info!("--- manual test triggers ---");
    let _ = shell.test_activity_update().await;
    let _ = shell.test_webhook_event().await;
    let _ = shell.test_store_connection().await;
    tokio::time::sleep(pause).await;

    info!("--- simulating a plan change and a payment ---");
    let _ = billing.simulate_plan_change().await;
    let _ = billing
        .simulate_webhook("invoice.payment_succeeded", json!({ "amount": 19 }))
        .await;
    tokio::time::sleep(pause).await;

    info!("--- simulating a cancellation ---");
    let _ = billing.simulate_cancellation().await;
    tokio::time::sleep(pause).await;

    info!("--- clearing test data ---");
    let _ = shell.clear_test_data().await;
    tokio::time::sleep(pause).await;

    info!("--- signing out ---");
    let _ = session.sign_out().await;
    tokio::time::sleep(pause).await;

    Ok(())
}
