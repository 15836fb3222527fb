//! Remote control demonstration.
//!
//! Demonstrates:
//! - Connecting with a cached token (accept the prompt on the TV once)
//! - Sending remote keys
//! - Listing installed apps and launching one
//!
//! Usage:
//!   cargo run --example remote -- 192.168.1.20
//!   cargo run --example remote -- 192.168.1.20 --launch 3201907018807
//!   cargo run --example remote -- 192.168.1.20 --debug

// ============================================================================
// Imports
// ============================================================================

use tracing_subscriber::EnvFilter;

use tizen_remote::{DeviceConfig, RemoteClient, RemoteKey, Result};

// ============================================================================
// Args
// ============================================================================

/// Command-line arguments.
#[derive(Debug, Clone)]
struct Args {
    host: String,
    launch: Option<String>,
    debug: bool,
}

impl Args {
    /// Parse command-line arguments.
    fn parse() -> Option<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();

        let host = args.iter().find(|a| !a.starts_with("--"))?.clone();
        let launch = args
            .iter()
            .position(|a| a == "--launch")
            .and_then(|i| args.get(i + 1))
            .cloned();

        Some(Self {
            host,
            launch,
            debug: args.iter().any(|a| a == "--debug"),
        })
    }
}

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let filter = if debug {
        "tizen_remote=debug"
    } else {
        "tizen_remote=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let Some(args) = Args::parse() else {
        eprintln!("Usage: remote <tv-ip> [--launch <app-id>] [--debug]");
        std::process::exit(2);
    };
    init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== Remote Control ===\n");

    // ========================================================================
    // Connect
    // ========================================================================

    println!("[Connect] {}...", args.host);

    let config = DeviceConfig::builder()
        .host(&args.host)
        .name("tizen-remote demo")
        .cache_tokens()
        .build()?;

    let client = RemoteClient::connect(config).await?;
    let metadata = client.metadata();
    println!(
        "          ✓ {} ({}), token auth: {}\n",
        metadata.name,
        metadata.device.model_name,
        client.profile().token_auth
    );

    // ========================================================================
    // Keys
    // ========================================================================

    println!("[Keys] Opening and closing the menu...");
    client.send_key(RemoteKey::Menu).await?;
    client.send_key(RemoteKey::Exit).await?;
    println!("       ✓ Sent\n");

    // ========================================================================
    // Apps
    // ========================================================================

    println!("[Apps] Installed:");
    for app in client.get_installed_apps().await? {
        println!(
            "       {:<20} type={} {}",
            app.app_id,
            app.app_type,
            app.name.as_deref().unwrap_or("-")
        );
    }

    if let Some(app_id) = &args.launch {
        println!("\n[Launch] {app_id}...");
        client.launch_app_by_id(app_id).await?;
        println!("         ✓ Launched");
    }

    client.disconnect();
    println!("\n=== Done ===");
    Ok(())
}
