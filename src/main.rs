/// IPFS Gateway - content-addressable storage front end
///
/// A stateless HTTP gateway in front of an IPFS-compatible node: multipart
/// uploads in, CID-addressed streaming retrieval out.

use ipfs_gateway::{config::GatewayConfig, context::AppContext, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipfs_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Print banner
    print_banner();

    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config)?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ________  ___________    ______      __
   /  _/ __ \/ ____/ ___/   / ____/___ _/ /____ _      ______ ___  __
   / // /_/ / /_   \__ \   / / __/ __ `/ __/ _ \ | /| / / __ `/ / / /
 _/ // ____/ __/  ___/ /  / /_/ / /_/ / /_/  __/ |/ |/ / /_/ / /_/ /
/___/_/   /_/    /____/   \____/\__,_/\__/\___/|__/|__/\__,_/\__, /
                                                            /____/

        Content-Addressable Storage Gateway v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
