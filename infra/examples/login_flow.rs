//! Interactive walkthrough of the phone + PIN login flow against a running
//! MaidMatch API.
//!
//! Usage:
//! ```bash
//! MM_API_BASE_URL=http://localhost:8000/api \
//! MM_DEMO_PHONE=0772345678 \
//! cargo run -p mm_infra --example login_flow
//! ```

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use mm_core::services::AuthFlow;
use mm_core::session::{MemorySessionStore, SessionStore};
use mm_infra::{ApiClient, HttpAuthGateway};
use mm_shared::config::ApiClientConfig;
use mm_shared::utils::phone::mask_phone_number;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let phone = std::env::var("MM_DEMO_PHONE").unwrap_or_else(|_| "0772345678".to_string());

    let config = ApiClientConfig::from_env();
    println!("MaidMatch login demo against {}", config.base_url);

    let sessions: Arc<MemorySessionStore> = Arc::new(MemorySessionStore::new());
    let client = Arc::new(ApiClient::new(&config, sessions.clone())?);
    let gateway = Arc::new(HttpAuthGateway::new(client.clone()));
    let flow = Arc::new(AuthFlow::new(gateway, sessions.clone()));
    client.set_rejection_observer(flow.clone());

    println!("Requesting login PIN for {} ...", mask_phone_number(&phone));
    flow.request_pin(&phone).await?;
    println!("PIN sent. Check your messages.");

    print!("Enter the PIN you received: ");
    io::stdout().flush()?;
    let mut pin = String::new();
    io::stdin().lock().read_line(&mut pin)?;

    match flow.verify_pin(&phone, pin.trim()).await {
        Ok(session) => {
            println!(
                "Authenticated as {} ({:?})",
                session.user.username, session.user.user_type
            );
            println!("Session established at {}", session.established_at);

            flow.logout().await;
            println!("Logged out; session cleared: {}", sessions.load().await.is_none());
        }
        Err(err) => {
            println!("Login failed: {err}");
        }
    }

    Ok(())
}
