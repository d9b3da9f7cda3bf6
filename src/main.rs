use std::sync::Arc;

use hart::cli::Session;
use hart::config::{HartConfig, http_client};
use hart::conversation::FlowController;
use hart::llm::{ChatResponder, create_provider};
use hart::services::{
    EmailNotifier, GoogleMapsClient, Recommender, SmsNotifier, SmtpEmailTransport,
    TwilioSmsTransport,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    // Initialize tracing; stdout belongs to the chat
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = HartConfig::from_env()?;

    eprintln!("🤖 HART v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.openai.model);

    let http = http_client()?;

    // ── Adapters ─────────────────────────────────────────────────────────
    let llm = create_provider(http.clone(), &config.openai);
    let places = Arc::new(GoogleMapsClient::new(
        http.clone(),
        config.places_api_key.clone(),
    ));

    let sms = config.sms.as_ref().map(|sms_config| {
        eprintln!("   SMS: enabled (from {})", sms_config.from_number);
        SmsNotifier::new(Arc::new(TwilioSmsTransport::new(http.clone(), sms_config)))
    });
    if sms.is_none() {
        eprintln!("   SMS: disabled");
    }

    let email = config.email.clone().map(|email_config| {
        eprintln!(
            "   Email: enabled (SMTP: {}:{}, from {})",
            email_config.smtp_host, email_config.smtp_port, email_config.from_address
        );
        EmailNotifier::new(Arc::new(SmtpEmailTransport::new(email_config)))
    });
    if email.is_none() {
        eprintln!("   Email: disabled");
    }
    eprintln!();

    // ── Session ──────────────────────────────────────────────────────────
    let controller = FlowController::new(Recommender::new(places), ChatResponder::new(llm));
    Session::new(controller, sms, email).run().await?;

    Ok(())
}
