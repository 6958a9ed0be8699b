use loan_sales_assistant::{
    api::{start_server, ApiState},
    feedback::FeedbackLog,
    AssistantConfig, LoanAssistant,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AssistantConfig::from_env()?;

    info!("🚀 Loan Sales Assistant - API Server");
    info!("📍 Port: {}", config.port);
    if config.gemini_api_key.is_none() {
        warn!("⚠️  GEMINI_API_KEY not set; see .env.example");
    }

    let assistant = Arc::new(LoanAssistant::from_config(&config)?);
    let feedback = Arc::new(FeedbackLog::new(&config.feedback_log_path));

    info!("✅ Assistant initialized");
    info!("📡 Starting API server...");

    start_server(ApiState::new(assistant, feedback), config.port).await?;

    Ok(())
}
