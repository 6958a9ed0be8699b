use loan_sales_assistant::{AssistantConfig, Conversation, LoanAssistant};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const QUIT_COMMANDS: &[&str] = &["exit", "quit"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Logs go to stderr so they do not interleave with the chat
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = AssistantConfig::from_env()?;
    info!(kyc_db = %config.kyc_db_path.display(), "Loan assistant starting");

    let assistant = LoanAssistant::from_config(&config)?;
    let mut conversation = Conversation::new();

    println!("=== Personal Loan Assistant ===");
    println!("Type \"reset\" to start over, \"exit\" to leave.\n");
    println!("Assistant: Hello! Please tell me your name to get started (e.g. \"My name is Ravi\").\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if QUIT_COMMANDS.contains(&message.to_lowercase().as_str()) {
            break;
        }

        match assistant.respond(&mut conversation, message).await {
            Ok(turn) => {
                println!("\nAssistant: {}\n", turn.reply);
                println!("[{} - {}%]\n", turn.stage_label, turn.progress);
                if let Some(sanction) = turn.sanction {
                    println!(
                        "Sanction letter {} saved to {}\n",
                        sanction.loan_id,
                        sanction.file_path.display()
                    );
                }
            }
            Err(e) => {
                error!("Turn failed: {}", e);
                eprintln!("Something went wrong: {}", e);
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}
