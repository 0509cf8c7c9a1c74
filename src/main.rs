use anyhow::{Context, Result};
use chrono::Duration;
use gembot::agent::{Orchestrator, QuotaGate, spawn_daily_reset};
use gembot::config::load_config;
use gembot::providers::GeminiProvider;
use gembot::session::{EvictionSweeper, SessionStore};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".parse().expect("default filter is valid"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(None)?;
    if config.api_key.is_empty() {
        anyhow::bail!("No API key configured; set GEMINI_API_KEY");
    }

    let backend = Arc::new(GeminiProvider::new(
        config.api_key.clone(),
        config.model.clone(),
    ));
    let store = Arc::new(SessionStore::new());
    let quota = Arc::new(QuotaGate::new(config.daily_limit));
    let orchestrator = Orchestrator::new(backend, store.clone(), quota.clone());

    let sweeper = EvictionSweeper::new(
        store,
        Duration::minutes(config.session_ttl_minutes as i64),
        config.sweep_interval_secs,
    );
    sweeper.start().await?;
    let reset_task = spawn_daily_reset(quota.clone(), config.quota_reset_hour);

    info!(
        model = %orchestrator.model_name(),
        daily_limit = config.daily_limit,
        session_ttl_minutes = config.session_ttl_minutes,
        "gembot v{} is online",
        gembot::VERSION
    );

    let mut user = if config.owner.is_empty() {
        "local".to_string()
    } else {
        config.owner.clone()
    };

    println!("🤖 Interactive mode as '{}' (Ctrl+C to exit)", user);
    println!("   Commands: /erase  /model <name>  /owner <name>  /stats  /image <path> <prompt>\n");

    loop {
        use std::io::{self, BufRead, Write};
        print!("You: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let reply = match parse_command(input) {
            Command::Erase => {
                let erased = orchestrator.remove_all_sessions().await;
                format!("All chats have been erased ({} sessions).", erased)
            }
            Command::SetModel(model) => {
                orchestrator.set_backend_model(model);
                format!("New model set: {}", orchestrator.model_name())
            }
            Command::SetOwner(name) => {
                user = name;
                format!("Owner identity is now '{}'.", user)
            }
            Command::Stats => format!(
                "model={} requests_used={} open_sessions={}",
                orchestrator.model_name(),
                orchestrator.requests_used(),
                orchestrator.session_count().await
            ),
            Command::Image { path, prompt } => {
                match send_image(&orchestrator, &user, &path, &prompt).await {
                    Ok(reply) => reply,
                    Err(e) => e.user_message(),
                }
            }
            Command::Chat(prompt) => match orchestrator.send_text(&user, &prompt).await {
                Ok(reply) => reply,
                Err(e) => e.user_message(),
            },
        };

        println!("\n🤖 {}\n", reply);
    }

    sweeper.stop().await;
    reset_task.abort();
    Ok(())
}

enum Command {
    Erase,
    SetModel(String),
    SetOwner(String),
    Stats,
    Image { path: String, prompt: String },
    Chat(String),
}

fn parse_command(input: &str) -> Command {
    if input == "/erase" {
        return Command::Erase;
    }
    if let Some(model) = input.strip_prefix("/model ") {
        return Command::SetModel(model.trim().to_string());
    }
    if let Some(name) = input.strip_prefix("/owner ") {
        return Command::SetOwner(name.trim().to_string());
    }
    if input == "/stats" {
        return Command::Stats;
    }
    if let Some(rest) = input.strip_prefix("/image ") {
        let mut parts = rest.splitn(2, ' ');
        let path = parts.next().unwrap_or_default().to_string();
        let prompt = parts.next().unwrap_or("Describe this image.").to_string();
        return Command::Image { path, prompt };
    }
    Command::Chat(input.to_string())
}

async fn send_image(
    orchestrator: &Orchestrator,
    user: &str,
    path: &str,
    prompt: &str,
) -> Result<String, gembot::errors::BotError> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image file: {}", path))
        .map_err(gembot::errors::BotError::Internal)?;
    let content_type = match path.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };
    orchestrator
        .send_with_attachment(user, prompt, path, content_type, bytes)
        .await
}
