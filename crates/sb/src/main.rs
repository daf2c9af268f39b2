use clap::{Parser, Subcommand};
use sb_clients::cursor::CursorClient;
use sb_clients::github::GithubClient;
use sb_clients::linear::LinearClient;
use sb_clients::llm::LlmClient;
use sb_core::router::route_task;
use sb_core::types::TaskInput;
use sb_core::{Collaborators, Config, Orchestrator};
use sb_serve::dedup::Deduplicator;
use sb_serve::AppState;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "switchboard", about = "Agent-session intake and orchestration service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook server.
    Serve,
    /// Classify a task from the command line.
    Classify {
        title: String,
        #[arg(default_value = "")]
        description: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Serve => {
            let model = Arc::new(LlmClient::new(config.llm.clone()));
            let code_host = match GithubClient::new(config.github_token.clone()) {
                Ok(client) => Arc::new(client),
                Err(err) => {
                    eprintln!("failed to build github client: {err}");
                    std::process::exit(1);
                }
            };
            let orchestrator = Orchestrator::new(
                config.repo.clone(),
                config.base_branch.clone(),
                Collaborators {
                    model: model.clone(),
                    code_host,
                    launcher: Arc::new(CursorClient::new(
                        config.cursor_api_url.clone(),
                        config.cursor_api_key.clone(),
                    )),
                    conversation: Arc::new(LinearClient::new(config.linear_api_key.clone())),
                },
            );
            let state = AppState {
                webhook_secret: config.webhook_secret.clone(),
                dedup: Arc::new(Deduplicator::with_default_window()),
                orchestrator: Arc::new(orchestrator),
                model,
            };
            let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.port);
            if config.repo.is_none() {
                tracing::warn!("GITHUB_REPO is not set; sessions will fail until it is configured");
            }
            if let Err(err) = sb_serve::serve(state, addr).await {
                eprintln!("serve error: {err}");
            }
        }
        Command::Classify { title, description } => {
            let model = LlmClient::new(config.llm);
            let input = TaskInput {
                title,
                description,
                hint: None,
            };
            match route_task(&input, &model).await {
                Ok(kind) => println!("{kind}"),
                Err(err) => {
                    eprintln!("classification failed: {err}");
                    std::process::exit(1);
                }
            }
        }
    }
}
