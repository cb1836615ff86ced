use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Parley CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the fulfillment server. Registers the default handler answering
    /// with the configured fallback text; embedders use the library to
    /// register per-intent handlers.
    Serve {
        /// Config file path (default: PARLEY_CONFIG_PATH or ~/.parley/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 8787)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Post a synthetic fulfillment request to a running server and print the
    /// reply (for trying out handlers without an NLU platform).
    Send {
        /// Config file path (default: PARLEY_CONFIG_PATH or ~/.parley/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Action name to send (omit to exercise the default handler)
        #[arg(long, short)]
        action: Option<String>,

        /// originalRequest.source value (e.g. "google" for the assistant branch)
        #[arg(long, short)]
        source: Option<String>,

        /// Server URL (default http://127.0.0.1:<config port>/fulfillment)
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("parley {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Send {
            config,
            action,
            source,
            url,
        }) => {
            if let Err(e) = run_send(config, action, source, url).await {
                log::error!("send failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    let registry = default_registry(&config);
    log::info!(
        "starting fulfillment server on {}:{}",
        config.server.bind,
        config.server.port
    );
    lib::webhook::run_server(config, registry).await
}

/// Registry with only the default handler, answering every action with the
/// configured fallback text.
fn default_registry(config: &lib::config::Config) -> lib::dispatch::HandlerRegistry {
    let speech = lib::config::resolve_fallback_speech(config);
    let display = lib::config::resolve_fallback_display(config);
    lib::dispatch::HandlerRegistry::new(Box::new(move |_request| {
        lib::response::ResponseModel::text(speech.clone(), display.clone())
    }))
}

async fn run_send(
    config_path: Option<std::path::PathBuf>,
    action: Option<String>,
    source: Option<String>,
    url: Option<String>,
) -> anyhow::Result<()> {
    let config = lib::config::load_config(config_path)?;
    let url = url.unwrap_or_else(|| {
        format!("http://127.0.0.1:{}/fulfillment", config.server.port)
    });

    let mut body = json!({ "result": { "parameters": {}, "contexts": [] } });
    if let Some(action) = action {
        body["result"]["action"] = Value::String(action);
    }
    if let Some(source) = source {
        body["originalRequest"] = json!({ "source": source });
    }

    let response = reqwest::Client::new()
        .post(&url)
        .json(&body)
        .send()
        .await?;
    anyhow::ensure!(
        response.status().is_success(),
        "server returned {}",
        response.status()
    );
    let reply: Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
