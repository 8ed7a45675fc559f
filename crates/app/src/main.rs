use std::{error::Error, path::PathBuf};

use clap::{Args, Parser, Subcommand};

mod commands;
mod error;
mod settings;

#[derive(Parser, Debug)]
#[command(name = "cashkey")]
#[command(about = "Annual cashflow diagrams whose state lives in the URL")]
struct Cli {
    /// Config file path (TOML, extension optional).
    #[arg(long, env = "CASHKEY_CONFIG", default_value = settings::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Override the log level.
    #[arg(long)]
    level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Print the flow graph of a token or share URL.
    Graph { input: String },
    /// Print the token of an `AppState` JSON document.
    Encode {
        /// Read the document from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print the state carried by a token or share URL.
    Decode { input: String },
    /// Print a share URL holding the seed data.
    Seed,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Override the bind address.
    #[arg(long)]
    bind: Option<String>,
    /// Override the port.
    #[arg(long)]
    port: Option<u16>,
    /// Override the public URL share links point at.
    #[arg(long)]
    public_url: Option<String>,
}

async fn serve(
    mut settings: settings::Settings,
    args: ServeArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if let Some(bind) = args.bind {
        settings.server.bind = bind;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(public_url) = args.public_url {
        settings.server.public_url = public_url;
    }

    let config = server::ServerConfig {
        public_url: settings.public_url()?,
        currency: settings.currency()?,
    };
    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(config, listener).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let mut settings = settings::Settings::new(&cli.config)?;
    if let Some(level) = cli.level {
        settings.app.level = level;
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "cashkey={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let output = match cli.command {
        Command::Serve(args) => {
            tracing::info!("starting server");
            if let Err(err) = serve(settings, args).await {
                tracing::error!("server failed: {err}");
                std::process::exit(1);
            }
            return Ok(());
        }
        Command::Graph { input } => commands::graph(&input),
        Command::Encode { file } => {
            commands::read_input(file.as_deref()).and_then(|json| commands::encode(&json))
        }
        Command::Decode { input } => commands::decode(&input),
        Command::Seed => settings
            .public_url()
            .and_then(|url| commands::seed(&url)),
    };

    match output {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }

    Ok(())
}
