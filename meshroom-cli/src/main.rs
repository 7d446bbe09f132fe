use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use meshroom_server::ServerConfig;
use std::net::IpAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meshroom")]
#[command(about = "Signaling rendezvous for mesh video rooms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling server. Flags override HOST / PORT / STUN_URL.
    Serve {
        #[arg(long)]
        host: Option<IpAddr>,

        #[arg(short, long)]
        port: Option<u16>,

        /// Replaces the STUN servers handed to clients; TURN entries stay.
        #[arg(long)]
        stun: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Serve { host, port, stun } => {
            let mut config = ServerConfig::from_env().context("Invalid server environment")?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            config.replace_stun_servers(stun);

            print_banner(&config);
            info!("Handing {} ICE server(s) to clients", config.ice_servers.len());
            meshroom_server::serve(config).await?;
        }
    }

    Ok(())
}

fn print_banner(config: &ServerConfig) {
    println!("{}", "📡 Starting Meshroom signaling server...".green().bold());
    println!("   🔌 WebSocket: ws://{}/ws", config.addr());
    println!("   ❤️  Health:    http://{}/health", config.addr());
    for server in &config.ice_servers {
        println!("   🧊 ICE:       {}", server.urls.join(", ").cyan());
    }
}
