use std::sync::Arc;
use std::time::Duration;

use airplanes::{
    cli::{parse_command, Command, HELP},
    endpoint_url, init_logging,
    transport::WsConnector,
    ui::ConsoleRenderer,
    ClientConfig, GameClient, GameSession, PlayerConfig, MAX_AIRPLANES,
};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(author, version, about = "Console client for the airplane battle game", long_about = None)]
struct Cli {
    /// Server host and port.
    #[arg(long, default_value = "127.0.0.1:8000")]
    host: String,
    /// Connect with `wss://` instead of `ws://`.
    #[arg(long)]
    secure: bool,
    /// Callsign shown in the welcome line.
    #[arg(long, default_value = "Pilot")]
    name: String,
    #[arg(long, default_value = "classic")]
    theme: String,
    #[arg(long, help = "Fix RNG seed for reproducible airplane colours (e.g., --seed 12345)")]
    seed: Option<u64>,
    /// Place all airplanes at random on startup.
    #[arg(long)]
    auto_place: bool,
    #[arg(long, default_value_t = 3000)]
    reconnect_delay_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let player = PlayerConfig::new(cli.name, cli.theme)?;
    let session = match cli.seed {
        Some(seed) => {
            println!("Using fixed seed: {}", seed);
            GameSession::with_seed(player, seed)
        }
        None => GameSession::new(player),
    };

    let url = endpoint_url(&cli.host, cli.secure);
    println!("Connecting to {}...", url);
    let config = ClientConfig::new(url)
        .with_reconnect_delay(Duration::from_millis(cli.reconnect_delay_ms));
    let connector = Arc::new(WsConnector::from_config(&config));

    let mut client = GameClient::start(session, config, connector, ConsoleRenderer::stdout());
    // State only goes out after an action, so place once the socket is up.
    if cli.auto_place && client.wait_connected().await {
        for _ in 0..MAX_AIRPLANES {
            client.auto_place()?;
        }
    }
    println!("{}", HELP);

    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    tokio::spawn(read_commands(cmd_tx));
    client.run(cmd_rx).await
}

/// Forward parsed stdin lines to the game loop until EOF or `quit`.
async fn read_commands(tx: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Failed to read input: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(command) => {
                if tx.send(command).await.is_err() || command == Command::Quit {
                    break;
                }
            }
            Err(e) => eprintln!("{}\n{}", e, HELP),
        }
    }
}
