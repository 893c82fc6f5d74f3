use anyhow::{bail, Result};
use linechat::client::{ChannelListener, ChatClient, ChatEvent};
use linechat::config::{self, AppConfig};
use linechat::console::{parse_address, parse_input, ConsoleListener, InputCommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let mut cfg = config::load_config()?;
    init_logging(&cfg);

    if cfg.ensure_username() {
        if let Err(e) = config::save_config(&cfg) {
            warn!("could not save generated username: {:#}", e);
        }
    }

    // Optional `host[:port]` argument overrides the configured server
    if let Some(addr) = std::env::args().nth(1) {
        let (host, port) = parse_address(&addr, cfg.server.port);
        cfg.server.host = host;
        cfg.server.port = port;
    }

    if let Err(e) = run(cfg).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(cfg: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cfg: AppConfig) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ChatEvent>();

    let client = Arc::new(ChatClient::new());
    client.add_listener(Arc::new(ConsoleListener::new(cfg.ui.timestamp_format.clone())));
    client.add_listener(Arc::new(ChannelListener::new(event_tx)));

    let host = cfg.server.host.as_str();
    let port = cfg.server.port;
    if !client.connect(host, port).await {
        bail!("could not connect to {}:{}", host, port);
    }
    println!("*** connected to {}:{}", host, port);

    let reader = client.start_listening();

    if cfg.server.auto_login {
        if let Some(username) = cfg.server.username.as_deref() {
            client.try_login(username).await?;
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_input(&client, &line).await {
                    break;
                }
            }
            event = event_rx.recv() => {
                match event {
                    Some(ChatEvent::Disconnected) | None => break,
                    Some(_) => {}
                }
            }
        }
    }

    client.disconnect().await;
    if let Some(reader) = reader {
        let _ = reader.await;
    }
    Ok(())
}

/// Act on one line of user input. Returns `false` when the user quits.
async fn handle_input(client: &ChatClient, line: &str) -> bool {
    let Some(command) = parse_input(line) else {
        if !line.trim().is_empty() {
            println!("!!! unknown command (try /help)");
        }
        return true;
    };

    let sent = match command {
        InputCommand::Quit => return false,
        InputCommand::Say { text } => client.send_public_message(&text).await,
        InputCommand::Msg { recipient, text } => {
            client.send_private_message(&recipient, &text).await
        }
        InputCommand::Login { username } => client.try_login(&username).await,
        InputCommand::Users => client.refresh_user_list().await,
        InputCommand::Help => client.ask_supported_commands().await,
    };

    match sent {
        Ok(true) => {}
        Ok(false) => println!("!!! not sent: connection is closed"),
        Err(e) => println!("!!! {}", e),
    }
    true
}
