use log::{error, info};
use std::env;
use std::process;

use snake_agent::agent::Agent;
use snake_agent::config::Config;
use snake_agent::transport::TcpTransport;

#[tokio::main]
async fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment
    // variable is set, we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let server = env::var("SNAKE_SERVER").unwrap_or_else(|_| "localhost:8000".to_string());
    let name = env::var("SNAKE_NAME").unwrap_or_else(|_| whoami());

    // Load configuration once at startup
    let config = Config::load_or_default();

    info!("Connecting to server {} as [{}]", server, name);

    let transport = match TcpTransport::connect(&server).await {
        Ok(transport) => transport,
        Err(e) => {
            error!("Could not connect to {}: {}", server, e);
            process::exit(1);
        }
    };

    let mut agent = match Agent::connect(transport, &name, config).await {
        Ok(agent) => agent,
        Err(e) => {
            error!("Handshake with {} failed: {}", server, e);
            process::exit(1);
        }
    };

    if let Err(e) = agent.play().await {
        error!("Session ended with an error: {}", e);
        process::exit(1);
    }

    info!("Episode finished");
}

fn whoami() -> String {
    env::var("USER").unwrap_or_else(|_| "snake-agent".to_string())
}
