use clap::Parser;
use server::network::Server;
use server::{spawn, sync};
use std::sync::Arc;

/// Main-method of the application.
/// Parses command-line arguments, binds the WebSocket server, then runs the
/// accept loop alongside the sync and spawn timers.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value = "8080")]
        port: u16,
        /// Sync tick rate (reconciliation passes per second)
        #[clap(short, long, default_value = "30")]
        tick_rate: u32,
    }

    env_logger::init();
    let args = Args::parse();

    let address = format!("{}:{}", args.host, args.port);
    let server = Server::bind(&address).await?;

    let world = server.world();
    let sessions = server.sessions();

    // Periodic tasks run for the lifetime of the process
    let sync_handle = tokio::spawn(sync::run(
        Arc::clone(&world),
        Arc::clone(&sessions),
        args.tick_rate,
    ));
    let spawn_handle = tokio::spawn(spawn::run(world, sessions));
    let server_handle = tokio::spawn(server.run());

    // Handle shutdown gracefully
    tokio::select! {
        result = server_handle => {
            if let Err(e) = result {
                eprintln!("Accept loop panicked: {}", e);
            }
        }
        result = sync_handle => {
            if let Err(e) = result {
                eprintln!("Sync task panicked: {}", e);
            }
        }
        result = spawn_handle => {
            if let Err(e) = result {
                eprintln!("Spawn task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
