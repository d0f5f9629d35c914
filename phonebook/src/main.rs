use std::env;

use phonebook::{Command, USAGE};
use record_store::{RecordStore, StoreConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("phonebook");

    let command = match Command::parse(args.get(1..).unwrap_or_default()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: {} [mode] [args...]", program);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    };

    let config = StoreConfig::from_env()?;
    let store = RecordStore::connect(&config).await?;

    let mut stdout = std::io::stdout().lock();
    phonebook::run(&store, command, &mut stdout).await?;

    Ok(())
}
