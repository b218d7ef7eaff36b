use std::net::SocketAddr;
use clap::Parser;
use log::{error, info};

use studyrouter::{StudyClient, StudyConfig};

/// HTTP router for the student AI tools
#[derive(Debug, Parser)]
#[command(name = "studyrouter", version, about)]
struct Cli
{   /// Address to bind
    #[arg(long, env = "STUDYROUTER_HOST", default_value = "127.0.0.1")]
    host: String
  , /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16
}

#[tokio::main]
async fn main()
{   // A missing .env is normal in production
    let _ = dotenv::dotenv();
    env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    let cli = Cli::parse();
    let mut config = StudyConfig::from_env();
    config.server.host = cli.host;
    config.server.port = cli.port;

    let addr: SocketAddr = match format!(
      "{}:{}", config.server.host, config.server.port
    ).parse()
    {   Ok(addr) => addr
      , Err(e) => {
          error!("Invalid listen address: {}", e);
          std::process::exit(2);
        }
    };

    for (name, present) in config.credential_status()
    {   info!("{}: {}", name, if present { "set" } else { "missing" });
    }

    let client = match StudyClient::from_config(config)
    {   Ok(client) => client
      , Err(e) => {
          error!("Startup failed: {}", e);
          std::process::exit(1);
        }
    };

    if let Err(e) = studyrouter::server::serve(client, addr).await
    {   error!("Server error: {}", e);
        std::process::exit(1);
    }
}
