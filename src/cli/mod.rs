pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bond-service")]
#[command(about = "Bond Service - personal bond portfolio API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API (default)")]
    Serve {
        #[arg(long, short, help = "Port to listen on, overrides BOND_SERVICE_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Migrate => commands::migrate::handle().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["bond-service"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_accepts_port() {
        let cli = Cli::try_parse_from(["bond-service", "serve", "--port", "9001"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(9001) })));
    }

    #[test]
    fn migrate_subcommand() {
        let cli = Cli::try_parse_from(["bond-service", "migrate"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Migrate)));
    }
}
