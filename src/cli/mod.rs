pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "courtside")]
#[command(about = "Courtside - club management API server")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP server (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Apply database migrations")]
    Migrate,

    #[command(about = "Platform administrator accounts")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::handle(args).await,
        None => commands::serve::handle(Default::default()).await,
        Some(Commands::Migrate) => commands::migrate::handle(output_format).await,
        Some(Commands::Admin { cmd }) => commands::admin::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_serves() {
        let cli = Cli::try_parse_from(["courtside"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from(["courtside", "serve", "--port", "8080", "--memory"]).unwrap();
        match cli.command {
            Some(Commands::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert!(args.memory);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn admin_create_parses() {
        let cli = Cli::try_parse_from([
            "courtside", "--json", "admin", "create", "--email", "root@club.com", "--name", "Root",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::Admin { .. })));
    }
}
