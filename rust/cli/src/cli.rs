use clap::{Args, Parser, Subcommand};

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(
    name = "war",
    version,
    about = "Two-player War card game over TCP: server, client and load driver"
)]
pub struct WarCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Where the server listens, or where clients dial.
#[derive(Args, Debug, Clone, Default)]
pub struct Endpoint {
    /// Host name or IP address
    #[arg(long)]
    pub host: Option<String>,
    /// TCP port
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the game server until interrupted
    Server {
        #[command(flatten)]
        endpoint: Endpoint,
        /// Base seed; session k is dealt from seed + k
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Play one game and print the result
    Client {
        #[command(flatten)]
        endpoint: Endpoint,
    },
    /// Run many clients concurrently against a server
    Clients {
        #[command(flatten)]
        endpoint: Endpoint,
        /// Number of clients to launch
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        count: u64,
        /// Maximum clients connected at once
        #[arg(long)]
        concurrency: Option<usize>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show resolved configuration and where each value came from
    Cfg,
}

impl Endpoint {
    pub fn into_overrides(self) -> Overrides {
        Overrides {
            host: self.host,
            port: self.port,
            ..Overrides::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_subcommand() {
        let commands = vec![
            vec!["war", "server"],
            vec!["war", "server", "--host", "0.0.0.0", "--port", "5000", "--seed", "7"],
            vec!["war", "client", "--port", "5000"],
            vec!["war", "clients", "--count", "10"],
            vec!["war", "clients", "--count", "10", "--concurrency", "2", "--json"],
            vec!["war", "cfg"],
        ];
        for args in commands {
            let result = WarCli::try_parse_from(&args);
            assert!(result.is_ok(), "Failed to parse: {:?}", args);
        }
    }

    #[test]
    fn clients_requires_positive_count() {
        assert!(WarCli::try_parse_from(["war", "clients"]).is_err());
        assert!(WarCli::try_parse_from(["war", "clients", "--count", "0"]).is_err());
    }

    #[test]
    fn endpoint_flags_become_overrides() {
        let cli = WarCli::try_parse_from(["war", "client", "--host", "example.org"]).unwrap();
        let Commands::Client { endpoint } = cli.cmd else {
            panic!("expected client subcommand");
        };
        let overrides = endpoint.into_overrides();
        assert_eq!(overrides.host.as_deref(), Some("example.org"));
        assert_eq!(overrides.port, None);
    }
}
