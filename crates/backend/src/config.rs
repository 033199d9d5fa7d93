use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use clap::Parser;
use log::LevelFilter;

#[derive(Debug, Clone, Parser)]
#[command(name = "backend")]
#[command(about = "Lobby server for 5-6 player Catan")]
pub struct Config {
    #[arg(long, env = "LOBBY_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    #[arg(short, long, env = "LOBBY_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory holding the built frontend.
    #[arg(long, env = "LOBBY_STATIC_DIR", default_value = "crates/frontend/dist")]
    pub static_dir: PathBuf,

    /// Seats per lobby.
    #[arg(long, env = "LOBBY_MAX_PLAYERS", default_value_t = 6,
          value_parser = clap::value_parser!(u8).range(2..=6))]
    pub max_players: u8,

    /// Lobbies that may exist at once; creating more fails.
    #[arg(long, env = "LOBBY_MAX_LOBBIES", default_value_t = 1000)]
    pub max_lobbies: usize,

    /// Buffered change notifications before a slow connection has to resync.
    #[arg(long, env = "LOBBY_EVENT_CAPACITY", default_value_t = 100)]
    pub event_capacity: usize,

    #[arg(long, env = "LOG_LEVEL", default_value_t = LevelFilter::Info, value_parser = parse_level)]
    pub log_level: LevelFilter,
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse().map_err(|_| format!("unknown log level '{s}'"))
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::parse_from(["backend"]);
        assert_eq!(config.addr(), "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.max_players, 6);
        assert_eq!(config.max_lobbies, 1000);
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn parses_log_levels() {
        let config = Config::parse_from(["backend", "--log-level", "debug"]);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(Config::try_parse_from(["backend", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn rejects_oversized_lobbies() {
        assert!(Config::try_parse_from(["backend", "--max-players", "7"]).is_err());
        let config = Config::try_parse_from(["backend", "--max-players", "4", "--port", "8080"]).unwrap();
        assert_eq!(config.max_players, 4);
        assert_eq!(config.port, 8080);
    }
}
