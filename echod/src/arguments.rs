use clap::Parser;
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(author, version)]
pub struct Arguments {
    /// Socket to bind on
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    pub socket: SocketAddr,

    /// Close a connection after this much inactivity
    #[arg(short, long, default_value = "60s")]
    pub idle_timeout: humantime::Duration,

    /// Cap on simultaneous connections (unlimited by default)
    #[arg(short, long)]
    pub max_conns: Option<usize>,

    /// How long to wait for open connections to drain on shutdown
    #[arg(short, long, default_value = "5s")]
    pub grace_period: humantime::Duration,
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults() {
        let args = Arguments::parse_from(["echod"]);
        assert_eq!(args.socket, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(Duration::from(args.idle_timeout), Duration::from_secs(60));
        assert_eq!(args.max_conns, None);
        assert_eq!(Duration::from(args.grace_period), Duration::from_secs(5));
    }

    #[test]
    fn overrides() {
        let args = Arguments::parse_from([
            "echod",
            "--socket",
            "127.0.0.1:9999",
            "--idle-timeout",
            "250ms",
            "--max-conns",
            "32",
        ]);
        assert_eq!(args.socket, "127.0.0.1:9999".parse().unwrap());
        assert_eq!(
            Duration::from(args.idle_timeout),
            Duration::from_millis(250)
        );
        assert_eq!(args.max_conns, Some(32));
    }
}
