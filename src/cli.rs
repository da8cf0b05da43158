use clap::Parser;

/// Measures TCP connect latency by repeatedly opening a fresh connection
/// to a host, one probe per second, ping-style.
#[derive(Debug, Parser)]
#[command(name = "tcping", version, about)]
pub struct Args {
    /// Host name or IP address to probe.
    pub host: String,

    /// TCP port to connect to.
    #[arg(default_value_t = 22)]
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_to_ssh() {
        let args = Args::try_parse_from(["tcping", "example.com"]).expect("parse");
        assert_eq!(args.host, "example.com");
        assert_eq!(args.port, 22);
    }

    #[test]
    fn explicit_port_wins() {
        let args = Args::try_parse_from(["tcping", "example.com", "443"]).expect("parse");
        assert_eq!(args.port, 443);
    }

    #[test]
    fn missing_host_is_rejected() {
        assert!(Args::try_parse_from(["tcping"]).is_err());
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        assert!(Args::try_parse_from(["tcping", "example.com", "ssh"]).is_err());
    }
}
