use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gridcast")]
#[command(version = "0.1.0")]
#[command(about = "Live NFL contest tracker publishing short text bulletins", long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and environment overlays
    #[arg(long, env = "GRIDCAST_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,

    /// Run a single poll cycle and exit
    #[arg(long)]
    pub once: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["gridcast"]).unwrap();
        assert!(!cli.once);
        // GRIDCAST_CONFIG_DIR may be set in the test environment
        if std::env::var_os("GRIDCAST_CONFIG_DIR").is_none() {
            assert_eq!(cli.config_dir, PathBuf::from("config"));
        }
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["gridcast", "--config-dir", "/etc/gridcast", "--once"])
            .unwrap();
        assert!(cli.once);
        assert_eq!(cli.config_dir, PathBuf::from("/etc/gridcast"));
    }

    #[test]
    fn test_rejects_subcommands() {
        assert!(Cli::try_parse_from(["gridcast", "run"]).is_err());
    }
}
