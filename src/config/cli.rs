// Command line arguments

use clap::Parser;

/// Default config file, looked up without extension (config.toml, config.json, ...)
pub const DEFAULT_CONFIG_FILE: &str = "config";

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "rust_calc_server")]
#[command(about = "HTTP calculator: POST query={\"op\":\"+\",\"ops\":[1,2,3]} to /")]
pub struct CliArgs {
    /// Port to listen on (overrides config file and environment)
    pub port: Option<u16>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,
}

impl CliArgs {
    /// Config file path and whether it must exist
    pub fn config_source(&self) -> (&str, bool) {
        self.config
            .as_deref()
            .map_or((DEFAULT_CONFIG_FILE, false), |path| (path, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let args = CliArgs::try_parse_from(["rust_calc_server"]).unwrap();
        assert_eq!(args.port, None);
        assert_eq!(args.config_source(), (DEFAULT_CONFIG_FILE, false));
    }

    #[test]
    fn test_port_argument() {
        let args = CliArgs::try_parse_from(["rust_calc_server", "9000"]).unwrap();
        assert_eq!(args.port, Some(9000));
    }

    #[test]
    fn test_config_argument() {
        let args =
            CliArgs::try_parse_from(["rust_calc_server", "--config", "calc.toml", "8001"]).unwrap();
        assert_eq!(args.port, Some(8001));
        assert_eq!(args.config_source(), ("calc.toml", true));
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(CliArgs::try_parse_from(["rust_calc_server", "eighty"]).is_err());
        assert!(CliArgs::try_parse_from(["rust_calc_server", "70000"]).is_err());
    }

    #[test]
    fn test_extra_positional_rejected() {
        assert!(CliArgs::try_parse_from(["rust_calc_server", "8000", "9000"]).is_err());
    }
}
