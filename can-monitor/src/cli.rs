use can_source::SourceConfig;
use can_source::replay::DEFAULT_SPEED_SCALE;
use can_source::serial::DEFAULT_BAUD_RATE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CAN bus monitor
#[derive(Parser, Debug)]
#[command(version, about = "Print CAN frames from a serial device or a candump log", long_about = None)]
pub struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log malformed lines and keep going instead of stopping
    #[arg(long)]
    pub skip_invalid: bool,

    /// Stop after this many frames
    #[arg(short = 'n', long)]
    pub limit: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read frames pushed by a device over a serial port
    Serial {
        /// Device path, e.g. /dev/ttyACM0
        device: String,
        #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
        baud: u32,
    },

    /// Replay a candump log with its original timing
    Replay {
        file: PathBuf,
        /// Replay speed multiplier, 2.0 is twice as fast
        #[arg(short, long, default_value_t = DEFAULT_SPEED_SCALE)]
        speed: f64,
    },
}

impl Commands {
    pub fn to_source_config(&self) -> SourceConfig {
        match self {
            Commands::Serial { device, baud } => SourceConfig::Serial {
                device: device.clone(),
                baud_rate: *baud,
            },
            Commands::Replay { file, speed } => SourceConfig::Replay {
                file: file.clone(),
                speed_scale: *speed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_subcommand_defaults() {
        let args = Args::parse_from(["can-monitor", "serial", "/dev/ttyACM0"]);

        assert_eq!(
            args.command.unwrap().to_source_config(),
            SourceConfig::Serial {
                device: "/dev/ttyACM0".into(),
                baud_rate: 115_200
            }
        );
    }

    #[test]
    fn replay_subcommand_with_options() {
        let args = Args::parse_from([
            "can-monitor",
            "--skip-invalid",
            "-n",
            "10",
            "replay",
            "capture.log",
            "--speed",
            "4",
        ]);

        assert!(args.skip_invalid);
        assert_eq!(args.limit, Some(10));
        assert_eq!(
            args.command.unwrap().to_source_config(),
            SourceConfig::Replay {
                file: "capture.log".into(),
                speed_scale: 4.0
            }
        );
    }

    #[test]
    fn subcommand_is_optional() {
        let args = Args::parse_from(["can-monitor", "--config", "monitor.toml"]);

        assert!(args.command.is_none());
        assert_eq!(args.config, Some(PathBuf::from("monitor.toml")));
    }
}
