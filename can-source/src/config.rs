use crate::replay::{DEFAULT_SPEED_SCALE, ReplayFrameSource};
use crate::serial::{DEFAULT_BAUD_RATE, SerialFrameSource};
use crate::source::AnySource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which source to build, and its construction parameters.
///
/// Deserializes from a table tagged by `kind`:
///
/// ```toml
/// kind = "replay"
/// file = "capture.log"
/// speed_scale = 2.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    Serial {
        device: String,
        #[serde(default = "default_baud_rate")]
        baud_rate: u32,
    },
    Replay {
        file: PathBuf,
        #[serde(default = "default_speed_scale")]
        speed_scale: f64,
    },
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_speed_scale() -> f64 {
    DEFAULT_SPEED_SCALE
}

impl SourceConfig {
    /// Builds the configured source. It still has to be opened.
    pub fn build(&self) -> AnySource {
        match self {
            SourceConfig::Serial { device, baud_rate } => {
                SerialFrameSource::new(device.as_str(), *baud_rate).into()
            }
            SourceConfig::Replay { file, speed_scale } => {
                ReplayFrameSource::new(file, *speed_scale).into()
            }
        }
    }
}

impl fmt::Display for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceConfig::Serial { device, baud_rate } => {
                write!(f, "serial device {} at {} baud", device, baud_rate)
            }
            SourceConfig::Replay { file, speed_scale } => {
                write!(f, "capture {} at {}x", file.display(), speed_scale)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageSource;
    use ::config::{Config, File, FileFormat};

    fn load(toml: &str) -> SourceConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn serial_with_default_baud_rate() {
        let config = load(
            r#"
            kind = "serial"
            device = "/dev/ttyACM0"
            "#,
        );

        assert_eq!(
            config,
            SourceConfig::Serial {
                device: "/dev/ttyACM0".into(),
                baud_rate: 115_200
            }
        );
    }

    #[test]
    fn replay_with_speed_scale() {
        let config = load(
            r#"
            kind = "replay"
            file = "capture.log"
            speed_scale = 2.5
            "#,
        );

        assert_eq!(
            config,
            SourceConfig::Replay {
                file: "capture.log".into(),
                speed_scale: 2.5
            }
        );
    }

    #[test]
    fn builds_the_matching_variant() {
        let serial = SourceConfig::Serial {
            device: "/dev/ttyUSB1".into(),
            baud_rate: 9600,
        };
        match serial.build() {
            AnySource::Serial(source) => {
                assert_eq!(source.device_path(), "/dev/ttyUSB1");
                assert_eq!(source.settings().baud_rate, 9600);
                assert!(!source.is_open());
            }
            AnySource::Replay(_) => panic!("expected a serial source"),
        }

        let replay = SourceConfig::Replay {
            file: "capture.log".into(),
            speed_scale: -1.0,
        };
        match replay.build() {
            AnySource::Replay(source) => {
                assert_eq!(source.path(), std::path::Path::new("capture.log"));
                assert_eq!(source.speed_scale(), 1.0);
            }
            AnySource::Serial(_) => panic!("expected a replay source"),
        }
    }

    #[test]
    fn display() {
        let config = SourceConfig::Replay {
            file: "capture.log".into(),
            speed_scale: 2.0,
        };
        assert_eq!(config.to_string(), "capture capture.log at 2x");
    }
}
