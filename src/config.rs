use crate::DaqError;
use confique::Config;
use serde::Deserialize;

/// Settings for one acquisition session, loaded from TOML before start and
/// immutable while a session is running.
#[derive(Config, Debug, Clone)]
pub struct SessionConfig {
    #[config(nested)]
    pub device: DeviceSettings,
    #[config(nested)]
    pub acquisition: AcquisitionSettings,
    #[config(nested)]
    pub output: OutputSettings,
}

#[derive(Config, Debug, Clone)]
pub struct DeviceSettings {
    /// Device name as the driver knows it, e.g. "dev0".
    pub name: String,
    /// Analog-input channels to sample, e.g. [0, 1] or "0,1".
    pub channels: ChannelList,
}

#[derive(Config, Debug, Clone)]
pub struct AcquisitionSettings {
    /// Sample clock rate in Hz.
    pub sampling_rate: f64,
    /// Samples pulled from the device per read call (one block).
    pub read_samples: usize,
    /// Capacity of the block queue between reader and writer, in blocks.
    pub max_queue_blocks: usize,
}

#[derive(Config, Debug, Clone)]
pub struct OutputSettings {
    /// Directory under which each session creates a timestamped folder.
    pub save_file_dir: String,
    #[config(default = "measured_data.csv")]
    pub save_file_name: String,
}

/// Channel selection, either an explicit list or the comma form "0,1".
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum ChannelList {
    List(Vec<u32>),
    Spec(String),
}

impl ChannelList {
    /// Resolve to an ordered channel list. Order is preserved as written;
    /// CSV columns follow it.
    pub fn resolve(&self) -> Result<Vec<u32>, DaqError> {
        let channels = match self {
            ChannelList::List(list) => list.clone(),
            ChannelList::Spec(spec) => spec
                .split(',')
                .map(|part| {
                    part.trim()
                        .parse::<u32>()
                        .map_err(|_| DaqError::config(format!("bad channel '{}'", part.trim())))
                })
                .collect::<Result<Vec<u32>, DaqError>>()?,
        };
        if channels.is_empty() {
            return Err(DaqError::config("no channels selected"));
        }
        Ok(channels)
    }
}

impl SessionConfig {
    /// Reject bad settings before any thread is spawned.
    pub fn validate(&self) -> Result<(), DaqError> {
        if self.device.name.trim().is_empty() {
            return Err(DaqError::config("device name is empty"));
        }
        self.device.channels.resolve()?;
        if !(self.acquisition.sampling_rate > 0.0) || !self.acquisition.sampling_rate.is_finite() {
            return Err(DaqError::config(format!(
                "sampling_rate must be positive, got {}",
                self.acquisition.sampling_rate
            )));
        }
        if self.acquisition.read_samples == 0 {
            return Err(DaqError::config("read_samples must be positive"));
        }
        if self.acquisition.max_queue_blocks == 0 {
            return Err(DaqError::config("max_queue_blocks must be positive"));
        }
        if self.output.save_file_dir.trim().is_empty() {
            return Err(DaqError::config("save_file_dir is empty"));
        }
        if self.output.save_file_name.trim().is_empty() {
            return Err(DaqError::config("save_file_name is empty"));
        }
        Ok(())
    }

    pub fn channels(&self) -> Result<Vec<u32>, DaqError> {
        self.device.channels.resolve()
    }

    /// One "key: value" line per setting, exported next to the CSV so a run
    /// can be reproduced later.
    pub fn render_settings(&self) -> String {
        let channels = match self.device.channels.resolve() {
            Ok(list) => list
                .iter()
                .map(|ch| ch.to_string())
                .collect::<Vec<_>>()
                .join(","),
            Err(_) => String::new(),
        };
        format!(
            "device: {}\nchannels: {}\nsampling_rate: {}\nread_samples: {}\nmax_queue_blocks: {}\nsave_file_dir: {}\nsave_file_name: {}\n",
            self.device.name,
            channels,
            self.acquisition.sampling_rate,
            self.acquisition.read_samples,
            self.acquisition.max_queue_blocks,
            self.output.save_file_dir,
            self.output.save_file_name,
        )
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> SessionConfig {
    SessionConfig {
        device: DeviceSettings {
            name: "dev0".into(),
            channels: ChannelList::List(vec![0, 1]),
        },
        acquisition: AcquisitionSettings {
            sampling_rate: 1000.0,
            read_samples: 100,
            max_queue_blocks: 4,
        },
        output: OutputSettings {
            save_file_dir: "/tmp".into(),
            save_file_name: "measured_data.csv".into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn zero_read_samples_rejected() {
        let mut cfg = test_config();
        cfg.acquisition.read_samples = 0;
        assert!(matches!(cfg.validate(), Err(DaqError::Config(_))));
    }

    #[test]
    fn nonpositive_rate_rejected() {
        let mut cfg = test_config();
        cfg.acquisition.sampling_rate = 0.0;
        assert!(matches!(cfg.validate(), Err(DaqError::Config(_))));
        cfg.acquisition.sampling_rate = -10.0;
        assert!(matches!(cfg.validate(), Err(DaqError::Config(_))));
    }

    #[test]
    fn zero_queue_capacity_rejected() {
        let mut cfg = test_config();
        cfg.acquisition.max_queue_blocks = 0;
        assert!(matches!(cfg.validate(), Err(DaqError::Config(_))));
    }

    #[test]
    fn channel_spec_comma_form() {
        let list = ChannelList::Spec("0, 1,3".into());
        assert_eq!(list.resolve().unwrap(), vec![0, 1, 3]);
    }

    #[test]
    fn channel_spec_garbage_rejected() {
        let list = ChannelList::Spec("0,x".into());
        assert!(list.resolve().is_err());
    }

    #[test]
    fn empty_channel_list_rejected() {
        let list = ChannelList::List(vec![]);
        assert!(list.resolve().is_err());
    }
}
