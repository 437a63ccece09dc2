use crate::{DaqError, SessionConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use std::thread;
use std::time::Duration;

/// Outcome of one hardware read.
///
/// Drivers report a disarm as `Stopped` and an empty poll as `Timeout` so the
/// acquisition loop can check cancellation between short reads instead of
/// parking inside the driver.
#[derive(Debug)]
pub enum ReadOutcome {
    /// One sample vector per configured channel, each `n_samples` long.
    Block(Vec<Vec<f64>>),
    /// No data available within the driver's own timeout.
    Timeout,
    /// The device has been disarmed; no further data will arrive.
    Stopped,
}

/// The narrow read interface the acquisition core depends on. Device
/// enumeration and calibration stay behind the vendor tooling.
pub trait AdcDriver: Send {
    /// Read one block of `n_samples` values per channel.
    fn read_block(&mut self, n_samples: usize) -> Result<ReadOutcome, DaqError>;

    /// Release the hardware channel.
    fn close(&mut self) -> Result<(), DaqError> {
        Ok(())
    }
}

/// Open the driver named by the config. Only the simulated device ships with
/// the crate; a real NI driver plugs in here.
pub fn open_driver(config: &SessionConfig) -> Result<Box<dyn AdcDriver>, DaqError> {
    let name = config.device.name.trim();
    if name.starts_with("sim") {
        Ok(Box::new(SimAdc::open(config)?))
    } else {
        Err(DaqError::hardware(format!(
            "device '{}' not found (only the simulated device \"sim0\" is built in)",
            name
        )))
    }
}

/// Simulated ADC: a sine carrier per channel with white noise on top, paced
/// to the configured sample clock so reads take as long as real ones would.
pub struct SimAdc {
    sampling_rate: f64,
    n_channels: usize,
    sample_index: u64,
    rng: StdRng,
}

impl SimAdc {
    pub fn open(config: &SessionConfig) -> Result<Self, DaqError> {
        let channels = config.channels()?;
        Ok(Self {
            sampling_rate: config.acquisition.sampling_rate,
            n_channels: channels.len(),
            sample_index: 0,
            rng: StdRng::from_os_rng(),
        })
    }

    fn sample(&mut self, channel: usize, index: u64) -> f64 {
        // 50 Hz carrier, one full-scale volt, phase-shifted per channel.
        let t = index as f64 / self.sampling_rate;
        let phase = channel as f64 * TAU / 8.0;
        (TAU * 50.0 * t + phase).sin() + self.rng.random_range(-0.05..0.05)
    }
}

impl AdcDriver for SimAdc {
    fn read_block(&mut self, n_samples: usize) -> Result<ReadOutcome, DaqError> {
        // A clocked device hands back a block once it has been sampled.
        let read_time = n_samples as f64 / self.sampling_rate;
        thread::sleep(Duration::from_secs_f64(read_time));

        let start = self.sample_index;
        let mut data = Vec::with_capacity(self.n_channels);
        for ch in 0..self.n_channels {
            let mut samples = Vec::with_capacity(n_samples);
            for i in 0..n_samples {
                samples.push(self.sample(ch, start + i as u64));
            }
            data.push(samples);
        }
        self.sample_index = start + n_samples as u64;
        Ok(ReadOutcome::Block(data))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    pub enum Step {
        Block,
        Timeout,
        Stop,
        Fail(String),
    }

    /// Driver that plays back a fixed script of read outcomes. Once the
    /// script runs out it reports timeouts, like an armed device with no
    /// triggers, so the loop keeps polling cancellation. Block `i` is filled
    /// with the value `i` to make write order checkable downstream.
    pub struct ScriptedDriver {
        steps: std::vec::IntoIter<Step>,
        n_channels: usize,
        blocks_read: u64,
        closed: Arc<AtomicBool>,
    }

    impl ScriptedDriver {
        pub fn new(steps: Vec<Step>, n_channels: usize) -> Self {
            Self {
                steps: steps.into_iter(),
                n_channels,
                blocks_read: 0,
                closed: Arc::new(AtomicBool::new(false)),
            }
        }

        pub fn closed_flag(&self) -> Arc<AtomicBool> {
            Arc::clone(&self.closed)
        }
    }

    impl AdcDriver for ScriptedDriver {
        fn read_block(&mut self, n_samples: usize) -> Result<ReadOutcome, DaqError> {
            match self.steps.next() {
                Some(Step::Block) => {
                    let value = self.blocks_read as f64;
                    self.blocks_read += 1;
                    Ok(ReadOutcome::Block(vec![
                        vec![value; n_samples];
                        self.n_channels
                    ]))
                }
                Some(Step::Timeout) | None => {
                    thread::sleep(Duration::from_millis(2));
                    Ok(ReadOutcome::Timeout)
                }
                Some(Step::Stop) => Ok(ReadOutcome::Stopped),
                Some(Step::Fail(msg)) => Err(DaqError::hardware(msg)),
            }
        }

        fn close(&mut self) -> Result<(), DaqError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }
}
