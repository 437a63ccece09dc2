//! Analog data-acquisition sessions streamed to CSV.
//!
//! One acquisition thread reads fixed-size sample blocks from an ADC device
//! and pushes them through a bounded queue to a writer thread, which appends
//! them to a CSV file inside a timestamped session folder. A
//! [`SessionController`] owns the start/stop lifecycle; the terminal
//! front-end in [`tui`] drives it with command messages.

mod acquisition;
mod block;
mod config;
mod driver;
mod error;
mod queue;
mod session;
mod tui;
mod utils;
mod writer;

pub use acquisition::acquisition_loop;
pub use block::SampleBlock;
pub use config::{
    AcquisitionSettings, ChannelList, DeviceSettings, OutputSettings, SessionConfig,
};
pub use driver::{open_driver, AdcDriver, ReadOutcome, SimAdc};
pub use error::DaqError;
pub use queue::{sample_queue, BlockReceiver, BlockSender, QueueClosed};
pub use session::{SessionCommand, SessionController, SessionState};
pub use tui::Status;
pub use utils::Counter;
pub use writer::{writer_loop, BlockSink, CsvWriter};
