use crate::{BlockReceiver, DaqError, SampleBlock, SessionConfig};
use crossbeam_channel::Sender;
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use time::macros::format_description;
use time::OffsetDateTime;

/// Destination for sample blocks. `CsvWriter` is the shipping
/// implementation; tests substitute their own.
pub trait BlockSink: Send {
    fn append(&mut self, block: &SampleBlock) -> Result<(), DaqError>;

    /// Flush buffered rows; called once after the last block.
    fn finish(&mut self) -> Result<(), DaqError>;
}

/// Streams blocks into a CSV file inside a fresh timestamped session folder.
///
/// Layout mirrors what lab users expect from earlier tooling:
/// `<save_file_dir>/<YYYYmmddHHMMSS>/setting.txt` holds the effective config,
/// the CSV sits next to it with a `timestamp,ch_<i>,...` header and one row
/// per sample.
pub struct CsvWriter {
    writer: csv::Writer<fs::File>,
    path: PathBuf,
}

impl CsvWriter {
    pub fn create(config: &SessionConfig) -> Result<Self, DaqError> {
        let channels = config.channels()?;

        let stamp_format = format_description!("[year][month][day][hour][minute][second]");
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let stamp = now
            .format(stamp_format)
            .map_err(|e| DaqError::config(format!("bad session timestamp: {e}")))?;

        let session_dir = Path::new(&config.output.save_file_dir).join(stamp);
        fs::create_dir_all(&session_dir)?;
        fs::write(session_dir.join("setting.txt"), config.render_settings())?;

        let path = session_dir.join(&config.output.save_file_name);
        let mut writer = csv::Writer::from_path(&path)?;

        let mut header = vec!["timestamp".to_string()];
        header.extend(channels.iter().map(|ch| format!("ch_{ch}")));
        writer.write_record(&header)?;
        writer.flush()?;

        info!("writing to {}", path.display());
        Ok(Self { writer, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlockSink for CsvWriter {
    fn append(&mut self, block: &SampleBlock) -> Result<(), DaqError> {
        // A driver handing back ragged per-channel vectors is a driver bug;
        // reject the block instead of panicking the writer thread.
        let n_samples = block.n_samples();
        if let Some(short) = block
            .channel_data
            .iter()
            .position(|ch| ch.len() != n_samples)
        {
            return Err(DaqError::hardware(format!(
                "ragged block {}: channel {} has {} samples, expected {}",
                block.seq,
                short,
                block.channel_data[short].len(),
                n_samples
            )));
        }

        let mut record = Vec::with_capacity(1 + block.n_channels());
        for i in 0..n_samples {
            record.clear();
            record.push(format!("{:.0}", block.timestamp_ns(i)));
            for channel in &block.channel_data {
                record.push(channel[i].to_string());
            }
            self.writer.write_record(&record)?;
        }
        // One flush per block keeps rows on disk whole.
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DaqError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writer thread body: drain the queue into the sink until the queue closes
/// or a write fails.
///
/// A failed write raises `shutdown` so the acquisition side stops promptly;
/// dropping the receiver on return unblocks a producer stalled in push.
/// Per-block stats (rows written, queue depth) go to the UI over `stats_tx`.
pub fn writer_loop(
    rx: BlockReceiver,
    mut sink: Box<dyn BlockSink>,
    stats_tx: Sender<(usize, usize)>,
    shutdown: Arc<AtomicBool>,
) -> Result<u64, DaqError> {
    let mut blocks_written = 0u64;
    while let Some(block) = rx.pop() {
        if let Err(e) = sink.append(&block) {
            error!("write failed on block {}: {e}", block.seq);
            shutdown.store(true, Ordering::SeqCst);
            return Err(e);
        }
        blocks_written += 1;
        let _ = stats_tx.send((block.n_samples(), rx.len()));
    }
    sink.finish()?;
    info!("writer done, {blocks_written} blocks");
    Ok(blocks_written)
}
