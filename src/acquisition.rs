use crate::{AdcDriver, BlockSender, DaqError, ReadOutcome, SampleBlock};
use log::{error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use time::OffsetDateTime;

/// Acquisition thread body: read fixed-size blocks from the device and push
/// them into the queue until cancelled or the device fails.
///
/// Cancellation is checked once per iteration, never mid-read; a read in
/// flight when `shutdown` is raised still gets pushed. Returning (on any
/// path) drops the sender, which closes the queue so the writer can drain
/// and exit. Returns the number of blocks pushed.
pub fn acquisition_loop(
    mut driver: Box<dyn AdcDriver>,
    read_samples: usize,
    sampling_rate: f64,
    tx: BlockSender,
    shutdown: Arc<AtomicBool>,
) -> Result<u64, DaqError> {
    let dt_ns = 1e9 / sampling_rate;
    let mut seq = 0u64;
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        let t0_ns = OffsetDateTime::now_utc().unix_timestamp_nanos() as u64;
        match driver.read_block(read_samples) {
            Ok(ReadOutcome::Block(channel_data)) => {
                let block = SampleBlock {
                    seq,
                    t0_ns,
                    dt_ns,
                    channel_data,
                };
                if tx.push(block).is_err() {
                    // Writer is gone; its error is already on its way to the
                    // controller.
                    break;
                }
                seq += 1;
            }
            Ok(ReadOutcome::Timeout) => continue,
            Ok(ReadOutcome::Stopped) => break,
            Err(e) => {
                error!("hardware read failed on block {seq}: {e}");
                if let Err(close_err) = driver.close() {
                    error!("driver close after failure: {close_err}");
                }
                return Err(e);
            }
        }
    }
    if let Err(e) = driver.close() {
        error!("driver close: {e}");
    }
    info!("acquisition done, {seq} blocks");
    tx.close();
    Ok(seq)
}
