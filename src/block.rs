/// One batch of samples produced by a single hardware read.
///
/// Blocks travel from the acquisition thread to the writer thread in read
/// order; `seq` is strictly increasing within a session with no gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBlock {
    /// 0-based position of this block within the session.
    pub seq: u64,
    /// Wall-clock time of the first sample, in nanoseconds.
    pub t0_ns: u64,
    /// Nanoseconds between consecutive samples (1e9 / sampling rate).
    pub dt_ns: f64,
    /// Per-channel sample vectors, all of equal length, in channel order.
    pub channel_data: Vec<Vec<f64>>,
}

impl SampleBlock {
    pub fn n_channels(&self) -> usize {
        self.channel_data.len()
    }

    pub fn n_samples(&self) -> usize {
        self.channel_data.first().map_or(0, |ch| ch.len())
    }

    /// Timestamp of sample `i`, interpolated across the block from the read
    /// start time.
    pub fn timestamp_ns(&self, i: usize) -> f64 {
        self.t0_ns as f64 + i as f64 * self.dt_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_interpolate_across_block() {
        let block = SampleBlock {
            seq: 0,
            t0_ns: 1_000,
            dt_ns: 1e9 / 1000.0,
            channel_data: vec![vec![0.0; 100]],
        };
        assert_eq!(block.timestamp_ns(0), 1_000.0);
        assert_eq!(block.timestamp_ns(1), 1_000.0 + 1e6);
        // Last sample sits one dt short of the next block's start.
        assert_eq!(block.timestamp_ns(99), 1_000.0 + 99.0 * 1e6);
    }

    #[test]
    fn shape_accessors() {
        let block = SampleBlock {
            seq: 3,
            t0_ns: 0,
            dt_ns: 1.0,
            channel_data: vec![vec![0.0; 8], vec![0.0; 8]],
        };
        assert_eq!(block.n_channels(), 2);
        assert_eq!(block.n_samples(), 8);
    }
}
