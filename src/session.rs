use crate::{
    acquisition_loop, open_driver, sample_queue, writer_loop, AdcDriver, BlockSink, CsvWriter,
    DaqError, SessionConfig,
};
use crossbeam_channel::Sender;
use log::{error, info, warn};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Lifecycle of the single acquisition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopping,
    Stopped,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Stopping => "stopping",
            SessionState::Stopped => "stopped",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Commands the front-end sends the controller. Keeping these explicit
/// messages decouples key handling from the worker lifecycle.
pub enum SessionCommand {
    Start(SessionConfig),
    Stop,
    Acknowledge,
}

type DriverFactory = Box<dyn Fn(&SessionConfig) -> Result<Box<dyn AdcDriver>, DaqError> + Send>;
type SinkFactory = Box<dyn Fn(&SessionConfig) -> Result<Box<dyn BlockSink>, DaqError> + Send>;

struct ActiveSession {
    shutdown: Arc<AtomicBool>,
    acq_handle: JoinHandle<Result<u64, DaqError>>,
    writer_handle: JoinHandle<Result<u64, DaqError>>,
}

/// Owns session state and the two worker threads. Exactly one session is
/// active at a time.
///
/// Worker failures come back through the thread results at join time;
/// `poll` reaps finished workers and drives the state transitions, so the
/// front-end calls it once per tick.
pub struct SessionController {
    driver_factory: DriverFactory,
    sink_factory: SinkFactory,
    stats_tx: Sender<(usize, usize)>,
    state: SessionState,
    last_error: Option<String>,
    active: Option<ActiveSession>,
}

impl SessionController {
    /// Controller wired to the real driver and the CSV sink. `stats_tx`
    /// receives one (rows, queue depth) pair per written block.
    pub fn new(stats_tx: Sender<(usize, usize)>) -> Self {
        Self::with_parts(
            Box::new(open_driver),
            Box::new(|config| {
                CsvWriter::create(config).map(|w| Box::new(w) as Box<dyn BlockSink>)
            }),
            stats_tx,
        )
    }

    pub fn with_parts(
        driver_factory: DriverFactory,
        sink_factory: SinkFactory,
        stats_tx: Sender<(usize, usize)>,
    ) -> Self {
        Self {
            driver_factory,
            sink_factory,
            stats_tx,
            state: SessionState::Idle,
            last_error: None,
            active: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Message for the front-end to display; set on worker failure and on a
    /// rejected start.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start(config) => {
                if let Err(e) = self.start(config) {
                    warn!("start rejected: {e}");
                    self.last_error = Some(e.to_string());
                }
            }
            SessionCommand::Stop => self.stop(),
            SessionCommand::Acknowledge => self.acknowledge(),
        }
    }

    /// Validate the config, open the output file, create the queue and spawn
    /// both workers. Rejected unless the controller is idle (a finished
    /// session counts as idle once a new start arrives).
    pub fn start(&mut self, config: SessionConfig) -> Result<(), DaqError> {
        match self.state {
            SessionState::Idle | SessionState::Stopped | SessionState::Failed => {}
            SessionState::Running | SessionState::Stopping => {
                return Err(DaqError::config("a session is already active"));
            }
        }
        config.validate()?;

        // Driver first: a failed open must not leave a session folder with a
        // header-only CSV behind.
        let mut driver = (self.driver_factory)(&config)?;
        let sink = match (self.sink_factory)(&config) {
            Ok(sink) => sink,
            Err(e) => {
                if let Err(close_err) = driver.close() {
                    error!("driver close after sink failure: {close_err}");
                }
                return Err(e);
            }
        };

        let shutdown = Arc::new(AtomicBool::new(false));
        let (tx, rx) = sample_queue(config.acquisition.max_queue_blocks);

        let read_samples = config.acquisition.read_samples;
        let sampling_rate = config.acquisition.sampling_rate;
        let acq_shutdown = Arc::clone(&shutdown);
        let acq_handle = thread::spawn(move || {
            acquisition_loop(driver, read_samples, sampling_rate, tx, acq_shutdown)
        });

        let stats_tx = self.stats_tx.clone();
        let writer_shutdown = Arc::clone(&shutdown);
        let writer_handle = thread::spawn(move || writer_loop(rx, sink, stats_tx, writer_shutdown));

        self.active = Some(ActiveSession {
            shutdown,
            acq_handle,
            writer_handle,
        });
        self.last_error = None;
        self.state = SessionState::Running;
        info!(
            "session started: {} ch at {} Hz, {} samples/block",
            config.device.name, sampling_rate, read_samples
        );
        Ok(())
    }

    /// Request cancellation. No-op unless running, so repeated stops are
    /// harmless.
    pub fn stop(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        if let Some(active) = &self.active {
            active.shutdown.store(true, Ordering::SeqCst);
        }
        self.state = SessionState::Stopping;
        info!("stop requested");
    }

    /// Reap finished workers and advance the state machine. Non-blocking;
    /// call once per UI tick.
    pub fn poll(&mut self) {
        let both_done = self
            .active
            .as_ref()
            .is_some_and(|a| a.acq_handle.is_finished() && a.writer_handle.is_finished());
        if !both_done {
            return;
        }
        let Some(active) = self.active.take() else {
            return;
        };

        let mut failure: Option<String> = None;
        match active.acq_handle.join() {
            Ok(Ok(blocks)) => info!("acquisition worker finished after {blocks} blocks"),
            Ok(Err(e)) => failure = Some(e.to_string()),
            Err(_) => failure = Some("acquisition thread panicked".into()),
        }
        match active.writer_handle.join() {
            Ok(Ok(blocks)) => info!("writer worker finished after {blocks} blocks"),
            Ok(Err(e)) => {
                if failure.is_none() {
                    failure = Some(e.to_string());
                }
            }
            Err(_) => {
                if failure.is_none() {
                    failure = Some("writer thread panicked".into());
                }
            }
        }

        match failure {
            Some(msg) => {
                error!("session failed: {msg}");
                self.last_error = Some(msg);
                self.state = SessionState::Failed;
            }
            None => {
                self.state = SessionState::Stopped;
                info!("session stopped");
            }
        }
    }

    /// Front-end acknowledged a finished or failed session.
    pub fn acknowledge(&mut self) {
        if matches!(self.state, SessionState::Stopped | SessionState::Failed) {
            self.state = SessionState::Idle;
            self.last_error = None;
        }
    }
}
