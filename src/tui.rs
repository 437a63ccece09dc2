use crate::{Counter, SessionCommand, SessionConfig, SessionController, SessionState};
use anyhow::Result;
use crossbeam_channel::{tick, unbounded, Sender};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Stylize,
    symbols::border,
    text::{Line, Text},
    widgets::{Block, Paragraph, Widget},
    DefaultTerminal, Frame,
};
use std::thread;
use std::time::{Duration, Instant};

/// Terminal front-end: draws session status once per tick and turns key
/// presses into session commands.
#[derive(Debug)]
pub struct Status {
    pub counter: Counter,
    pub queue_len: usize,
    pub config: SessionConfig,
    state: SessionState,
    error: Option<String>,
    exit: bool,
}

impl Status {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            counter: Counter::new(),
            queue_len: 0,
            config,
            state: SessionState::Idle,
            error: None,
            exit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let ticker = tick(Duration::from_millis(250));
        let (tx_stats, rx_stats) = unbounded();
        let (tx_cmds, rx_cmds) = unbounded();
        let mut controller = SessionController::new(tx_stats);

        while !self.exit {
            let _ = ticker.recv();

            // Drain stats channel
            while let Ok((rows, queue_len)) = rx_stats.try_recv() {
                self.counter.increment(rows);
                self.queue_len = queue_len;
            }

            self.handle_events(&tx_cmds)?;
            while let Ok(command) = rx_cmds.try_recv() {
                if matches!(command, SessionCommand::Start(_)) {
                    self.counter.reset();
                    self.queue_len = 0;
                }
                controller.handle_command(command);
            }

            controller.poll();
            self.state = controller.state();
            self.error = controller.last_error().map(str::to_string);

            terminal.draw(|f| self.draw(f))?;
        }

        // Let the workers wind down before the terminal is restored.
        controller.stop();
        let deadline = Instant::now() + Duration::from_secs(5);
        while matches!(
            controller.state(),
            SessionState::Running | SessionState::Stopping
        ) && Instant::now() < deadline
        {
            controller.poll();
            thread::sleep(Duration::from_millis(10));
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    fn handle_events(&mut self, tx_cmds: &Sender<SessionCommand>) -> Result<()> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    self.handle_key_event(key_event, tx_cmds)
                }
                _ => {}
            };
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key_event: KeyEvent, tx_cmds: &Sender<SessionCommand>) {
        match key_event.code {
            KeyCode::Char('s') => {
                let _ = tx_cmds.send(SessionCommand::Start(self.config.clone()));
            }
            KeyCode::Char('t') => {
                let _ = tx_cmds.send(SessionCommand::Stop);
            }
            KeyCode::Char('a') => {
                let _ = tx_cmds.send(SessionCommand::Acknowledge);
            }
            KeyCode::Char('q') => self.exit = true,
            _ => {}
        }
    }
}

impl Widget for &Status {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = Line::from(format!(" {} Acquisition ", self.config.device.name).bold());
        let instructions = Line::from(vec![
            " Start ".into(),
            "<S>".blue().bold(),
            " Stop ".into(),
            "<T>".blue().bold(),
            " Ack ".into(),
            "<A>".blue().bold(),
            " Quit ".into(),
            "<Q> ".blue().bold(),
        ]);
        let block = Block::bordered()
            .title(title.centered())
            .title_bottom(instructions.centered())
            .border_set(border::THICK);

        let state = match self.state {
            SessionState::Running => self.state.to_string().green(),
            SessionState::Failed => self.state.to_string().red(),
            _ => self.state.to_string().yellow(),
        };
        let mut lines = vec![Line::from(vec![
            "State: ".into(),
            state,
            "  Elapsed: ".into(),
            self.counter.t_begin.elapsed().as_secs().to_string().yellow(),
            " s".into(),
            "  Rows: ".into(),
            self.counter.n_rows.to_string().yellow(),
            "  Rate: ".into(),
            format!("{:.1}", self.counter.rate()).yellow(),
            " kS/s".into(),
            "  Queue: ".into(),
            self.queue_len.to_string().yellow(),
        ])];
        if let Some(error) = &self.error {
            lines.push(Line::from(vec!["Error: ".into(), error.clone().red()]));
        }

        Paragraph::new(Text::from(lines))
            .centered()
            .block(block)
            .render(area, buf);
    }
}
