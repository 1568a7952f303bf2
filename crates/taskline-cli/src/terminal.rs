//! Keyboard controls for the countdown loop.
//!
//! Raw mode is held only while waiting for a key, so log lines and progress
//! output printed between polls render normally. Outside raw mode Ctrl+C
//! arrives as SIGINT; a handler records it and the next poll reports it
//! like the key.

use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use taskline_core::timer::{Controls, Signal};

/// Upper bound for a single wait while the alarm is up; the wait repeats.
const ACK_SLICE: Duration = Duration::from_secs(60);

/// Sleep granularity when there is no terminal to poll.
const SIGNAL_SLICE: Duration = Duration::from_millis(100);

pub struct TerminalControls {
    available: bool,
    sigint: Arc<AtomicBool>,
}

impl TerminalControls {
    /// Without a terminal on stdin, polls just sleep and alarms acknowledge
    /// themselves; SIGINT still stops the run.
    pub fn detect() -> Self {
        let available = std::io::stdin().is_terminal();
        if !available {
            tracing::warn!("stdin is not a terminal: skip/stop keys disabled");
        }
        let sigint = Arc::new(AtomicBool::new(false));
        let flag = sigint.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
            tracing::warn!(error = %e, "could not install Ctrl+C handler");
        }
        Self::with_flag(available, sigint)
    }

    fn with_flag(available: bool, sigint: Arc<AtomicBool>) -> Self {
        Self { available, sigint }
    }

    /// Consume a pending SIGINT.
    fn take_sigint(&self) -> bool {
        self.sigint.swap(false, Ordering::SeqCst)
    }

    /// Sleep out `timeout`, waking early for SIGINT.
    fn sleep(&self, timeout: Duration) -> Signal {
        let deadline = Instant::now() + timeout;
        loop {
            if self.take_sigint() {
                return Signal::Interrupt;
            }
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Signal::Idle;
            }
            std::thread::sleep(left.min(SIGNAL_SLICE));
        }
    }

    fn read_key(&self, timeout: Duration) -> std::io::Result<Option<KeyEvent>> {
        let _raw = RawMode::enable()?;
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            if !event::poll(left)? {
                return Ok(None);
            }
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(key));
                }
            }
            if left.is_zero() {
                return Ok(None);
            }
        }
    }

    fn give_up(&mut self, e: &std::io::Error) {
        tracing::warn!(error = %e, "terminal input failed, continuing without keys");
        self.available = false;
    }
}

struct RawMode;

impl RawMode {
    fn enable() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!(error = %e, "could not leave raw mode");
        }
    }
}

fn classify(key: &KeyEvent) -> Signal {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Signal::Interrupt,
        KeyCode::Char('q') | KeyCode::Esc => Signal::Interrupt,
        KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char(' ') => Signal::Skip,
        _ => Signal::Idle,
    }
}

impl Controls for TerminalControls {
    fn poll(&mut self, timeout: Duration) -> Signal {
        if self.take_sigint() {
            return Signal::Interrupt;
        }
        if !self.available {
            return self.sleep(timeout);
        }
        let started = Instant::now();
        match self.read_key(timeout) {
            Ok(Some(key)) => classify(&key),
            Ok(None) => Signal::Idle,
            Err(e) => {
                self.give_up(&e);
                self.sleep(timeout.saturating_sub(started.elapsed()))
            }
        }
    }

    fn wait_for_ack(&mut self) -> Signal {
        while self.available {
            if self.take_sigint() {
                return Signal::Interrupt;
            }
            match self.read_key(ACK_SLICE) {
                Ok(Some(key)) => match classify(&key) {
                    Signal::Skip | Signal::Acknowledge => return Signal::Acknowledge,
                    Signal::Interrupt => return Signal::Interrupt,
                    Signal::Idle => {}
                },
                Ok(None) => {}
                Err(e) => self.give_up(&e),
            }
        }
        if self.take_sigint() {
            return Signal::Interrupt;
        }
        Signal::Acknowledge
    }
}
