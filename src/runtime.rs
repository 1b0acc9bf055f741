use log::warn;
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Unified event type consumed by the quiz loop
#[derive(Clone, Debug, PartialEq)]
pub enum QuizEvent {
    /// label produced by the recognizer for the current drawing
    Answer(String),
    Skip,
    Restart,
    Quit,
    Tick,
}

impl QuizEvent {
    /// Interpret one line of terminal input
    pub fn parse_line(line: &str) -> Option<QuizEvent> {
        match line.trim() {
            "" => None,
            ":skip" | ":s" => Some(QuizEvent::Skip),
            ":restart" | ":r" => Some(QuizEvent::Restart),
            ":quit" | ":q" => Some(QuizEvent::Quit),
            label => Some(QuizEvent::Answer(label.to_string())),
        }
    }
}

/// Lines of terminal input. Lines that are not valid UTF-8 are skipped;
/// iteration stops at end of input or on a read error.
pub struct InputLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> InputLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for InputLines<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    warn!("stopped reading input: {e}");
                    return None;
                }
            }
            while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
                self.buf.pop();
            }
            match std::str::from_utf8(&self.buf) {
                Ok(line) => return Some(line.to_string()),
                Err(e) => warn!("skipping input line that is not utf-8: {e}"),
            }
        }
    }
}

/// Source of user events
pub trait QuizEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError>;
}

/// Reads lines from any buffered reader on a helper thread
pub struct LineEventSource {
    rx: Receiver<QuizEvent>,
}

impl LineEventSource {
    pub fn new<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            for line in InputLines::new(reader) {
                if let Some(ev) = QuizEvent::parse_line(&line) {
                    if tx.send(ev).is_err() {
                        return;
                    }
                }
            }
            // end of input behaves like an explicit quit
            let _ = tx.send(QuizEvent::Quit);
        });

        Self { rx }
    }

    pub fn stdin() -> Self {
        Self::new(std::io::BufReader::new(std::io::stdin()))
    }
}

impl QuizEventSource for LineEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<QuizEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<QuizEvent>) -> Self {
        Self { rx }
    }
}

impl QuizEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Periodic timer that is only live between `arm` and `disarm`
#[derive(Clone, Copy, Debug)]
pub struct IntervalTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl IntervalTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Time left until the next tick, or None when disarmed
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Consume the tick if it is due and schedule the next one
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(due + self.interval);
                true
            }
            _ => false,
        }
    }
}

/// Multiplexes user events and timer ticks into one stream
pub struct Runner<E: QuizEventSource> {
    event_source: E,
    timer: IntervalTimer,
    idle_wait: Duration,
}

impl<E: QuizEventSource> Runner<E> {
    pub fn new(event_source: E, interval: Duration) -> Self {
        Self {
            event_source,
            timer: IntervalTimer::new(interval),
            idle_wait: Duration::from_secs(3600),
        }
    }

    pub fn start_timer(&mut self) {
        self.timer.arm(Instant::now());
    }

    /// After this returns no `Tick` is yielded until `start_timer` is called again
    pub fn stop_timer(&mut self) {
        self.timer.disarm();
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_armed()
    }

    /// Blocks until the next user event or timer tick.
    /// Returns None once the event source is gone, whether or not the timer is armed.
    pub fn step(&mut self) -> Option<QuizEvent> {
        loop {
            if self.timer.fire_if_due(Instant::now()) {
                return Some(QuizEvent::Tick);
            }

            let wait = self.timer.remaining(Instant::now()).unwrap_or(self.idle_wait);
            match self.event_source.recv_timeout(wait) {
                Ok(ev) => return Some(ev),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}
