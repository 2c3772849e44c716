//! The processing context: everything the read loop keeps between lines.
use chrono::Utc;
use log::{debug, error, trace};

use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::nmea::nmea0183::{self, Frame};
use crate::render::Render;
use crate::state::State;

/// Minimum time between two emitted records
pub const EMIT_INTERVAL: Duration = Duration::from_secs(1);

/// Number of records collected in once mode before the longest is printed
const ONCE_RECORDS: usize = 2;

pub struct Options {
    pub render: Render,
    /// Emit even before position and time are known
    pub partial: bool,
    /// Print a single record, then stop
    pub once: bool,
    /// Echo every accepted sentence
    pub echo_raw: bool,
}

/// Whether the read loop should go on
#[derive(Debug, PartialEq)]
pub enum Flow {
    Continue,
    Finished,
}

/// Lets one tick through per interval.
pub struct Cadence {
    interval: Duration,
    last: Option<Instant>,
}

impl Cadence {
    pub fn new(interval: Duration) -> Self {
        Cadence { interval, last: None }
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Opens `path` for appending accepted sentences, one per line.
pub fn open_log(path: &Path) -> io::Result<LineWriter<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(LineWriter::new(file))
}

pub struct Session<W: Write> {
    state: State,
    cadence: Cadence,
    options: Options,
    out: W,
    log: Option<Box<dyn Write>>,
    collected: Vec<String>,
}

impl<W: Write> Session<W> {
    pub fn new(options: Options, out: W, log: Option<Box<dyn Write>>) -> Self {
        Session {
            state: State::new(),
            cadence: Cadence::new(EMIT_INTERVAL),
            options,
            out,
            log,
            collected: Vec::new(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Processes one raw line read at `now`.
    ///
    /// Lines that are not valid sentences are dropped. Only I/O errors on the
    /// output or the log sink are returned.
    pub fn feed(&mut self, line: &str, now: Instant) -> io::Result<Flow> {
        let frame = match Frame::parse(line) {
            Ok(frame) => frame,
            Err(e) => {
                trace!("dropped {:?}: {}", line.trim_end(), e);
                return Ok(Flow::Continue);
            }
        };

        let sentence = line.trim();
        if self.options.echo_raw {
            writeln!(self.out, "{}", sentence)?;
        }
        if let Some(log) = self.log.as_mut() {
            writeln!(log, "{}", sentence)?;
        }

        let update = nmea0183::decode(&frame, Utc::now().date_naive());
        if !update.is_empty() {
            self.state.merge(update);
        }

        if !self.cadence.tick(now) {
            return Ok(Flow::Continue);
        }
        let partial = self.options.partial && !self.options.once;
        if !partial && !self.state.is_complete() {
            trace!("state incomplete, emission suppressed");
            return Ok(Flow::Continue);
        }
        let record = match self.options.render.render(&self.state) {
            Ok(record) => record,
            Err(e) => {
                error!("format error: {}", e);
                return Ok(Flow::Continue);
            }
        };

        if self.options.once {
            self.collected.push(record);
            if self.collected.len() >= ONCE_RECORDS {
                self.write_longest()?;
                return Ok(Flow::Finished);
            }
        } else {
            writeln!(self.out, "{}", record)?;
            self.out.flush()?;
        }
        Ok(Flow::Continue)
    }

    /// Prints the longest collected record, the earliest one on ties.
    fn write_longest(&mut self) -> io::Result<()> {
        let longest = self
            .collected
            .drain(..)
            .reduce(|best, r| if r.len() > best.len() { r } else { best });
        if let Some(record) = longest {
            writeln!(self.out, "{}", record)?;
        }
        self.out.flush()
    }

    /// Tells the reader on the output that the run was cut short.
    pub fn interrupted(&mut self) -> io::Result<()> {
        writeln!(self.out, "Interrupted.")?;
        self.out.flush()
    }

    /// Flushes pending output and releases the log sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.write_longest()?;
        if let Some(mut log) = self.log.take() {
            log.flush()?;
        }
        debug!("session finished");
        Ok(self.out)
    }
}
