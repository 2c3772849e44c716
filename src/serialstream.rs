use std::io::{self, ErrorKind, Read};
use std::time::Duration;

use serialport::SerialPort;

/// How long a read waits for the device before reporting no data
const READ_TIMEOUT: Duration = Duration::from_millis(20);

/// Longest line kept while waiting for its newline; anything longer is noise
const MAX_LINE: usize = 4096;

pub struct SerialStream {
    port: Box<dyn SerialPort>,
}

impl SerialStream {
    pub fn open(path: &str, baud: u32) -> serialport::Result<Self> {
        let port = serialport::new(path, baud).timeout(READ_TIMEOUT).open()?;
        Ok(SerialStream { port })
    }
}

impl Read for SerialStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

/// Splits a byte stream into lines without blocking on partial input.
///
/// Reads that time out or return nothing are not the end of the stream, they
/// only mean there is no complete line yet.
pub struct LineReader<R> {
    input: R,
    buf: Vec<u8>,
}

impl<R: Read> LineReader<R> {
    pub fn new(input: R) -> Self {
        LineReader { input, buf: Vec::new() }
    }

    /// Returns the next complete line including its line ending, or `None`
    /// if none is available right now.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut chunk = [0u8; 256];
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                // line noise outside ASCII is dropped, the checksum decides the rest
                let line = self
                    .buf
                    .drain(..=pos)
                    .filter(u8::is_ascii)
                    .map(char::from)
                    .collect();
                return Ok(Some(line));
            }
            if self.buf.len() > MAX_LINE {
                self.buf.clear();
            }
            match self.input.read(&mut chunk) {
                Ok(0) => return Ok(None),
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) =>
                {
                    return Ok(None)
                }
                Err(e) => return Err(e),
            }
        }
    }
}
