use std::{
    io::{self, BufRead, BufReader, Read},
    time::Duration,
};

use log::{debug, info};
use serialport::SerialPort;

/// A source of newline-delimited text lines.
///
/// `Ok(None)` means no complete line arrived before the underlying read
/// timed out; the caller is expected to simply try again.
pub(crate) trait LineSource {
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

pub(crate) struct LineReader<R: Read> {
    reader: BufReader<R>,
    // Bytes of a line whose terminator has not arrived yet
    pending: Vec<u8>,
}

impl<R: Read> LineReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: Vec::new(),
        }
    }
}

impl<R: Read> LineSource for LineReader<R> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(_) => {}
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                // Partial line stays buffered until the rest arrives
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
        if self.pending.is_empty() {
            return Ok(None);
        }
        let raw = std::mem::replace(&mut self.pending, Vec::new());
        let line = String::from_utf8(raw)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(line.trim().to_string()))
    }
}

pub(crate) fn open(
    path: &str,
    baud_rate: u32,
    timeout: Duration,
) -> Result<LineReader<Box<dyn SerialPort>>, serialport::Error> {
    debug!("opening serial port {} at {} baud", path, baud_rate);
    let port = serialport::new(path, baud_rate).timeout(timeout).open()?;
    info!("serial port {} open", path);
    Ok(LineReader::new(port))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    struct ScriptedPort {
        chunks: VecDeque<io::Result<Vec<u8>>>,
    }

    impl ScriptedPort {
        fn new(chunks: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                chunks: chunks.into_iter().collect(),
            }
        }
    }

    impl Read for ScriptedPort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop_front() {
                Some(Ok(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }

    fn timeout() -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"))
    }

    #[test]
    fn complete_line_is_trimmed() {
        let mut reader = LineReader::new(ScriptedPort::new(vec![Ok(b"BAC:0.045\r\n".to_vec())]));
        assert_eq!(reader.read_line().unwrap(), Some("BAC:0.045".to_string()));
    }

    #[test]
    fn timeout_without_data_yields_no_line() {
        let mut reader = LineReader::new(ScriptedPort::new(vec![timeout()]));
        assert_eq!(reader.read_line().unwrap(), None);
    }

    #[test]
    fn partial_line_survives_a_timeout() {
        let mut reader = LineReader::new(ScriptedPort::new(vec![
            Ok(b"BAC:0.".to_vec()),
            timeout(),
            Ok(b"045\n".to_vec()),
        ]));
        assert_eq!(reader.read_line().unwrap(), None);
        assert_eq!(reader.read_line().unwrap(), Some("BAC:0.045".to_string()));
    }

    #[test]
    fn lines_in_one_chunk_come_out_one_at_a_time() {
        let mut reader =
            LineReader::new(ScriptedPort::new(vec![Ok(b"BAC:0.010\nDEBUG:ready\n".to_vec())]));
        assert_eq!(reader.read_line().unwrap(), Some("BAC:0.010".to_string()));
        assert_eq!(reader.read_line().unwrap(), Some("DEBUG:ready".to_string()));
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let mut reader = LineReader::new(ScriptedPort::new(vec![Ok(vec![0xff, 0xfe, b'\n'])]));
        let err = reader.read_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn blank_line_comes_out_empty() {
        let mut reader = LineReader::new(ScriptedPort::new(vec![Ok(b"\r\n".to_vec())]));
        assert_eq!(reader.read_line().unwrap(), Some(String::new()));
    }
}
