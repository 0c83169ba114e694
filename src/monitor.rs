use std::{
    io,
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};

use log::{error, info, warn};

use crate::{config::Config, serial::LineSource, sheets::CellWriter};

// Last write attempt, successful or not
#[derive(Debug)]
struct WriteRecord {
    status: bool,
    bac: f64,
    at: Instant,
}

pub(crate) struct Monitor<R, W> {
    source: R,
    sheets: W,
    spreadsheet_id: String,
    sheet_name: String,
    status_cell: String,
    bac_cell: String,
    threshold: f64,
    write_interval: Duration,
    last_write: Option<WriteRecord>,
}

impl<R: LineSource, W: CellWriter> Monitor<R, W> {
    pub(crate) fn new(source: R, sheets: W, config: &Config) -> Self {
        Self {
            source,
            sheets,
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
            status_cell: config.status_cell.clone(),
            bac_cell: config.bac_cell.clone(),
            threshold: config.threshold,
            write_interval: config.write_interval,
            last_write: None,
        }
    }

    /// Drives the read/parse/throttle/write cycle until `running` clears.
    /// Iteration errors are logged and followed by a flat 1s pause.
    pub(crate) fn run(&mut self, running: &AtomicBool) {
        info!(
            "starting BAC monitoring, forwarding at most every {:?}",
            self.write_interval
        );
        while running.load(Ordering::SeqCst) {
            if let Err(e) = self.step() {
                error!("error in monitoring loop: {}", e);
                thread::sleep(Duration::from_secs(1));
            }
        }
        info!("BAC monitoring stopped");
    }

    fn step(&mut self) -> io::Result<()> {
        let line = match self.source.read_line()? {
            Some(line) if !line.is_empty() => line,
            _ => return Ok(()),
        };
        info!("serial: {}", line);

        if let Some(bac) = Self::parse_bac(&line) {
            let status = bac > self.threshold;
            if self.write_due() {
                self.forward(status, bac);
            }
        }
        Ok(())
    }

    fn parse_bac(line: &str) -> Option<f64> {
        let rest = line.strip_prefix("BAC:")?;
        // Only up to a second colon counts as the value
        let value = match rest.find(':') {
            Some(i) => &rest[..i],
            None => rest,
        };
        match value.trim().parse() {
            Ok(bac) => Some(bac),
            Err(_) => {
                warn!("fail to parse BAC from line: {}", line);
                None
            }
        }
    }

    fn write_due(&self) -> bool {
        match &self.last_write {
            Some(record) => record.at.elapsed() >= self.write_interval,
            None => true,
        }
    }

    fn forward(&mut self, status: bool, bac: f64) {
        self.sheets.write_cell(
            &self.spreadsheet_id,
            &self.sheet_name,
            &self.status_cell,
            if status { "TRUE" } else { "FALSE" },
        );
        self.sheets.write_cell(
            &self.spreadsheet_id,
            &self.sheet_name,
            &self.bac_cell,
            &format!("{:.3}", bac),
        );
        // Throttle is measured from the attempt, not from a success
        let record = WriteRecord {
            status,
            bac,
            at: Instant::now(),
        };
        info!("wrote to sheet: BAC={:.3} -> {}", record.bac, record.status);
        self.last_write = Some(record);
    }
}
