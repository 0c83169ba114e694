mod config;
mod monitor;
mod serial;
mod sheets;

use crate::config::Config;
use crate::monitor::Monitor;
use crate::sheets::SheetWriter;

use std::{
    fs::File,
    io::BufReader,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use anyhow::Context;
use clap::{App, Arg};
use indoc::indoc;
use log::info;

fn main() -> anyhow::Result<()> {
    let cmd = App::new("bac-monitor")
        .version("0.1")
        .about("Monitor BAC readings from a serial alcohol sensor and publish them to Google Sheets")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .help("Sets custom config file location")
                .long_help(indoc!(
                    "Sets custom config file location, default to read config.yaml
                    The custom config must be a file of YAML 1.2 format.
                    The following configuration keys are supported:
                    serial_port: required, path of the serial device to read from
                    baud_rate: optional, default 9600, baud rate of the serial device
                    read_timeout: optional, default 1s, timeout of a single serial read
                    credentials: optional, default auth.json, Google service account key file
                    spreadsheet_id: required, id of the target spreadsheet
                    sheet_name: required, name of the sheet holding the target cells
                    status_cell: optional, default A1, cell receiving the TRUE/FALSE flag
                    bac_cell: optional, default B1, cell receiving the latest reading
                    threshold: optional, default 0.08, BAC level that flips the status to TRUE
                    write_interval: optional, default 3s, minimum interval between write attempts
                    "
                ))
                .value_name("FILE")
                .takes_value(true),
        )
        .get_matches();
    env_logger::init();

    let config_path = cmd.value_of("config").unwrap_or("config.yaml");
    info!("open and parse config file {}", config_path);
    let config_file =
        File::open(config_path).with_context(|| format!("failed to open file {}", config_path))?;
    let config: Config = serde_yaml::from_reader(BufReader::new(config_file))
        .with_context(|| format!("failed to parse config file {}", config_path))?;

    let sheets =
        SheetWriter::connect(&config.credentials).context("failed to connect to Google Sheets")?;
    let source = serial::open(&config.serial_port, config.baud_rate, config.read_timeout)
        .with_context(|| format!("failed to open serial port {}", config.serial_port))?;

    let running = Arc::new(AtomicBool::new(true));
    ctrlc::set_handler({
        let running = Arc::clone(&running);
        move || {
            info!("signal received, terminating...");
            running.store(false, Ordering::SeqCst);
        }
    })
    .context("failed to set up signal handlers")?;

    Monitor::new(source, sheets, &config).run(&running);
    Ok(())
}
