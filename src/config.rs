use std::time::Duration;

use serde::{Deserialize, Serialize};

#[inline]
fn default_baud_rate() -> u32 {
    9600
}
#[inline]
fn default_read_timeout() -> Duration {
    Duration::from_secs(1)
}
#[inline]
fn default_credentials() -> String {
    "auth.json".to_string()
}
#[inline]
fn default_status_cell() -> String {
    "A1".to_string()
}
#[inline]
fn default_bac_cell() -> String {
    "B1".to_string()
}
#[inline]
fn default_threshold() -> f64 {
    0.08
}
#[inline]
fn default_write_interval() -> Duration {
    Duration::from_secs(3)
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct Config {
    // Path of the serial device the sensor is attached to
    // required
    pub serial_port: String,
    // Baud rate of the serial device
    // optional, default: 9600
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    // Timeout for a single blocking serial read
    // optional, default: 1s
    #[serde(with = "humantime_serde", default = "default_read_timeout")]
    pub read_timeout: Duration,
    // Path of the Google service account key file
    // optional, default: auth.json
    #[serde(default = "default_credentials")]
    pub credentials: String,
    // Id of the target spreadsheet
    // required
    pub spreadsheet_id: String,
    // Name of the sheet holding the target cells
    // required
    pub sheet_name: String,
    // Cell receiving the TRUE/FALSE over-threshold flag
    // optional, default: A1
    #[serde(default = "default_status_cell")]
    pub status_cell: String,
    // Cell receiving the latest reading
    // optional, default: B1
    #[serde(default = "default_bac_cell")]
    pub bac_cell: String,
    // BAC level above which the status flag turns TRUE
    // optional, default: 0.08
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    // Minimum interval between two spreadsheet write attempts
    // optional, default: 3s
    #[serde(with = "humantime_serde", default = "default_write_interval")]
    pub write_interval: Duration,
}
