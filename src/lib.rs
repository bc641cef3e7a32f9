//! Cable diagnostics (TDR) for SNR/Eltex and D-Link switches over SNMP.
//!
//! Starts the Time-Domain Reflectometer test on a switch port, waits for the
//! switch to finish, and reads status and length of each of the four pairs.
//! The two vendor MIB layouts are hidden behind one call.
//!
//! # Usage
//!
//! ```bash
//! cable-diag --ip 10.0.0.2 --family snr --port 1/0/3
//! cable-diag --ip 10.0.0.3 --model "DES-3200-28" --port 5 --port 6 -o json
//! ```
//!
//! From code:
//!
//! ```no_run
//! let report = cable_diag::run_diagnostic("10.0.0.2", "1/0/3", "snr", "public");
//! println!("{}", report);
//! ```

/// Command-line configuration and validation.
pub mod configuration;
/// Vendor dispatch and the never-failing entry point.
pub mod dispatcher;
/// OID templates of the vendor TDR tables.
pub mod oids;
/// Start/poll/read state machine per vendor.
pub mod poller;
/// Interface index parsing from port labels.
pub mod port;
/// Diagnostic results and rendering.
pub mod report;
/// Vendor status code vocabularies.
pub mod status;
/// SNMP get/set transport.
pub mod transport;
/// Vendor family detection.
pub mod vendor;

pub use dispatcher::{run_diagnostic, Dispatcher};
