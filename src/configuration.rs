pub use clap::Parser;
use std::time::Duration;
use thiserror::Error;

use crate::{
    poller::{PollSchedule, WAIT_SEC},
    port::DEFAULT_PORT,
    report::OutputFormat,
    transport::{DEFAULT_COMMUNITY, DEFAULT_RETRIES, SNMP_PORT},
    vendor::VendorFamily,
};

/// ConfigurationError describes an invalid command line.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Community string must not be empty")]
    EmptyCommunity,
    #[error("Timeout must be greater than zero")]
    ZeroTimeout,
    #[error("Wait must be at least one poll")]
    ZeroWait,
    #[error("Either --family or --model is required")]
    NoFamily,
    #[error("--family and --model are mutually exclusive")]
    FamilyAndModel,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Configuration {
    /// Management address of the switch
    #[arg(short, long)]
    pub ip: String,
    /// Port label; the trailing digits are used as ifIndex (repeatable)
    #[arg(short, long = "port", default_value = DEFAULT_PORT)]
    pub ports: Vec<String>,
    /// Vendor family tag (snr, dlink)
    #[arg(short, long)]
    pub family: Option<String>,
    /// Model description to derive the vendor family from (e.g. sysDescr)
    #[arg(short, long)]
    pub model: Option<String>,
    /// SNMP read/write community
    #[arg(short, long, default_value = DEFAULT_COMMUNITY)]
    pub community: String,
    /// Per-request SNMP timeout in seconds
    #[arg(short, long, default_value_t = 4)]
    pub timeout: u64,
    /// SNMP retries after the first attempt
    #[arg(short, long, default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,
    /// UDP port of the SNMP agent
    #[arg(long, default_value_t = SNMP_PORT)]
    pub snmp_port: u16,
    /// Maximum number of one-second completion polls
    #[arg(short, long, default_value_t = WAIT_SEC)]
    pub wait: u32,
    /// Output format of the report
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,
}

impl Configuration {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.community.is_empty() {
            return Err(ConfigurationError::EmptyCommunity);
        }
        if self.timeout == 0 {
            return Err(ConfigurationError::ZeroTimeout);
        }
        if self.wait == 0 {
            return Err(ConfigurationError::ZeroWait);
        }
        match (&self.family, &self.model) {
            (None, None) => Err(ConfigurationError::NoFamily),
            (Some(_), Some(_)) => Err(ConfigurationError::FamilyAndModel),
            _ => Ok(()),
        }
    }

    /// Resolves the vendor family from `--family` or `--model`.
    pub fn vendor_family(&self) -> VendorFamily {
        match (&self.family, &self.model) {
            (Some(tag), _) => tag
                .parse()
                .unwrap_or_else(|_| VendorFamily::Unsupported(tag.clone())),
            (None, Some(model)) => VendorFamily::from_model_description(model),
            (None, None) => VendorFamily::Unsupported(String::new()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn poll_schedule(&self) -> PollSchedule {
        PollSchedule {
            attempts: self.wait,
            ..PollSchedule::default()
        }
    }
}
