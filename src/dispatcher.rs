//! Entry point of a diagnostic: picks the vendor strategy and never fails.

use std::{sync::Arc, time::Duration};

use crate::{
    poller::{diagnose, poller_for, PollSchedule, Target},
    port::InterfaceIndex,
    report::DiagnosticReport,
    transport::{SnmpTransport, SnmpV2cTransport, DEFAULT_TIMEOUT},
    vendor::VendorFamily,
};

/// Runs diagnostics through a transport with fixed timing parameters.
///
/// Holds no per-device state, so one dispatcher can serve any number of
/// concurrent invocations.
#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    transport: T,
    timeout: Duration,
    schedule: PollSchedule,
}

impl Default for Dispatcher<SnmpV2cTransport> {
    fn default() -> Self {
        Dispatcher::new(SnmpV2cTransport::default())
    }
}

impl<T: SnmpTransport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Dispatcher {
            transport,
            timeout: DEFAULT_TIMEOUT,
            schedule: PollSchedule::default(),
        }
    }

    /// Sets the per-request transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the completion wait bounds.
    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs a diagnostic and returns the structured report.
    pub fn diagnose(
        &self,
        ip: &str,
        port: &str,
        family: &VendorFamily,
        community: &str,
    ) -> DiagnosticReport {
        let Some(poller) = poller_for(family) else {
            log::info!("{}: family '{}' is not supported", ip, family);
            return DiagnosticReport::UnsupportedFamily {
                family: family.tag().to_string(),
            };
        };

        let if_index = match InterfaceIndex::from_port_label(port) {
            Ok(idx) => idx,
            Err(e) => {
                log::info!("{}: {}", ip, e);
                return DiagnosticReport::PortNotRecognized {
                    port: port.to_string(),
                };
            }
        };

        let target = Target {
            host: ip,
            community,
            if_index,
            timeout: self.timeout,
        };

        diagnose(poller, &self.transport, &target, &self.schedule)
    }

    /// Runs a diagnostic for a family tag and returns the rendered text.
    pub fn run(&self, ip: &str, port: &str, family: &str, community: &str) -> String {
        let family: VendorFamily = match family.parse() {
            Ok(f) => f,
            Err(never) => match never {},
        };
        self.diagnose(ip, port, &family, community).to_string()
    }
}

/// Runs a TDR diagnostic with the default SNMP v2c transport.
///
/// Blocks for up to [`crate::poller::WAIT_SEC`] seconds plus transport
/// timeouts. All failures are reported in the returned text.
pub fn run_diagnostic(ip: &str, port: &str, family: &str, community: &str) -> String {
    Dispatcher::default().run(ip, port, family, community)
}

/// Diagnoses several ports of one switch on the blocking thread pool.
///
/// Results come back in the order of `ports`. The diagnostics are not
/// coordinated with each other.
pub async fn run_ports<T>(
    dispatcher: Arc<Dispatcher<T>>,
    ip: &str,
    ports: &[String],
    family: &VendorFamily,
    community: &str,
) -> Vec<(String, DiagnosticReport)>
where
    T: SnmpTransport + Send + Sync + 'static,
{
    let handles: Vec<_> = ports
        .iter()
        .map(|port| {
            let dispatcher = dispatcher.clone();
            let ip = ip.to_string();
            let port = port.clone();
            let family = family.clone();
            let community = community.to_string();
            tokio::task::spawn_blocking(move || {
                dispatcher.diagnose(&ip, &port, &family, &community)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (port, handle) in ports.iter().zip(handles) {
        let report = match handle.await {
            Ok(report) => report,
            Err(e) => {
                log::error!("{}: diagnostic worker for port {} failed: {}", ip, port, e);
                DiagnosticReport::Failed {
                    message: format!("worker: {}", e),
                }
            }
        };
        results.push((port.clone(), report));
    }
    results
}
