#[macro_use]
extern crate log;

use std::{process, sync::Arc};

use cable_diag::{
    configuration::*,
    dispatcher::{run_ports, Dispatcher},
    report::{DiagnosticReport, OutputFormat},
    transport::SnmpV2cTransport,
};
use serde::Serialize;

/// One port's result as printed in JSON mode.
#[derive(Serialize)]
struct PortOutput<'a> {
    ip: &'a str,
    port: &'a str,
    family: &'a str,
    report: &'a DiagnosticReport,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let conf = Configuration::parse();
    if let Err(e) = conf.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(2);
    }

    let family = conf.vendor_family();
    info!(
        "Configuration valid. Diagnosing {} port(s) on {} ({})",
        conf.ports.len(),
        conf.ip,
        family
    );

    let dispatcher = Arc::new(
        Dispatcher::new(SnmpV2cTransport::new(conf.retries, conf.snmp_port))
            .with_timeout(conf.timeout())
            .with_schedule(conf.poll_schedule()),
    );

    let results = run_ports(dispatcher, &conf.ip, &conf.ports, &family, &conf.community).await;

    for (port, report) in &results {
        match conf.output_format {
            OutputFormat::Text => {
                println!("Cable diagnostics on {}, port {}:", conf.ip, port);
                println!("{}", report.render(OutputFormat::Text));
            }
            OutputFormat::Json => {
                let output = PortOutput {
                    ip: &conf.ip,
                    port,
                    family: family.tag(),
                    report,
                };
                match serde_json::to_string(&output) {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!("Cannot serialize report for port {}: {}", port, e),
                }
            }
        }
    }
}
