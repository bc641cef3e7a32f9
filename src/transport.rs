//! Synchronous SNMP get/set of single INTEGER values.
//!
//! This is the only place where the crate talks to the network. Pollers see
//! the [`SnmpTransport`] trait and nothing else, so any call may fail or time
//! out and the caller decides whether that is fatal.

use std::{io, time::Duration};

use snmp2::{Oid, SyncSession, Value};
use thiserror::Error;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);
/// Default number of retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 2;
/// Standard SNMP agent port.
pub const SNMP_PORT: u16 = 161;
/// Community used when none is configured.
pub const DEFAULT_COMMUNITY: &str = "public";

/// Errors raised by a single SNMP get or set.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid OID '{0}'")]
    InvalidOid(String),
    #[error("Cannot open SNMP session to {host}: {source}")]
    Session {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("SNMP request failed: {0}")]
    Request(String),
    #[error("No response after {attempts} attempts: {detail}")]
    Exhausted { attempts: u32, detail: String },
    #[error("SNMP error-status {status} at {oid}")]
    ErrorStatus { oid: String, status: u32 },
    #[error("Empty SNMP response for {0}")]
    NoValue(String),
    #[error("Non-integer value at {oid}: {value}")]
    NotInteger { oid: String, value: String },
}

impl TransportError {
    /// True for failures a repeated request may cure (lost or late datagrams).
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Request(_))
    }
}

/// Get/set contract consumed by the vendor pollers.
pub trait SnmpTransport {
    /// Reads an INTEGER-like value at `oid`.
    fn get_int(
        &self,
        host: &str,
        community: &str,
        oid: &str,
        timeout: Duration,
    ) -> Result<i64, TransportError>;

    /// Writes an INTEGER value at `oid`.
    fn set_int(
        &self,
        host: &str,
        community: &str,
        oid: &str,
        value: i64,
        timeout: Duration,
    ) -> Result<(), TransportError>;
}

/// Parses a dotted OID string into the `snmp2` representation.
pub fn parse_oid(s: &str) -> Result<Oid<'static>, TransportError> {
    let invalid = || TransportError::InvalidOid(s.to_string());

    let parts = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect::<Result<Vec<u64>, _>>()
        .map_err(|_| invalid())?;

    if parts.len() < 2 {
        return Err(invalid());
    }

    Oid::from(parts.as_slice()).map_err(|_| invalid())
}

/// Converts a varbind value into an integer, if it is integer-typed.
fn value_to_int(oid: &str, value: &Value) -> Result<i64, TransportError> {
    match value {
        Value::Integer(v) => Ok(*v),
        Value::Unsigned32(v) | Value::Counter32(v) | Value::Timeticks(v) => Ok(*v as i64),
        other => Err(TransportError::NotInteger {
            oid: oid.to_string(),
            value: format!("{:?}", other),
        }),
    }
}

/// SNMP v2c transport built on `snmp2::SyncSession`.
///
/// A fresh session is opened per request; nothing is kept between calls.
#[derive(Clone, Debug)]
pub struct SnmpV2cTransport {
    retries: u32,
    port: u16,
}

impl Default for SnmpV2cTransport {
    fn default() -> Self {
        SnmpV2cTransport::new(DEFAULT_RETRIES, SNMP_PORT)
    }
}

impl SnmpV2cTransport {
    pub fn new(retries: u32, port: u16) -> Self {
        SnmpV2cTransport { retries, port }
    }

    fn session(
        &self,
        host: &str,
        community: &str,
        timeout: Duration,
    ) -> Result<SyncSession, TransportError> {
        SyncSession::new_v2c((host, self.port), community.as_bytes(), Some(timeout), 0).map_err(
            |source| TransportError::Session {
                host: host.to_string(),
                source,
            },
        )
    }

    /// Runs `op` until it succeeds, fails for good, or retries run out.
    fn with_retries<R>(
        &self,
        oid: &str,
        mut op: impl FnMut() -> Result<R, TransportError>,
    ) -> Result<R, TransportError> {
        let attempts = self.retries + 1;
        let mut attempt = 1;
        loop {
            match op() {
                Err(e) if e.is_retryable() => {
                    if attempt >= attempts {
                        return Err(TransportError::Exhausted {
                            attempts,
                            detail: e.to_string(),
                        });
                    }
                    log::debug!(
                        "SNMP request for {} failed (attempt {}/{}): {}",
                        oid,
                        attempt,
                        attempts,
                        e
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

impl SnmpTransport for SnmpV2cTransport {
    fn get_int(
        &self,
        host: &str,
        community: &str,
        oid: &str,
        timeout: Duration,
    ) -> Result<i64, TransportError> {
        let name = parse_oid(oid)?;
        let mut session = self.session(host, community, timeout)?;

        self.with_retries(oid, || {
            let mut pdu = session
                .get(&name)
                .map_err(|e| TransportError::Request(format!("{:?}", e)))?;

            if pdu.error_status != 0 {
                return Err(TransportError::ErrorStatus {
                    oid: oid.to_string(),
                    status: pdu.error_status,
                });
            }

            let (_, value) = pdu
                .varbinds
                .next()
                .ok_or_else(|| TransportError::NoValue(oid.to_string()))?;

            value_to_int(oid, &value)
        })
    }

    fn set_int(
        &self,
        host: &str,
        community: &str,
        oid: &str,
        value: i64,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let name = parse_oid(oid)?;
        let mut session = self.session(host, community, timeout)?;

        self.with_retries(oid, || {
            let pdu = session
                .set(&[(&name, Value::Integer(value))])
                .map_err(|e| TransportError::Request(format!("{:?}", e)))?;

            if pdu.error_status != 0 {
                return Err(TransportError::ErrorStatus {
                    oid: oid.to_string(),
                    status: pdu.error_status,
                });
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_parse_oid() {
        assert!(parse_oid("1.3.6.1.4.1.35265.1.23.90.1.1.1.3.5").is_ok());
        assert!(parse_oid(".1.3.6.1.2.1.1.5.0").is_ok());
    }

    #[test]
    fn test_parse_oid_invalid() {
        for s in ["", "1", "1.3.x.1", "not an oid"] {
            assert!(
                matches!(parse_oid(s), Err(TransportError::InvalidOid(_))),
                "oid {:?}",
                s
            );
        }
    }

    #[test]
    fn test_value_to_int() {
        assert_eq!(value_to_int("x", &Value::Integer(-3)).unwrap(), -3);
        assert_eq!(value_to_int("x", &Value::Unsigned32(7)).unwrap(), 7);
        assert!(matches!(
            value_to_int("x", &Value::OctetString(b"ok")),
            Err(TransportError::NotInteger { .. })
        ));
        assert!(value_to_int("x", &Value::NoSuchInstance).is_err());
    }

    #[test]
    fn test_retryable() {
        assert!(TransportError::Request("Receive".into()).is_retryable());
        assert!(!TransportError::NoValue("1.3".into()).is_retryable());
        assert!(!TransportError::ErrorStatus {
            oid: "1.3".into(),
            status: 2
        }
        .is_retryable());
    }

    #[test]
    fn test_retries_exhausted_after_all_attempts() {
        let transport = SnmpV2cTransport::new(2, SNMP_PORT);
        let calls = Cell::new(0);
        let res: Result<(), _> = transport.with_retries("1.3.6", || {
            calls.set(calls.get() + 1);
            Err(TransportError::Request("Receive".into()))
        });

        assert_eq!(calls.get(), 3);
        match res {
            Err(TransportError::Exhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("Expected Exhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_retry_then_success() {
        let transport = SnmpV2cTransport::default();
        let calls = Cell::new(0);
        let res = transport.with_retries("1.3.6", || {
            calls.set(calls.get() + 1);
            if calls.get() < 2 {
                Err(TransportError::Request("Receive".into()))
            } else {
                Ok(5)
            }
        });
        assert_eq!(res.unwrap(), 5);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_permanent_error_not_retried() {
        let transport = SnmpV2cTransport::default();
        let calls = Cell::new(0);
        let res: Result<(), _> = transport.with_retries("1.3.6", || {
            calls.set(calls.get() + 1);
            Err(TransportError::NoValue("1.3.6".into()))
        });
        assert_eq!(calls.get(), 1);
        assert!(matches!(res, Err(TransportError::NoValue(_))));
    }
}
