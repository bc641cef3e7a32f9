//! Per-vendor TDR polling state machine.
//!
//! Every vendor runs the same cycle: write the start trigger, poll until the
//! switch reports completion (bounded), then read status and length of each
//! of the four pairs. The vendors differ in:
//!
//! - the value written to start a test (SNR: 2, D-Link: 1),
//! - whether a failed start write aborts the test (SNR: no, D-Link: yes),
//! - what is polled and which value ends the wait
//!   (SNR: ready flag == 1, D-Link: start trigger != 2 "processing"),
//! - the status vocabulary.
//!
//! Poll exhaustion is never fatal: pairs are read anyway.

use std::{borrow::Cow, thread, time::Duration};

use thiserror::Error;

use crate::{
    oids::{resolve_oid, OidError, OidRole, PAIR_COUNT},
    port::InterfaceIndex,
    report::{DiagnosticReport, PairResult},
    status::StatusCodeMap,
    transport::{SnmpTransport, TransportError},
    vendor::VendorFamily,
};

/// Maximum number of completion polls, one per second by default.
pub const WAIT_SEC: u32 = 20;

/// SNR: eltPhyTdrAction value that starts a test.
const SNR_START_VALUE: i64 = 2;
/// SNR: eltPhyTdrValid value that marks results as valid.
const SNR_READY_VALUE: i64 = 1;
/// D-Link: swEtherCableDiagAction value that starts a test.
const DLINK_START_VALUE: i64 = 1;
/// D-Link: swEtherCableDiagAction value while the test is running.
const DLINK_PROCESSING_VALUE: i64 = 2;

/// Bounds of the completion wait.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PollSchedule {
    /// Maximum number of polls.
    pub attempts: u32,
    /// Pause between two polls.
    pub interval: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        PollSchedule {
            attempts: WAIT_SEC,
            interval: Duration::from_secs(1),
        }
    }
}

/// How the completion wait ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// The switch reported completion on poll number `polls`.
    Ready { polls: u32 },
    /// The budget ran out without a completion report.
    Exhausted { polls: u32 },
}

impl PollOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready { .. })
    }
}

/// DiagnosticError is returned by the start and pair-read steps.
#[derive(Error, Debug)]
pub enum DiagnosticError {
    #[error(transparent)]
    Oid(#[from] OidError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// The switch and interface a diagnostic runs against.
#[derive(Debug, Clone)]
pub struct Target<'a> {
    pub host: &'a str,
    pub community: &'a str,
    pub if_index: InterfaceIndex,
    /// Per-request transport timeout.
    pub timeout: Duration,
}

/// Contract shared by the vendor strategies.
pub trait VendorPoller: Sync {
    /// Family whose TDR table this strategy drives.
    fn family(&self) -> VendorFamily;

    /// Status vocabulary of the vendor.
    fn status_map(&self) -> StatusCodeMap;

    /// Role read on each completion poll.
    fn poll_role(&self) -> OidRole;

    /// True when a polled value means the results are ready.
    fn is_complete(&self, value: i64) -> bool;

    /// Issues the start trigger. An error aborts the diagnostic.
    fn start(&self, transport: &dyn SnmpTransport, target: &Target) -> Result<(), DiagnosticError>;

    /// Resolves the OID of `role` for the target interface.
    fn oid(&self, role: OidRole, target: &Target) -> Result<String, OidError> {
        resolve_oid(&self.family(), role, target.if_index)
    }

    fn translate_status(&self, code: i64) -> Cow<'static, str> {
        self.status_map().translate(code)
    }

    /// Polls until completion or until the schedule runs out.
    ///
    /// Read failures count as a poll and are otherwise ignored.
    fn poll(
        &self,
        transport: &dyn SnmpTransport,
        target: &Target,
        schedule: &PollSchedule,
    ) -> PollOutcome {
        let oid = match self.oid(self.poll_role(), target) {
            Ok(oid) => oid,
            Err(e) => {
                log::warn!("Cannot poll {}: {}", target.host, e);
                return PollOutcome::Exhausted { polls: 0 };
            }
        };

        for poll in 1..=schedule.attempts {
            match transport.get_int(target.host, target.community, &oid, target.timeout) {
                Ok(value) if self.is_complete(value) => {
                    log::debug!("{}: TDR complete after {} poll(s)", target.host, poll);
                    return PollOutcome::Ready { polls: poll };
                }
                Ok(value) => log::debug!("{}: poll {} got {}", target.host, poll, value),
                Err(e) => log::debug!("{}: poll {} failed: {}", target.host, poll, e),
            }

            if poll < schedule.attempts && !schedule.interval.is_zero() {
                thread::sleep(schedule.interval);
            }
        }

        log::warn!(
            "{}: TDR on ifIndex {} not confirmed after {} polls, reading results anyway",
            target.host,
            target.if_index,
            schedule.attempts
        );
        PollOutcome::Exhausted {
            polls: schedule.attempts,
        }
    }

    /// Reads one pair. The length is only read once the status read succeeds.
    fn read_pair(
        &self,
        transport: &dyn SnmpTransport,
        target: &Target,
        pair: u8,
    ) -> Result<PairResult, DiagnosticError> {
        let status_oid = self.oid(OidRole::PairStatus(pair), target)?;
        let length_oid = self.oid(OidRole::PairLength(pair), target)?;

        let code = transport.get_int(target.host, target.community, &status_oid, target.timeout)?;
        let length =
            transport.get_int(target.host, target.community, &length_oid, target.timeout)?;

        Ok(PairResult::measured(
            pair,
            self.translate_status(code),
            code,
            length,
        ))
    }

    /// Reads all pairs in order. A failed pair does not stop the others.
    fn read_pairs(&self, transport: &dyn SnmpTransport, target: &Target) -> Vec<PairResult> {
        (1..=PAIR_COUNT)
            .map(|pair| {
                self.read_pair(transport, target, pair)
                    .unwrap_or_else(|e| {
                        log::warn!("{}: pair {} read failed: {}", target.host, pair, e);
                        PairResult::failed(pair, e.to_string())
                    })
            })
            .collect()
    }
}

/// SNR and Eltex switches.
#[derive(Copy, Clone, Debug, Default)]
pub struct SnrPoller;

impl VendorPoller for SnrPoller {
    fn family(&self) -> VendorFamily {
        VendorFamily::Snr
    }

    fn status_map(&self) -> StatusCodeMap {
        StatusCodeMap::SNR
    }

    fn poll_role(&self) -> OidRole {
        OidRole::ReadyFlag
    }

    fn is_complete(&self, value: i64) -> bool {
        value == SNR_READY_VALUE
    }

    /// Older firmware starts the test on its own and rejects the write, so a
    /// failure here is logged and ignored.
    fn start(&self, transport: &dyn SnmpTransport, target: &Target) -> Result<(), DiagnosticError> {
        let oid = self.oid(OidRole::StartTrigger, target)?;
        if let Err(e) = transport.set_int(
            target.host,
            target.community,
            &oid,
            SNR_START_VALUE,
            target.timeout,
        ) {
            log::debug!("{}: TDR start write ignored: {}", target.host, e);
        }
        Ok(())
    }
}

/// D-Link switches.
#[derive(Copy, Clone, Debug, Default)]
pub struct DLinkPoller;

impl VendorPoller for DLinkPoller {
    fn family(&self) -> VendorFamily {
        VendorFamily::DLink
    }

    fn status_map(&self) -> StatusCodeMap {
        StatusCodeMap::DLINK
    }

    fn poll_role(&self) -> OidRole {
        OidRole::StartTrigger
    }

    fn is_complete(&self, value: i64) -> bool {
        value != DLINK_PROCESSING_VALUE
    }

    fn start(&self, transport: &dyn SnmpTransport, target: &Target) -> Result<(), DiagnosticError> {
        let oid = self.oid(OidRole::StartTrigger, target)?;
        transport.set_int(
            target.host,
            target.community,
            &oid,
            DLINK_START_VALUE,
            target.timeout,
        )?;
        Ok(())
    }
}

/// Returns the strategy for a family, if it has one.
pub fn poller_for(family: &VendorFamily) -> Option<&'static dyn VendorPoller> {
    match family {
        VendorFamily::Snr => Some(&SnrPoller),
        VendorFamily::DLink => Some(&DLinkPoller),
        VendorFamily::Unsupported(_) => None,
    }
}

/// Runs the full start/poll/read cycle against one interface.
pub fn diagnose(
    poller: &dyn VendorPoller,
    transport: &dyn SnmpTransport,
    target: &Target,
    schedule: &PollSchedule,
) -> DiagnosticReport {
    log::info!(
        "{}: starting TDR on ifIndex {}",
        target.host,
        target.if_index
    );

    if let Err(e) = poller.start(transport, target) {
        log::warn!("{}: TDR start failed: {}", target.host, e);
        return DiagnosticReport::Failed {
            message: format!("set: {}", e),
        };
    }

    let outcome = poller.poll(transport, target, schedule);
    let pairs = poller.read_pairs(transport, target);

    DiagnosticReport::Pairs {
        pairs,
        ready_confirmed: outcome.is_ready(),
    }
}
