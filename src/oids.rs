//! OID templates of the vendor TDR tables.
//!
//! Both vendors expose a table indexed by ifIndex whose columns hold the
//! action/ready state and per-pair status and length. Only the column
//! numbers and the table root differ.

use std::fmt;

use thiserror::Error;

use crate::{port::InterfaceIndex, vendor::VendorFamily};

/// Number of twisted pairs in an Ethernet cable.
pub const PAIR_COUNT: u8 = 4;

/// eltPhyTdrEntry: .1.3.6.1.4.1.35265.1.23.90.1.1.1
const SNR_TDR_ENTRY: &[u64] = &[1, 3, 6, 1, 4, 1, 35265, 1, 23, 90, 1, 1, 1];

/// swEtherCableDiagEntry: .1.3.6.1.4.1.171.12.58.1.1.1
const DLINK_CABLE_DIAG_ENTRY: &[u64] = &[1, 3, 6, 1, 4, 1, 171, 12, 58, 1, 1, 1];

/// Symbolic role of an OID within a vendor TDR table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OidRole {
    /// Column written to start a test.
    StartTrigger,
    /// Column reporting that results are valid. Not every vendor has one.
    ReadyFlag,
    /// Status column of a pair (1..=4).
    PairStatus(u8),
    /// Length column of a pair (1..=4), in meters.
    PairLength(u8),
}

impl fmt::Display for OidRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OidRole::StartTrigger => write!(f, "start-trigger"),
            OidRole::ReadyFlag => write!(f, "ready-flag"),
            OidRole::PairStatus(p) => write!(f, "pair{}-status", p),
            OidRole::PairLength(p) => write!(f, "pair{}-length", p),
        }
    }
}

/// OidError is returned when a role cannot be resolved for a family.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OidError {
    #[error("OID role {role} is not defined for family '{family}'")]
    UnknownRole { family: String, role: OidRole },
}

/// Column layout of one vendor's TDR table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OidTemplate {
    entry: &'static [u64],
    start_column: u64,
    ready_column: Option<u64>,
    /// Column of pair 1 status minus one.
    status_offset: u64,
    /// Column of pair 1 length minus one.
    length_offset: u64,
}

impl OidTemplate {
    pub const SNR: OidTemplate = OidTemplate {
        entry: SNR_TDR_ENTRY,
        start_column: 3,
        ready_column: Some(1),
        status_offset: 1,
        length_offset: 5,
    };

    pub const DLINK: OidTemplate = OidTemplate {
        entry: DLINK_CABLE_DIAG_ENTRY,
        start_column: 12,
        ready_column: None,
        status_offset: 3,
        length_offset: 7,
    };

    /// Returns the template of a family, if it has a TDR table.
    pub fn for_family(family: &VendorFamily) -> Option<OidTemplate> {
        match family {
            VendorFamily::Snr => Some(OidTemplate::SNR),
            VendorFamily::DLink => Some(OidTemplate::DLINK),
            VendorFamily::Unsupported(_) => None,
        }
    }

    fn column(&self, role: OidRole) -> Option<u64> {
        let valid_pair = |p: u8| (1..=PAIR_COUNT).contains(&p);
        match role {
            OidRole::StartTrigger => Some(self.start_column),
            OidRole::ReadyFlag => self.ready_column,
            OidRole::PairStatus(p) if valid_pair(p) => Some(self.status_offset + p as u64),
            OidRole::PairLength(p) if valid_pair(p) => Some(self.length_offset + p as u64),
            _ => None,
        }
    }

    /// Returns the sub-identifiers of `role` for an interface, if defined.
    pub fn sub_ids(&self, role: OidRole, if_index: InterfaceIndex) -> Option<Vec<u64>> {
        let column = self.column(role)?;
        let mut v = self.entry.to_vec();
        v.extend_from_slice(&[column, if_index.get() as u64]);
        Some(v)
    }

    /// Returns the dotted OID of `role` for an interface, if defined.
    pub fn oid(&self, role: OidRole, if_index: InterfaceIndex) -> Option<String> {
        self.sub_ids(role, if_index).map(|v| {
            v.iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(".")
        })
    }
}

/// Resolves the dotted OID of `role` for `family` at `if_index`.
pub fn resolve_oid(
    family: &VendorFamily,
    role: OidRole,
    if_index: InterfaceIndex,
) -> Result<String, OidError> {
    OidTemplate::for_family(family)
        .and_then(|t| t.oid(role, if_index))
        .ok_or_else(|| OidError::UnknownRole {
            family: family.tag().to_string(),
            role,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(v: u32) -> InterfaceIndex {
        InterfaceIndex::new(v).unwrap()
    }

    #[test]
    fn test_snr_layout() {
        let f = VendorFamily::Snr;
        let r = |role| resolve_oid(&f, role, idx(3)).unwrap();

        assert_eq!(r(OidRole::StartTrigger), "1.3.6.1.4.1.35265.1.23.90.1.1.1.3.3");
        assert_eq!(r(OidRole::ReadyFlag), "1.3.6.1.4.1.35265.1.23.90.1.1.1.1.3");
        assert_eq!(r(OidRole::PairStatus(1)), "1.3.6.1.4.1.35265.1.23.90.1.1.1.2.3");
        assert_eq!(r(OidRole::PairStatus(4)), "1.3.6.1.4.1.35265.1.23.90.1.1.1.5.3");
        assert_eq!(r(OidRole::PairLength(1)), "1.3.6.1.4.1.35265.1.23.90.1.1.1.6.3");
        assert_eq!(r(OidRole::PairLength(4)), "1.3.6.1.4.1.35265.1.23.90.1.1.1.9.3");
    }

    #[test]
    fn test_dlink_layout() {
        let f = VendorFamily::DLink;
        let r = |role| resolve_oid(&f, role, idx(12)).unwrap();

        assert_eq!(r(OidRole::StartTrigger), "1.3.6.1.4.1.171.12.58.1.1.1.12.12");
        assert_eq!(r(OidRole::PairStatus(1)), "1.3.6.1.4.1.171.12.58.1.1.1.4.12");
        assert_eq!(r(OidRole::PairStatus(4)), "1.3.6.1.4.1.171.12.58.1.1.1.7.12");
        assert_eq!(r(OidRole::PairLength(1)), "1.3.6.1.4.1.171.12.58.1.1.1.8.12");
        assert_eq!(r(OidRole::PairLength(4)), "1.3.6.1.4.1.171.12.58.1.1.1.11.12");
    }

    #[test]
    fn test_dlink_has_no_ready_flag() {
        let err = resolve_oid(&VendorFamily::DLink, OidRole::ReadyFlag, idx(1)).unwrap_err();
        assert_eq!(
            err,
            OidError::UnknownRole {
                family: "dlink".to_string(),
                role: OidRole::ReadyFlag
            }
        );
        assert_eq!(
            err.to_string(),
            "OID role ready-flag is not defined for family 'dlink'"
        );
    }

    #[test]
    fn test_pair_out_of_range() {
        for role in [
            OidRole::PairStatus(0),
            OidRole::PairStatus(5),
            OidRole::PairLength(0),
            OidRole::PairLength(5),
        ] {
            assert!(resolve_oid(&VendorFamily::Snr, role, idx(1)).is_err());
        }
    }

    #[test]
    fn test_unsupported_family() {
        let family = VendorFamily::Unsupported("cisco".to_string());
        assert!(resolve_oid(&family, OidRole::StartTrigger, idx(1)).is_err());
    }

    #[test]
    fn test_status_and_length_columns_do_not_overlap() {
        for t in [OidTemplate::SNR, OidTemplate::DLINK] {
            let mut cols: Vec<u64> = (1..=PAIR_COUNT)
                .flat_map(|p| [OidRole::PairStatus(p), OidRole::PairLength(p)])
                .filter_map(|role| t.column(role))
                .collect();
            assert_eq!(cols.len(), 2 * PAIR_COUNT as usize);
            cols.sort_unstable();
            cols.dedup();
            assert_eq!(cols.len(), 2 * PAIR_COUNT as usize);
        }
    }

    // eltPhyTdrAction and the pair 2 status share column 3 on SNR.
    #[test]
    fn test_snr_start_trigger_shares_pair2_status_column() {
        let t = OidTemplate::SNR;
        assert_eq!(
            t.column(OidRole::StartTrigger),
            t.column(OidRole::PairStatus(2))
        );
        assert_ne!(
            t.column(OidRole::ReadyFlag),
            t.column(OidRole::StartTrigger)
        );
    }

    #[test]
    fn test_dlink_start_trigger_is_own_column() {
        let t = OidTemplate::DLINK;
        let start = t.column(OidRole::StartTrigger);
        for p in 1..=PAIR_COUNT {
            assert_ne!(start, t.column(OidRole::PairStatus(p)));
            assert_ne!(start, t.column(OidRole::PairLength(p)));
        }
    }
}
