//! Vendor TDR status vocabularies.
//!
//! SNR/Eltex and D-Link reuse the same small integers with unrelated
//! meanings, so every code is translated through its own family's map.

use std::borrow::Cow;

/// eltPhyTdrPairStatus values.
const SNR_STATUS: &[(i64, &str)] = &[
    (0, "fail"),
    (1, "ok"),
    (2, "open"),
    (3, "short"),
    (4, "impedance"),
    (5, "short-p1"),
    (6, "short-p2"),
    (7, "short-p3"),
    (8, "short-p4"),
];

/// swEtherCableDiagPairStatus values.
const DLINK_STATUS: &[(i64, &str)] = &[
    (0, "ok"),
    (1, "open"),
    (2, "short"),
    (3, "open-short"),
    (4, "crosstalk"),
    (5, "unknown"),
    (6, "count"),
    (7, "no-cable"),
    (8, "other"),
];

/// StatusCodeMap is the fixed code → label table of one vendor family.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StatusCodeMap {
    entries: &'static [(i64, &'static str)],
}

impl StatusCodeMap {
    pub const SNR: StatusCodeMap = StatusCodeMap {
        entries: SNR_STATUS,
    };

    pub const DLINK: StatusCodeMap = StatusCodeMap {
        entries: DLINK_STATUS,
    };

    /// Returns the label for a known code.
    pub fn label(&self, code: i64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
    }

    /// Translates a code, falling back to its raw numeric form.
    pub fn translate(&self, code: i64) -> Cow<'static, str> {
        match self.label(code) {
            Some(label) => Cow::Borrowed(label),
            None => Cow::Owned(code.to_string()),
        }
    }
}
