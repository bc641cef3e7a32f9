//! Switch vendor families with distinct TDR MIB layouts.

use std::{convert::Infallible, fmt, str::FromStr};

/// Model-name prefixes that identify D-Link managed switches.
const DLINK_MODEL_PREFIXES: &[&str] = &["DCS", "DES", "DGS"];

/// VendorFamily selects the OID layout and status vocabulary of a switch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VendorFamily {
    /// SNR and Eltex switches (enterprise 35265, eltPhyTdr table).
    Snr,
    /// D-Link switches (enterprise 171.12.58, cable diagnostics table).
    DLink,
    /// Any other tag. Carries the tag as given.
    Unsupported(String),
}

impl VendorFamily {
    /// Classifies a device from its model description (e.g. sysDescr).
    ///
    /// Hyphens and underscores are ignored and matching is case-insensitive,
    /// so "SNR-S2985G-24T" and "d-link DES_3200" both resolve.
    pub fn from_model_description(descr: &str) -> Self {
        let cleaned = descr.to_uppercase().replace(['-', '_'], "");
        let cleaned = cleaned.trim();

        if cleaned.contains("SNR") {
            VendorFamily::Snr
        } else if DLINK_MODEL_PREFIXES.iter().any(|p| cleaned.contains(p)) {
            VendorFamily::DLink
        } else {
            VendorFamily::Unsupported(descr.to_string())
        }
    }

    /// Returns the canonical tag of the family.
    pub fn tag(&self) -> &str {
        match self {
            VendorFamily::Snr => "snr",
            VendorFamily::DLink => "dlink",
            VendorFamily::Unsupported(tag) => tag,
        }
    }

    /// True when a TDR strategy exists for the family.
    pub fn is_supported(&self) -> bool {
        !matches!(self, VendorFamily::Unsupported(_))
    }
}

impl FromStr for VendorFamily {
    type Err = Infallible;

    /// Parses a family tag. Unknown tags map to `Unsupported`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "snr" => VendorFamily::Snr,
            "dlink" => VendorFamily::DLink,
            other => VendorFamily::Unsupported(other.to_string()),
        })
    }
}

impl fmt::Display for VendorFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
