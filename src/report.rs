//! Diagnostic results and their user-facing rendering.
//!
//! A report is built once per invocation and rendered as text (one line per
//! pair) or JSON for machine consumption.

use std::fmt;

use serde::Serialize;

/// Fixed text returned for families without a TDR implementation.
pub const UNSUPPORTED_FAMILY_MESSAGE: &str = "This device family is not supported yet";

/// Output format for diagnostic reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for machine consumption.
    Json,
}

/// Outcome of one pair's status/length read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum PairOutcome {
    Measured {
        status: String,
        code: i64,
        length_m: i64,
    },
    Failed {
        error: String,
    },
}

/// Result of a single twisted pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairResult {
    pub pair: u8,
    #[serde(flatten)]
    pub outcome: PairOutcome,
}

impl PairResult {
    pub fn measured(pair: u8, status: impl Into<String>, code: i64, length_m: i64) -> Self {
        PairResult {
            pair,
            outcome: PairOutcome::Measured {
                status: status.into(),
                code,
                length_m,
            },
        }
    }

    pub fn failed(pair: u8, error: impl Into<String>) -> Self {
        PairResult {
            pair,
            outcome: PairOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, PairOutcome::Failed { .. })
    }
}

impl fmt::Display for PairResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.outcome {
            PairOutcome::Measured {
                status, length_m, ..
            } => write!(f, "pair{}: {} {} m", self.pair, status, length_m),
            PairOutcome::Failed { error } => write!(f, "pair{}: ERROR {}", self.pair, error),
        }
    }
}

/// Final result of one diagnostic invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticReport {
    /// Per-pair results in pair order.
    Pairs {
        pairs: Vec<PairResult>,
        /// False when the poll budget ran out before the switch reported
        /// completion. Results were read anyway.
        ready_confirmed: bool,
    },
    /// The port label had no trailing interface index. Nothing was sent.
    PortNotRecognized { port: String },
    /// The diagnostic aborted before any pair was read.
    Failed { message: String },
    /// The family has no TDR implementation. Nothing was sent.
    UnsupportedFamily { family: String },
}

impl DiagnosticReport {
    /// Renders the report in the requested format.
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.to_string(),
            OutputFormat::Json => serde_json::to_string(self).unwrap_or_else(|e| {
                log::error!("Cannot serialize report: {}", e);
                self.to_string()
            }),
        }
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DiagnosticReport::Pairs { pairs, .. } => {
                for (i, pair) in pairs.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", pair)?;
                }
                Ok(())
            }
            DiagnosticReport::PortNotRecognized { port } => {
                write!(f, "Port '{}' not recognized", port)
            }
            DiagnosticReport::Failed { message } => write!(f, "ERROR {}", message),
            DiagnosticReport::UnsupportedFamily { .. } => {
                write!(f, "{}", UNSUPPORTED_FAMILY_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pairs() -> DiagnosticReport {
        DiagnosticReport::Pairs {
            pairs: vec![
                PairResult::measured(1, "ok", 1, 12),
                PairResult::measured(2, "open", 2, 3),
                PairResult::failed(3, "No response after 3 attempts: Receive"),
                PairResult::measured(4, "17", 17, 0),
            ],
            ready_confirmed: true,
        }
    }

    #[test]
    fn test_text_rendering() {
        assert_eq!(
            sample_pairs().to_string(),
            "pair1: ok 12 m\n\
             pair2: open 3 m\n\
             pair3: ERROR No response after 3 attempts: Receive\n\
             pair4: 17 0 m"
        );
    }

    #[test]
    fn test_single_line_reports() {
        assert_eq!(
            DiagnosticReport::PortNotRecognized {
                port: "uplink".into()
            }
            .to_string(),
            "Port 'uplink' not recognized"
        );
        assert_eq!(
            DiagnosticReport::Failed {
                message: "set: timeout".into()
            }
            .to_string(),
            "ERROR set: timeout"
        );
        assert_eq!(
            DiagnosticReport::UnsupportedFamily {
                family: "cisco".into()
            }
            .to_string(),
            UNSUPPORTED_FAMILY_MESSAGE
        );
    }

    #[test]
    fn test_unsupported_message_is_fixed() {
        let a = DiagnosticReport::UnsupportedFamily {
            family: "cisco".into(),
        };
        let b = DiagnosticReport::UnsupportedFamily {
            family: "huawei".into(),
        };
        assert_eq!(a.render(OutputFormat::Text), b.render(OutputFormat::Text));
    }

    #[test]
    fn test_json_rendering() {
        let json: serde_json::Value =
            serde_json::from_str(&sample_pairs().render(OutputFormat::Json)).unwrap();

        assert_eq!(json["kind"], "pairs");
        assert_eq!(json["ready_confirmed"], true);
        assert_eq!(json["pairs"][0]["pair"], 1);
        assert_eq!(json["pairs"][0]["result"], "measured");
        assert_eq!(json["pairs"][0]["status"], "ok");
        assert_eq!(json["pairs"][0]["length_m"], 12);
        assert_eq!(json["pairs"][2]["result"], "failed");
        assert!(json["pairs"][2]["error"]
            .as_str()
            .unwrap()
            .starts_with("No response"));
    }

    #[test]
    fn test_is_failed() {
        assert!(PairResult::failed(1, "x").is_failed());
        assert!(!PairResult::measured(1, "ok", 1, 5).is_failed());
    }
}
