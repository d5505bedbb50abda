//! Report families served by the service.

use std::fmt;

use serde::Deserialize;

/// Which family of report a manager serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Current observation (METAR).
    #[serde(alias = "report", alias = "METAR")]
    Metar,

    /// Terminal aerodrome forecast (TAF).
    #[serde(alias = "forecast", alias = "TAF")]
    Taf,
}

impl ReportKind {
    /// Human-readable label, as used in log lines and API messages.
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Metar => "Metar",
            ReportKind::Taf => "Taf",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Metar => f.write_str("metar"),
            ReportKind::Taf => f.write_str("taf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_names_and_aliases() {
        let kinds: Vec<ReportKind> =
            serde_yaml::from_str("[metar, taf, report, forecast, METAR, TAF]").unwrap();
        assert_eq!(
            kinds,
            vec![
                ReportKind::Metar,
                ReportKind::Taf,
                ReportKind::Metar,
                ReportKind::Taf,
                ReportKind::Metar,
                ReportKind::Taf,
            ]
        );
    }

    #[test]
    fn display_and_label() {
        assert_eq!(ReportKind::Metar.to_string(), "metar");
        assert_eq!(ReportKind::Taf.label(), "Taf");
    }
}
