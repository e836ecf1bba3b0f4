//! Format detection and unified dialect sniffing.
//!
//! This module provides a `Format` enum that unifies detection across the
//! four artifact kinds the engine handles: EPANET/SWMM model files and
//! EPANET/SWMM report files.

use std::path::Path;

use anyhow::Result;

use hyd_core::Dialect;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// EPANET INP model files
    EpanetInp,
    /// SWMM INP model files
    SwmmInp,
    /// EPANET RPT report files
    EpanetRpt,
    /// SWMM RPT report files
    SwmmRpt,
}

/// Confidence level for format detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    /// Extension matches but content not verified
    Low,
    /// Extension and some content markers match
    Medium,
    /// Strong content markers confirm format
    High,
}

impl Format {
    /// All supported formats.
    pub const ALL: &'static [Format] = &[
        Format::EpanetInp,
        Format::SwmmInp,
        Format::EpanetRpt,
        Format::SwmmRpt,
    ];

    /// Expected file extensions for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::EpanetInp | Format::SwmmInp => &["inp"],
            Format::EpanetRpt | Format::SwmmRpt => &["rpt"],
        }
    }

    /// Human-readable format name.
    pub fn friendly_name(&self) -> &'static str {
        match self {
            Format::EpanetInp => "EPANET INP model",
            Format::SwmmInp => "SWMM INP model",
            Format::EpanetRpt => "EPANET report",
            Format::SwmmRpt => "SWMM report",
        }
    }

    /// The dialect this format belongs to.
    pub fn dialect(&self) -> Dialect {
        match self {
            Format::EpanetInp | Format::EpanetRpt => Dialect::Epanet,
            Format::SwmmInp | Format::SwmmRpt => Dialect::Swmm,
        }
    }

    /// Whether this format is a simulation report (vs an editable model).
    pub fn is_report(&self) -> bool {
        matches!(self, Format::EpanetRpt | Format::SwmmRpt)
    }

    /// Detect format from file path and content.
    ///
    /// Returns the detected format and confidence level, or None if no
    /// format matches.
    pub fn detect(path: &Path) -> Option<(Format, Confidence)> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        let content = std::fs::read_to_string(path)
            .map(|s| s.chars().take(4096).collect::<String>())
            .unwrap_or_default();
        Self::detect_content(&ext, &content)
    }

    /// Detect format from an extension and a content sample.
    pub fn detect_content(ext: &str, content: &str) -> Option<(Format, Confidence)> {
        match ext {
            "inp" => Some(sniff_inp(content)),
            "rpt" => Some(sniff_rpt(content)),
            _ => None,
        }
    }
}

fn sniff_inp(content: &str) -> (Format, Confidence) {
    let upper = content.to_ascii_uppercase();
    // Sections that exist in exactly one dialect are strong markers.
    let swmm_markers = [
        "[SUBCATCHMENTS]",
        "[CONDUITS]",
        "[OUTFALLS]",
        "[RAINGAGES]",
        "[XSECTIONS]",
        "FLOW_ROUTING",
    ];
    let epanet_markers = ["[PIPES]", "[RESERVOIRS]", "[EMITTERS]", "[QUALITY]", "[TANKS]"];

    if swmm_markers.iter().any(|m| upper.contains(m)) {
        (Format::SwmmInp, Confidence::High)
    } else if epanet_markers.iter().any(|m| upper.contains(m)) {
        (Format::EpanetInp, Confidence::High)
    } else if upper.contains("[JUNCTIONS]") || upper.contains("[OPTIONS]") {
        // Shared sections only: assume EPANET, the older dialect.
        (Format::EpanetInp, Confidence::Medium)
    } else {
        (Format::EpanetInp, Confidence::Low)
    }
}

fn sniff_rpt(content: &str) -> (Format, Confidence) {
    let upper = content.to_ascii_uppercase();
    if upper.contains("EPANET") {
        (Format::EpanetRpt, Confidence::High)
    } else if upper.contains("STORM WATER MANAGEMENT MODEL") || upper.contains("SWMM") {
        (Format::SwmmRpt, Confidence::High)
    } else if content.lines().any(|l| {
        let t = l.trim();
        t.len() >= 4 && t.chars().all(|c| c == '*')
    }) {
        // Star banners are the SWMM report convention.
        (Format::SwmmRpt, Confidence::Medium)
    } else {
        (Format::EpanetRpt, Confidence::Low)
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.friendly_name())
    }
}

impl std::str::FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "epanet-inp" | "epanet" => Ok(Format::EpanetInp),
            "swmm-inp" | "swmm" => Ok(Format::SwmmInp),
            "epanet-rpt" => Ok(Format::EpanetRpt),
            "swmm-rpt" => Ok(Format::SwmmRpt),
            _ => anyhow::bail!(
                "Unknown format: {}. Supported: epanet-inp, swmm-inp, epanet-rpt, swmm-rpt",
                s
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_swmm_inp() {
        let content = "[TITLE]\nDemo\n[JUNCTIONS]\nJ1 10\n[CONDUITS]\nC1 J1 J2 120 0.01\n";
        let (format, confidence) = Format::detect_content("inp", content).unwrap();
        assert_eq!(format, Format::SwmmInp);
        assert_eq!(confidence, Confidence::High);
    }

    #[test]
    fn test_detect_epanet_inp() {
        let content = "[JUNCTIONS]\nJ1 10\n[PIPES]\nP1 J1 J2 100 12 100\n";
        let (format, _) = Format::detect_content("inp", content).unwrap();
        assert_eq!(format, Format::EpanetInp);
        assert_eq!(format.dialect(), Dialect::Epanet);
    }

    #[test]
    fn test_detect_rpt_banners() {
        let content = "  ****************\n  Node Depth Summary\n  ****************\n";
        let (format, _) = Format::detect_content("rpt", content).unwrap();
        assert!(format.is_report());
        assert_eq!(format, Format::SwmmRpt);
    }

    #[test]
    fn test_unknown_extension() {
        assert!(Format::detect_content("csv", "a,b,c").is_none());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("swmm".parse::<Format>().unwrap(), Format::SwmmInp);
        assert_eq!("epanet-rpt".parse::<Format>().unwrap(), Format::EpanetRpt);
        assert!("dwg".parse::<Format>().is_err());
    }
}
