//! Value representations
//!
//! Each element carries a two-letter VR. The engine only reasons about three
//! shapes of value ([`VrCategory`]); the VR itself decides whether a protected
//! field can be emptied or must receive a pseudonym instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shape of an element's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VrCategory {
    /// Text-like values (names, dates, codes, decimal strings)
    Ascii,
    /// Raw bytes and fixed-width numbers
    Binary,
    /// Ordered list of nested records
    Sequence,
}

/// DICOM value representation
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vr {
    AE,
    AS,
    AT,
    CS,
    DA,
    DS,
    DT,
    FD,
    FL,
    IS,
    LO,
    LT,
    OB,
    OD,
    OF,
    OL,
    OW,
    PN,
    SH,
    SL,
    SQ,
    SS,
    ST,
    TM,
    UC,
    UI,
    UL,
    UN,
    UR,
    US,
    UT,
}

impl Vr {
    /// Category of values this VR holds
    pub fn category(&self) -> VrCategory {
        match self {
            Vr::AE
            | Vr::AS
            | Vr::CS
            | Vr::DA
            | Vr::DS
            | Vr::DT
            | Vr::IS
            | Vr::LO
            | Vr::LT
            | Vr::PN
            | Vr::SH
            | Vr::ST
            | Vr::TM
            | Vr::UC
            | Vr::UI
            | Vr::UR
            | Vr::UT => VrCategory::Ascii,
            Vr::AT
            | Vr::FD
            | Vr::FL
            | Vr::OB
            | Vr::OD
            | Vr::OF
            | Vr::OL
            | Vr::OW
            | Vr::SL
            | Vr::SS
            | Vr::UL
            | Vr::UN
            | Vr::US => VrCategory::Binary,
            Vr::SQ => VrCategory::Sequence,
        }
    }

    /// Whether a protected field of this VR may be reduced to a zero-length value.
    ///
    /// Unique identifiers are referenced across records, so an empty value would
    /// break the relationships between studies, series and instances; they get a
    /// pseudonym instead. Sequences cannot be emptied at all.
    pub fn can_be_emptied(&self) -> bool {
        !matches!(self, Vr::UI | Vr::SQ)
    }

    /// Two-letter code
    pub fn as_str(&self) -> &'static str {
        match self {
            Vr::AE => "AE",
            Vr::AS => "AS",
            Vr::AT => "AT",
            Vr::CS => "CS",
            Vr::DA => "DA",
            Vr::DS => "DS",
            Vr::DT => "DT",
            Vr::FD => "FD",
            Vr::FL => "FL",
            Vr::IS => "IS",
            Vr::LO => "LO",
            Vr::LT => "LT",
            Vr::OB => "OB",
            Vr::OD => "OD",
            Vr::OF => "OF",
            Vr::OL => "OL",
            Vr::OW => "OW",
            Vr::PN => "PN",
            Vr::SH => "SH",
            Vr::SL => "SL",
            Vr::SQ => "SQ",
            Vr::SS => "SS",
            Vr::ST => "ST",
            Vr::TM => "TM",
            Vr::UC => "UC",
            Vr::UI => "UI",
            Vr::UL => "UL",
            Vr::UN => "UN",
            Vr::UR => "UR",
            Vr::US => "US",
            Vr::UT => "UT",
        }
    }
}

impl fmt::Display for Vr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vr = match s.trim().to_ascii_uppercase().as_str() {
            "AE" => Vr::AE,
            "AS" => Vr::AS,
            "AT" => Vr::AT,
            "CS" => Vr::CS,
            "DA" => Vr::DA,
            "DS" => Vr::DS,
            "DT" => Vr::DT,
            "FD" => Vr::FD,
            "FL" => Vr::FL,
            "IS" => Vr::IS,
            "LO" => Vr::LO,
            "LT" => Vr::LT,
            "OB" => Vr::OB,
            "OD" => Vr::OD,
            "OF" => Vr::OF,
            "OL" => Vr::OL,
            "OW" => Vr::OW,
            "PN" => Vr::PN,
            "SH" => Vr::SH,
            "SL" => Vr::SL,
            "SQ" => Vr::SQ,
            "SS" => Vr::SS,
            "ST" => Vr::ST,
            "TM" => Vr::TM,
            "UC" => Vr::UC,
            "UI" => Vr::UI,
            "UL" => Vr::UL,
            "UN" => Vr::UN,
            "UR" => Vr::UR,
            "US" => Vr::US,
            "UT" => Vr::UT,
            other => return Err(format!("Unknown VR '{other}'")),
        };
        Ok(vr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Vr::PN, VrCategory::Ascii)]
    #[test_case(Vr::UI, VrCategory::Ascii)]
    #[test_case(Vr::OB, VrCategory::Binary)]
    #[test_case(Vr::US, VrCategory::Binary)]
    #[test_case(Vr::SQ, VrCategory::Sequence)]
    fn test_category(vr: Vr, expected: VrCategory) {
        assert_eq!(vr.category(), expected);
    }

    #[test]
    fn test_can_be_emptied() {
        assert!(Vr::PN.can_be_emptied());
        assert!(Vr::DA.can_be_emptied());
        assert!(Vr::OB.can_be_emptied());
        assert!(!Vr::UI.can_be_emptied());
        assert!(!Vr::SQ.can_be_emptied());
    }

    #[test]
    fn test_parse_round_trips_display() {
        for code in ["AE", "PN", "SQ", "UI", "OW"] {
            let vr: Vr = code.parse().unwrap();
            assert_eq!(vr.to_string(), code);
        }
        assert!("XX".parse::<Vr>().is_err());
    }
}
