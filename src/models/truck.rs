//! Truck-type classification used to pick a report template.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Truck type, supplied by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruckType {
    /// Compression garbage truck (yellow template).
    Compression,
    /// Recycling truck (white template).
    Recycling,
}

impl TruckType {
    pub const ALL: [TruckType; 2] = [TruckType::Compression, TruckType::Recycling];

    /// Operator-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            TruckType::Compression => "壓縮式垃圾車",
            TruckType::Recycling => "資源回收車",
        }
    }

    /// Suffix used in the output filename.
    pub fn filename_suffix(&self) -> &'static str {
        match self {
            TruckType::Compression => "垃圾車",
            TruckType::Recycling => "回收車",
        }
    }

    /// Default template filename for this type.
    pub fn template_filename(&self) -> &'static str {
        match self {
            TruckType::Compression => "template_yellow.docx",
            TruckType::Recycling => "template_white.docx",
        }
    }

    /// Checkbox glyph for a template checkbox belonging to `other`.
    pub fn checkbox_for(&self, other: TruckType) -> &'static str {
        if *self == other {
            "■"
        } else {
            "□"
        }
    }
}

impl fmt::Display for TruckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The selection string was not a known truck type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown truck type: {0}")]
pub struct UnknownTruckType(pub String);

impl FromStr for TruckType {
    type Err = UnknownTruckType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "壓縮式垃圾車" | "compression" | "yellow" => Ok(TruckType::Compression),
            "資源回收車" | "recycling" | "white" => Ok(TruckType::Recycling),
            _ => Err(UnknownTruckType(s.to_string())),
        }
    }
}
