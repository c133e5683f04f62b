//! Text encoding for paths, names and mount arguments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FuseError, FuseResult};

/// How native byte strings map to Rust strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
    #[serde(rename = "ascii")]
    Ascii,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
            Self::Ascii => "ascii",
        }
    }

    /// Strict decode; invalid input is an error, never replaced.
    pub fn decode(self, bytes: &[u8]) -> FuseResult<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| FuseError::other(format!("cannot decode as utf-8: {e}"))),
            Self::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            Self::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(FuseError::other(format!(
                    "cannot decode as ascii: byte {:#04x} at {pos}",
                    bytes[pos]
                ))),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
        }
    }

    pub fn encode(self, text: &str) -> FuseResult<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Latin1 => self.encode_narrow(text, 0xff),
            Self::Ascii => self.encode_narrow(text, 0x7f),
        }
    }

    fn encode_narrow(self, text: &str, max: u32) -> FuseResult<Vec<u8>> {
        text.chars()
            .map(|c| {
                if (c as u32) <= max {
                    Ok(c as u32 as u8)
                } else {
                    Err(FuseError::other(format!(
                        "cannot encode {c:?} as {}",
                        self.as_str()
                    )))
                }
            })
            .collect()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            "ascii" => Ok(Self::Ascii),
            other => Err(format!("unknown encoding: {other}")),
        }
    }
}
