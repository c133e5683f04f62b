//! Mount configuration.
//!
//! A [`MountConfig`] is either built in code or loaded from TOML:
//!
//! ```toml
//! mountpoint = "/mnt/mem"
//! foreground = true
//! encoding = "utf-8"          # or "latin-1", "ascii"
//! fault_policy = "terminate"  # or "fail-request"
//!
//! [options]
//! allow_other = true          # bare flag
//! ro = false                  # omitted
//! max_read = 131072           # key=value
//! fsname = "memfs"
//! ```

use std::ffi::CString;
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::encoding::Encoding;
use crate::error::{ConfigError, MountError};
use crate::fault::FaultPolicy;

/// Program name placed in `argv[0]`.
pub const PROGRAM_NAME: &str = "fusebridge";

/// A mount option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// `true` becomes a bare flag, `false` drops the option.
    Flag(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MountConfig {
    pub mountpoint: PathBuf,
    /// Hand operations the native file info instead of a bare handle.
    #[serde(default)]
    pub raw_fi: bool,
    #[serde(default)]
    pub encoding: Encoding,
    #[serde(default)]
    pub foreground: bool,
    #[serde(default)]
    pub debug: bool,
    /// Run libfuse's single-threaded loop.
    #[serde(default)]
    pub nothreads: bool,
    #[serde(default)]
    pub fault_policy: FaultPolicy,
    #[serde(default)]
    pub options: IndexMap<String, OptionValue>,
}

impl MountConfig {
    pub fn new(mountpoint: impl Into<PathBuf>) -> Self {
        Self {
            mountpoint: mountpoint.into(),
            raw_fi: false,
            encoding: Encoding::default(),
            foreground: false,
            debug: false,
            nothreads: false,
            fault_policy: FaultPolicy::default(),
            options: IndexMap::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    pub fn raw_fi(mut self, on: bool) -> Self {
        self.raw_fi = on;
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn foreground(mut self, on: bool) -> Self {
        self.foreground = on;
        self
    }

    pub fn debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    pub fn nothreads(mut self, on: bool) -> Self {
        self.nothreads = on;
        self
    }

    pub fn fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Check the config can be rendered into a startup vector. Option names
    /// may not be empty or hold `,` or `=`, and text values may not hold `,`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mountpoint.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("mountpoint is empty".into()));
        }
        if let Some(key) = self.options.keys().find(|k| k.is_empty() || k.contains([',', '='])) {
            return Err(ConfigError::Invalid(format!("bad option name {key:?}")));
        }
        for (key, value) in &self.options {
            match value {
                OptionValue::Text(text) if text.contains(',') => {
                    return Err(ConfigError::Invalid(format!("option {key} has a ',' in {text:?}")));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// The `-o` option string. `fsname` defaults to `default_fsname`.
    pub fn option_string(&self, default_fsname: &str) -> String {
        let mut parts = Vec::new();
        if !self.options.contains_key("fsname") {
            parts.push(format!("fsname={default_fsname}"));
        }
        for (key, value) in &self.options {
            match value {
                OptionValue::Flag(true) => parts.push(key.clone()),
                OptionValue::Flag(false) => {}
                other => parts.push(format!("{key}={other}")),
            }
        }
        parts.join(",")
    }

    /// The native startup vector: program name, flags, `-o` options, then
    /// the mountpoint, each encoded with the configured encoding.
    pub fn args(&self, default_fsname: &str) -> Result<Vec<CString>, MountError> {
        self.validate()
            .map_err(|e| MountError::InvalidArgument(e.to_string()))?;
        let mountpoint = self
            .mountpoint
            .to_str()
            .ok_or_else(|| MountError::InvalidArgument(format!("mountpoint is not text: {:?}", self.mountpoint)))?;

        let mut args = vec![PROGRAM_NAME.to_string()];
        if self.foreground {
            args.push("-f".into());
        }
        if self.debug {
            args.push("-d".into());
        }
        if self.nothreads {
            args.push("-s".into());
        }
        let options = self.option_string(default_fsname);
        if !options.is_empty() {
            args.push("-o".into());
            args.push(options);
        }
        args.push(mountpoint.to_string());

        args.into_iter()
            .map(|arg| {
                let bytes = self
                    .encoding
                    .encode(&arg)
                    .map_err(|e| MountError::InvalidArgument(e.to_string()))?;
                CString::new(bytes).map_err(|_| MountError::InvalidArgument(format!("argument contains NUL: {arg:?}")))
            })
            .collect()
    }
}

impl std::str::FromStr for MountConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
