//! libfuse3 bindings for path-based filesystems.
//!
//! Implement [`Operations`] for a type, list what it supports in
//! [`Operations::supported`], and hand it to [`Fuse::mount`]:
//!
//! ```no_run
//! use fusebridge::{Attrs, Fuse, FuseError, FuseResult, FileRef, MountConfig, OpSet, Operations};
//!
//! struct Hello;
//!
//! impl Operations for Hello {
//!     fn supported(&self) -> OpSet {
//!         OpSet::GETATTR
//!     }
//!
//!     fn getattr(&self, path: Option<&str>, _fh: Option<FileRef<'_>>) -> FuseResult<Attrs> {
//!         match path {
//!             Some("/") => Ok(Attrs::new().mode(0o40755).nlink(2)),
//!             _ => Err(FuseError::not_found()),
//!         }
//!     }
//! }
//!
//! Fuse::mount(Hello, &MountConfig::new("/mnt/hello").foreground(true))?;
//! # Ok::<(), fusebridge::MountError>(())
//! ```
//!
//! # Layers
//!
//! - [`ops`]: the contract and its capability set.
//! - `trampoline`: the `extern "C"` table entries libfuse calls.
//! - `adapter`: decoding native arguments and encoding results.
//! - [`fault`]: errno translation and the panic net at the boundary.
//! - [`native`]: the libfuse3 handle.
//! - [`session`]: request identity and session termination.

mod adapter;
pub mod config;
pub mod encoding;
pub mod error;
pub mod fault;
pub mod logging;
pub mod mount;
pub mod native;
pub mod ops;
pub mod session;
mod trampoline;
pub mod types;

pub use fusebridge_abi as abi;

pub use config::{MountConfig, OptionValue};
pub use encoding::Encoding;
pub use error::{ConfigError, FuseError, FuseResult, MountError};
pub use fault::FaultPolicy;
pub use logging::LoggingOps;
pub use mount::Fuse;
pub use ops::{OpSet, Operations, PrivateData};
pub use session::RequestContext;
pub use types::{AttrValue, Attrs, BufSegment, BufView, DirItem, DirIter, FileRef, RawPtr, TimeValue};
