//! Runtime view of the per-platform layout selection.
//!
//! The `Stat`/`StatVfs` aliases pick a variant at compile time; this enum
//! names the same closed set so a layout can be looked up from OS and
//! architecture identifiers (`uname` spelling or Rust's `std::env::consts`).

use thiserror::Error;

use crate::record::{NativeRecord, RecordLayout};
use crate::stat::{
    StatDarwin, StatFreeBsd, StatLinuxAarch64, StatLinuxI686, StatLinuxMips, StatLinuxPpc,
    StatLinuxPpc64, StatLinuxX86_64, StatWindows,
};
use crate::statvfs::{StatVfsDarwin, StatVfsFreeBsd, StatVfsLinux32, StatVfsLinux64, StatVfsWindows};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported platform: {os}")]
pub struct UnsupportedPlatform {
    pub os: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbiVariant {
    LinuxX86_64,
    /// Also riscv64 and loongarch64 (asm-generic layout).
    LinuxAarch64,
    LinuxPpc64,
    LinuxPpc,
    LinuxMips,
    /// i686 and every Linux architecture not listed above.
    LinuxI686,
    Darwin,
    FreeBsd,
    Windows,
    /// Cygwin talks to WinFsp, so it shares the Windows records.
    Cygwin,
}

impl AbiVariant {
    /// Select a variant from OS and architecture names.
    ///
    /// Matching is case-insensitive. Unknown Linux architectures fall
    /// back to [`AbiVariant::LinuxI686`], the layout of 32-bit glibc
    /// targets; unknown operating systems are an error. The compiled-in
    /// [`Stat`](crate::Stat) alias has no such fallback for 64-bit targets.
    pub fn detect(os: &str, arch: &str) -> Result<Self, UnsupportedPlatform> {
        let os_lower = os.to_ascii_lowercase();
        let arch = arch.to_ascii_lowercase();

        if os_lower.starts_with("cygwin") {
            return Ok(Self::Cygwin);
        }

        match os_lower.as_str() {
            "linux" => Ok(match arch.as_str() {
                "x86_64" | "amd64" => Self::LinuxX86_64,
                "aarch64" | "arm64" | "riscv64" | "loongarch64" => Self::LinuxAarch64,
                "ppc64" | "ppc64le" | "powerpc64" | "powerpc64le" => Self::LinuxPpc64,
                "ppc" | "powerpc" => Self::LinuxPpc,
                "mips" | "mipsel" => Self::LinuxMips,
                _ => Self::LinuxI686,
            }),
            "darwin" | "macos" => Ok(Self::Darwin),
            "freebsd" => Ok(Self::FreeBsd),
            "windows" => Ok(Self::Windows),
            _ => Err(UnsupportedPlatform { os: os.to_string() }),
        }
    }

    /// The variant the running process was built for.
    pub fn current() -> Result<Self, UnsupportedPlatform> {
        Self::detect(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn stat_layout(self) -> RecordLayout {
        match self {
            Self::LinuxX86_64 => StatLinuxX86_64::layout(),
            Self::LinuxAarch64 => StatLinuxAarch64::layout(),
            Self::LinuxPpc64 => StatLinuxPpc64::layout(),
            Self::LinuxPpc => StatLinuxPpc::layout(),
            Self::LinuxMips => StatLinuxMips::layout(),
            Self::LinuxI686 => StatLinuxI686::layout(),
            Self::Darwin => StatDarwin::layout(),
            Self::FreeBsd => StatFreeBsd::layout(),
            Self::Windows | Self::Cygwin => StatWindows::layout(),
        }
    }

    pub fn statvfs_layout(self) -> RecordLayout {
        match self {
            Self::LinuxX86_64 | Self::LinuxAarch64 | Self::LinuxPpc64 => StatVfsLinux64::layout(),
            Self::LinuxPpc | Self::LinuxMips | Self::LinuxI686 => StatVfsLinux32::layout(),
            Self::Darwin => StatVfsDarwin::layout(),
            Self::FreeBsd => StatVfsFreeBsd::layout(),
            Self::Windows | Self::Cygwin => StatVfsWindows::layout(),
        }
    }

    /// Whether the file-status record carries a creation timestamp.
    pub fn has_birthtime(self) -> bool {
        matches!(self, Self::Darwin | Self::FreeBsd | Self::Windows | Self::Cygwin)
    }

    /// Numeric value of `ENOTSUP`.
    pub fn enotsup(self) -> i32 {
        match self {
            Self::Darwin | Self::FreeBsd => 45,
            Self::Windows => 129,
            Self::Cygwin => 134,
            _ => 95,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_linux_arches() {
        let cases = [
            ("x86_64", AbiVariant::LinuxX86_64),
            ("aarch64", AbiVariant::LinuxAarch64),
            ("riscv64", AbiVariant::LinuxAarch64),
            ("ppc64le", AbiVariant::LinuxPpc64),
            ("powerpc64", AbiVariant::LinuxPpc64),
            ("ppc", AbiVariant::LinuxPpc),
            ("mips", AbiVariant::LinuxMips),
            ("i686", AbiVariant::LinuxI686),
            ("armv7l", AbiVariant::LinuxI686),
        ];
        for (arch, expected) in cases {
            assert_eq!(AbiVariant::detect("Linux", arch), Ok(expected), "{arch}");
        }
    }

    #[test]
    fn test_detect_other_os() {
        assert_eq!(AbiVariant::detect("Darwin", "arm64"), Ok(AbiVariant::Darwin));
        assert_eq!(AbiVariant::detect("macos", "x86_64"), Ok(AbiVariant::Darwin));
        assert_eq!(AbiVariant::detect("FreeBSD", "amd64"), Ok(AbiVariant::FreeBsd));
        assert_eq!(AbiVariant::detect("Windows", "AMD64"), Ok(AbiVariant::Windows));
        assert_eq!(
            AbiVariant::detect("CYGWIN_NT-10.0", "x86_64"),
            Ok(AbiVariant::Cygwin)
        );
        assert!(AbiVariant::detect("Plan9", "x86_64").is_err());
    }

    #[test]
    fn test_enotsup_values() {
        assert_eq!(AbiVariant::LinuxMips.enotsup(), 95);
        assert_eq!(AbiVariant::Darwin.enotsup(), 45);
        assert_eq!(AbiVariant::FreeBsd.enotsup(), 45);
        assert_eq!(AbiVariant::Windows.enotsup(), 129);
        assert_eq!(AbiVariant::Cygwin.enotsup(), 134);
    }

    #[test]
    fn test_birthtime_in_layouts() {
        for variant in [
            AbiVariant::LinuxX86_64,
            AbiVariant::LinuxI686,
            AbiVariant::Darwin,
            AbiVariant::FreeBsd,
            AbiVariant::Windows,
        ] {
            let has_field = variant.stat_layout().offset_of("st_birthtim").is_some();
            assert_eq!(has_field, variant.has_birthtime(), "{variant:?}");
        }
    }

    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "freebsd"))]
    #[test]
    fn test_current_matches_alias() {
        let variant = AbiVariant::current().unwrap();
        assert_eq!(variant.stat_layout().size, std::mem::size_of::<crate::Stat>());
        assert_eq!(
            variant.statvfs_layout().size,
            std::mem::size_of::<crate::StatVfs>()
        );
        assert_eq!(variant.enotsup(), crate::consts::ENOTSUP);
    }
}
