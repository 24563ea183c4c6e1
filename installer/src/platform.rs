//! Host platform normalisation.
//!
//! The installer recognises a small closed set of operating systems and CPU
//! architectures. Anything outside that set is carried as
//! [`Platform::Unsupported`] so that construction never fails and the
//! analyser can answer "not supported" without raising an error.

use std::fmt;

/// Operating system families the installer knows how to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    /// Any Linux distribution.
    Linux,
    /// macOS (Darwin).
    MacOs,
    /// Microsoft Windows.
    Windows,
}

impl OsFamily {
    /// Return the identifier used in platform ids, e.g. `macos`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linux" => Some(Self::Linux),
            "macos" | "darwin" | "osx" | "mac" => Some(Self::MacOs),
            "windows" | "win32" | "win" => Some(Self::Windows),
            _ => None,
        }
    }
}

/// CPU architectures the installer knows how to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 32-bit x86.
    X86,
    /// 64-bit x86.
    X86_64,
    /// 64-bit ARM.
    Aarch64,
}

impl Arch {
    /// Return the identifier used in platform ids, e.g. `x86_64`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "x86" | "i386" | "i586" | "i686" => Some(Self::X86),
            "x86_64" | "amd64" | "x64" => Some(Self::X86_64),
            "aarch64" | "arm64" => Some(Self::Aarch64),
            _ => None,
        }
    }
}

/// A normalised OS + architecture pair.
///
/// # Examples
///
/// ```
/// use webdriver_installer::platform::Platform;
///
/// let platform = Platform::from_parts("darwin", "arm64");
/// assert_eq!(platform.id(), "macos-aarch64");
///
/// let odd = Platform::from_parts("haiku", "riscv64");
/// assert!(!odd.is_known());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    /// A recognised OS and architecture.
    Known {
        /// Operating system family.
        os: OsFamily,
        /// CPU architecture.
        arch: Arch,
    },
    /// Values the installer does not recognise, kept verbatim.
    Unsupported {
        /// The raw OS name.
        os: String,
        /// The raw architecture name.
        arch: String,
    },
}

impl Platform {
    /// Detect the platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Normalise raw OS and architecture names.
    #[must_use]
    pub fn from_parts(os: &str, arch: &str) -> Self {
        match (OsFamily::parse(os), Arch::parse(arch)) {
            (Some(os), Some(arch)) => Self::Known { os, arch },
            _ => Self::Unsupported {
                os: os.trim().to_ascii_lowercase(),
                arch: arch.trim().to_ascii_lowercase(),
            },
        }
    }

    /// Parse a platform id of the form `<os>-<arch>`.
    ///
    /// Ids without a separator become [`Platform::Unsupported`] with an
    /// empty architecture.
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        match id.split_once('-') {
            Some((os, arch)) => Self::from_parts(os, arch),
            None => Self::from_parts(id, ""),
        }
    }

    /// Return the `<os>-<arch>` identifier used in driver configuration.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::Known { os, arch } => format!("{}-{}", os.as_str(), arch.as_str()),
            Self::Unsupported { os, arch } => format!("{os}-{arch}"),
        }
    }

    /// Whether the OS and architecture were both recognised.
    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known { .. })
    }

    /// Whether executables on this platform carry an `.exe` suffix.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        matches!(
            self,
            Self::Known {
                os: OsFamily::Windows,
                ..
            }
        )
    }

    /// The OS family, when recognised.
    #[must_use]
    pub fn os(&self) -> Option<OsFamily> {
        match self {
            Self::Known { os, .. } => Some(*os),
            Self::Unsupported { .. } => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
