//! Cross-compilation target definitions

/// A cross-compilation target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    /// CPU architecture as Zig names it (e.g., "aarch64", "x86_64", "x86")
    pub arch: &'static str,
    /// Operating system as Zig names it (e.g., "macos", "linux", "windows")
    pub os: &'static str,
}

/// macOS on Apple silicon
pub const MACOS_AARCH64: Target = Target {
    arch: "aarch64",
    os: "macos",
};

/// macOS on Intel
pub const MACOS_X86_64: Target = Target {
    arch: "x86_64",
    os: "macos",
};

/// Linux ARM64
pub const LINUX_AARCH64: Target = Target {
    arch: "aarch64",
    os: "linux",
};

/// Linux x86_64
pub const LINUX_X86_64: Target = Target {
    arch: "x86_64",
    os: "linux",
};

/// Linux 32-bit x86
pub const LINUX_X86: Target = Target {
    arch: "x86",
    os: "linux",
};

/// Windows x86_64
pub const WINDOWS_X86_64: Target = Target {
    arch: "x86_64",
    os: "windows",
};

/// Windows 32-bit x86
pub const WINDOWS_X86: Target = Target {
    arch: "x86",
    os: "windows",
};

/// Every target a release is built for, in build order
pub const ALL_TARGETS: &[Target] = &[
    MACOS_AARCH64,
    MACOS_X86_64,
    LINUX_AARCH64,
    LINUX_X86_64,
    LINUX_X86,
    WINDOWS_X86_64,
    WINDOWS_X86,
];

impl Target {
    /// The `arch-os` string passed to `-Dtarget`
    pub fn triple(&self) -> String {
        format!("{}-{}", self.arch, self.os)
    }

    /// Executable suffix for binaries built for this target
    pub fn exe_suffix(&self) -> &'static str {
        if self.os == "windows" { ".exe" } else { "" }
    }

    /// File name of an executable built for this target
    pub fn executable_name(&self, base_name: &str) -> String {
        format!("{}{}", base_name, self.exe_suffix())
    }

    /// Name of the release directory (and archive stem) for this target.
    ///
    /// `zigverm-0.3.1-x86_64-linux`
    pub fn output_dir_name(&self, version: &str) -> String {
        format!("zigverm-{}-{}", version, self.triple())
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.arch, self.os)
    }
}
