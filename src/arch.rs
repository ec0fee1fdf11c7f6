//! Target architecture naming.
//!
//! Container platforms use Go-style architecture names (`amd64`, `arm64`),
//! while Rust reports `x86_64`/`aarch64`. The host default is translated so
//! `--arch` can be omitted on common machines.

/// Host architecture in container platform naming.
pub fn host_arch() -> &'static str {
    container_arch_name(std::env::consts::ARCH)
}

/// Map a Rust target architecture name onto the container platform name.
///
/// Unknown names pass through unchanged.
pub fn container_arch_name(rust_arch: &str) -> &str {
    match rust_arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
        "loongarch64" => "loong64",
        other => other,
    }
}

/// Platform string passed to both `build` and `run`.
pub fn platform(arch: &str) -> String {
    format!("linux/{}", arch)
}
