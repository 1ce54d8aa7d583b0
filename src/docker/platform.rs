//! Target platform selection for the build container.

use crate::errors::BuildEnvError;

/// Release whose images are built for the x86-64-v2 microarchitecture level.
const AMD64_V2_VERSION: &str = "9.0";

/// Default `--platform` for a host machine and image version, if one is known.
pub fn default_platform(arch: &str, version: &str) -> Option<&'static str> {
    match arch {
        "x86_64" | "amd64" => {
            if version == AMD64_V2_VERSION {
                Some("linux/amd64/v2")
            } else {
                Some("linux/amd64")
            }
        }
        "aarch64" | "arm64" => Some("linux/arm64"),
        _ => None,
    }
}

/// An explicit platform always wins; otherwise fall back to the machine default.
pub fn resolve_platform(
    explicit: Option<&str>,
    arch: &str,
    version: &str,
) -> Result<String, BuildEnvError> {
    if let Some(p) = explicit.map(str::trim).filter(|p| !p.is_empty()) {
        return Ok(p.to_string());
    }
    default_platform(arch, version)
        .map(str::to_string)
        .ok_or_else(|| BuildEnvError::UnresolvedPlatform {
            arch: arch.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x86_64_defaults() {
        assert_eq!(resolve_platform(None, "x86_64", "9.0").unwrap(), "linux/amd64/v2");
        assert_eq!(resolve_platform(None, "x86_64", "8.3").unwrap(), "linux/amd64");
        assert_eq!(resolve_platform(None, "x86_64", "9.0-rc").unwrap(), "linux/amd64");
    }

    #[test]
    fn test_arm64_ignores_v2_special_case() {
        assert_eq!(resolve_platform(None, "aarch64", "9.0").unwrap(), "linux/arm64");
    }

    #[test]
    fn test_explicit_overrides() {
        assert_eq!(
            resolve_platform(Some("linux/amd64"), "x86_64", "9.0").unwrap(),
            "linux/amd64"
        );
        assert_eq!(
            resolve_platform(Some("linux/riscv64"), "riscv64", "8.3").unwrap(),
            "linux/riscv64"
        );
    }

    #[test]
    fn test_unknown_arch_fails() {
        let err = resolve_platform(None, "riscv64", "8.3").unwrap_err();
        assert!(matches!(err, BuildEnvError::UnresolvedPlatform { ref arch } if arch == "riscv64"));
        assert_eq!(err.exit_code(), 1);
        assert!(resolve_platform(Some("  "), "ppc64le", "8.3").is_err());
    }
}
