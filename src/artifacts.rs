//! Summary of what the builder image left in the output directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// An RPM found under the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpmArtifact {
    /// Path relative to the output directory.
    pub relative: PathBuf,
    pub size: u64,
}

/// Collect every `*.rpm` (including `*.src.rpm`) under `output_dir`, sorted.
///
/// Unreadable entries are skipped; this only feeds the end-of-run report.
pub fn collect_rpms(output_dir: &Path) -> Vec<RpmArtifact> {
    let mut rpms: Vec<RpmArtifact> = WalkDir::new(output_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "rpm"))
        .filter_map(|entry| {
            let size = entry.metadata().ok()?.len();
            let relative = entry.path().strip_prefix(output_dir).ok()?.to_path_buf();
            Some(RpmArtifact { relative, size })
        })
        .collect();
    rpms.sort_by(|a, b| a.relative.cmp(&b.relative));
    rpms
}

/// Log the RPMs in `output_dir`. Warns when there are none.
pub fn report(output_dir: &Path) -> Vec<RpmArtifact> {
    let rpms = collect_rpms(output_dir);
    if rpms.is_empty() {
        log::warn!("no RPMs found in {}", output_dir.display());
    }
    for rpm in &rpms {
        log::info!(
            "  {} ({:.1} MB)",
            rpm.relative.display(),
            rpm.size as f64 / 1_000_000.0
        );
    }
    rpms
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn collects_nested_rpms_only() {
        let temp = TempDir::new().unwrap();
        let out = temp.path();
        fs::create_dir_all(out.join("x86_64")).unwrap();
        fs::write(out.join("x86_64/kernel-6.1-1.x86_64.rpm"), b"12345").unwrap();
        fs::write(out.join("kernel-6.1-1.src.rpm"), b"1").unwrap();
        fs::write(out.join("build.log"), b"log").unwrap();

        let rpms = collect_rpms(out);

        assert_eq!(
            rpms,
            vec![
                RpmArtifact {
                    relative: PathBuf::from("kernel-6.1-1.src.rpm"),
                    size: 1,
                },
                RpmArtifact {
                    relative: PathBuf::from("x86_64/kernel-6.1-1.x86_64.rpm"),
                    size: 5,
                },
            ]
        );
    }

    #[test]
    fn empty_or_missing_dir_reports_nothing() {
        let temp = TempDir::new().unwrap();
        assert!(report(temp.path()).is_empty());
        assert!(collect_rpms(&temp.path().join("missing")).is_empty());
    }
}
