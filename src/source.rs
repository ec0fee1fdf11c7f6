//! SRPM source resolution.
//!
//! A source is either a URL (anything starting with `http`) which gets
//! downloaded into a scoped temporary file, or a local path which is made
//! absolute and used in place.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use reqwest::blocking::Client;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use tempfile::TempPath;

use crate::error::{Error, Result};

/// Where the SRPM comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SrpmSource {
    Url(String),
    Local(PathBuf),
}

impl SrpmSource {
    pub fn classify(raw: &str) -> Self {
        if raw.starts_with("http") {
            SrpmSource::Url(raw.to_string())
        } else {
            SrpmSource::Local(PathBuf::from(raw))
        }
    }
}

/// Absolute path to the SRPM for this run.
///
/// When the SRPM was downloaded the file belongs to the run and is removed
/// when this value drops. Local files are never touched.
#[derive(Debug)]
pub struct ResolvedSrpm {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl ResolvedSrpm {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }
}

/// Resolve a raw `--srpm` value to a local file.
pub fn resolve(raw: &str) -> Result<ResolvedSrpm> {
    match SrpmSource::classify(raw) {
        SrpmSource::Url(url) => {
            log::info!(">>> Downloading SRPM from URL...");
            download_to_temp(&url)
        }
        SrpmSource::Local(path) => {
            log::info!(">>> Using local SRPM...");
            let path = absolute_path(&path)?;
            log::debug!("resolved local SRPM to {}", path.display());
            Ok(ResolvedSrpm { path, temp: None })
        }
    }
}

/// Download `url` into a fresh `kernel-*.src.rpm` in the system temp dir.
pub fn download_to_temp(url: &str) -> Result<ResolvedSrpm> {
    let mut file = tempfile::Builder::new()
        .prefix("kernel-")
        .suffix(".src.rpm")
        .tempfile()
        .map_err(Error::TempFile)?;
    // NamedTempFile removes itself if the transfer below fails.
    let path = file.path().to_path_buf();
    log::debug!("downloading {} -> {}", url, path.display());

    download_into(url, file.as_file_mut())?;

    Ok(ResolvedSrpm {
        path,
        temp: Some(file.into_temp_path()),
    })
}

/// Stream the body of a GET on `url` into `dest`. Only 200 is accepted.
pub fn download_into(url: &str, dest: &mut File) -> Result<u64> {
    let download_err = |reason: String| Error::Download {
        url: url.to_string(),
        reason,
    };

    let mut response = http_client()
        .and_then(|client| client.get(url).send())
        .map_err(|e| download_err(e.to_string()))?;
    if response.status() != StatusCode::OK {
        return Err(download_err(format!("bad status: {}", response.status())));
    }

    let written = response
        .copy_to(dest)
        .map_err(|e| download_err(e.to_string()))?;
    log::debug!("downloaded {} bytes from {}", written, url);
    Ok(written)
}

fn http_client() -> reqwest::Result<Client> {
    let builder =
        Client::builder().user_agent(concat!("kernel-builder/", env!("CARGO_PKG_VERSION")));
    // Loopback test servers must not be routed through a CI proxy.
    #[cfg(test)]
    let builder = builder.no_proxy();
    builder.build()
}

/// Make `path` absolute against the current directory.
///
/// Purely lexical: the file does not have to exist and symlinks are kept.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(Error::PathResolution {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty path"),
        });
    }

    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|source| Error::PathResolution {
            path: path.to_path_buf(),
            source,
        })?;
        cwd.join(path)
    };

    Ok(clean(&joined))
}

fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `/..` stays `/`
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Compare the SHA-256 of `path` against `expected` (hex, case-insensitive).
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let mut file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let actual = format!("{:x}", hasher.finalize());
    let expected = expected.trim().to_ascii_lowercase();

    if actual != expected {
        return Err(Error::ChecksumMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one HTTP response on a loopback port.
    pub(crate) fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let mut request = Vec::new();
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let header = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status_line,
                    body.len()
                );
                let _ = stream.write_all(header.as_bytes());
                let _ = stream.write_all(body);
                let _ = stream.flush();
            }
        });
        format!("http://{}/kernel.src.rpm", addr)
    }

    pub(crate) fn unused_local_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/kernel.src.rpm", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{serve_once, unused_local_url};
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn classify_uses_http_prefix() {
        assert_eq!(
            SrpmSource::classify("https://example.org/k.src.rpm"),
            SrpmSource::Url("https://example.org/k.src.rpm".to_string())
        );
        assert_eq!(
            SrpmSource::classify("http://example.org/k.src.rpm"),
            SrpmSource::Url("http://example.org/k.src.rpm".to_string())
        );
        assert_eq!(
            SrpmSource::classify("./kernel.src.rpm"),
            SrpmSource::Local(PathBuf::from("./kernel.src.rpm"))
        );
        assert_eq!(
            SrpmSource::classify("/srv/ftp/http-mirror/k.src.rpm"),
            SrpmSource::Local(PathBuf::from("/srv/ftp/http-mirror/k.src.rpm"))
        );
    }

    #[test]
    fn local_existing_file_resolves_to_absolute_without_temp() {
        let temp = TempDir::new().unwrap();
        let srpm = temp.path().join("kernel-6.1.src.rpm");
        std::fs::write(&srpm, b"srpm").unwrap();

        let resolved = resolve(srpm.to_str().unwrap()).unwrap();
        assert_eq!(resolved.path(), srpm.as_path());
        assert!(!resolved.is_temporary());

        drop(resolved);
        assert!(srpm.exists(), "local SRPM must never be deleted");
    }

    #[test]
    fn relative_path_is_joined_with_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let abs = absolute_path(Path::new("some/dir/../kernel.src.rpm")).unwrap();
        assert_eq!(abs, cwd.join("some/kernel.src.rpm"));
        assert!(abs.is_absolute());
    }

    #[test]
    fn absolute_path_is_cleaned() {
        let abs = absolute_path(Path::new("/a/./b/../c")).unwrap();
        assert_eq!(abs, PathBuf::from("/a/c"));
        assert_eq!(absolute_path(Path::new("/..")).unwrap(), PathBuf::from("/"));
    }

    #[test]
    fn empty_path_is_resolution_error() {
        let err = absolute_path(Path::new("")).unwrap_err();
        assert!(matches!(err, Error::PathResolution { .. }));
    }

    #[test]
    fn download_writes_body_and_removes_file_on_drop() {
        let url = serve_once("200 OK", b"fake srpm payload");

        let resolved = resolve(&url).unwrap();
        assert!(resolved.is_temporary());
        let path = resolved.path().to_path_buf();
        assert!(path.is_absolute());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("kernel-") && name.ends_with(".src.rpm"));
        assert_eq!(std::fs::read(&path).unwrap(), b"fake srpm payload");

        drop(resolved);
        assert!(!path.exists(), "downloaded SRPM must be removed");
    }

    #[test]
    fn non_200_status_is_download_error() {
        let url = serve_once("404 Not Found", b"nope");
        let err = resolve(&url).unwrap_err();
        match err {
            Error::Download { reason, .. } => assert!(reason.contains("404"), "{reason}"),
            other => panic!("expected Download, got {other:?}"),
        }
    }

    #[test]
    fn transport_failure_is_download_error() {
        let err = resolve(&unused_local_url()).unwrap_err();
        assert!(matches!(err, Error::Download { .. }));
    }

    #[test]
    fn sha256_verification() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("k.src.rpm");
        std::fs::write(&file, b"abc").unwrap();

        let digest = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        verify_sha256(&file, digest).unwrap();
        verify_sha256(&file, &digest.to_ascii_uppercase()).unwrap();

        let err = verify_sha256(&file, &"0".repeat(64)).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }));
    }
}
