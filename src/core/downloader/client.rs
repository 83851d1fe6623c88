use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Client;
use sha1::{Digest, Sha1};
use sha2::Sha512;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

/// What a downloaded payload is checked against before it is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileValidation {
    pub size: Option<u64>,
    pub sha1: Option<String>,
    pub sha512: Option<String>,
}

/// Plain HTTP downloader with size and hash validation.
///
/// It imposes no concurrency limit of its own; callers that fan out rely
/// on the connection pool of the shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    // ── Single file download ────────────────────────────

    /// Download `url` to `dest`, validating the payload first.
    ///
    /// The body is written to a `.part` sibling and renamed into place, so a
    /// destination that exists is always a complete file. Returns the number
    /// of bytes written.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        validation: &FileValidation,
    ) -> LauncherResult<u64> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        validate_payload(dest, &bytes, validation)?;

        let part = part_path(dest);
        {
            let mut file = tokio::fs::File::create(&part)
                .await
                .map_err(|e| LauncherError::io(&part, e))?;
            file.write_all(&bytes)
                .await
                .map_err(|e| LauncherError::io(&part, e))?;
            file.flush().await.map_err(|e| LauncherError::io(&part, e))?;
            // handle dropped before the rename
        }
        tokio::fs::rename(&part, dest)
            .await
            .map_err(|e| LauncherError::io(dest, e))?;

        debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, bytes.len());
        Ok(bytes.len() as u64)
    }

    /// Try each candidate URL in order; the first successful download wins.
    pub async fn download_first(
        &self,
        urls: &[String],
        dest: &Path,
        validation: &FileValidation,
    ) -> LauncherResult<u64> {
        let mut last_error = None;

        for url in urls {
            match self.download_file(url, dest, validation).await {
                Ok(written) => return Ok(written),
                Err(e) => {
                    warn!("Download candidate {} failed: {}", url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| LauncherError::NoDownloadSource(dest.display().to_string())))
    }
}

static PART_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique `.part` sibling per call; concurrent downloads to one destination
/// never share a temp file.
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    let seq = PART_SEQ.fetch_add(1, Ordering::Relaxed);
    name.push(format!(".{}.{}.part", std::process::id(), seq));
    dest.with_file_name(name)
}

fn validate_payload(dest: &Path, bytes: &[u8], validation: &FileValidation) -> LauncherResult<()> {
    if let Some(expected) = validation.size {
        let actual = bytes.len() as u64;
        if actual != expected {
            return Err(LauncherError::SizeMismatch {
                path: dest.to_path_buf(),
                expected,
                actual,
            });
        }
    }

    // sha1 is enough when present; sha512 only when it is all we have
    if let Some(expected) = &validation.sha1 {
        let actual = hex::encode(Sha1::digest(bytes));
        check_digest(dest, "SHA-1", expected, actual)?;
    } else if let Some(expected) = &validation.sha512 {
        let actual = hex::encode(Sha512::digest(bytes));
        check_digest(dest, "SHA-512", expected, actual)?;
    }

    Ok(())
}

fn check_digest(
    dest: &Path,
    algorithm: &'static str,
    expected: &str,
    actual: String,
) -> LauncherResult<()> {
    if actual.eq_ignore_ascii_case(expected) {
        return Ok(());
    }
    Err(LauncherError::HashMismatch {
        path: dest.to_path_buf(),
        algorithm,
        expected: expected.to_string(),
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn writes_validated_payload_and_leaves_no_part_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mods/a.jar");
        let downloader = Downloader::new(Client::new());
        let validation = FileValidation {
            size: Some(5),
            sha1: Some(hex::encode(Sha1::digest(b"hello"))),
            sha512: None,
        };

        let written = downloader
            .download_file(&format!("{}/a.jar", server.uri()), &dest, &validation)
            .await
            .unwrap();

        assert_eq!(written, 5);
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");
        let names: Vec<_> = std::fs::read_dir(dir.path().join("mods"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jar"]);
    }

    #[tokio::test]
    async fn concurrent_downloads_to_one_destination_both_succeed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/same.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"same".to_vec()))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mods/same.jar");
        let downloader = Downloader::new(Client::new());
        let url = format!("{}/same.jar", server.uri());
        let validation = FileValidation::default();

        let (a, b) = tokio::join!(
            downloader.download_file(&url, &dest, &validation),
            downloader.download_file(&url, &dest, &validation),
        );

        assert_eq!(a.unwrap(), 4);
        assert_eq!(b.unwrap(), 4);
        assert_eq!(std::fs::read(&dest).unwrap(), b"same");
        assert_eq!(std::fs::read_dir(dir.path().join("mods")).unwrap().count(), 1);
    }

    #[test]
    fn part_names_are_unique_per_call() {
        let dest = Path::new("/game/mods/x.jar");
        let a = part_path(dest);
        let b = part_path(dest);
        assert_ne!(a, b);
        assert_eq!(a.parent(), dest.parent());
        assert!(a.to_string_lossy().ends_with(".part"));
    }

    #[tokio::test]
    async fn hash_mismatch_does_not_create_destination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"tampered".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("b.jar");
        let validation = FileValidation {
            sha512: Some(hex::encode(Sha512::digest(b"original"))),
            ..Default::default()
        };

        let err = Downloader::new(Client::new())
            .download_file(&format!("{}/b.jar", server.uri()), &dest, &validation)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LauncherError::HashMismatch {
                algorithm: "SHA-512",
                ..
            }
        ));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn falls_back_to_next_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken.jar"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/mirror.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("c.jar");
        let urls = vec![
            format!("{}/broken.jar", server.uri()),
            format!("{}/mirror.jar", server.uri()),
        ];

        Downloader::new(Client::new())
            .download_first(&urls, &dest, &FileValidation::default())
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"ok");
    }

    #[tokio::test]
    async fn no_candidates_is_no_download_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = Downloader::new(Client::new())
            .download_first(&[], &dir.path().join("d.jar"), &FileValidation::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LauncherError::NoDownloadSource(_)));
    }
}
