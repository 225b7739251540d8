//! Best-effort avatar cache population.
//!
//! Each avatar is streamed to `{dir}/{id}.{extension}.part` and renamed
//! into place once the body is on disk, so readers of the cache only ever
//! see complete files. A failed transfer removes its `.part` file. Failures
//! are logged and reported, never raised.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Response, StatusCode};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;

pub const DEFAULT_URL_TEMPLATE: &str = "http://q1.qlogo.cn/g?b=qq&nk={id}&s=1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub dir: PathBuf,
    /// Avatar URL with `{id}` standing in for the user id.
    pub url_template: String,
    pub extension: String,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("user_profile"),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            extension: "jpg".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("user id {id:?} is not a plain file name")]
    InvalidId { id: String },
    #[error("requesting avatar {id}: {source}")]
    Request {
        id: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("avatar {id} answered {status}")]
    Status { id: String, status: StatusCode },
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Ids become file names in the cache: non-empty, no path separators, and
/// not `.` or `..`.
pub fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\', '\0'])
}

/// Outcome of a batch download; ids are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub saved: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AvatarFetcher {
    client: reqwest::Client,
    options: FetchOptions,
}

impl AvatarFetcher {
    pub fn new(options: FetchOptions) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, options })
    }

    pub fn url_for(&self, id: &str) -> String {
        self.options.url_template.replace("{id}", id)
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.options
            .dir
            .join(format!("{id}.{}", self.options.extension))
    }

    /// Downloads one avatar into the cache and returns its path.
    pub async fn fetch_avatar(&self, id: &str) -> Result<PathBuf, FetchError> {
        if !is_plain_id(id) {
            return Err(FetchError::InvalidId { id: id.to_string() });
        }
        let mut response = self
            .client
            .get(self.url_for(id))
            .send()
            .await
            .map_err(|source| FetchError::Request {
                id: id.to_string(),
                source,
            })?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                id: id.to_string(),
                status: response.status(),
            });
        }

        fs::create_dir_all(&self.options.dir)
            .await
            .map_err(|source| FetchError::Io {
                path: self.options.dir.clone(),
                source,
            })?;
        let path = self.path_for(id);
        let partial = path.with_extension(format!("{}.part", self.options.extension));
        let written = match stream_body(id, &mut response, &partial).await {
            Ok(written) => written,
            Err(err) => {
                let _ = fs::remove_file(&partial).await;
                return Err(err);
            }
        };
        if let Err(source) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(FetchError::Io { path, source });
        }
        log::debug!("cached avatar {id} ({written} bytes)");
        Ok(path)
    }

    /// Downloads every id concurrently. One failure never stops the others.
    pub async fn fetch_many<I, S>(&self, ids: I) -> FetchReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
        let mut tasks = JoinSet::new();
        for id in ids {
            let fetcher = self.clone();
            tasks.spawn(async move {
                let outcome = fetcher.fetch_avatar(&id).await;
                (id, outcome)
            });
        }

        let mut report = FetchReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(_))) => report.saved.push(id),
                Ok((id, Err(err))) => {
                    log::warn!("avatar {id} not cached: {err}");
                    report.failed.push(id);
                }
                Err(err) => log::warn!("avatar download task aborted: {err}"),
            }
        }
        report.saved.sort();
        report.failed.sort();
        report
    }
}

/// Copies the response body chunk by chunk into `partial`.
async fn stream_body(
    id: &str,
    response: &mut Response,
    partial: &Path,
) -> Result<usize, FetchError> {
    let io_error = |source| FetchError::Io {
        path: partial.to_path_buf(),
        source,
    };
    let mut file = fs::File::create(partial).await.map_err(io_error)?;
    let mut written = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| FetchError::Request {
            id: id.to_string(),
            source,
        })?
    {
        file.write_all(&chunk).await.map_err(io_error)?;
        written += chunk.len();
    }
    file.flush().await.map_err(io_error)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    /// Serves `avatar-{id}` for ids starting with "good", a truncated body
    /// for ids starting with "short" and 404 otherwise.
    async fn spawn_responder() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(respond(socket));
            }
        });
        addr
    }

    async fn respond(mut socket: TcpStream) {
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&chunk[..n]),
            }
        }
        let request = String::from_utf8_lossy(&request);
        let id = request
            .split("nk=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .unwrap_or_default()
            .to_string();

        let response = if id.starts_with("short") {
            // promises more body than it sends, then hangs up
            "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\n0123456789"
                .to_string()
        } else if id.starts_with("good") {
            let body = format!("avatar-{id}");
            format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
        } else {
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
        };
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    }

    fn options(dir: PathBuf, addr: SocketAddr) -> FetchOptions {
        FetchOptions {
            dir,
            url_template: format!("http://{addr}/g?b=qq&nk={{id}}&s=1"),
            extension: "jpg".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn urls_and_paths_follow_the_templates() {
        let fetcher = AvatarFetcher::new(FetchOptions::default()).unwrap();
        assert_eq!(
            fetcher.url_for("1001"),
            "http://q1.qlogo.cn/g?b=qq&nk=1001&s=1"
        );
        assert_eq!(
            fetcher.path_for("1001"),
            PathBuf::from("user_profile/1001.jpg")
        );
    }

    #[tokio::test]
    async fn successful_download_lands_in_the_cache() {
        let addr = spawn_responder().await;
        let temp = tempdir().unwrap();
        let fetcher = AvatarFetcher::new(options(temp.path().join("avatars"), addr)).unwrap();

        let path = fetcher.fetch_avatar("good1").await.unwrap();
        assert_eq!(path, temp.path().join("avatars").join("good1.jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), b"avatar-good1");
        assert!(!temp.path().join("avatars").join("good1.jpg.part").exists());
    }

    #[tokio::test]
    async fn non_200_leaves_no_file() {
        let addr = spawn_responder().await;
        let temp = tempdir().unwrap();
        let fetcher = AvatarFetcher::new(options(temp.path().to_path_buf(), addr)).unwrap();

        let err = fetcher.fetch_avatar("missing").await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }
        ));
        assert!(!temp.path().join("missing.jpg").exists());
    }

    #[tokio::test]
    async fn truncated_body_leaves_no_partial_file() {
        let addr = spawn_responder().await;
        let temp = tempdir().unwrap();
        let fetcher = AvatarFetcher::new(options(temp.path().to_path_buf(), addr)).unwrap();

        let err = fetcher.fetch_avatar("short1").await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
        assert!(!temp.path().join("short1.jpg").exists());
        assert!(!temp.path().join("short1.jpg.part").exists());
    }

    #[tokio::test]
    async fn ids_with_path_components_are_refused() {
        let temp = tempdir().unwrap();
        let cache = temp.path().join("cache");
        let fetcher = AvatarFetcher::new(FetchOptions {
            dir: cache.clone(),
            ..FetchOptions::default()
        })
        .unwrap();

        for id in ["../escape", "a/b", "..", ""] {
            let err = fetcher.fetch_avatar(id).await.unwrap_err();
            assert!(matches!(err, FetchError::InvalidId { .. }), "id {id:?}");
        }
        assert!(!cache.exists());
        assert!(!temp.path().join("escape.jpg").exists());

        let report = fetcher.fetch_many(["../escape"]).await;
        assert_eq!(report.failed, vec!["../escape".to_string()]);
    }

    #[tokio::test]
    async fn batch_failures_do_not_stop_siblings() {
        let addr = spawn_responder().await;
        let temp = tempdir().unwrap();
        let fetcher = AvatarFetcher::new(options(temp.path().to_path_buf(), addr)).unwrap();

        let report = fetcher
            .fetch_many(["good2", "bad", "good1", "good2", "gone"])
            .await;
        assert_eq!(report.saved, vec!["good1".to_string(), "good2".to_string()]);
        assert_eq!(report.failed, vec!["bad".to_string(), "gone".to_string()]);
        assert!(temp.path().join("good1.jpg").exists());
        assert!(temp.path().join("good2.jpg").exists());
        assert!(!temp.path().join("bad.jpg").exists());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let temp = tempdir().unwrap();
        let fetcher = AvatarFetcher::new(options(temp.path().to_path_buf(), addr)).unwrap();
        let err = fetcher.fetch_avatar("good1").await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));

        let report = fetcher.fetch_many(vec!["good1".to_string()]).await;
        assert!(report.saved.is_empty());
        assert_eq!(report.failed, vec!["good1".to_string()]);
    }
}
