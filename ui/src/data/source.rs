//! Where measure documents come from: HTTP in the browser, a directory natively.

use futures::future::LocalBoxFuture;

use crate::core::error::LoadError;

/// Fetches named JSON documents (`measures.json`, `<measure>.json`, ...).
pub trait DataSource {
    fn fetch_text<'a>(&'a self, document: &'a str) -> LocalBoxFuture<'a, Result<String, LoadError>>;
}

impl<S: DataSource + ?Sized> DataSource for std::rc::Rc<S> {
    fn fetch_text<'a>(&'a self, document: &'a str) -> LocalBoxFuture<'a, Result<String, LoadError>> {
        (**self).fetch_text(document)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn join(base: &str, document: &str) -> String {
    if base.is_empty() {
        document.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), document)
    }
}

/// Fetches documents relative to a base URL.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
}

#[cfg(target_arch = "wasm32")]
impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl DataSource for HttpSource {
    fn fetch_text<'a>(&'a self, document: &'a str) -> LocalBoxFuture<'a, Result<String, LoadError>> {
        use futures::FutureExt;
        use gloo_net::http::Request;

        async move {
            let url = join(&self.base_url, document);
            let response = Request::get(&url)
                .send()
                .await
                .map_err(|err| LoadError::Network {
                    url: url.clone(),
                    cause: err.to_string(),
                })?;
            if !response.ok() {
                return Err(LoadError::Http {
                    url,
                    status: response.status(),
                });
            }
            response.text().await.map_err(|err| LoadError::Network {
                url,
                cause: err.to_string(),
            })
        }
        .boxed_local()
    }
}

/// Reads documents from a directory on disk.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirectorySource {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl DataSource for DirectorySource {
    fn fetch_text<'a>(&'a self, document: &'a str) -> LocalBoxFuture<'a, Result<String, LoadError>> {
        use futures::FutureExt;

        async move {
            let path = self.root.join(document);
            std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
                path: path.display().to_string(),
                source,
            })
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_handles_trailing_slashes() {
        assert_eq!(join("data/", "a.json"), "data/a.json");
        assert_eq!(join("data", "a.json"), "data/a.json");
        assert_eq!(join("", "a.json"), "a.json");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn directory_source_reads_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("measures.json"), "[]").unwrap();
        let source = DirectorySource::new(dir.path());

        let text = futures::executor::block_on(source.fetch_text("measures.json")).unwrap();
        assert_eq!(text, "[]");

        let err = futures::executor::block_on(source.fetch_text("missing.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
