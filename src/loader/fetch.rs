//! Byte transports: local files and HTTP natively, `fetch()` in the
//! browser.

use futures::future::LocalBoxFuture;
use futures::FutureExt as _;

use super::{AssetLoadError, Fetch};

fn fetch_error(url: &str, reason: impl ToString) -> AssetLoadError {
    AssetLoadError::Fetch {
        url: url.to_owned(),
        reason: reason.to_string(),
    }
}

// -----------------------------
// Native (disk) fetcher
// -----------------------------

/// Reads assets from the local filesystem. `file://` prefixes are stripped.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

#[cfg(not(target_arch = "wasm32"))]
impl Fetch for FileFetcher {
    fn fetch(
        &self,
        url: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<u8>, AssetLoadError>> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        let result = std::fs::read(path).map_err(|e| fetch_error(url, e));
        async move { result }.boxed_local()
    }
}

// -----------------------------
// Native (HTTP) fetcher
// -----------------------------

/// Upper bound on a single downloaded body.
#[cfg(feature = "viewer")]
const MAX_BODY_BYTES: u64 = 512 * 1024 * 1024;

/// Blocking HTTP(S) fetcher; meant to run on a loader thread.
#[cfg(feature = "viewer")]
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

#[cfg(feature = "viewer")]
impl Fetch for HttpFetcher {
    fn fetch(
        &self,
        url: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<u8>, AssetLoadError>> {
        let result = ureq::get(url)
            .call()
            .map_err(|e| fetch_error(url, e))
            .and_then(|response| {
                let mut body = response.into_body();
                body.with_config()
                    .limit(MAX_BODY_BYTES)
                    .read_to_vec()
                    .map_err(|e| fetch_error(url, e))
            });
        async move { result }.boxed_local()
    }
}

/// Routes `http(s)://` URLs to [`HttpFetcher`] and everything else to
/// [`FileFetcher`].
#[cfg(feature = "viewer")]
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFetcher;

#[cfg(feature = "viewer")]
impl Fetch for NativeFetcher {
    fn fetch(
        &self,
        url: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<u8>, AssetLoadError>> {
        if url.starts_with("http://") || url.starts_with("https://") {
            HttpFetcher.fetch(url)
        } else {
            FileFetcher.fetch(url)
        }
    }
}

// -----------------------------
// WASM (HTTP) fetcher
// -----------------------------

/// Browser `fetch()` transport.
#[cfg(feature = "web")]
#[derive(Debug, Clone, Copy, Default)]
pub struct WebFetcher;

#[cfg(feature = "web")]
impl Fetch for WebFetcher {
    fn fetch(
        &self,
        url: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<u8>, AssetLoadError>> {
        let url = url.to_owned();
        async move { fetch_bytes(&url).await }.boxed_local()
    }
}

#[cfg(feature = "web")]
async fn fetch_bytes(url: &str) -> Result<Vec<u8>, AssetLoadError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let js_err = |e: wasm_bindgen::JsValue| fetch_error(url, format!("{e:?}"));

    let win = web_sys::window().ok_or_else(|| fetch_error(url, "no window"))?;
    let resp_val = JsFuture::from(win.fetch_with_str(url))
        .await
        .map_err(js_err)?;
    let resp: web_sys::Response = resp_val.dyn_into().map_err(js_err)?;

    if !resp.ok() {
        return Err(fetch_error(
            url,
            format!("HTTP {} {}", resp.status(), resp.status_text()),
        ));
    }

    let buf_promise = resp.array_buffer().map_err(js_err)?;
    let buf_val = JsFuture::from(buf_promise).await.map_err(js_err)?;
    let bytes = js_sys::Uint8Array::new(&buf_val);
    Ok(bytes.to_vec())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn file_fetcher_reads_and_reports_missing_files() {
        let path = std::env::temp_dir().join("isle_fetch_test.bin");
        std::fs::write(&path, [7u8, 8, 9]).unwrap();
        let url = format!("file://{}", path.display());
        let bytes = pollster::block_on(FileFetcher.fetch(&url)).unwrap();
        assert_eq!(bytes, vec![7, 8, 9]);
        let _ = std::fs::remove_file(&path);

        let err = pollster::block_on(FileFetcher.fetch("/definitely/not/here.gltf"))
            .unwrap_err();
        assert!(matches!(err, AssetLoadError::Fetch { .. }));
    }
}
