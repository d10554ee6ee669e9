//! Request pipeline for the signed API
//!
//! `BiliClient` owns everything a request needs: the `reqwest` connection
//! pool, the swappable session context, the signing strategy, and the
//! once-per-lifetime signing-key cache. The pipeline is sign (when the
//! endpoint demands it), encode, send with the session headers, then unwrap
//! the `{code, message, data}` envelope.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::models::{Envelope, NavData};
use crate::session::{BrowserSession, RawCookie, SessionContext};
use crate::sign::{encode_query, ParamMap, SignStrategy, SigningKeyPair, WbiSigner};
use crate::{BiliError, Result};

/// Default API host
pub const DEFAULT_HOST: &str = "https://api.bilibili.com";

/// Default User-Agent, matching a current desktop browser
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Account-status endpoint; also the network source of the signing keys
const NAV_PATH: &str = "/x/web-interface/nav";

/// Client for the read-only web API
///
/// One instance serves one session: requests share a connection pool, the
/// session context is swapped whole on refresh, and the signing keys are
/// derived at most once for the client's lifetime.
pub struct BiliClient {
    http: Client,
    host: String,
    user_agent: String,
    session: RwLock<Arc<SessionContext>>,
    browser: Option<Arc<dyn BrowserSession>>,
    signer: Arc<dyn SignStrategy>,
    key_cache: OnceCell<SigningKeyPair>,
}

impl BiliClient {
    /// Creates a client with the production wbi signer
    ///
    /// # Arguments
    ///
    /// * `host` - API origin, e.g. `https://api.bilibili.com`
    /// * `timeout` - per-request socket timeout
    /// * `user_agent` - User-Agent header for every request
    pub fn new(host: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        Self::with_signer(host, timeout, user_agent, Arc::new(WbiSigner))
    }

    /// Creates a client with a caller-supplied signing strategy
    pub fn with_signer(
        host: &str,
        timeout: Duration,
        user_agent: &str,
        signer: Arc<dyn SignStrategy>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        let session = SessionContext::new(user_agent, &[]);

        Ok(Self {
            http,
            host: host.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
            session: RwLock::new(Arc::new(session)),
            browser: None,
            signer,
            key_cache: OnceCell::new(),
        })
    }

    /// Attaches the browsing-session collaborator
    ///
    /// The browser supplies cookies for `refresh_session` and the
    /// local-storage signing-key cache. Attach before sharing the client.
    pub fn attach_browser(&mut self, browser: Arc<dyn BrowserSession>) {
        self.browser = Some(browser);
    }

    /// Rebuilds the session context from the attached browser's cookies
    pub async fn refresh_session(&self) -> Result<()> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| BiliError::Session("no browsing session attached".to_string()))?;
        let cookies = browser.cookies().await?;
        self.refresh_from_cookies(&cookies);

        Ok(())
    }

    /// Replaces the session context with one built from `cookies`
    ///
    /// The replacement is a single swap; requests already holding the old
    /// context finish with it, later requests see the new one.
    pub fn refresh_from_cookies(&self, cookies: &[RawCookie]) {
        let context = Arc::new(SessionContext::new(&self.user_agent, cookies));
        let mut slot = self.session.write().unwrap();
        *slot = context;
    }

    /// Returns the current session context
    pub fn session(&self) -> Arc<SessionContext> {
        self.session.read().unwrap().clone()
    }

    /// Checks whether the session cookies still identify a logged-in account
    ///
    /// Advisory only: every failure on the way (transport, envelope
    /// rejection, payload shape) is logged and reported as `false`. The
    /// caller uses the answer to decide whether to re-capture the session.
    pub async fn probe_login(&self) -> bool {
        tracing::info!("Probing login state");
        let url = format!("{}{}", self.host, NAV_PATH);

        let data = match self.request_json(Method::GET, &url, None).await {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!("Login probe failed: {}", err);
                return false;
            }
        };

        match serde_json::from_value::<NavData>(data) {
            Ok(nav) if nav.is_login => {
                tracing::info!("Session is logged in");
                true
            }
            Ok(_) => {
                tracing::info!("Session is not logged in");
                false
            }
            Err(err) => {
                tracing::warn!("Login probe failed: {}", err);
                false
            }
        }
    }

    /// Sends a GET to `path`, optionally signing the parameters
    ///
    /// The query string is produced by the same encoder the signature was
    /// computed over, so the signed bytes are the sent bytes.
    pub async fn get(&self, path: &str, params: &ParamMap, sign: bool) -> Result<Value> {
        let params = if sign {
            self.signed_params(params).await?
        } else {
            params.clone()
        };

        let query = encode_query(&params);
        let url = if query.is_empty() {
            format!("{}{}", self.host, path)
        } else {
            format!("{}{}?{}", self.host, path, query)
        };

        self.request_json(Method::GET, &url, None).await
    }

    /// Sends a POST to `path` with the signed parameters as a JSON body
    pub async fn post(&self, path: &str, params: &ParamMap) -> Result<Value> {
        let signed = self.signed_params(params).await?;
        let body = serde_json::to_string(&signed)?;
        let url = format!("{}{}", self.host, path);

        self.request_json(Method::POST, &url, Some(body)).await
    }

    /// Fetches a raw media URL (covers, preview streams) with session headers
    ///
    /// Media failures are soft: any non-success status or transport error
    /// is logged and reported as `None`, never an error.
    pub async fn fetch_media(&self, url: &str) -> Option<Vec<u8>> {
        let response = match self.apply_headers(self.http.get(url)).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("Media fetch failed for {}: {}", url, err);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Media fetch for {} answered {}", url, response.status());
            return None;
        }

        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(err) => {
                tracing::warn!("Media body read failed for {}: {}", url, err);
                None
            }
        }
    }

    /// Signs `params` with the session keys at the current timestamp
    ///
    /// An empty parameter set short-circuits to empty without touching the
    /// key cache or the network.
    pub async fn signed_params(&self, params: &ParamMap) -> Result<ParamMap> {
        if params.is_empty() {
            return Ok(ParamMap::new());
        }

        let keys = self.signing_keys().await?;
        let wts = chrono::Utc::now().timestamp();

        Ok(self.signer.sign(params, keys, wts))
    }

    /// Returns the session signing keys, deriving them on first use
    ///
    /// Concurrent first callers coalesce into a single derivation; the
    /// result is cached for the client's lifetime.
    pub async fn signing_keys(&self) -> Result<&SigningKeyPair> {
        self.key_cache
            .get_or_try_init(|| self.derive_signing_keys())
            .await
    }

    /// Derives the signing keys: browser local storage first, then the
    /// navigation endpoint
    async fn derive_signing_keys(&self) -> Result<SigningKeyPair> {
        if let Some(browser) = &self.browser {
            match browser.local_storage().await {
                Ok(storage) => {
                    if let Some(pair) = keys_from_local_storage(&storage) {
                        tracing::debug!("Signing keys read from browser local storage");
                        return Ok(pair);
                    }
                }
                Err(err) => {
                    tracing::warn!("Browser local storage unavailable: {}", err);
                }
            }
        }

        tracing::debug!("Deriving signing keys from the navigation endpoint");
        let url = format!("{}{}", self.host, NAV_PATH);
        let data = self.request_json(Method::GET, &url, None).await?;
        let nav: NavData = serde_json::from_value(data)?;
        let wbi = nav.wbi_img.ok_or_else(|| {
            BiliError::SigningUnavailable("navigation payload carries no wbi_img block".to_string())
        })?;

        SigningKeyPair::from_urls(&wbi.img_url, &wbi.sub_url)
    }

    /// Sends a request and unwraps the response envelope
    ///
    /// The HTTP status is deliberately not checked: rejections arrive as a
    /// JSON envelope with a non-zero code, which `into_data` turns into
    /// `BiliError::DataFetch`.
    async fn request_json(&self, method: Method, url: &str, body: Option<String>) -> Result<Value> {
        let mut request = self.apply_headers(self.http.request(method, url));
        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/json")
                .body(body);
        }

        let response = request.send().await.map_err(|source| BiliError::Transport {
            url: url.to_string(),
            source,
        })?;
        let envelope: Envelope =
            response
                .json()
                .await
                .map_err(|source| BiliError::Transport {
                    url: url.to_string(),
                    source,
                })?;

        envelope.into_data()
    }

    fn apply_headers(&self, mut request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let session = self.session();
        for (name, value) in &session.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request
    }

    pub(crate) fn host(&self) -> &str {
        &self.host
    }
}

/// Reads signing-key URLs out of a local-storage snapshot
///
/// Prefers the combined `wbi_img_urls` entry, else joins the separate
/// `wbi_img_url`/`wbi_sub_url` entries. Unusable cached URLs are logged and
/// ignored, sending the caller to the network fallback.
fn keys_from_local_storage(storage: &HashMap<String, String>) -> Option<SigningKeyPair> {
    let combined = match storage.get("wbi_img_urls") {
        Some(urls) if !urls.is_empty() => urls.clone(),
        _ => format!(
            "{}-{}",
            storage.get("wbi_img_url")?,
            storage.get("wbi_sub_url")?
        ),
    };

    match SigningKeyPair::from_combined(&combined) {
        Ok(pair) => Some(pair),
        Err(err) => {
            tracing::warn!("Cached signing-key URLs unusable, falling back: {}", err);
            None
        }
    }
}
