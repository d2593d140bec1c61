pub mod factory;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::{debug, error, info, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};
use serde::Serialize;

use crate::effect::Effect;
use crate::error::RequestError;
use crate::navigate::{Navigator, Route, LOGIN_PATH};
use crate::response::{ApiResponse, MIME_JSON};
use crate::store::{CredentialStore, TOKEN_KEY};

/// The header the credential travels in, both ways.
pub const TOKEN_HEADER: &str = "token";

/// HTTP client that carries the stored credential on every request and
/// reacts to the server's verdict on it.
///
/// Cloning is cheap; clones share the connection pool, the store and the
/// navigator.
#[derive(Clone)]
pub struct RequestClient {
    url: String,
    client: reqwest::Client,
    timeout: Duration,

    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,

    login_path: String,
    login_return: bool,
}

pub struct RequestClientBuilder {
    url: String,
    timeout: Duration,

    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,

    login_path: String,
    login_return: bool,
}

impl RequestClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(50 * 1000);

    pub fn builder(
        url: &str,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> RequestClientBuilder {
        RequestClientBuilder {
            url: url.trim_end_matches('/').to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            store,
            navigator,
            login_path: String::from(LOGIN_PATH),
            login_return: false,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, RequestError> {
        self.send(Method::GET, path, None).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, RequestError> {
        self.send(Method::DELETE, path, None).await
    }

    pub async fn post<B>(&self, path: &str, body: &B) -> Result<ApiResponse, RequestError>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_string(body).map_err(RequestError::Encode)?;
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put<B>(&self, path: &str, body: &B) -> Result<ApiResponse, RequestError>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_string(body).map_err(RequestError::Encode)?;
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B>(&self, path: &str, body: &B) -> Result<ApiResponse, RequestError>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_string(body).map_err(RequestError::Encode)?;
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse, RequestError> {
        let body = match body {
            Some(body) => Some(serde_json::to_string(body).map_err(RequestError::Encode)?),
            None => None,
        };
        self.send(method, path, body).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<ApiResponse, RequestError> {
        let req = self.prepare(method, path, body)?;
        let method = req.method().clone();
        let url = req.url().clone();
        debug!("Request {method} {url}");

        let resp = match self.client.execute(req).await {
            Ok(resp) => resp,
            Err(err) => return Err(self.transport_error(err)),
        };

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(err) if status.is_success() => return Err(self.transport_error(err)),
            Err(err) => {
                warn!("Read {status} response body for {method} {url} failed: {err}");
                String::new()
            }
        };
        debug!("Response {method} {url}: {status}");

        let response = ApiResponse::new(status, headers, body);
        if status.is_success() {
            self.handle_response(response)
        } else {
            Err(self.handle_status_error(response))
        }
    }

    /// Runs before every request: attaches the stored credential, if any.
    fn prepare(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<reqwest::Request, RequestError> {
        let url = format!("{}/{}", self.url, path.trim_start_matches('/'));
        let mut req = self.client.request(method, &url);

        if let Some(body) = body {
            req = req.header(CONTENT_TYPE, MIME_JSON).body(body);
        }

        let token = self.store.get(TOKEN_KEY).map_err(RequestError::Store)?;
        if let Some(token) = token {
            if !token.is_empty() {
                req = req.header(TOKEN_HEADER, token);
            }
        }

        req.build().map_err(RequestError::Build)
    }

    /// The server answered with 2xx. Saves a refreshed credential, then
    /// checks the payload code. No effect is dispatched from here.
    fn handle_response(&self, response: ApiResponse) -> Result<ApiResponse, RequestError> {
        if let Some(token) = response.header(TOKEN_HEADER) {
            match self.store.set(TOKEN_KEY, token) {
                Ok(()) => info!("Server refreshed token, saved to store"),
                Err(err) => warn!("Save refreshed token failed: {err:#}"),
            }
        } else if response.headers.contains_key(TOKEN_HEADER) {
            warn!("Server refreshed token is not valid utf-8, ignore it");
        }

        if response.is_success() {
            Ok(response)
        } else {
            Err(RequestError::Rejected(response))
        }
    }

    fn handle_status_error(&self, response: ApiResponse) -> RequestError {
        let effect = Effect::for_status(response.status, response.message());
        self.apply_effect(&effect);
        RequestError::Status { response, effect }
    }

    /// Best-effort: a store failure while evicting does not stop the redirect.
    fn apply_effect(&self, effect: &Effect) {
        if effect.evicts_credential() {
            if let Err(err) = self.store.remove(TOKEN_KEY) {
                warn!("Remove expired token from store failed: {err:#}");
            }
        }
        if effect.redirects() {
            self.to_login();
        }
        if let Effect::Log(message) = effect {
            error!("Request failed: {message}");
        }
    }

    fn to_login(&self) {
        let redirect = if self.login_return {
            self.navigator.current()
        } else {
            None
        };
        let route = Route::new(self.login_path.as_str()).with_redirect(redirect);
        self.navigator.replace(&route);
    }

    /// No response at all: nothing to classify, no effect.
    fn transport_error(&self, err: reqwest::Error) -> RequestError {
        if err.is_timeout() {
            RequestError::Timeout(self.timeout)
        } else if err.is_builder() {
            RequestError::Build(err)
        } else {
            RequestError::Transport(err)
        }
    }
}

impl RequestClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn login_return(mut self, enable: bool) -> Self {
        self.login_return = enable;
        self
    }

    pub fn build(self) -> Result<RequestClient> {
        let parsed = match Url::parse(&self.url) {
            Ok(url) => url,
            Err(_) => bail!("invalid server url '{}'", self.url),
        };
        match parsed.scheme() {
            "http" | "https" => {}
            _ => bail!(
                "invalid url scheme, expect 'http' or 'https', not '{}'",
                parsed.scheme()
            ),
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("build http client")?;

        Ok(RequestClient {
            url: self.url,
            client,
            timeout: self.timeout,
            store: self.store,
            navigator: self.navigator,
            login_path: self.login_path,
            login_return: self.login_return,
        })
    }
}
