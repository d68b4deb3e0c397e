//! HTTP client for the backend.
//!
//! Requests carry the session cookie kept in a shared jar. Non-GET requests
//! also carry the anti-forgery token found in the `csrftoken` cookie.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, Result};

const CSRF_COOKIE: &str = "csrftoken";
const CSRF_HEADER: &str = "X-CSRFToken";
const JSON: &str = "application/json";

/// Backend answer, interpreted only when it is typed as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Json(Value),
    Raw(RawResponse),
}

/// Uninterpreted response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Reply {
    /// Deserialize a JSON reply into `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Reply::Json(value) => Ok(serde_json::from_value(value)?),
            Reply::Raw(raw) => Err(ClientError::UnexpectedContent {
                status: raw.status,
            }),
        }
    }
}

/// Credentialed HTTP client.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    jar: Arc<Jar>,
    base_url: String,
}

impl HttpClient {
    /// Create a new [`HttpClient`] against `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // fail early on unusable URLs.
        Url::parse(base_url)?;

        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            jar,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store a `Set-Cookie` style string for the backend origin.
    pub fn add_cookie(&self, cookie: &str) -> Result<()> {
        let url = Url::parse(&self.base_url)?;
        self.jar.add_cookie_str(cookie, &url);
        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http") {
            Ok(Url::parse(path)?)
        } else {
            Ok(Url::parse(&format!("{}{path}", self.base_url))?)
        }
    }

    /// Anti-forgery token of the current origin, if the backend set one.
    fn csrf_token(&self, url: &Url) -> Option<String> {
        let cookies = self.jar.cookies(url)?;
        let cookies = cookies.to_str().ok()?;

        cookies.split(';').find_map(|cookie| {
            cookie
                .trim()
                .strip_prefix(CSRF_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
                .map(ToOwned::to_owned)
        })
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        let url = self.url(path)?;
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON));

        if method != Method::GET {
            if let Some(token) = self.csrf_token(&url) {
                request = request.header(CSRF_HEADER, token);
            }
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        tracing::debug!(%method, path, status = %response.status(), "backend answered");

        Ok(response)
    }

    /// Parse JSON replies or raise with the backend message.
    async fn interpret(response: Response) -> Result<Reply> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);

        if !content_type.as_deref().is_some_and(|ct| ct.contains(JSON)) {
            return Ok(Reply::Raw(RawResponse {
                status,
                content_type,
                body: response.bytes().await?.to_vec(),
            }));
        }

        let bytes = response.bytes().await?;
        let data = serde_json::from_slice::<Value>(&bytes);

        if !status.is_success() {
            return Err(ClientError::api(status, &data.unwrap_or_default()));
        }

        Ok(Reply::Json(data?))
    }

    pub async fn get(&self, path: &str) -> Result<Reply> {
        let response = self.request(Method::GET, path, None).await?;
        Self::interpret(response).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Reply> {
        let body = serde_json::to_vec(body)?;
        let response = self.request(Method::POST, path, Some(body)).await?;
        Self::interpret(response).await
    }

    /// `POST` without a body.
    pub async fn post_empty(&self, path: &str) -> Result<Reply> {
        let response = self.request(Method::POST, path, None).await?;
        Self::interpret(response).await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Reply> {
        let body = serde_json::to_vec(body)?;
        let response = self.request(Method::PATCH, path, Some(body)).await?;
        Self::interpret(response).await
    }

    /// `DELETE`, returned as-is.
    pub async fn delete(&self, path: &str) -> Result<RawResponse> {
        let response = self.request(Method::DELETE, path, None).await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);

        Ok(RawResponse {
            status,
            content_type,
            body: response.bytes().await?.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpClient {
        HttpClient::new("http://127.0.0.1:8000/", Duration::from_secs(1))
            .unwrap()
    }

    #[test]
    fn test_url_join() {
        let client = client();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(
            client.url("/api/auth/login/").unwrap().as_str(),
            "http://127.0.0.1:8000/api/auth/login/"
        );
        assert_eq!(
            client.url("https://other.example/x").unwrap().as_str(),
            "https://other.example/x"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpClient::new("", Duration::from_secs(1)),
            Err(ClientError::Url(_))
        ));
    }

    #[test]
    fn test_csrf_token_from_jar() {
        let client = client();
        let url = client.url("/api/auth/logout/").unwrap();
        assert_eq!(client.csrf_token(&url), None);

        client.add_cookie("sessionid=s3ss10n; Path=/").unwrap();
        assert_eq!(client.csrf_token(&url), None);

        client.add_cookie("csrftoken=t0k3n; Path=/").unwrap();
        assert_eq!(client.csrf_token(&url).as_deref(), Some("t0k3n"));
    }

    #[test]
    fn test_raw_reply_is_not_json() {
        let reply = Reply::Raw(RawResponse {
            status: StatusCode::OK,
            content_type: Some("text/html".into()),
            body: b"<html></html>".to_vec(),
        });
        let result = reply.into_json::<Value>();
        assert!(matches!(
            result,
            Err(ClientError::UnexpectedContent { status }) if status == StatusCode::OK
        ));
    }
}
