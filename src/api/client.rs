use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::types::{Ack, ErrorBody};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::{AuthScope, Session};

/// Shared HTTP client: one base URL, bearer token attached from the session.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<Session>) -> Result<Self> {
        let base_url = Url::parse(&config.api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| Error::InvalidUrl(config.api_url.clone()))?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("rumin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Only fails for cannot-be-a-base URLs, which `new` rejects.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Request builder with the scope's token attached, if there is one.
    pub(crate) fn request(
        &self,
        method: Method,
        segments: &[&str],
        scope: AuthScope,
    ) -> RequestBuilder {
        let url = self.url(segments);
        debug!("{method} {}", url.path());
        let builder = self.http.request(method, url);
        match self.session.token(scope) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str], scope: AuthScope) -> Result<T> {
        self.send(self.request(Method::GET, segments, scope)).await
    }

    pub async fn post<B, T>(&self, segments: &[&str], body: &B, scope: AuthScope) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, segments, scope).json(body))
            .await
    }

    /// POST/PUT/DELETE whose response body only matters when it carries a
    /// message.
    pub async fn mutate<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        scope: AuthScope,
    ) -> Result<Ack>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self.request(method, segments, scope);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send_ack(builder).await
    }

    pub async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let body = self.execute(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn send_ack(&self, builder: RequestBuilder) -> Result<Ack> {
        let body = self.execute(builder).await?;
        if body.trim().is_empty() {
            return Ok(Ack::default());
        }
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    /// Send and return the body of a 2xx response. Anything else becomes
    /// [`Error::Server`] carrying the backend's message, when it sent one.
    async fn execute(&self, builder: RequestBuilder) -> Result<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            debug!("{status}, {} bytes", body.len());
            return Ok(body);
        }

        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(ErrorBody::into_message)
            .unwrap_or_default();
        warn!("Backend returned {status}: {message}");

        Err(Error::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> Result<ApiClient> {
        let config = Config {
            api_url: api_url.to_string(),
            ..Config::default()
        };
        ApiClient::new(&config, Arc::new(Session::in_memory()))
    }

    #[test]
    fn ids_are_encoded_as_single_segments() {
        let client = client("http://localhost:5000/api").unwrap();
        assert_eq!(
            client.url(&["interests", "r1#x"]).as_str(),
            "http://localhost:5000/api/interests/r1%23x"
        );
        assert_eq!(
            client.url(&["rooms", "a/b?c"]).as_str(),
            "http://localhost:5000/api/rooms/a%2Fb%3Fc"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let client = client("http://localhost:5000/api/").unwrap();
        assert_eq!(client.url(&["rooms"]).as_str(), "http://localhost:5000/api/rooms");
        assert_eq!(client.base_url(), "http://localhost:5000/api/");
    }

    #[test]
    fn unusable_base_url_is_rejected() {
        for bad in ["localhost:5000/api", "mailto:admin@example.com", ""] {
            assert!(matches!(client(bad), Err(Error::InvalidUrl(_))), "{bad:?}");
        }
    }
}
