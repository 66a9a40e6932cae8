//! HTTP transport to the shelf server.

use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use thiserror::Error;
use url::Url;
use wire::{
    domain::VideoType,
    update::{
        PostData, TitleUpdate, UpdateReply, UpdateRequestBody, CSRF_COOKIE, CSRF_HEADER,
        REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE,
    },
};

use crate::{
    cookies::CookieJar,
    page::{self, PageError},
    shelf::Shelf,
    source::ShelfSource,
};

/// Client-side abort clock for one update request, body read included.
pub const DEFAULT_UPDATE_TIMEOUT: Duration = Duration::from_secs(10);

/// One apply action's worth of data, assembled the same way whether the
/// URL came from a candidate entry or the manual row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub title: String,
    pub update_url: String,
    pub chosen_url: String,
    pub video_type: VideoType,
}

/// Why a title update failed. Variants map one-to-one onto the messages
/// the user sees; callers never string-match.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("403: missing CSRF token - cookies must be allowed (private window?)")]
    MissingCsrfToken,
    #[error("{status}: {status_text}")]
    Status { status: u16, status_text: String },
    #[error("{0}")]
    Rejected(String),
    #[error("timed out waiting for the title update")]
    TimedOut,
    #[error("update request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("update endpoint is not a valid url: {0}")]
    BadEndpoint(#[from] url::ParseError),
}

/// Seam between the apps and the wire, stubbable in tests.
#[async_trait]
pub trait ShelfTransport: Send + Sync {
    async fn fetch_shelf(&self, source: &ShelfSource) -> Result<Shelf, PageError>;
    async fn apply_update(&self, request: UpdateRequest) -> Result<TitleUpdate, UpdateError>;
}

/// Talks to the shelf server the way the page's own script would: cookies
/// captured from shelf fetches go back on same-origin requests only, and
/// the CSRF token rides the `X-CSRFToken` header when one exists.
pub struct HttpShelfClient {
    http: Client,
    base: Url,
    jar: Mutex<CookieJar>,
    csrf_cookie: String,
    update_timeout: Duration,
}

impl HttpShelfClient {
    pub fn new(base: Url) -> Self {
        Self::with_settings(base, CSRF_COOKIE, DEFAULT_UPDATE_TIMEOUT)
    }

    pub fn with_settings(
        base: Url,
        csrf_cookie: impl Into<String>,
        update_timeout: Duration,
    ) -> Self {
        Self {
            http: Client::new(),
            base,
            jar: Mutex::new(CookieJar::new()),
            csrf_cookie: csrf_cookie.into(),
            update_timeout,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn same_origin(&self, other: &Url) -> bool {
        other.scheme() == self.base.scheme()
            && other.host_str() == self.base.host_str()
            && other.port_or_known_default() == self.base.port_or_known_default()
    }

    fn csrf_token(&self) -> Option<String> {
        self.jar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&self.csrf_cookie)
    }

    fn cookie_header_for(&self, target: &Url) -> Option<String> {
        if !self.same_origin(target) {
            return None;
        }
        self.jar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .header_value()
    }

    fn absorb_response_cookies(&self, response: &Response) {
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        for value in response.headers().get_all(header::SET_COOKIE) {
            if let Ok(text) = value.to_str() {
                jar.absorb_set_cookie(text);
            }
        }
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_string()
}

#[async_trait]
impl ShelfTransport for HttpShelfClient {
    async fn fetch_shelf(&self, source: &ShelfSource) -> Result<Shelf, PageError> {
        let page_url = self.base.join(&source.path())?;
        tracing::debug!(%page_url, "fetching shelf");

        let mut request = self.http.get(page_url.clone());
        if let Some(cookies) = self.cookie_header_for(&page_url) {
            request = request.header(header::COOKIE, cookies);
        }

        let response = request.send().await?;
        self.absorb_response_cookies(&response);

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::Status {
                status: status.as_u16(),
                status_text: status_text(status),
            });
        }

        let body = response.text().await?;
        page::parse_shelf(&body, &page_url, source.clone())
    }

    async fn apply_update(&self, request: UpdateRequest) -> Result<TitleUpdate, UpdateError> {
        let endpoint = self.base.join(&request.update_url)?;
        let token = self.csrf_token();
        let body = UpdateRequestBody {
            post_data: PostData {
                title: request.title.clone(),
                url: request.chosen_url.clone(),
                video_type: request.video_type,
            },
        };

        tracing::info!(title = %request.title, %endpoint, "posting title update");
        let mut post = self
            .http
            .post(endpoint.clone())
            .json(&body)
            .header(header::ACCEPT, "application/json")
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
            .timeout(self.update_timeout);
        if let Some(token) = &token {
            post = post.header(CSRF_HEADER, token);
        }
        if let Some(cookies) = self.cookie_header_for(&endpoint) {
            post = post.header(header::COOKIE, cookies);
        }

        let response = match post.send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => return Err(UpdateError::TimedOut),
            Err(err) => return Err(UpdateError::Transport(err)),
        };
        self.absorb_response_cookies(&response);

        let status = response.status();
        if !status.is_success() {
            // A 403 with no local token means the cookie never reached us.
            if status == StatusCode::FORBIDDEN && token.is_none() {
                return Err(UpdateError::MissingCsrfToken);
            }
            return Err(UpdateError::Status {
                status: status.as_u16(),
                status_text: status_text(status),
            });
        }

        let reply = match response.json::<UpdateReply>().await {
            Ok(reply) => reply,
            Err(err) if err.is_timeout() => return Err(UpdateError::TimedOut),
            Err(err) => return Err(UpdateError::Transport(err)),
        };
        match reply {
            UpdateReply::Rejected { error } => {
                tracing::warn!(title = %request.title, "server rejected update: {error}");
                Err(UpdateError::Rejected(error))
            }
            UpdateReply::Updated(update) => Ok(update),
        }
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
