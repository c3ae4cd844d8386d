/*!
# Xtream Panel Client

A blocking client for the `player_api.php` endpoint exposed by Xtream-Codes
style IPTV panels. Every request is a GET whose query string carries the
credentials and an `action`. A successful (HTTP 200) response body is parsed
into a [`Value`].

```no_run
use xtream_probe::client::{Action, XtreamClient};
use xtream_probe::config::Credentials;

let client = XtreamClient::new(Credentials::new("http://panel:8080", "user", "pass"))?;
let categories = client.fetch(&Action::VodCategories)?;
# Ok::<(), xtream_probe::client::ClientError>(())
```
*/
use log::{debug, info};
use reqwest::{StatusCode, Url, blocking::Client};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::config::Credentials;
use crate::value::Value;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// User agent sent to panels; some reject unknown clients.
pub const USER_AGENT: &str = "IPTV Smarters Pro";

/// Placeholder substituted for credentials in URLs shown to the user.
pub const REDACTED: &str = "***";

/// Errors raised while talking to a panel.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured address does not form a valid URL
    #[error("invalid panel address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The request could not be sent or the body could not be read
    #[error("request for {action} failed")]
    Transport {
        action: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The panel answered with something other than 200 OK
    #[error("{action} returned HTTP {status}")]
    Status {
        action: &'static str,
        status: StatusCode,
    },

    /// The body was not valid JSON
    #[error("{action} returned a body that is not JSON")]
    Decode {
        action: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A listing lacked the id needed for the next request
    #[error("{action} returned no item with a usable `{field}`")]
    MissingId {
        action: &'static str,
        field: &'static str,
    },
}

/// A `player_api.php` action together with its parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    VodCategories,
    VodStreams { category_id: Option<String> },
    VodInfo { vod_id: String },
    LiveCategories,
    LiveStreams { category_id: Option<String> },
    SeriesCategories,
    Series { category_id: Option<String> },
    SeriesInfo { series_id: String },
}

impl Action {
    /// The `action=` query value.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::VodCategories => "get_vod_categories",
            Self::VodStreams { .. } => "get_vod_streams",
            Self::VodInfo { .. } => "get_vod_info",
            Self::LiveCategories => "get_live_categories",
            Self::LiveStreams { .. } => "get_live_streams",
            Self::SeriesCategories => "get_series_categories",
            Self::Series { .. } => "get_series",
            Self::SeriesInfo { .. } => "get_series_info",
        }
    }

    /// The extra query parameter, if any.
    #[must_use]
    pub fn param(&self) -> Option<(&'static str, &str)> {
        match self {
            Self::VodStreams { category_id }
            | Self::LiveStreams { category_id }
            | Self::Series { category_id } => {
                category_id.as_deref().map(|id| ("category_id", id))
            }
            Self::VodInfo { vod_id } => Some(("vod_id", vod_id)),
            Self::SeriesInfo { series_id } => Some(("series_id", series_id)),
            Self::VodCategories | Self::LiveCategories | Self::SeriesCategories => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if let Some((key, val)) = self.param() {
            write!(f, "&{key}={val}")?;
        }
        Ok(())
    }
}

/// The three content sections of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StreamKind {
    Vod,
    Live,
    Series,
}

impl StreamKind {
    /// The category listing for this section.
    #[must_use]
    pub const fn categories(self) -> Action {
        match self {
            Self::Vod => Action::VodCategories,
            Self::Live => Action::LiveCategories,
            Self::Series => Action::SeriesCategories,
        }
    }

    /// The stream listing for this section, optionally filtered by category.
    #[must_use]
    pub fn streams(self, category_id: Option<String>) -> Action {
        match self {
            Self::Vod => Action::VodStreams { category_id },
            Self::Live => Action::LiveStreams { category_id },
            Self::Series => Action::Series { category_id },
        }
    }
}

/// Blocking `player_api.php` client.
#[derive(Debug, Clone)]
pub struct XtreamClient {
    credentials: Credentials,
    http: Client,
}

impl XtreamClient {
    /// Builds a client for the given panel.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidAddress`] if the address cannot form a
    /// URL, or [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn new(credentials: Credentials) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ClientError::Transport {
                action: "client setup",
                source,
            })?;
        Self::with_http(credentials, http)
    }

    /// Builds a client that sends its requests through `http`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidAddress`] if the address cannot form a
    /// URL.
    pub fn with_http(credentials: Credentials, http: Client) -> Result<Self, ClientError> {
        let client = Self { credentials, http };
        // Fail on a bad address now rather than on the first request
        client.endpoint()?;
        Ok(client)
    }

    fn endpoint(&self) -> Result<Url, ClientError> {
        let raw = format!("{}/player_api.php", self.credentials.address);
        Url::parse(&raw).map_err(|err| ClientError::InvalidAddress {
            address: self.credentials.address.clone(),
            reason: err.to_string(),
        })
    }

    fn build_url(
        &self,
        action: &Action,
        username: &str,
        password: &str,
    ) -> Result<Url, ClientError> {
        let mut url = self.endpoint()?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("username", username)
                .append_pair("password", password)
                .append_pair("action", action.name());
            if let Some((key, val)) = action.param() {
                query.append_pair(key, val);
            }
        }
        Ok(url)
    }

    /// The full request URL for `action`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidAddress`] for an unusable address.
    pub fn url(&self, action: &Action) -> Result<Url, ClientError> {
        self.build_url(action, &self.credentials.username, &self.credentials.password)
    }

    /// The request URL for `action` with username and password masked, safe
    /// to print or log.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidAddress`] for an unusable address.
    pub fn redacted_url(&self, action: &Action) -> Result<Url, ClientError> {
        self.build_url(action, REDACTED, REDACTED)
    }

    /// Issues `action` and parses the response body.
    ///
    /// # Errors
    ///
    /// Any transport failure, non-200 status, or non-JSON body is reported as
    /// the matching [`ClientError`] variant.
    pub fn fetch(&self, action: &Action) -> Result<Value, ClientError> {
        let name = action.name();
        let url = self.url(action)?;
        debug!("GET {}", self.redacted_url(action)?);

        // `without_url` keeps credentials out of error messages
        let transport = |source: reqwest::Error| ClientError::Transport {
            action: name,
            source: source.without_url(),
        };
        let response = self.http.get(url).send().map_err(transport)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::Status {
                action: name,
                status,
            });
        }
        let body = response.text().map_err(transport)?;
        let value = Value::try_from(body.as_str()).map_err(|source| ClientError::Decode {
            action: name,
            source,
        })?;

        match value.as_array() {
            Some(items) => info!("{name}: {} item(s)", items.len()),
            None => info!("{name}: received {}", kind_name(&value)),
        }
        Ok(value)
    }

    /// Fetches the category listing of `kind` and returns the id of its first
    /// entry.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::fetch`], or with [`ClientError::MissingId`] when the
    /// first category carries no id.
    pub fn first_category(&self, kind: StreamKind) -> Result<String, ClientError> {
        let action = kind.categories();
        let categories = self.fetch(&action)?;
        if let Some(name) = first_item(&categories)
            .and_then(|c| c.get("category_name"))
            .and_then(Value::as_str)
        {
            info!("using first category {name:?}");
        }
        first_category_id(&categories).ok_or(ClientError::MissingId {
            action: action.name(),
            field: "category_id",
        })
    }
}

/// The first element of a listing, if the value is a non-empty array.
#[must_use]
pub fn first_item(listing: &Value) -> Option<&Value> {
    listing.as_array()?.first()
}

/// Id of the first category in a `get_*_categories` listing, read from
/// `category_id` or else `id`. Both string and integer ids are accepted.
#[must_use]
pub fn first_category_id(categories: &Value) -> Option<String> {
    let first = first_item(categories)?;
    first
        .get("category_id")
        .and_then(Value::as_id)
        .or_else(|| first.get("id").and_then(Value::as_id))
}

/// `stream_id` of the first entry in a stream listing.
#[must_use]
pub fn first_stream_id(streams: &Value) -> Option<String> {
    first_item(streams)?.get("stream_id").and_then(Value::as_id)
}

const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::MockPanel;
    use std::net::TcpListener;

    fn offline_client(address: &str) -> XtreamClient {
        XtreamClient::new(Credentials::new(address, "alice", "s3cr&t")).unwrap()
    }

    #[test]
    fn builds_encoded_urls() {
        let client = offline_client("http://panel.test:8080/");
        let url = client
            .url(&Action::VodStreams {
                category_id: Some("135".into()),
            })
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://panel.test:8080/player_api.php?username=alice\
             &password=s3cr%26t&action=get_vod_streams&category_id=135"
        );
        let url = client.url(&Action::SeriesCategories).unwrap();
        assert!(url.as_str().ends_with("action=get_series_categories"));
    }

    #[test]
    fn redacted_url_hides_credentials() {
        let client = offline_client("http://panel.test");
        let url = client
            .redacted_url(&Action::VodInfo {
                vod_id: "42".into(),
            })
            .unwrap()
            .to_string();
        assert!(!url.contains("alice"));
        assert!(!url.contains("s3cr"));
        assert!(url.contains("username=***&password=***"));
        assert!(url.ends_with("action=get_vod_info&vod_id=42"));
    }

    #[test]
    fn invalid_address_rejected_up_front() {
        let err = XtreamClient::new(Credentials::new("not a url", "u", "p")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidAddress { .. }));
    }

    #[test]
    fn action_display_and_params() {
        assert_eq!(
            Action::LiveStreams { category_id: None }.to_string(),
            "get_live_streams"
        );
        assert_eq!(
            Action::SeriesInfo {
                series_id: "7".into()
            }
            .to_string(),
            "get_series_info&series_id=7"
        );
        assert_eq!(StreamKind::Series.categories(), Action::SeriesCategories);
        assert_eq!(
            StreamKind::Live.streams(Some("3".into())).param(),
            Some(("category_id", "3"))
        );
    }

    #[test]
    fn fetch_parses_ok_body() {
        let panel = MockPanel::start(&[(
            "get_vod_streams",
            "HTTP/1.1 200 OK",
            r#"[{"stream_id": 42, "name": "A"}]"#,
        )]);
        let value = panel
            .client()
            .fetch(&Action::VodStreams {
                category_id: Some("1".into()),
            })
            .unwrap();
        let requests = panel.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with(
            "GET /player_api.php?username=alice&password=s3cr%26t\
             &action=get_vod_streams&category_id=1 HTTP/1.1"
        ));
        assert_eq!(first_stream_id(&value).as_deref(), Some("42"));
    }

    #[test]
    fn non_200_is_a_status_error() {
        let panel = MockPanel::start(&[]);
        let err = panel.client().fetch(&Action::VodCategories).unwrap_err();
        match err {
            ClientError::Status { action, status } => {
                assert_eq!(action, "get_vod_categories");
                assert_eq!(status, StatusCode::NOT_FOUND);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_json_is_a_decode_error() {
        let panel = MockPanel::start(&[(
            "get_vod_categories",
            "HTTP/1.1 200 OK",
            "<html>login</html>",
        )]);
        let err = panel.client().fetch(&Action::VodCategories).unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[test]
    fn refused_connection_is_a_transport_error() {
        let address = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };
        let http = Client::builder().no_proxy().build().unwrap();
        let client =
            XtreamClient::with_http(Credentials::new(address, "alice", "s3cr&t"), http).unwrap();
        let err = client.fetch(&Action::VodCategories).unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
        // credentials never leak through the error chain
        let chain = format!("{:?}", anyhow::Error::from(err));
        assert!(!chain.contains("s3cr"));
    }

    #[test]
    fn first_category_uses_category_id_then_id() {
        let cats = Value::try_from(r#"[{"category_id": "135", "id": "9"}]"#).unwrap();
        assert_eq!(first_category_id(&cats).as_deref(), Some("135"));
        let cats = Value::try_from(r#"[{"id": 9, "category_name": "Movies"}]"#).unwrap();
        assert_eq!(first_category_id(&cats).as_deref(), Some("9"));
    }

    #[test]
    fn first_category_never_invents_an_id() {
        for text in [r#"[{"category_name": "X"}]"#, "[]", "{}", r#"[{"category_id": null}]"#] {
            let cats = Value::try_from(text).unwrap();
            assert_eq!(first_category_id(&cats), None, "input: {text}");
        }
    }

    #[test]
    fn first_category_request_reports_missing_id() {
        let panel = MockPanel::start(&[(
            "get_vod_categories",
            "HTTP/1.1 200 OK",
            r#"[{"category_name": "No id"}]"#,
        )]);
        let err = panel.client().first_category(StreamKind::Vod).unwrap_err();
        assert!(matches!(
            err,
            ClientError::MissingId {
                action: "get_vod_categories",
                field: "category_id"
            }
        ));
    }

    #[test]
    fn first_category_request_returns_id() {
        let panel = MockPanel::start(&[(
            "get_series_categories",
            "HTTP/1.1 200 OK",
            r#"[{"category_id": "135", "category_name": "Drama"}, {"category_id": "2"}]"#,
        )]);
        assert_eq!(panel.client().first_category(StreamKind::Series).unwrap(), "135");
    }
}
