//! Twitter status update adapter

use async_trait::async_trait;
use pr_announcer_domain::{AnnounceError, Announcer, Clock, SystemClock};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::sync::Arc;

use super::oauth::{OAuthCredentials, SigningContext, percent_encode, sign_request};

/// Default statuses/update endpoint
pub const UPDATE_STATUS_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

const STATUS_PARAM: &str = "status";

/// Announcer that posts each message as a tweet, signed with OAuth 1.0a
pub struct TwitterAnnouncer {
    client: Client,
    credentials: OAuthCredentials,
    endpoint: String,
    clock: Arc<dyn Clock>,
}

impl TwitterAnnouncer {
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self::with_endpoint(credentials, UPDATE_STATUS_URL.to_string())
    }

    pub fn with_endpoint(credentials: OAuthCredentials, endpoint: String) -> Self {
        Self {
            client: Client::new(),
            credentials,
            endpoint,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for `oauth_timestamp`
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Announcer for TwitterAnnouncer {
    async fn publish(&self, message: &str) -> Result<String, AnnounceError> {
        let context = SigningContext::fresh(self.clock.now());
        let signed = sign_request(
            &self.credentials,
            "POST",
            &self.endpoint,
            &[(STATUS_PARAM, message)],
            &context,
        )
        .map_err(AnnounceError::Signing)?;

        // Body carries only the status; OAuth parameters travel in the header
        let body = format!("{}={}", STATUS_PARAM, percent_encode(message));

        tracing::debug!(endpoint = %self.endpoint, timestamp = context.timestamp, "Posting status");

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, signed.authorization)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| AnnounceError::Network(e.to_string()))?;

        let status = response.status();

        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(AnnounceError::Auth(body));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnnounceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .text()
            .await
            .map_err(|e| AnnounceError::Network(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use time::OffsetDateTime;
    use time::macros::datetime;
    use wiremock::matchers::{body_string, header, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedClock(OffsetDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    fn credentials() -> OAuthCredentials {
        OAuthCredentials::new(
            SecretString::new("consumer-key".into()),
            SecretString::new("consumer-secret".into()),
            SecretString::new("access-token".into()),
            SecretString::new("token-secret".into()),
        )
    }

    fn announcer(server: &MockServer) -> TwitterAnnouncer {
        TwitterAnnouncer::with_endpoint(
            credentials(),
            format!("{}/1.1/statuses/update.json", server.uri()),
        )
        .with_clock(Arc::new(FixedClock(datetime!(2023-11-14 22:13:20 UTC))))
    }

    const MESSAGE: &str = "New PR from octocat: https://github.com/octo/repo/pull/7";

    #[tokio::test]
    async fn test_publish_success_returns_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/1.1/statuses/update.json"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(header_regex(
                "Authorization",
                r#"^OAuth oauth_consumer_key="consumer-key", oauth_nonce="[A-Za-z0-9]{32}", oauth_signature="[A-Za-z0-9%]+", oauth_signature_method="HMAC-SHA1", oauth_timestamp="1700000000", oauth_token="access-token", oauth_version="1\.0"$"#,
            ))
            .and(body_string(
                "status=New%20PR%20from%20octocat%3A%20https%3A%2F%2Fgithub.com%2Focto%2Frepo%2Fpull%2F7",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id_str":"42"}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let body = announcer(&mock_server).publish(MESSAGE).await.unwrap();

        assert_eq!(body, r#"{"id_str":"42"}"#);
    }

    #[tokio::test]
    async fn test_publish_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/1.1/statuses/update.json"))
            .respond_with(ResponseTemplate::new(503).set_body_string("over capacity"))
            .mount(&mock_server)
            .await;

        let result = announcer(&mock_server).publish(MESSAGE).await;

        match result {
            Err(AnnounceError::Api { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "over capacity");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_auth_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/1.1/statuses/update.json"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let result = announcer(&mock_server).publish(MESSAGE).await;

        assert!(matches!(result, Err(AnnounceError::Auth(_))));
    }

    #[tokio::test]
    async fn test_publish_network_error() {
        // Nothing listens on the discard port
        let announcer = TwitterAnnouncer::with_endpoint(
            credentials(),
            "http://127.0.0.1:9/1.1/statuses/update.json".to_string(),
        );

        let result = announcer.publish(MESSAGE).await;

        assert!(matches!(result, Err(AnnounceError::Network(_))));
    }

    #[tokio::test]
    async fn test_each_request_uses_a_new_nonce() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&mock_server)
            .await;

        let announcer = announcer(&mock_server);
        announcer.publish(MESSAGE).await.unwrap();
        announcer.publish(MESSAGE).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let headers: Vec<String> = requests
            .iter()
            .map(|r| {
                r.headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();

        assert_eq!(headers.len(), 2);
        assert_ne!(headers[0], headers[1]);
    }
}
