//! OAuth 1.0a request signing (HMAC-SHA1)
//!
//! Twitter doc: https://developer.twitter.com/en/docs/authentication/oauth-1-0a/creating-a-signature

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;
use time::OffsetDateTime;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LEN: usize = 32;

/// Long-lived credentials for a single Twitter app + user
#[derive(Debug)]
pub struct OAuthCredentials {
    pub consumer_key: SecretString,
    pub consumer_secret: SecretString,
    pub token: SecretString,
    pub token_secret: SecretString,
}

impl OAuthCredentials {
    pub fn new(
        consumer_key: SecretString,
        consumer_secret: SecretString,
        token: SecretString,
        token_secret: SecretString,
    ) -> Self {
        Self {
            consumer_key,
            consumer_secret,
            token,
            token_secret,
        }
    }
}

/// Per-request values; never reuse one across requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    pub nonce: String,
    pub timestamp: i64,
}

impl SigningContext {
    /// Fresh random nonce and `now` floored to whole seconds
    pub fn fresh(now: OffsetDateTime) -> Self {
        let nonce = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect();

        Self {
            nonce,
            timestamp: now.unix_timestamp(),
        }
    }

    pub fn fixed(nonce: impl Into<String>, timestamp: i64) -> Self {
        Self {
            nonce: nonce.into(),
            timestamp,
        }
    }
}

/// Signature and the header carrying it
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub signature: String,
    pub authorization: String,
}

/// Percent-encode everything except ASCII alphanumerics and `-._~`
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Sign a request whose non-OAuth parameters are `params`
pub fn sign_request(
    credentials: &OAuthCredentials,
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    context: &SigningContext,
) -> Result<SignedRequest, String> {
    let mut protocol = protocol_params(credentials, context);

    let all_params: Vec<(&str, &str)> = params
        .iter()
        .copied()
        .chain(protocol.iter().map(|(k, v)| (*k, v.as_str())))
        .collect();

    let base = signature_base_string(method, url, &parameter_string(&all_params));
    let key = signing_key(
        credentials.consumer_secret.expose_secret(),
        credentials.token_secret.expose_secret(),
    );
    let signature = hmac_sha1_base64(&key, &base)?;

    protocol.push(("oauth_signature", signature.clone()));

    Ok(SignedRequest {
        authorization: authorization_header(&protocol),
        signature,
    })
}

fn protocol_params(
    credentials: &OAuthCredentials,
    context: &SigningContext,
) -> Vec<(&'static str, String)> {
    vec![
        (
            "oauth_consumer_key",
            credentials.consumer_key.expose_secret().to_string(),
        ),
        ("oauth_nonce", context.nonce.clone()),
        ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
        ("oauth_timestamp", context.timestamp.to_string()),
        ("oauth_token", credentials.token.expose_secret().to_string()),
        ("oauth_version", OAUTH_VERSION.to_string()),
    ]
}

/// Encoded `k=v` pairs, sorted on their encoded form, joined with `&`
pub(crate) fn parameter_string(params: &[(&str, &str)]) -> String {
    let mut pairs: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect();
    pairs.sort();
    pairs.join("&")
}

pub(crate) fn signature_base_string(method: &str, url: &str, parameter_string: &str) -> String {
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(parameter_string)
    )
}

fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    )
}

fn hmac_sha1_base64(key: &str, message: &str) -> Result<String, String> {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| e.to_string())?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn authorization_header(protocol: &[(&str, String)]) -> String {
    let mut fields: Vec<String> = protocol
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect();
    fields.sort();
    format!("OAuth {}", fields.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const UPDATE_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

    fn secret(value: &str) -> SecretString {
        SecretString::new(value.into())
    }

    fn test_credentials() -> OAuthCredentials {
        OAuthCredentials::new(
            secret("consumer-key"),
            secret("consumer-secret"),
            secret("access-token"),
            secret("token-secret"),
        )
    }

    const MESSAGE: &str = "New PR from octocat: https://github.com/octo/repo/pull/7";

    #[test]
    fn test_percent_encode_uses_rfc3986_unreserved_set() {
        assert_eq!(percent_encode("a b"), "a%20b");
        assert_eq!(percent_encode("AZaz09-._~"), "AZaz09-._~");
        assert_eq!(percent_encode("a+b=c&d"), "a%2Bb%3Dc%26d");
        assert_eq!(percent_encode("https://x/y"), "https%3A%2F%2Fx%2Fy");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
    }

    #[test]
    fn test_matches_twitter_documentation_example() {
        let credentials = OAuthCredentials::new(
            secret("xvz1evFS4wEEPTGEFPHBog"),
            secret("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"),
            secret("370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb"),
            secret("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"),
        );
        let context =
            SigningContext::fixed("kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg", 1318622958);

        let signed = sign_request(
            &credentials,
            "POST",
            UPDATE_URL,
            &[
                ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
                ("include_entities", "true"),
            ],
            &context,
        )
        .unwrap();

        assert_eq!(signed.signature, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn test_announcement_signature_is_deterministic() {
        let context = SigningContext::fixed("0123456789abcdefABCDEF0123456789", 1700000000);

        let signed = sign_request(
            &test_credentials(),
            "POST",
            UPDATE_URL,
            &[("status", MESSAGE)],
            &context,
        )
        .unwrap();

        assert_eq!(signed.signature, "G+VOY3p4i5DEys7OeJclBk60ZWg=");
        assert_eq!(
            signed.authorization,
            "OAuth oauth_consumer_key=\"consumer-key\", \
             oauth_nonce=\"0123456789abcdefABCDEF0123456789\", \
             oauth_signature=\"G%2BVOY3p4i5DEys7OeJclBk60ZWg%3D\", \
             oauth_signature_method=\"HMAC-SHA1\", \
             oauth_timestamp=\"1700000000\", \
             oauth_token=\"access-token\", \
             oauth_version=\"1.0\""
        );
    }

    #[test]
    fn test_base_string_layout() {
        let params = parameter_string(&[("status", MESSAGE), ("oauth_token", "access-token")]);
        assert_eq!(
            params,
            "oauth_token=access-token&status=New%20PR%20from%20octocat%3A%20https%3A%2F%2Fgithub.com%2Focto%2Frepo%2Fpull%2F7"
        );

        let base = signature_base_string("post", UPDATE_URL, "a=b&c=d");
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&a%3Db%26c%3Dd"
        );
    }

    #[test]
    fn test_header_excludes_body_params() {
        let context = SigningContext::fixed("nonce", 1);
        let signed = sign_request(
            &test_credentials(),
            "POST",
            UPDATE_URL,
            &[("status", MESSAGE)],
            &context,
        )
        .unwrap();

        assert!(signed.authorization.starts_with("OAuth "));
        assert!(!signed.authorization.contains("status"));
    }

    #[test]
    fn test_fresh_context_floors_timestamp_and_varies_nonce() {
        let now = datetime!(2023-11-14 22:13:20.999 UTC);

        let first = SigningContext::fresh(now);
        let second = SigningContext::fresh(now);

        assert_eq!(first.timestamp, 1700000000);
        assert_eq!(first.nonce.len(), NONCE_LEN);
        assert!(first.nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first.nonce, second.nonce);
    }
}
