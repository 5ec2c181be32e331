//! Twitter credential loading from the environment

use pr_announcer_adapters::twitter::OAuthCredentials;
use secrecy::SecretString;

use crate::config::TwitterConfig;

/// A required credential was not available
#[derive(Debug, thiserror::Error)]
pub enum MissingCredential {
    #[error("No env var configured for {0}")]
    Unconfigured(&'static str),
    #[error("Missing env var {env_var} for {name}")]
    Unset { name: &'static str, env_var: String },
    #[error("Env var {env_var} for {name} is empty")]
    Empty { name: &'static str, env_var: String },
}

/// Read all four OAuth credentials, failing on the first one that is absent
pub fn load_credentials(config: &TwitterConfig) -> Result<OAuthCredentials, MissingCredential> {
    load_credentials_with(config, |name| std::env::var(name).ok())
}

pub(crate) fn load_credentials_with(
    config: &TwitterConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<OAuthCredentials, MissingCredential> {
    let read = |env_var: &str, name: &'static str| -> Result<SecretString, MissingCredential> {
        if env_var.trim().is_empty() {
            return Err(MissingCredential::Unconfigured(name));
        }

        let value = lookup(env_var).ok_or_else(|| MissingCredential::Unset {
            name,
            env_var: env_var.to_string(),
        })?;

        if value.trim().is_empty() {
            return Err(MissingCredential::Empty {
                name,
                env_var: env_var.to_string(),
            });
        }

        Ok(SecretString::new(value.into()))
    };

    Ok(OAuthCredentials::new(
        read(&config.consumer_key_env, "consumer key")?,
        read(&config.consumer_secret_env, "consumer secret")?,
        read(&config.access_token_env, "access token")?,
        read(&config.access_token_secret_env, "access token secret")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_all_present() {
        let vars = env(&[
            ("TwitterApiKey", "ck"),
            ("TwitterApiKeySecret", "cs"),
            ("TwitterAccessToken", "t"),
            ("TwitterAccessTokenSecret", "ts"),
        ]);

        let credentials =
            load_credentials_with(&TwitterConfig::default(), |k| vars.get(k).cloned()).unwrap();

        assert_eq!(credentials.consumer_key.expose_secret(), "ck");
        assert_eq!(credentials.token_secret.expose_secret(), "ts");
    }

    #[test]
    fn test_missing_one_fails() {
        let vars = env(&[
            ("TwitterApiKey", "ck"),
            ("TwitterApiKeySecret", "cs"),
            ("TwitterAccessToken", "t"),
        ]);

        let result = load_credentials_with(&TwitterConfig::default(), |k| vars.get(k).cloned());

        match result {
            Err(MissingCredential::Unset { env_var, .. }) => {
                assert_eq!(env_var, "TwitterAccessTokenSecret")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_blank_value_fails() {
        let vars = env(&[
            ("TwitterApiKey", "  "),
            ("TwitterApiKeySecret", "cs"),
            ("TwitterAccessToken", "t"),
            ("TwitterAccessTokenSecret", "ts"),
        ]);

        let result = load_credentials_with(&TwitterConfig::default(), |k| vars.get(k).cloned());

        assert!(matches!(result, Err(MissingCredential::Empty { .. })));
    }
}
