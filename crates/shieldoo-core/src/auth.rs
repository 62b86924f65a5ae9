//! Signed request tokens.
//!
//! Every API call carries an `AuthToken` header holding a JWT signed with
//! HS512 using the API key as the shared secret. The token expires five
//! minutes after issue and names the target instance (the endpoint host) in
//! a custom `shieldoo` claim map.

use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::{Host, Url};

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECS: i64 = 5 * 60;

/// Claim key holding the target instance host.
pub const INSTANCE_CLAIM: &str = "instance";

/// Claims carried by a request token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiry as seconds since the epoch
    pub exp: i64,
    /// Shieldoo specific claims
    pub shieldoo: BTreeMap<String, String>,
}

impl TokenClaims {
    /// The instance this token was issued for.
    #[must_use]
    pub fn instance(&self) -> &str {
        self.shieldoo
            .get(INSTANCE_CLAIM)
            .map_or("", String::as_str)
    }
}

/// Issues request tokens for one endpoint and API key.
#[derive(Clone)]
pub struct RequestSigner {
    instance: String,
    api_key: SecretString,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    /// Create a signer for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] when the endpoint is not a URL. An
    /// endpoint without a host yields an empty instance claim.
    pub fn new(endpoint: &str, api_key: SecretString) -> Result<Self> {
        let url = Url::parse(endpoint)?;
        Ok(Self {
            instance: instance_of(&url),
            api_key,
        })
    }

    /// Instance claim value derived from the endpoint.
    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Sign a token valid for [`TOKEN_TTL_SECS`] from now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Token`] if encoding fails.
    pub fn sign(&self) -> Result<String> {
        self.sign_at(Utc::now())
    }

    /// Sign a token as if issued at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Token`] if encoding fails.
    pub fn sign_at(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = TokenClaims {
            exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
            shieldoo: BTreeMap::from([(INSTANCE_CLAIM.to_string(), self.instance.clone())]),
        };
        let key = EncodingKey::from_secret(self.api_key.expose_secret().as_bytes());
        jsonwebtoken::encode(&Header::new(Algorithm::HS512), &claims, &key).map_err(Error::from)
    }

    /// Verify a token issued by a signer holding the same key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Token`] on a bad signature, wrong algorithm or
    /// expired token.
    pub fn verify(&self, token: &str) -> Result<TokenClaims> {
        let key = DecodingKey::from_secret(self.api_key.expose_secret().as_bytes());
        let data = jsonwebtoken::decode::<TokenClaims>(
            token,
            &key,
            &Validation::new(Algorithm::HS512),
        )?;
        Ok(data.claims)
    }
}

fn instance_of(url: &Url) -> String {
    match url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(endpoint: &str, key: &str) -> RequestSigner {
        RequestSigner::new(endpoint, SecretString::from(key.to_string())).unwrap()
    }

    #[test]
    fn instance_is_endpoint_hostname() {
        assert_eq!(signer("https://acme.shieldoo.net:8443/x", "k").instance(), "acme.shieldoo.net");
        assert_eq!(signer("http://[::1]:8080", "k").instance(), "::1");
        assert_eq!(signer("https://10.0.0.1", "k").instance(), "10.0.0.1");
    }

    #[test]
    fn hostless_endpoint_yields_empty_instance() {
        assert_eq!(signer("unix:/run/shieldoo.sock", "k").instance(), "");
    }

    #[test]
    fn unparsable_endpoint_fails() {
        let err = RequestSigner::new("no scheme here", SecretString::from("k".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn token_round_trips_with_same_key() {
        let signer = signer("https://acme.shieldoo.net", "api-key");
        let now = Utc::now();
        let token = signer.sign_at(now).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.instance(), "acme.shieldoo.net");
        assert_eq!(claims.exp, now.timestamp() + TOKEN_TTL_SECS);
    }

    #[test]
    fn token_uses_hs512() {
        let token = signer("https://acme.shieldoo.net", "api-key").sign().unwrap();
        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS512);
    }

    #[test]
    fn token_rejected_with_other_key() {
        let token = signer("https://acme.shieldoo.net", "api-key").sign().unwrap();
        let err = signer("https://acme.shieldoo.net", "other-key")
            .verify(&token)
            .unwrap_err();
        assert!(matches!(err, Error::Token(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = signer("https://acme.shieldoo.net", "api-key");
        let token = signer
            .sign_at(Utc::now() - Duration::minutes(10))
            .unwrap();
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn debug_output_hides_key() {
        let signer = signer("https://acme.shieldoo.net", "api-key");
        assert!(!format!("{signer:?}").contains("api-key"));
    }
}
