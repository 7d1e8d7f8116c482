use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

const HOSTNAME_KEY: &str = "HostName";
const SHAREDACCESSKEYNAME_KEY: &str = "SharedAccessKeyName";
const SHAREDACCESSKEY_KEY: &str = "SharedAccessKey";
const SHAREDACCESSSIGNATURE_KEY: &str = "SharedAccessSignature";

/// Errors raised while parsing credentials or signing tokens
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TokenError {
    /// A required connection string component is missing
    #[error("connection string is missing {0}")]
    MissingParameter(&'static str),
    /// The access key is not valid base64
    #[error("access key is not valid base64: {0}")]
    InvalidKey(#[from] base64::DecodeError),
    /// The decoded key cannot seed the HMAC
    #[error("access key has an invalid length")]
    InvalidKeyLength,
    /// The signed token could not be url encoded
    #[error("failed to encode token: {0}")]
    Encoding(#[from] serde_urlencoded::ser::Error),
}

/// Provides the `Authorization` header value for service requests
pub trait TokenSource: std::fmt::Debug {
    /// Produce a token valid until `expiry`
    fn get(&self, expiry: &DateTime<Utc>) -> Result<String, TokenError>;
}

/// Token source returning a pre-generated shared access signature
#[derive(Debug, Clone)]
pub struct SasTokenSource {
    sas: String,
}

impl SasTokenSource {
    /// Wrap a full `SharedAccessSignature sr=...` token
    pub fn new(sas: impl Into<String>) -> Self {
        SasTokenSource { sas: sas.into() }
    }
}

impl TokenSource for SasTokenSource {
    fn get(&self, _: &DateTime<Utc>) -> Result<String, TokenError> {
        Ok(self.sas.clone())
    }
}

/// Token source signing with a hub shared access policy key
#[derive(Debug, Clone)]
pub struct SharedAccessKeyTokenSource {
    resource_uri: String,
    key_name: String,
    key: Vec<u8>,
}

impl SharedAccessKeyTokenSource {
    /// Create a token source for the policy `key_name` on the hub `hostname`
    ///
    /// Fails when `key` is not base64.
    pub fn new(hostname: &str, key_name: &str, key: &str) -> Result<Self, TokenError> {
        Ok(SharedAccessKeyTokenSource {
            resource_uri: hostname.to_string(),
            key_name: key_name.to_string(),
            key: base64::decode(key)?,
        })
    }

    /// Hub hostname the generated tokens are scoped to
    pub fn hostname(&self) -> &str {
        &self.resource_uri
    }
}

impl TokenSource for SharedAccessKeyTokenSource {
    fn get(&self, expiry: &DateTime<Utc>) -> Result<String, TokenError> {
        let expiry_timestamp = expiry.timestamp();
        let encoded_resource: String =
            form_urlencoded::byte_serialize(self.resource_uri.as_bytes()).collect();
        let to_sign = format!("{}\n{}", encoded_resource, expiry_timestamp);

        let signature = sign(&self.key, &to_sign)?;

        let pairs = [
            ("sr", self.resource_uri.clone()),
            ("sig", signature),
            ("se", expiry_timestamp.to_string()),
            ("skn", self.key_name.clone()),
        ];
        let sas = format!("SharedAccessSignature {}", serde_urlencoded::to_string(pairs)?);

        trace!("Using shared access policy token: {}", redact_signature(&sas));

        Ok(sas)
    }
}

/// Credential half of a parsed service connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Shared access policy name and base64 key
    SharedAccessKey {
        /// Policy name, e.g. `iothubowner`
        key_name: String,
        /// Base64 encoded policy key
        key: String,
    },
    /// Pre-generated shared access signature
    SharedAccessSignature(String),
}

/// Split a service connection string into hostname and credential
///
/// Accepts `HostName=...;SharedAccessKeyName=...;SharedAccessKey=...` or
/// `HostName=...;SharedAccessSignature=...`. Unknown components are ignored.
pub fn parse_connection_string(
    connection_string: impl AsRef<str>,
) -> Result<(String, Credential), TokenError> {
    let mut hostname = None;
    let mut key_name = None;
    let mut key = None;
    let mut signature = None;

    for part in connection_string.as_ref().split(';') {
        // keys and signatures carry base64 padding, only split on the first '='
        let mut kv = part.splitn(2, '=');
        let (name, value) = match (kv.next(), kv.next()) {
            (Some(name), Some(value)) => (name.trim(), value.trim()),
            _ => continue,
        };
        match name {
            HOSTNAME_KEY => hostname = Some(value.to_string()),
            SHAREDACCESSKEYNAME_KEY => key_name = Some(value.to_string()),
            SHAREDACCESSKEY_KEY => key = Some(value.to_string()),
            SHAREDACCESSSIGNATURE_KEY => signature = Some(value.to_string()),
            _ => (), // Ignore extraneous component in the connection string
        }
    }

    let hostname = hostname.ok_or(TokenError::MissingParameter(HOSTNAME_KEY))?;

    let credential = match (key_name, key, signature) {
        (_, _, Some(sas)) => Credential::SharedAccessSignature(sas),
        (Some(key_name), Some(key), None) => Credential::SharedAccessKey { key_name, key },
        (None, Some(_), None) => return Err(TokenError::MissingParameter(SHAREDACCESSKEYNAME_KEY)),
        (_, None, None) => return Err(TokenError::MissingParameter(SHAREDACCESSKEY_KEY)),
    };

    Ok((hostname, credential))
}

/// Token with its `sig=` value masked, for logging
fn redact_signature(sas: &str) -> String {
    match sas.find("sig=") {
        Some(start) => {
            let value = start + "sig=".len();
            let end = sas[value..].find('&').map_or(sas.len(), |i| value + i);
            format!("{}<redacted>{}", &sas[..value], &sas[end..])
        }
        None => sas.to_string(),
    }
}

fn sign(key: &[u8], message: &str) -> Result<String, TokenError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).map_err(|_| TokenError::InvalidKeyLength)?;
    mac.update(message.as_bytes());
    Ok(base64::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const KEY: &str = "O+H9VTcdJP0Tqkl7bh4nVG0OJNrAataMpuWB54D0VEc=";

    #[test]
    fn test_sign() {
        let key = base64::decode(KEY).unwrap();
        assert_eq!(
            sign(&key, "myiothub.azure-devices.net%2Fdevices%2FFirstDevice\n1587123309").unwrap(),
            "vn0+gyIUKgaBhEU0ypyOhJ0gPK5fSY1TKdvcJ1HxhnQ="
        );
    }

    #[test]
    fn test_policy_token() {
        let source =
            SharedAccessKeyTokenSource::new("myiothub.azure-devices.net", "iothubowner", KEY)
                .unwrap();
        let expiry = Utc.timestamp_opt(1_587_123_309, 0).unwrap();
        assert_eq!(
            source.get(&expiry).unwrap(),
            "SharedAccessSignature sr=myiothub.azure-devices.net&sig=S5CEmadVbXk5FbenAtiA31CZo%2Bd0hmWyM%2BgOF%2FZyue8%3D&se=1587123309&skn=iothubowner"
        );
    }

    #[test]
    fn logged_token_hides_signature() {
        let source =
            SharedAccessKeyTokenSource::new("myiothub.azure-devices.net", "iothubowner", KEY)
                .unwrap();
        let token = source.get(&Utc.timestamp_opt(1_587_123_309, 0).unwrap()).unwrap();

        let logged = redact_signature(&token);
        assert_eq!(
            logged,
            "SharedAccessSignature sr=myiothub.azure-devices.net&sig=<redacted>&se=1587123309&skn=iothubowner"
        );
        assert!(!logged.contains("S5CEmadVbXk5"));
        assert_eq!(redact_signature("no signature"), "no signature");
    }

    #[test]
    fn rejects_non_base64_key() {
        let err = SharedAccessKeyTokenSource::new("hub.azure-devices.net", "owner", "not base64!")
            .unwrap_err();
        assert!(matches!(err, TokenError::InvalidKey(_)));
    }

    #[test]
    fn parses_policy_connection_string() {
        let (hostname, credential) = parse_connection_string(
            "HostName=myiothub.azure-devices.net;SharedAccessKeyName=iothubowner;SharedAccessKey=O+H9VTcdJP0Tqkl7bh4nVG0OJNrAataMpuWB54D0VEc=",
        )
        .unwrap();
        assert_eq!(hostname, "myiothub.azure-devices.net");
        assert_eq!(
            credential,
            Credential::SharedAccessKey {
                key_name: "iothubowner".to_string(),
                key: KEY.to_string(),
            }
        );
    }

    #[test]
    fn parses_signature_connection_string() {
        let (_, credential) = parse_connection_string(
            "HostName=hub.azure-devices.net;SharedAccessSignature=SharedAccessSignature sr=hub&sig=abc%3D&se=1",
        )
        .unwrap();
        assert_eq!(
            credential,
            Credential::SharedAccessSignature("SharedAccessSignature sr=hub&sig=abc%3D&se=1".to_string())
        );
    }

    #[test]
    fn reports_missing_components() {
        let cases = vec![
            ("SharedAccessKeyName=owner;SharedAccessKey=abc=", HOSTNAME_KEY),
            ("HostName=hub;SharedAccessKey=abc=", SHAREDACCESSKEYNAME_KEY),
            ("HostName=hub;SharedAccessKeyName=owner", SHAREDACCESSKEY_KEY),
        ];

        for (input, missing) in cases {
            match parse_connection_string(input) {
                Err(TokenError::MissingParameter(name)) => {
                    assert_eq!(name, missing, "input '{}'", input)
                }
                other => panic!("input '{}' should fail, got {:?}", input, other),
            }
        }
    }
}
