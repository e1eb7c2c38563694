use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::connection::Connection;
use crate::error::{WiremapError, WiremapResult};
use crate::secrets::SecretProvider;

/// Client TLS material resolved for one connection, each piece
/// independently optional.
///
/// Secret names derive from the connection identity: a connection named
/// `test` reads `HTTP_TEST_SERIALIZED_CERT`, `HTTP_TEST_SERIALIZED_PRIVATE_KEY`,
/// `HTTP_TEST_SERIALIZED_PFX`, `HTTP_TEST_SERIALIZED_CA_CERT` and
/// `HTTP_TEST_PASSPHRASE`. Serialized PEM values carry literal `\n`
/// escapes which are restored on load; the PFX bundle is base64-encoded
/// PKCS#12.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TlsMaterial {
    pub cert_pem: Option<String>,
    pub key_pem: Option<String>,
    pub pfx: Option<Vec<u8>>,
    pub ca_pem: Option<String>,
    pub passphrase: Option<String>,
}

impl TlsMaterial {
    /// Resolve material for a connection from the given provider.
    pub fn resolve(
        connection: &Connection,
        secrets: &dyn SecretProvider,
    ) -> WiremapResult<Self> {
        let prefix = secret_prefix(&connection.identity);
        let fetch = |suffix: &str| {
            secrets
                .get(&format!("{prefix}_{suffix}"))
                .map(|value| restore_newlines(&value))
        };

        let pfx = match fetch("SERIALIZED_PFX") {
            Some(encoded) => Some(STANDARD.decode(encoded.trim()).map_err(|e| {
                WiremapError::Config(format!(
                    "PFX bundle for connection '{}' is not valid base64: {}",
                    connection.identity, e
                ))
            })?),
            None => None,
        };

        Ok(Self {
            cert_pem: fetch("SERIALIZED_CERT"),
            key_pem: fetch("SERIALIZED_PRIVATE_KEY"),
            pfx,
            ca_pem: fetch("SERIALIZED_CA_CERT"),
            passphrase: fetch("PASSPHRASE"),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cert_pem.is_none()
            && self.key_pem.is_none()
            && self.pfx.is_none()
            && self.ca_pem.is_none()
            && self.passphrase.is_none()
    }

    /// Contribute the material to a client builder as transport options.
    ///
    /// A PFX bundle selects the native TLS backend (the only one that
    /// accepts PKCS#12); a PEM certificate/key pair selects rustls.
    pub fn apply(&self, mut builder: reqwest::ClientBuilder) -> WiremapResult<reqwest::ClientBuilder> {
        if let Some(ca) = &self.ca_pem {
            let cert = reqwest::Certificate::from_pem(ca.as_bytes())
                .map_err(|e| WiremapError::Config(format!("invalid CA certificate: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        if let Some(pfx) = &self.pfx {
            let passphrase = self.passphrase.as_deref().unwrap_or("");
            let identity = reqwest::Identity::from_pkcs12_der(pfx, passphrase)
                .map_err(|e| WiremapError::Config(format!("invalid PFX bundle: {e}")))?;
            builder = builder.use_native_tls().identity(identity);
        } else if let (Some(cert), Some(key)) = (&self.cert_pem, &self.key_pem) {
            let mut pem = key.clone().into_bytes();
            pem.extend_from_slice(cert.as_bytes());
            let identity = reqwest::Identity::from_pem(&pem)
                .map_err(|e| WiremapError::Config(format!("invalid client certificate: {e}")))?;
            builder = builder.use_rustls_tls().identity(identity);
        }

        Ok(builder)
    }
}

fn secret_prefix(identity: &str) -> String {
    let normalized: String = identity
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("HTTP_{normalized}")
}

fn restore_newlines(value: &str) -> String {
    value.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::testing::StaticSecrets;

    fn connection() -> Connection {
        Connection::new("test", "https://localhost:1337")
    }

    #[test]
    fn resolves_nothing_when_provider_is_empty() {
        let secrets = StaticSecrets::default();
        let material = TlsMaterial::resolve(&connection(), &secrets).unwrap();
        assert!(material.is_empty());
    }

    #[test]
    fn restores_escaped_newlines_in_pem_material() {
        let secrets = StaticSecrets::with(&[(
            "HTTP_TEST_SERIALIZED_CERT",
            "-----BEGIN CERTIFICATE-----\\nabc\\n-----END CERTIFICATE-----\\n",
        )]);

        let material = TlsMaterial::resolve(&connection(), &secrets).unwrap();
        assert_eq!(
            material.cert_pem.as_deref(),
            Some("-----BEGIN CERTIFICATE-----\nabc\n-----END CERTIFICATE-----\n")
        );
    }

    #[test]
    fn decodes_pfx_bundles_from_base64() {
        let secrets = StaticSecrets::with(&[("HTTP_TEST_SERIALIZED_PFX", "SGVsbG8=")]);
        let material = TlsMaterial::resolve(&connection(), &secrets).unwrap();
        assert_eq!(material.pfx.as_deref(), Some(b"Hello".as_slice()));
    }

    #[test]
    fn rejects_invalid_pfx_encoding() {
        let secrets = StaticSecrets::with(&[("HTTP_TEST_SERIALIZED_PFX", "not base64!!!")]);
        let err = TlsMaterial::resolve(&connection(), &secrets).unwrap_err();
        assert!(matches!(err, WiremapError::Config(_)));
    }

    #[test]
    fn passphrase_is_read_verbatim() {
        let secrets = StaticSecrets::with(&[("HTTP_TEST_PASSPHRASE", "secret")]);
        let material = TlsMaterial::resolve(&connection(), &secrets).unwrap();
        assert_eq!(material.passphrase.as_deref(), Some("secret"));
    }

    #[test]
    fn identity_normalizes_into_secret_prefix() {
        assert_eq!(secret_prefix("my-api"), "HTTP_MY_API");
        assert_eq!(secret_prefix("test"), "HTTP_TEST");
    }
}
