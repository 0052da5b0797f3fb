//! HTTP transport to the remote KMS.
//!
//! Every request goes through [`KmsClient::invoke`]: the body is
//! canonicalized, the invocation is signed, and the signed headers are
//! attached. A request that cannot be signed is never sent. Responses are
//! not interpreted beyond status and JSON decoding, and nothing is retried.

use std::time::Duration;

use kmsc_core::CanonicalBytes;
use kmsc_zcap::{Capability, Invocation, InvocationAuthorizer, InvocationSigner};
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::KmsClientConfig;
use crate::error::KmsError;

/// One authorized call to the KMS.
#[derive(Debug, Clone, Copy)]
pub struct KmsCall<'a> {
    pub method: &'a Method,
    pub url: &'a str,
    /// Capability action, e.g. `sign`.
    pub action: &'a str,
    pub invocation_target: &'a str,
    pub capability: Option<&'a Capability>,
}

/// Client for one keystore on the remote KMS.
#[derive(Debug, Clone)]
pub struct KmsClient {
    http: reqwest::Client,
    config: KmsClientConfig,
    authorizer: InvocationAuthorizer,
}

impl KmsClient {
    /// Create a new KMS client from configuration.
    pub fn new(config: KmsClientConfig) -> Result<Self, KmsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KmsError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            authorizer: InvocationAuthorizer::new(config.invocation_ttl_secs),
            config,
        })
    }

    /// Replace the invocation authorizer (e.g. to pin `created` in tests).
    pub fn with_authorizer(mut self, authorizer: InvocationAuthorizer) -> Self {
        self.authorizer = authorizer;
        self
    }

    pub fn config(&self) -> &KmsClientConfig {
        &self.config
    }

    pub fn keystore_url(&self) -> &Url {
        &self.config.keystore_url
    }

    /// URL of the keystore's key collection; the target of key generation.
    pub fn keys_url(&self) -> String {
        self.config.keys_url()
    }

    /// Sign and send `call`, decoding a 2xx JSON response as `T`.
    pub async fn invoke<T: DeserializeOwned>(
        &self,
        call: KmsCall<'_>,
        body: Option<CanonicalBytes>,
        signer: &dyn InvocationSigner,
    ) -> Result<T, KmsError> {
        let endpoint = format!("{} {}", call.method, call.url);
        let url = Url::parse(call.url)
            .map_err(|e| KmsError::InvalidInput(format!("invalid key URL {:?}: {e}", call.url)))?;

        let signed = self
            .authorizer
            .authorize(
                Invocation {
                    url: &url,
                    method: call.method.as_str(),
                    action: call.action,
                    invocation_target: call.invocation_target,
                    capability: call.capability,
                    body: body.as_ref(),
                },
                signer,
            )
            .await?;

        let mut request = self.http.request(call.method.clone(), url);
        for (name, value) in &signed.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.body(body.into_vec());
        }

        tracing::debug!(
            endpoint = %endpoint,
            action = call.action,
            capability = %signed.capability.id,
            "sending KMS invocation"
        );

        let resp = request.send().await.map_err(|e| KmsError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, status, error = %e, "failed to read KMS error body");
                    format!("<error body unreadable: {e}>")
                }
            };
            tracing::warn!(endpoint = %endpoint, status, "KMS rejected invocation");
            return Err(KmsError::Api {
                endpoint,
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| KmsError::Deserialization {
            endpoint,
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_from_mock_config() {
        let cfg = KmsClientConfig::local_mock("http://127.0.0.1:9000").unwrap();
        let client = KmsClient::new(cfg).unwrap();
        assert_eq!(client.keys_url(), "http://127.0.0.1:9000/keystores/test/keys");
        assert_eq!(client.config().timeout_secs, 5);
    }
}
