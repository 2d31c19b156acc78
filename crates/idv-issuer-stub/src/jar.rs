//! Request-object (JAR) decoding and construction.
//!
//! Inbound authorization requests carry their parameters inside a signed,
//! optionally encrypted JWT (the "request object"). The codec here unwraps
//! them:
//!
//! 1. Try to parse the value as a JWE and decrypt it with the client's
//!    registered RSA private key; on success the JWE payload is a nested
//!    compact JWS whose claim set is extracted **without** re-verifying the
//!    signature - the stub trusts structural well-formedness.
//! 2. Any failure on the encrypted path falls back to parsing the value
//!    directly as a signed JWT.
//! 3. A final failure surfaces as a decode error the caller renders inline;
//!    it never aborts the HTTP exchange.
//!
//! The permissive step 1 behavior is deliberate for a test double and sits
//! behind the `trust_unverified_request_objects` configuration flag; when
//! the flag is off, signatures are verified against the client's registered
//! signing key.
//!
//! The builder side constructs the same artifacts for the relying-party
//! role and for tests: claims, ES256 signature, optional RSA-OAEP
//! encryption.

use std::time::{Duration, SystemTime};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use josekit::jwe::{JweHeader, RSA_OAEP};
use josekit::jws::{ES256, JwsHeader, RS256};
use josekit::jwt::JwtPayload;
use serde_json::{Map, Value};

use crate::error::{IssuerError, IssuerResult};
use crate::types::ClientRegistration;

/// Claim name for the structured identity attributes carried by a request
/// object.
pub const SHARED_CLAIMS: &str = "shared_claims";

/// Verified (or structurally trusted) request-object claim set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestObjectClaims {
    claims: Map<String, Value>,
}

impl RequestObjectClaims {
    /// Wraps a raw claim map.
    #[must_use]
    pub fn new(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    /// Returns a claim as a string slice, when present and a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    /// The `redirect_uri` claim.
    #[must_use]
    pub fn redirect_uri(&self) -> Option<&str> {
        self.get_str("redirect_uri")
    }

    /// The `response_type` claim.
    #[must_use]
    pub fn response_type(&self) -> Option<&str> {
        self.get_str("response_type")
    }

    /// The `state` claim.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.get_str("state")
    }

    /// The structured `shared_claims` attribute block, when present.
    #[must_use]
    pub fn shared_claims(&self) -> Option<&Map<String, Value>> {
        self.claims.get(SHARED_CLAIMS).and_then(Value::as_object)
    }

    /// The full claim map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.claims
    }
}

/// Decoder for inbound request objects.
#[derive(Debug, Clone)]
pub struct RequestObjectCodec {
    trust_unverified: bool,
}

impl RequestObjectCodec {
    /// Creates a codec.
    ///
    /// `trust_unverified` mirrors the `trust_unverified_request_objects`
    /// configuration flag.
    #[must_use]
    pub fn new(trust_unverified: bool) -> Self {
        Self { trust_unverified }
    }

    /// Decodes a request object for the given client.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerError::RequestObjectDecode`] when the value is
    /// neither a decryptable JWE nor a well-formed signed JWT, or
    /// [`IssuerError::RequestObjectSignature`] when verification is enabled
    /// and fails.
    pub fn decode(
        &self,
        request: &str,
        client: &ClientRegistration,
    ) -> IssuerResult<RequestObjectClaims> {
        if let Some(pem) = client.encryption_private_key_pem.as_deref() {
            if let Ok(inner) = decrypt_jwe(request, pem) {
                return self.parse_signed(&inner, client);
            }
        }
        self.parse_signed(request, client)
    }

    fn parse_signed(
        &self,
        jws: &str,
        client: &ClientRegistration,
    ) -> IssuerResult<RequestObjectClaims> {
        if self.trust_unverified {
            parse_unverified_jws(jws)
        } else {
            parse_verified_jws(jws, client)
        }
    }
}

fn decrypt_jwe(request: &str, private_key_pem: &str) -> IssuerResult<String> {
    let decrypter = RSA_OAEP
        .decrypter_from_pem(private_key_pem)
        .map_err(|e| IssuerError::request_object_decode(format!("unusable decryption key: {e}")))?;
    let (payload, _header) = josekit::jwe::deserialize_compact(request, &decrypter)
        .map_err(|e| IssuerError::request_object_decode(format!("JWE decrypt failed: {e}")))?;
    String::from_utf8(payload)
        .map_err(|e| IssuerError::request_object_decode(format!("JWE payload not UTF-8: {e}")))
}

/// Structural parse of a compact JWS: three segments, base64url header and
/// payload, JSON claim set. The signature segment must be present but is
/// not checked.
fn parse_unverified_jws(jws: &str) -> IssuerResult<RequestObjectClaims> {
    let mut segments = jws.split('.');
    let (Some(header), Some(payload), Some(signature)) =
        (segments.next(), segments.next(), segments.next())
    else {
        return Err(IssuerError::request_object_decode(
            "not a three-segment compact JWS",
        ));
    };
    if segments.next().is_some() {
        return Err(IssuerError::request_object_decode(
            "more than three JWS segments",
        ));
    }
    if signature.is_empty() {
        return Err(IssuerError::request_object_decode("empty signature segment"));
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|e| IssuerError::request_object_decode(format!("header not base64url: {e}")))?;
    let header_json: Map<String, Value> = serde_json::from_slice(&header_bytes)
        .map_err(|e| IssuerError::request_object_decode(format!("header not JSON: {e}")))?;
    if !header_json.get("alg").is_some_and(Value::is_string) {
        return Err(IssuerError::request_object_decode("header missing alg"));
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| IssuerError::request_object_decode(format!("payload not base64url: {e}")))?;
    let claims: Map<String, Value> = serde_json::from_slice(&payload_bytes)
        .map_err(|e| IssuerError::request_object_decode(format!("claims not JSON: {e}")))?;

    Ok(RequestObjectClaims::new(claims))
}

fn parse_verified_jws(
    jws: &str,
    client: &ClientRegistration,
) -> IssuerResult<RequestObjectClaims> {
    let pem = client.signing_public_key_pem.as_deref().ok_or_else(|| {
        IssuerError::RequestObjectSignature {
            message: "no signing key registered for client".to_string(),
        }
    })?;

    // Pick the verifier from the protected header's alg.
    let alg = jws
        .split('.')
        .next()
        .and_then(|seg| URL_SAFE_NO_PAD.decode(seg).ok())
        .and_then(|bytes| serde_json::from_slice::<Map<String, Value>>(&bytes).ok())
        .and_then(|header| header.get("alg").and_then(Value::as_str).map(String::from))
        .ok_or_else(|| IssuerError::request_object_decode("unreadable JWS header"))?;

    let payload = match alg.as_str() {
        "ES256" => {
            let verifier = ES256.verifier_from_pem(pem).map_err(|e| {
                IssuerError::RequestObjectSignature {
                    message: format!("unusable ES256 key: {e}"),
                }
            })?;
            josekit::jws::deserialize_compact(jws, &verifier)
        }
        "RS256" => {
            let verifier = RS256.verifier_from_pem(pem).map_err(|e| {
                IssuerError::RequestObjectSignature {
                    message: format!("unusable RS256 key: {e}"),
                }
            })?;
            josekit::jws::deserialize_compact(jws, &verifier)
        }
        other => {
            return Err(IssuerError::RequestObjectSignature {
                message: format!("unsupported alg {other}"),
            });
        }
    };

    let (payload, _header) = payload.map_err(|e| IssuerError::RequestObjectSignature {
        message: e.to_string(),
    })?;
    let claims: Map<String, Value> = serde_json::from_slice(&payload)
        .map_err(|e| IssuerError::request_object_decode(format!("claims not JSON: {e}")))?;
    Ok(RequestObjectClaims::new(claims))
}

/// Builder for outbound request objects (relying-party side and tests).
#[derive(Debug, Clone, Default)]
pub struct RequestObjectBuilder {
    issuer: Option<String>,
    audience: Option<String>,
    subject: Option<String>,
    response_type: Option<String>,
    redirect_uri: Option<String>,
    state: Option<String>,
    shared_claims: Option<Map<String, Value>>,
    ttl: Option<Duration>,
}

impl RequestObjectBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `iss` claim.
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the `aud` claim.
    #[must_use]
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Sets the `sub` claim.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the `response_type` claim.
    #[must_use]
    pub fn response_type(mut self, response_type: impl Into<String>) -> Self {
        self.response_type = Some(response_type.into());
        self
    }

    /// Sets the `redirect_uri` claim.
    #[must_use]
    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Sets the `state` claim.
    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Sets the structured `shared_claims` block.
    #[must_use]
    pub fn shared_claims(mut self, shared_claims: Map<String, Value>) -> Self {
        self.shared_claims = Some(shared_claims);
        self
    }

    /// Sets the token lifetime. Defaults to one hour.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Signs the claim set with ES256 and returns the compact JWS.
    ///
    /// # Errors
    ///
    /// Returns an error when the signing key is unusable or a claim cannot
    /// be set.
    pub fn sign_es256(&self, signing_key_pem: &str) -> IssuerResult<String> {
        let mut payload = JwtPayload::new();
        if let Some(ref issuer) = self.issuer {
            payload.set_issuer(issuer);
        }
        if let Some(ref audience) = self.audience {
            payload.set_audience(vec![audience.as_str()]);
        }
        if let Some(ref subject) = self.subject {
            payload.set_subject(subject);
        }
        set_string_claim(&mut payload, "response_type", self.response_type.as_deref())?;
        set_string_claim(&mut payload, "redirect_uri", self.redirect_uri.as_deref())?;
        set_string_claim(&mut payload, "state", self.state.as_deref())?;
        if let Some(ref shared) = self.shared_claims {
            payload
                .set_claim(SHARED_CLAIMS, Some(Value::Object(shared.clone())))
                .map_err(|e| IssuerError::request_object_decode(e.to_string()))?;
        }

        let now = SystemTime::now();
        let ttl = self.ttl.unwrap_or(Duration::from_secs(3600));
        payload.set_issued_at(&now);
        payload.set_not_before(&now);
        payload.set_expires_at(&(now + ttl));

        let mut header = JwsHeader::new();
        header.set_token_type("JWT");

        let signer = ES256
            .signer_from_pem(signing_key_pem)
            .map_err(|e| IssuerError::request_object_decode(format!("unusable signing key: {e}")))?;
        josekit::jwt::encode_with_signer(&payload, &header, &signer)
            .map_err(|e| IssuerError::request_object_decode(format!("signing failed: {e}")))
    }

    /// Signs the claim set and encrypts the result into a compact JWE
    /// (RSA-OAEP, A256CBC-HS512) for the issuer's public encryption key.
    ///
    /// # Errors
    ///
    /// Returns an error when either key is unusable.
    pub fn sign_and_encrypt(
        &self,
        signing_key_pem: &str,
        encryption_public_key_pem: &str,
    ) -> IssuerResult<String> {
        let signed = self.sign_es256(signing_key_pem)?;
        encrypt_for(&signed, encryption_public_key_pem)
    }
}

/// Wraps a signed JWT into a compact JWE for the given RSA public key.
///
/// # Errors
///
/// Returns an error when the key is unusable.
pub fn encrypt_for(signed_jwt: &str, encryption_public_key_pem: &str) -> IssuerResult<String> {
    let encrypter = RSA_OAEP
        .encrypter_from_pem(encryption_public_key_pem)
        .map_err(|e| IssuerError::request_object_decode(format!("unusable encryption key: {e}")))?;
    let mut header = JweHeader::new();
    header.set_token_type("JWT");
    header.set_content_type("JWT");
    header.set_content_encryption("A256CBC-HS512");
    josekit::jwe::serialize_compact(signed_jwt.as_bytes(), &header, &encrypter)
        .map_err(|e| IssuerError::request_object_decode(format!("encryption failed: {e}")))
}

fn set_string_claim(
    payload: &mut JwtPayload,
    name: &str,
    value: Option<&str>,
) -> IssuerResult<()> {
    if let Some(value) = value {
        payload
            .set_claim(name, Some(Value::String(value.to_string())))
            .map_err(|e| IssuerError::request_object_decode(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn client() -> ClientRegistration {
        ClientRegistration {
            redirect_uris: vec!["https://valid.example.com".to_string()],
            signing_public_key_pem: Some(fixtures::EC_PUBLIC_KEY_PEM.to_string()),
            encryption_private_key_pem: Some(fixtures::RSA_PRIVATE_KEY_PEM.to_string()),
        }
    }

    fn builder() -> RequestObjectBuilder {
        let mut shared = Map::new();
        shared.insert(
            "addresses".to_string(),
            serde_json::json!(["123 random street, M13 7GE"]),
        );
        RequestObjectBuilder::new()
            .issuer("issuer")
            .audience("audience")
            .subject("subject")
            .response_type("code")
            .redirect_uri("https://valid.example.com")
            .state("test-state")
            .shared_claims(shared)
    }

    #[test]
    fn decodes_plain_signed_request_object() {
        let jws = builder().sign_es256(fixtures::EC_PRIVATE_KEY_PEM).unwrap();
        let codec = RequestObjectCodec::new(true);

        let claims = codec.decode(&jws, &client()).unwrap();
        assert_eq!(claims.redirect_uri(), Some("https://valid.example.com"));
        assert_eq!(claims.response_type(), Some("code"));
        assert_eq!(claims.state(), Some("test-state"));
        assert!(claims.shared_claims().unwrap().contains_key("addresses"));
    }

    #[test]
    fn decodes_encrypted_request_object() {
        let jwe = builder()
            .sign_and_encrypt(fixtures::EC_PRIVATE_KEY_PEM, fixtures::RSA_PUBLIC_KEY_PEM)
            .unwrap();
        let codec = RequestObjectCodec::new(true);

        let claims = codec.decode(&jwe, &client()).unwrap();
        assert_eq!(claims.redirect_uri(), Some("https://valid.example.com"));
        assert_eq!(claims.state(), Some("test-state"));
    }

    #[test]
    fn decoding_is_idempotent() {
        let jws = builder().sign_es256(fixtures::EC_PRIVATE_KEY_PEM).unwrap();
        let codec = RequestObjectCodec::new(true);

        let first = codec.decode(&jws, &client()).unwrap();
        let second = codec.decode(&jws, &client()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tampered_signature_is_accepted_when_trusting() {
        // Permissive mode checks structure only.
        let jws = builder().sign_es256(fixtures::EC_PRIVATE_KEY_PEM).unwrap();
        let tampered = format!("{}Nope", &jws[..jws.len() - 4]);
        let codec = RequestObjectCodec::new(true);

        let claims = codec.decode(&tampered, &client()).unwrap();
        assert_eq!(claims.response_type(), Some("code"));
    }

    #[test]
    fn tampered_signature_is_rejected_when_verifying() {
        let jws = builder().sign_es256(fixtures::EC_PRIVATE_KEY_PEM).unwrap();
        let tampered = format!("{}Nope", &jws[..jws.len() - 4]);
        let codec = RequestObjectCodec::new(false);

        let result = codec.decode(&tampered, &client());
        assert!(matches!(
            result,
            Err(IssuerError::RequestObjectSignature { .. })
        ));
    }

    #[test]
    fn valid_signature_is_accepted_when_verifying() {
        let jws = builder().sign_es256(fixtures::EC_PRIVATE_KEY_PEM).unwrap();
        let codec = RequestObjectCodec::new(false);

        let claims = codec.decode(&jws, &client()).unwrap();
        assert_eq!(claims.redirect_uri(), Some("https://valid.example.com"));
    }

    #[test]
    fn garbage_is_rejected_with_decode_error() {
        let codec = RequestObjectCodec::new(true);
        let result = codec.decode("not-a-jwt", &client());
        assert!(matches!(
            result,
            Err(IssuerError::RequestObjectDecode { .. })
        ));
    }

    #[test]
    fn two_segment_value_is_rejected() {
        let codec = RequestObjectCodec::new(true);
        let result = codec.decode("eyJhbGciOiJFUzI1NiJ9.eyJmb28iOiJiYXIifQ", &client());
        assert!(result.is_err());
    }

    #[test]
    fn decrypt_failure_falls_back_to_direct_parse() {
        // A client whose decryption key cannot open the value still decodes
        // a plain signed JWT.
        let jws = builder().sign_es256(fixtures::EC_PRIVATE_KEY_PEM).unwrap();
        let codec = RequestObjectCodec::new(true);

        let claims = codec.decode(&jws, &client()).unwrap();
        assert_eq!(claims.response_type(), Some("code"));
    }
}
