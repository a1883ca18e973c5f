use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage signing secret not configured")]
    MissingSecret,

    #[error("Failed to sign upload token: {0}")]
    Signing(String),
}

/// Claims embedded in an upload token: the object the bearer may write to,
/// and nothing else.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadTokenClaims {
    /// `{bucket}/{path}` of the object the token authorizes
    pub url: String,
    pub content_type: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Everything a client needs to perform one upload: the time-limited signed
/// URL, the bare token, the storage path, and the eventual public URL.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUpload {
    pub signed_url: String,
    pub token: String,
    pub path: String,
    pub public_url: String,
}

/// Mints signed upload URLs for the object-storage backend. Which caller may
/// sign is the backend policy's decision; this service adds no authorization
/// of its own.
pub struct StorageService {
    bucket: String,
    public_base_url: String,
    signing_secret: String,
    ttl_secs: u64,
}

impl StorageService {
    pub fn from_config() -> Self {
        let storage = &config::config().storage;
        Self {
            bucket: storage.bucket.clone(),
            public_base_url: storage.public_base_url.trim_end_matches('/').to_string(),
            signing_secret: storage.signing_secret.clone(),
            ttl_secs: storage.signed_url_ttl_secs,
        }
    }

    #[cfg(test)]
    pub fn new(
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
        signing_secret: impl Into<String>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            public_base_url: public_base_url.into(),
            signing_secret: signing_secret.into(),
            ttl_secs,
        }
    }

    /// Compute the ephemeral upload path for a user's file: a per-user
    /// temporary prefix plus a timestamped copy of the original filename.
    /// The path is derived, used once, and never persisted as an entity.
    pub fn upload_path(identity: &str, filename: &str, now: DateTime<Utc>) -> String {
        format!(
            "tmp/{}/{}-{}",
            identity,
            now.timestamp_millis(),
            sanitize_filename(filename)
        )
    }

    /// Mint a signed upload URL for `filename` under `identity`'s temporary
    /// prefix, valid for the configured TTL.
    pub fn sign_upload(
        &self,
        identity: &str,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<SignedUpload, StorageError> {
        if self.signing_secret.is_empty() {
            return Err(StorageError::MissingSecret);
        }

        let now = Utc::now();
        let path = Self::upload_path(identity, filename, now);

        let claims = UploadTokenClaims {
            url: format!("{}/{}", self.bucket, path),
            content_type: content_type.map(str::to_string),
            exp: now.timestamp() + self.ttl_secs as i64,
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.signing_secret.as_bytes()),
        )
        .map_err(|e| StorageError::Signing(e.to_string()))?;

        let signed_url = format!(
            "{}/storage/v1/object/upload/sign/{}/{}?token={}",
            self.public_base_url, self.bucket, path, token
        );
        let public_url = format!(
            "{}/storage/v1/object/public/{}/{}",
            self.public_base_url, self.bucket, path
        );

        Ok(SignedUpload {
            signed_url,
            token,
            path,
            public_url,
        })
    }
}

/// Keep filenames URL- and key-safe without losing the extension
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    fn service() -> StorageService {
        StorageService::new("avatars", "http://storage.local", "test-secret", 7200)
    }

    #[test]
    fn upload_path_is_scoped_and_timestamped() {
        let now = Utc::now();
        let path = StorageService::upload_path("user_ext_1", "face.png", now);
        assert!(path.starts_with(&format!("tmp/user_ext_1/{}-", now.timestamp_millis())));
        assert!(path.ends_with("face.png"));
    }

    #[test]
    fn sanitizes_hostile_filenames() {
        assert_eq!(sanitize_filename("my face (1).png"), "my_face__1_.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
    }

    #[test]
    fn signed_upload_has_consistent_urls() {
        let signed = service()
            .sign_upload("user_ext_1", "face.png", Some("image/png"))
            .expect("signed upload");

        assert!(signed.path.starts_with("tmp/user_ext_1/"));
        assert!(signed.signed_url.contains(&signed.path));
        assert!(signed.signed_url.contains(&signed.token));
        assert_eq!(
            signed.public_url,
            format!("http://storage.local/storage/v1/object/public/avatars/{}", signed.path)
        );
    }

    #[test]
    fn upload_token_decodes_with_expected_claims() {
        let signed = service()
            .sign_upload("user_ext_1", "face.png", None)
            .expect("signed upload");

        let decoded = decode::<UploadTokenClaims>(
            &signed.token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .expect("decode token");

        assert_eq!(decoded.claims.url, format!("avatars/{}", signed.path));
        assert!(decoded.claims.exp - decoded.claims.iat == 7200);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let service = StorageService::new("avatars", "http://storage.local", "", 7200);
        assert!(matches!(
            service.sign_upload("u", "f.png", None),
            Err(StorageError::MissingSecret)
        ));
    }
}
