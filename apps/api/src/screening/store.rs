//! Session Store adapter — persists a finalized candidate record.
//!
//! PII fields (phone, email, location) are encrypted at this boundary; the
//! machine and everything above it only ever see plaintext. Writes upsert on
//! `session_id`, so a duplicate terminal trigger (abrupt exit followed by a
//! retry) lands on the same record instead of inserting twice.
//!
//! Encryption failure aborts the write: the adapter fails closed rather than
//! persisting unencrypted PII.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::crypto::FieldCipher;
use crate::errors::AppError;
use crate::models::candidate::{CandidateProfile, CandidateSession};

#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Persists the session, returning the stored record id.
    async fn persist(&self, session: &CandidateSession) -> Result<Uuid, AppError>;
}

/// Ciphertext for the PII columns of one record.
struct EncryptedPii {
    phone: Option<String>,
    email: Option<String>,
    location: Option<String>,
}

/// Postgres-backed store.
pub struct PgCandidateStore {
    pool: PgPool,
    cipher: FieldCipher,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool, cipher: FieldCipher) -> Self {
        Self { pool, cipher }
    }
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn persist(&self, session: &CandidateSession) -> Result<Uuid, AppError> {
        let pii = encrypt_pii(&self.cipher, &session.profile)?;

        let assessment = serde_json::to_value(&session.assessment)
            .map_err(|e| AppError::Storage(format!("Failed to serialize assessment: {e}")))?;

        let (record_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO candidates
                (id, session_id, name, phone, email, location, experience_years,
                 desired_position, tech_stack, assessment, status, created_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (session_id) DO UPDATE SET
                name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                location = EXCLUDED.location,
                experience_years = EXCLUDED.experience_years,
                desired_position = EXCLUDED.desired_position,
                tech_stack = EXCLUDED.tech_stack,
                assessment = EXCLUDED.assessment,
                status = EXCLUDED.status,
                completed_at = EXCLUDED.completed_at
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(session.session_id)
        .bind(&session.profile.name)
        .bind(&pii.phone)
        .bind(&pii.email)
        .bind(&pii.location)
        .bind(session.profile.years_experience.map(i16::from))
        .bind(&session.profile.desired_position)
        .bind(&session.tech_stack)
        .bind(&assessment)
        .bind(session.status_label())
        .bind(session.created_at)
        .bind(session.completed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Storage(format!("Failed to persist session: {e}")))?;

        info!(
            "Persisted candidate record {} for session {} (status: {})",
            record_id,
            session.session_id,
            session.status_label()
        );

        Ok(record_id)
    }
}

/// Encrypts exactly the PII fields; absent fields stay NULL.
fn encrypt_pii(cipher: &FieldCipher, profile: &CandidateProfile) -> Result<EncryptedPii, AppError> {
    let encrypt = |value: &Option<String>| -> Result<Option<String>, AppError> {
        value
            .as_deref()
            .map(|v| cipher.encrypt(v))
            .transpose()
            .map_err(|e| AppError::Encryption(e.to_string()))
    };

    Ok(EncryptedPii {
        phone: encrypt(&profile.phone)?,
        email: encrypt(&profile.email)?,
        location: encrypt(&profile.location)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

    fn test_cipher() -> FieldCipher {
        FieldCipher::new(&BASE64.encode([3u8; 32])).unwrap()
    }

    #[test]
    fn test_encrypt_pii_round_trips_every_field() {
        let cipher = test_cipher();
        let profile = CandidateProfile {
            name: Some("Jane Doe".to_string()),
            email: Some("jane@doe.com".to_string()),
            phone: Some("+15551234567".to_string()),
            years_experience: Some(4),
            desired_position: Some("Backend Developer".to_string()),
            location: Some("Berlin, Germany".to_string()),
        };

        let pii = encrypt_pii(&cipher, &profile).unwrap();

        let phone = pii.phone.unwrap();
        let email = pii.email.unwrap();
        let location = pii.location.unwrap();

        // Ciphertext in, plaintext back out
        assert_ne!(phone, "+15551234567");
        assert_ne!(email, "jane@doe.com");
        assert_ne!(location, "Berlin, Germany");
        assert_eq!(cipher.decrypt(&phone).unwrap(), "+15551234567");
        assert_eq!(cipher.decrypt(&email).unwrap(), "jane@doe.com");
        assert_eq!(cipher.decrypt(&location).unwrap(), "Berlin, Germany");
    }

    #[test]
    fn test_encrypt_pii_leaves_absent_fields_null() {
        let cipher = test_cipher();
        let profile = CandidateProfile {
            name: Some("Jane Doe".to_string()),
            ..Default::default()
        };

        let pii = encrypt_pii(&cipher, &profile).unwrap();
        assert!(pii.phone.is_none());
        assert!(pii.email.is_none());
        assert!(pii.location.is_none());
    }
}
