use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domains::now_ts;
use crate::error::{PlaticaError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// Something with an owning account. Guest-bound records report `None` and
/// are never reachable through a bearer credential.
pub trait Owned {
    fn owner_id(&self) -> Option<&str>;
}

/// Signs and verifies identity tokens and performs the ownership comparison
/// every owner-scoped operation runs before touching a record. The sequence
/// is always verify -> load -> [`AccessGate::ensure_owner`]; verification
/// failures take precedence over lookup failures.
pub struct AccessGate {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_minutes: i64,
}

impl AccessGate {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_minutes,
        }
    }

    pub fn sign(&self, subject_id: &str) -> Result<String> {
        self.sign_with_ttl(subject_id, self.ttl_minutes)
    }

    pub fn sign_with_ttl(&self, subject_id: &str, ttl_minutes: i64) -> Result<String> {
        let claims = Claims {
            sub: subject_id.to_string(),
            exp: now_ts() + ttl_minutes * 60,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| PlaticaError::Config(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    PlaticaError::Unauthenticated("credential has expired".to_string())
                }
                _ => PlaticaError::Unauthenticated("invalid credentials".to_string()),
            }
        })?;
        Ok(data.claims)
    }

    pub fn ensure_owner<E: Owned>(&self, claims: &Claims, entity: &E) -> Result<()> {
        match entity.owner_id() {
            Some(owner) if owner == claims.sub => Ok(()),
            _ => Err(PlaticaError::Forbidden(
                "you are not authorized to access this record".to_string(),
            )),
        }
    }
}

pub fn hash_password(plain: &str) -> Result<String> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST).map_err(|e| PlaticaError::Config(e.to_string()))
}

pub fn check_password(plain: &str, digest: &str) -> Result<bool> {
    bcrypt::verify(plain, digest).map_err(|e| PlaticaError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Record {
        owner: Option<String>,
    }

    impl Owned for Record {
        fn owner_id(&self) -> Option<&str> {
            self.owner.as_deref()
        }
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let gate = AccessGate::new("secret", 15);
        let token = gate.sign("user-1").unwrap();
        let claims = gate.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > now_ts());
    }

    #[test]
    fn expired_and_malformed_tokens_are_unauthenticated() {
        let gate = AccessGate::new("secret", 15);
        let stale = gate.sign_with_ttl("user-1", -5).unwrap();
        assert!(matches!(
            gate.verify(&stale),
            Err(PlaticaError::Unauthenticated(_))
        ));
        assert!(matches!(
            gate.verify("not-a-token"),
            Err(PlaticaError::Unauthenticated(_))
        ));

        let other = AccessGate::new("other-secret", 15);
        let forged = other.sign("user-1").unwrap();
        assert!(matches!(
            gate.verify(&forged),
            Err(PlaticaError::Unauthenticated(_))
        ));
    }

    #[test]
    fn ownership_comparison() {
        let gate = AccessGate::new("secret", 15);
        let token = gate.sign("user-1").unwrap();
        let claims = gate.verify(&token).unwrap();

        let mine = Record {
            owner: Some("user-1".to_string()),
        };
        let theirs = Record {
            owner: Some("user-2".to_string()),
        };
        let unowned = Record { owner: None };

        assert!(gate.ensure_owner(&claims, &mine).is_ok());
        assert!(matches!(
            gate.ensure_owner(&claims, &theirs),
            Err(PlaticaError::Forbidden(_))
        ));
        assert!(matches!(
            gate.ensure_owner(&claims, &unowned),
            Err(PlaticaError::Forbidden(_))
        ));
    }
}
