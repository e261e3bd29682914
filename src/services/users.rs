use std::sync::Arc;

use async_graphql::InputObject;
use mongodb::bson::Document;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::auth::{check_password, hash_password, AccessGate};
use crate::domains::now_ts;
use crate::domains::user::{AuthToken, TaxRegime, User};
use crate::error::{PlaticaError, Result};
use crate::pagination::{Window, WindowArgs};
use crate::repos::users::UserRepo;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

const PASSWORD_SPECIALS: &str = "#$@!%&*?_";

#[derive(Debug, Clone, InputObject)]
pub struct RegisterUserInput {
    pub name: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, InputObject)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, InputObject)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub tax_regime: Option<TaxRegime>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    users: UserRepo,
    gate: Arc<AccessGate>,
}

fn validate_password(password: &str) -> Result<()> {
    let long_enough = password.chars().count() >= 6;
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    let no_whitespace = !password.chars().any(char::is_whitespace);

    if long_enough && has_lower && has_upper && has_digit && has_special && no_whitespace {
        Ok(())
    } else {
        Err(PlaticaError::InvalidArgument(format!(
            "password must be at least 6 characters with no whitespace and include a lowercase \
             letter, an uppercase letter, a digit and one of {PASSWORD_SPECIALS}"
        )))
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if EMAIL_RE.is_match(&email) {
        Ok(email)
    } else {
        Err(PlaticaError::InvalidArgument(format!(
            "{email} is not a valid email address"
        )))
    }
}

impl UserService {
    pub fn new(users: UserRepo, gate: Arc<AccessGate>) -> Self {
        Self { users, gate }
    }

    pub async fn register(&self, input: RegisterUserInput) -> Result<User> {
        let email = normalize_email(&input.email)?;
        validate_password(&input.password)?;
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(PlaticaError::Conflict(format!(
                "a user with email {email} already exists"
            )));
        }

        let user = User {
            id: String::new(),
            name: input.name,
            lastname: input.lastname,
            email,
            password_hash: hash_password(&input.password)?,
            tax_regime: TaxRegime::Undefined,
            created_at: now_ts(),
            updated_at: None,
            reminder_ids: Vec::new(),
            chat_ids: Vec::new(),
        };
        let id = self.users.insert(&user).await?;
        self.users.get(&id).await
    }

    pub async fn login(&self, input: LoginInput) -> Result<AuthToken> {
        let email = input.email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| PlaticaError::Unauthenticated("invalid credentials".to_string()))?;
        if !check_password(&input.password, &user.password_hash)? {
            return Err(PlaticaError::Unauthenticated(
                "invalid credentials".to_string(),
            ));
        }
        Ok(AuthToken::bearer(self.gate.sign(&user.id)?))
    }

    pub async fn me(&self, token: &str) -> Result<User> {
        let claims = self.gate.verify(token)?;
        self.users.get(&claims.sub).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<User> {
        self.users.get(id).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        self.users.get_by_email(email).await
    }

    pub async fn update(&self, token: &str, input: UpdateUserInput) -> Result<User> {
        let claims = self.gate.verify(token)?;
        let user = self.users.get(&claims.sub).await?;

        let mut set = Document::new();
        if let Some(name) = input.name {
            set.insert("name", name);
        }
        if let Some(lastname) = input.lastname {
            set.insert("lastname", lastname);
        }
        if let Some(email) = input.email {
            set.insert("email", normalize_email(&email)?);
        }
        if let Some(regime) = input.tax_regime {
            let value = mongodb::bson::to_bson(&regime)
                .map_err(|e| PlaticaError::Serialization(e.to_string()))?;
            set.insert("tax_regime", value);
        }

        match (input.old_password, input.new_password) {
            (None, None) => {}
            (Some(old), Some(new)) => {
                if !check_password(&old, &user.password_hash)? {
                    return Err(PlaticaError::Unauthenticated(
                        "invalid credentials".to_string(),
                    ));
                }
                validate_password(&new)?;
                set.insert("password_hash", hash_password(&new)?);
            }
            _ => {
                return Err(PlaticaError::InvalidArgument(
                    "changing the password requires both the old and the new password".to_string(),
                ))
            }
        }

        set.insert("updated_at", now_ts());
        let matched = self.users.update_fields(&claims.sub, set).await?;
        if matched == 0 {
            return Err(PlaticaError::NotFound(format!(
                "user {} not found",
                claims.sub
            )));
        }
        self.users.get(&claims.sub).await
    }

    pub async fn delete(&self, token: &str, email: &str) -> Result<User> {
        let claims = self.gate.verify(token)?;
        let user = self.users.get(&claims.sub).await?;
        if user.email != email.trim().to_lowercase() {
            return Err(PlaticaError::InvalidArgument(
                "email does not match the authenticated user".to_string(),
            ));
        }
        let deleted = self.users.delete(&claims.sub).await?;
        if deleted != 1 {
            return Err(PlaticaError::NotFound(format!(
                "user {} not found",
                claims.sub
            )));
        }
        Ok(user)
    }

    pub async fn list(&self, args: &WindowArgs) -> Result<Window<User>> {
        self.users.window(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_policy() {
        assert!(validate_password("Abc123!").is_ok());
        assert!(validate_password("abc123!").is_err());
        assert!(validate_password("ABC123!").is_err());
        assert!(validate_password("Abcdef!").is_err());
        assert!(validate_password("Abc123").is_err());
        assert!(validate_password("Ab1!").is_err());
        assert!(validate_password("Abc 123!").is_err());
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email(" Ana@X.com ").unwrap(), "ana@x.com");
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("a b@x.com").is_err());
    }
}
