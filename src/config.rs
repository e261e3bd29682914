use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{PlaticaError, Result};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MongoConfig {
    pub uri: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub secret: Option<String>,
    pub token_ttl_minutes: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub system_prompt: Option<String>,
    pub max_output_length: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    pub default_model_id: Option<String>,
    pub guest_chat_title: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobsConfig {
    pub reminder_poll_seconds: Option<u64>,
    pub guest_sweep_seconds: Option<u64>,
    pub guest_session_ttl_hours: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: Option<ServerConfig>,
    pub mongo: Option<MongoConfig>,
    pub auth: Option<AuthConfig>,
    pub generation: Option<GenerationConfig>,
    pub chat: Option<ChatConfig>,
    pub mail: Option<MailConfig>,
    pub jobs: Option<JobsConfig>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| PlaticaError::Config(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| PlaticaError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Secrets may be supplied through the environment instead of the file.
    pub fn resolve_env(mut self) -> Self {
        if let Ok(secret) = std::env::var("PLATICA_JWT_SECRET") {
            let auth = self.auth.get_or_insert(AuthConfig {
                secret: None,
                token_ttl_minutes: None,
            });
            auth.secret = Some(secret);
        }
        if let Ok(key) = std::env::var("PLATICA_GENERATION_API_KEY") {
            let generation = self.generation.get_or_insert(GenerationConfig {
                api_key: None,
                base_url: None,
                system_prompt: None,
                max_output_length: None,
            });
            generation.api_key = Some(key);
        }
        if let Ok(password) = std::env::var("PLATICA_SMTP_PASSWORD") {
            if let Some(mail) = &mut self.mail {
                mail.password = Some(password);
            }
        }
        self
    }

    pub fn jwt_secret(&self) -> Result<String> {
        self.auth
            .as_ref()
            .and_then(|auth| auth.secret.clone())
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| PlaticaError::Config("auth.secret is not configured".to_string()))
    }

    pub fn token_ttl_minutes(&self) -> i64 {
        self.auth
            .as_ref()
            .and_then(|auth| auth.token_ttl_minutes)
            .unwrap_or(60 * 24)
    }

    pub fn max_output_length(&self) -> u32 {
        self.generation
            .as_ref()
            .and_then(|generation| generation.max_output_length)
            .unwrap_or(512)
    }

    pub fn guest_session_ttl_seconds(&self) -> i64 {
        self.jobs
            .as_ref()
            .and_then(|jobs| jobs.guest_session_ttl_hours)
            .unwrap_or(24)
            * 3600
    }
}
