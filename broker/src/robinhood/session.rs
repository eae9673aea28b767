//! OAuth token session persisted to a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::client::{CLIENT_ID, RobinhoodClient};
use super::types::TokenRequest;
use crate::Session;
use crate::error::BrokerError;
use crate::types::Credentials;

/// Requested token lifetime in seconds.
const TOKEN_LIFETIME_SECS: i64 = 86_400;

/// Token file contents.
#[derive(Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub device_token: String,
}

impl Drop for StoredToken {
    fn drop(&mut self) {
        self.access_token.zeroize();
        if let Some(refresh) = self.refresh_token.as_mut() {
            refresh.zeroize();
        }
    }
}

/// Session backed by an OAuth token file.
///
/// Valid iff a token is loaded and has not expired.
pub struct TokenSession {
    path: PathBuf,
    client: RobinhoodClient,
    token: Option<StoredToken>,
    device_token: String,
}

impl TokenSession {
    /// Load the session stored at `path`, if any. An unreadable or corrupt
    /// token file is treated as no session.
    pub fn open(path: &Path, client: RobinhoodClient) -> Self {
        let token = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<StoredToken>(&contents) {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!("Ignoring corrupt token file {}: {e}", path.display());
                    None
                }
            },
            Err(_) => None,
        };

        let device_token = token
            .as_ref()
            .map(|t| t.device_token.clone())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Self {
            path: path.to_path_buf(),
            client,
            token,
            device_token,
        }
    }

    /// The bearer token, when the session is valid.
    pub fn access_token(&self) -> Option<&str> {
        self.token
            .as_ref()
            .filter(|t| t.expires_at > Utc::now())
            .map(|t| t.access_token.as_str())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.token.as_ref().map(|t| t.expires_at)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), BrokerError> {
        let Some(token) = &self.token else {
            return Ok(());
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(token)
            .map_err(|e| BrokerError::Other(format!("failed to encode token: {e}")))?;
        fs::write(&self.path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), BrokerError> {
        self.token = None;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!("Removed token file {}", self.path.display());
        }
        Ok(())
    }
}

impl Session for TokenSession {
    fn login(&mut self, credentials: &Credentials) -> Result<(), BrokerError> {
        self.clear()?;

        let request = TokenRequest {
            client_id: CLIENT_ID,
            expires_in: TOKEN_LIFETIME_SECS,
            grant_type: "password",
            scope: "internal",
            username: &credentials.username,
            password: &credentials.password,
            device_token: &self.device_token,
            challenge_type: "sms",
            mfa_code: credentials.mfa_code.as_deref(),
        };
        let resp = self.client.oauth_token(&request)?;

        if let Some(access_token) = resp.access_token.clone() {
            let lifetime = resp.expires_in.unwrap_or(TOKEN_LIFETIME_SECS);
            self.token = Some(StoredToken {
                access_token,
                refresh_token: resp.refresh_token.clone(),
                token_type: resp.token_type.clone().unwrap_or_else(|| "Bearer".into()),
                expires_at: Utc::now() + Duration::seconds(lifetime),
                device_token: self.device_token.clone(),
            });
            self.save()?;
            info!("Logged in as {}", credentials.username);
            return Ok(());
        }

        if resp.mfa_required.unwrap_or(false) || resp.challenge.is_some() {
            let kind = resp.mfa_type.clone().unwrap_or_else(|| "sms".into());
            return Err(BrokerError::ChallengeRequired(kind));
        }

        let detail = resp.detail.clone().unwrap_or_default();
        if detail.to_lowercase().contains("credentials") {
            return Err(BrokerError::Auth("invalid username or password".into()));
        }
        Err(BrokerError::Auth(if detail.is_empty() {
            "login rejected".into()
        } else {
            detail
        }))
    }

    fn logout(&mut self) -> Result<(), BrokerError> {
        if let Some(token) = &self.token {
            if let Err(e) = self.client.revoke_token(&token.access_token) {
                warn!("Token revoke failed, clearing local session anyway: {e}");
            }
        }
        self.clear()
    }

    fn is_valid(&self) -> bool {
        self.access_token().is_some()
    }
}
