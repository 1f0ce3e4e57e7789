//! Google Sheets tracking: append one row per run

use crate::config::SheetsConfig;
use crate::error::{Result, TailorError};
use crate::output::result::ResultRecord;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// How the client authenticates
#[derive(Debug, Clone)]
pub enum SheetsAuth {
    /// Pre-issued OAuth bearer token
    AccessToken(String),
    ServiceAccount(ServiceAccountKey),
}

/// The fields of a service-account key file the token exchange needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct AppendBody {
    values: Vec<Vec<serde_json::Value>>,
}

pub struct SheetsClient {
    client: Client,
    sheet_id: String,
    range: String,
    value_input_option: String,
    auth: SheetsAuth,
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| TailorError::Sheets(format!("Invalid service account credentials: {}", e)))
    }

    /// RS256 assertion for the token endpoint, valid for one hour
    pub fn assertion(&self, now: i64) -> Result<String> {
        let claims = Claims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| TailorError::Sheets(format!("Invalid service account key: {}", e)))?;
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| TailorError::Sheets(format!("Failed to sign token request: {}", e)))
    }
}

impl SheetsClient {
    pub fn new(config: &SheetsConfig, sheet_id: String, auth: SheetsAuth) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            sheet_id,
            range: config.range.clone(),
            value_input_option: config.value_input_option.clone(),
            auth,
        })
    }

    /// Client from the environment variables named in `config`. The access
    /// token variable wins over service-account credentials.
    pub fn from_env(config: &SheetsConfig) -> Result<Self> {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let sheet_id = env(&config.sheet_id_env)
            .ok_or_else(|| TailorError::Sheets(format!("{} is not set", config.sheet_id_env)))?;

        let auth = if let Some(token) = env(&config.access_token_env) {
            SheetsAuth::AccessToken(token.trim().to_string())
        } else if let Some(creds) = env(&config.credentials_env) {
            SheetsAuth::ServiceAccount(ServiceAccountKey::from_json(&creds)?)
        } else {
            return Err(TailorError::Sheets(format!(
                "Missing Google Sheets credentials: set {} or {}",
                config.access_token_env, config.credentials_env
            )));
        };

        Self::new(config, sheet_id, auth)
    }

    pub fn append_url(&self) -> String {
        format!(
            "{}/{}/values/{}:append?valueInputOption={}&insertDataOption=INSERT_ROWS",
            SHEETS_API, self.sheet_id, self.range, self.value_input_option
        )
    }

    async fn access_token(&self) -> Result<String> {
        match &self.auth {
            SheetsAuth::AccessToken(token) => Ok(token.clone()),
            SheetsAuth::ServiceAccount(key) => {
                let assertion = key.assertion(chrono::Utc::now().timestamp())?;
                let response = self
                    .client
                    .post(&key.token_uri)
                    .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(TailorError::Sheets(format!("Token exchange failed ({}): {}", status, body)));
                }
                let token: TokenResponse = response.json().await?;
                debug!("Obtained access token for {}", key.client_email);
                Ok(token.access_token)
            }
        }
    }

    /// Append `record` as one row. No retry.
    pub async fn append(&self, record: &ResultRecord) -> Result<()> {
        let token = self.access_token().await?;
        let body = AppendBody {
            values: vec![record.to_row()],
        };

        let response = self
            .client
            .post(self.append_url())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TailorError::Sheets(format!("Append failed ({}): {}", status, body)));
        }

        info!("Appended row for {} to sheet", record.company);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SheetsConfig {
        SheetsConfig {
            sheet_id_env: "JOB_TAILOR_TEST_SHEET_ID_UNSET".to_string(),
            access_token_env: "JOB_TAILOR_TEST_TOKEN_UNSET".to_string(),
            credentials_env: "JOB_TAILOR_TEST_CREDS_UNSET".to_string(),
            ..SheetsConfig::default()
        }
    }

    #[test]
    fn test_append_url() {
        let client = SheetsClient::new(
            &SheetsConfig::default(),
            "abc123".to_string(),
            SheetsAuth::AccessToken("t".to_string()),
        )
        .unwrap();
        assert_eq!(
            client.append_url(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/Sheet1!A:G:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS"
        );
    }

    #[test]
    fn test_from_env_requires_sheet_id() {
        let result = SheetsClient::from_env(&config());
        assert!(matches!(result, Err(TailorError::Sheets(msg)) if msg.contains("JOB_TAILOR_TEST_SHEET_ID_UNSET")));
    }

    #[test]
    fn test_service_account_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(r#"{"client_email":"bot@example.iam.gserviceaccount.com","private_key":"x"}"#)
            .unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert!(matches!(key.assertion(0), Err(TailorError::Sheets(_))));
    }

    #[test]
    fn test_invalid_credentials_json() {
        assert!(matches!(ServiceAccountKey::from_json("not json"), Err(TailorError::Sheets(_))));
    }
}
