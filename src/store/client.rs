//! REST client for the email store proxy.
//!
//! The proxy speaks the PostgREST query dialect: one table, `select=` for
//! columns, `<column>=eq.<value>` filters and `order=<column>.desc`.

use crate::models::EmailRecord;
use crate::store::StoreError;
use std::time::Duration;
use tracing::{debug, info};

/// Columns requested for every email row.
pub const EMAIL_COLUMNS: &[&str] = &[
    "email_id",
    "from_norm",
    "to_norm",
    "cc_norm",
    "bcc_norm",
    "dt_utc",
    "subject",
    "body_raw",
    "path",
    "risk_label",
    "final_score",
    "sentiment_label",
    "sentiment_score",
    "emotion_label",
    "emotion_score",
];

/// Connection settings for the store proxy.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Proxy base URL, e.g. `https://mail-proxy.internal`.
    pub url: String,
    pub table: String,
    /// Bearer token forwarded to the proxy, if it requires one.
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

/// Client for the email store proxy.
pub struct EmailStoreClient {
    config: StoreConfig,
    http_client: reqwest::Client,
}

impl EmailStoreClient {
    /// Create a client. Fails when no proxy URL is configured.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        if config.url.trim().is_empty() {
            return Err(StoreError::NotConfigured);
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Endpoint URL for the configured table.
    pub fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            self.config.table
        )
    }

    /// Query parameters selecting every email sent by `person_id`, newest first.
    pub fn sender_query(person_id: &str) -> Vec<(&'static str, String)> {
        vec![
            ("select", EMAIL_COLUMNS.join(",")),
            ("from_norm", format!("eq.{}", person_id)),
            ("order", "dt_utc.desc".to_string()),
        ]
    }

    /// Fetch every email sent by a person.
    pub async fn emails_from(&self, person_id: &str) -> Result<Vec<EmailRecord>, StoreError> {
        let url = self.table_url();
        debug!("Querying email store: {} (from_norm={})", url, person_id);

        let mut request = self
            .http_client
            .get(&url)
            .query(&Self::sender_query(person_id));
        if let Some(ref token) = self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout(self.config.timeout_seconds)
            } else if e.is_connect() {
                StoreError::Connect(self.config.url.clone())
            } else {
                StoreError::Request(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let body = response.text().await?;
        let rows = parse_rows(&body)?;
        info!("Fetched {} emails for {}", rows.len(), person_id);
        Ok(rows)
    }
}

/// Decode a JSON array of email rows.
pub fn parse_rows(body: &str) -> Result<Vec<EmailRecord>, StoreError> {
    serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> StoreConfig {
        StoreConfig {
            url: url.to_string(),
            table: "emails_clean_9902".to_string(),
            token: None,
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_requires_url() {
        assert!(matches!(
            EmailStoreClient::new(config("  ")),
            Err(StoreError::NotConfigured)
        ));
    }

    #[test]
    fn test_table_url() {
        let client = EmailStoreClient::new(config("https://proxy.example/")).unwrap();
        assert_eq!(
            client.table_url(),
            "https://proxy.example/rest/v1/emails_clean_9902"
        );
    }

    #[test]
    fn test_sender_query() {
        let query = EmailStoreClient::sender_query("kenneth.lay");
        assert_eq!(query[1], ("from_norm", "eq.kenneth.lay".to_string()));
        assert_eq!(query[2], ("order", "dt_utc.desc".to_string()));
        assert!(query[0].1.starts_with("email_id,from_norm"));
        assert!(query[0].1.ends_with("emotion_score"));
    }

    #[test]
    fn test_parse_rows() {
        let rows = parse_rows(
            r#"[{"email_id": "e1", "subject": "Q3", "final_score": 0.7}, {"email_id": "e2"}]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].final_score, Some(0.7));

        assert!(matches!(parse_rows("{\"message\": \"denied\"}"), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_unreachable_proxy() {
        // Nothing listens on the discard port.
        let client = EmailStoreClient::new(config("http://127.0.0.1:9")).unwrap();
        let result = tokio_test::block_on(client.emails_from("kenneth.lay"));
        assert!(result.is_err());
    }
}
