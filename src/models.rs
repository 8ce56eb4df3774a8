//! Data models for the email network.
//!
//! This module contains the node, edge and thread records loaded from the
//! precomputed dataset files, and the email rows returned by the store.
//! Missing numeric fields are defaulted here, once, at ingestion.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A person in the email network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Normalized person identifier, the join key for edges and lookups.
    pub id: String,
    /// Community label from the detection step, if the person was assigned one.
    #[serde(default)]
    pub community: Option<i64>,
    #[serde(default)]
    pub risk_label: Option<String>,
    #[serde(default)]
    pub risk_intensity: f64,
    #[serde(default)]
    pub sentiment_label: Option<String>,
    #[serde(default)]
    pub sentiment_intensity: f64,
    #[serde(default)]
    pub emotion_label: Option<String>,
    #[serde(default)]
    pub emotion_intensity: f64,
    #[serde(default)]
    pub pagerank: f64,
    #[serde(default)]
    pub degree: u64,
    #[serde(default)]
    pub in_degree: u64,
    #[serde(default)]
    pub out_degree: u64,
    /// Weighted degree.
    #[serde(default)]
    pub w_degree: f64,
    #[serde(default)]
    pub clustering_coef: f64,
    #[serde(default)]
    pub kcore: u64,
    /// Display names seen in the `X-From` headers for this person.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub total_emails: u64,
    #[serde(default)]
    pub risk_emails: u64,
    #[serde(default)]
    pub first_date: Option<String>,
    #[serde(default)]
    pub last_date: Option<String>,
    #[serde(default)]
    pub years: Vec<i32>,
}

impl Node {
    /// Creates a node with every optional field at its default.
    #[cfg(test)]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            community: None,
            risk_label: None,
            risk_intensity: 0.0,
            sentiment_label: None,
            sentiment_intensity: 0.0,
            emotion_label: None,
            emotion_intensity: 0.0,
            pagerank: 0.0,
            degree: 0,
            in_degree: 0,
            out_degree: 0,
            w_degree: 0.0,
            clustering_coef: 0.0,
            kcore: 0,
            aliases: Vec::new(),
            total_emails: 0,
            risk_emails: 0,
            first_date: None,
            last_date: None,
            years: Vec::new(),
        }
    }

    /// Returns the intensity score for a measure.
    pub fn intensity(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Risk => self.risk_intensity,
            Measure::Sentiment => self.sentiment_intensity,
            Measure::Emotion => self.emotion_intensity,
        }
    }

    /// Returns the dominant label for a measure, if any.
    pub fn label(&self, measure: Measure) -> Option<&str> {
        match measure {
            Measure::Risk => self.risk_label.as_deref(),
            Measure::Sentiment => self.sentiment_label.as_deref(),
            Measure::Emotion => self.emotion_label.as_deref(),
        }
    }
}

/// A directed, aggregated interaction between two people.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    /// Number of emails exchanged.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Mean sentiment in [-1, 1].
    #[serde(default)]
    pub sentiment_score: f64,
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(default)]
    pub first_date: Option<String>,
    #[serde(default)]
    pub last_date: Option<String>,
}

fn default_weight() -> f64 {
    1.0
}

impl Edge {
    /// Creates an edge with default weight and neutral sentiment.
    #[cfg(test)]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: default_weight(),
            sentiment_score: 0.0,
            years: Vec::new(),
            first_date: None,
            last_date: None,
        }
    }

    /// Sets the weight, returning the edge.
    #[cfg(test)]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// One partition of the graph dataset (`graph_internal.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub directed: bool,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// The per-node scores that carry a dominant label and an intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Risk,
    Sentiment,
    Emotion,
}

impl Measure {
    /// All measures, in display order.
    pub const ALL: [Measure; 3] = [Measure::Risk, Measure::Sentiment, Measure::Emotion];
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Risk => write!(f, "Risk"),
            Measure::Sentiment => write!(f, "Sentiment"),
            Measure::Emotion => write!(f, "Emotion"),
        }
    }
}

/// Thread-level aggregate scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default = "default_none_label")]
    pub risk_label_zeroshot: String,
    #[serde(default)]
    pub mean_risk: f64,
    #[serde(default = "default_neutral_label")]
    pub dominant_sentiment: String,
    #[serde(default)]
    pub mean_sentiment_score: f64,
    #[serde(default = "default_neutral_label")]
    pub dominant_emotion: String,
    #[serde(default)]
    pub mean_emotion_score: f64,
    #[serde(default)]
    pub n_emails: u64,
}

fn default_none_label() -> String {
    "None".to_string()
}

fn default_neutral_label() -> String {
    "neutral".to_string()
}

/// Root of the thread metadata file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadIndex {
    #[serde(default)]
    pub threads: Vec<Thread>,
}

/// Concatenated text of one thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadText {
    pub thread_id: String,
    #[serde(default)]
    pub subject_norm: Option<String>,
    #[serde(default)]
    pub body_concat: Option<String>,
    #[serde(default)]
    pub n_tokens: u64,
    #[serde(default)]
    pub has_text: bool,
}

/// The thread text file is written either as a bare array or wrapped in an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThreadTextFile {
    List(Vec<ThreadText>),
    Wrapped { threads: Vec<ThreadText> },
}

impl ThreadTextFile {
    pub fn into_texts(self) -> Vec<ThreadText> {
        match self {
            ThreadTextFile::List(texts) => texts,
            ThreadTextFile::Wrapped { threads } => threads,
        }
    }
}

/// A row from the hosted email store.
///
/// Address columns arrive either as JSON-encoded strings or as JSON arrays
/// depending on the column type; both are kept as text. Scores may arrive as
/// numbers or numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub email_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub from_norm: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub to_norm: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub cc_norm: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub bcc_norm: Option<String>,
    #[serde(default)]
    pub dt_utc: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body_raw: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub risk_label: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub final_score: Option<f64>,
    #[serde(default)]
    pub sentiment_label: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub emotion_label: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub emotion_score: Option<f64>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl EmailRecord {
    /// Number of pieces the body splits into on runs of whitespace.
    ///
    /// Leading and trailing whitespace each add an empty piece, so
    /// `"\nHello there\n"` counts as 4. A missing body counts as 0.
    pub fn body_words(&self) -> usize {
        let Some(body) = self.body_raw.as_deref() else {
            return 0;
        };

        let mut runs = 0;
        let mut in_run = false;
        for c in body.chars() {
            let ws = c.is_whitespace();
            if ws && !in_run {
                runs += 1;
            }
            in_run = ws;
        }
        runs + 1
    }
}

/// Parse the timestamp formats the dataset builder and the store emit.
///
/// RFC 3339 strings keep their offset; naive timestamps and bare dates are
/// taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_defaults_applied_at_ingestion() {
        let node: Node = serde_json::from_str(r#"{"id": "kenneth.lay"}"#).unwrap();
        assert_eq!(node.id, "kenneth.lay");
        assert_eq!(node.community, None);
        assert_eq!(node.risk_intensity, 0.0);
        assert_eq!(node.sentiment_intensity, 0.0);
        assert_eq!(node.pagerank, 0.0);
        assert_eq!(node.degree, 0);
        assert!(node.aliases.is_empty());
        assert_eq!(node.risk_label, None);
    }

    #[test]
    fn test_node_explicit_null_community() {
        let node: Node =
            serde_json::from_str(r#"{"id": "a", "community": null, "risk_label": null}"#).unwrap();
        assert_eq!(node.community, None);
        assert_eq!(node.label(Measure::Risk), None);
    }

    #[test]
    fn test_edge_defaults() {
        let edge: Edge = serde_json::from_str(r#"{"source": "a", "target": "b"}"#).unwrap();
        assert_eq!(edge.weight, 1.0);
        assert_eq!(edge.sentiment_score, 0.0);
        assert!(edge.years.is_empty());

        let weighted: Edge =
            serde_json::from_str(r#"{"source": "a", "target": "b", "weight": 7}"#).unwrap();
        assert_eq!(weighted.weight, 7.0);
    }

    #[test]
    fn test_thread_defaults() {
        let thread: Thread = serde_json::from_str(r#"{"id": "t1"}"#).unwrap();
        assert_eq!(thread.risk_label_zeroshot, "None");
        assert_eq!(thread.dominant_sentiment, "neutral");
        assert_eq!(thread.dominant_emotion, "neutral");
        assert_eq!(thread.n_emails, 0);
    }

    #[test]
    fn test_thread_text_file_shapes() {
        let list: ThreadTextFile =
            serde_json::from_str(r#"[{"thread_id": "t1", "body_concat": "hi"}]"#).unwrap();
        assert_eq!(list.into_texts().len(), 1);

        let wrapped: ThreadTextFile =
            serde_json::from_str(r#"{"threads": [{"thread_id": "t1"}, {"thread_id": "t2"}]}"#)
                .unwrap();
        assert_eq!(wrapped.into_texts().len(), 2);
    }

    #[test]
    fn test_email_record_lenient_columns() {
        let row: EmailRecord = serde_json::from_str(
            r#"{
                "email_id": 1042,
                "from_norm": "[\"kenneth.lay\"]",
                "to_norm": ["jeff.skilling", "steven.kean"],
                "cc_norm": null,
                "final_score": "0.82",
                "sentiment_score": -0.4,
                "emotion_score": "n/a"
            }"#,
        )
        .unwrap();

        assert_eq!(row.email_id.as_deref(), Some("1042"));
        assert_eq!(row.from_norm.as_deref(), Some(r#"["kenneth.lay"]"#));
        assert_eq!(
            row.to_norm.as_deref(),
            Some(r#"["jeff.skilling","steven.kean"]"#)
        );
        assert_eq!(row.cc_norm, None);
        assert_eq!(row.bcc_norm, None);
        assert_eq!(row.final_score, Some(0.82));
        assert_eq!(row.sentiment_score, Some(-0.4));
        assert_eq!(row.emotion_score, None);
    }

    #[test]
    fn test_body_words() {
        let mut email = EmailRecord::default();
        assert_eq!(email.body_words(), 0);
        email.body_raw = Some("one two\n\nthree   four".to_string());
        assert_eq!(email.body_words(), 4);
        email.body_raw = Some("\n\none two\n".to_string());
        assert_eq!(email.body_words(), 4);
        email.body_raw = Some(String::new());
        assert_eq!(email.body_words(), 1);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2001-05-14T16:39:00").is_some());
        assert!(parse_timestamp("2001-05-14T16:39:00+00:00").is_some());
        assert!(parse_timestamp("2001-05-14 16:39:00+00:00").is_some());
        assert!(parse_timestamp("2001-05-14").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());

        let dt = parse_timestamp("2001-05-14T18:39:00+02:00").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "16:39");
    }
}
