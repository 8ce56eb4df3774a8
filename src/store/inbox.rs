//! Ranking and display helpers for fetched emails.

use crate::models::EmailRecord;

/// Risk label the classifier assigns to unremarkable mail.
pub const ROUTINE_RISK_LABEL: &str =
    "This email appears routine, compliant, and shows no indication of risk or wrongdoing.";

/// Default minimum body length, in words, for an email to be shown.
pub const DEFAULT_MIN_BODY_WORDS: usize = 50;

fn is_routine(email: &EmailRecord) -> bool {
    email.risk_label.as_deref() == Some(ROUTINE_RISK_LABEL)
}

/// Keep substantive emails and order them for review.
///
/// Bodies of `min_body_words` words or fewer are dropped. Routine emails go
/// last; within each group the highest risk score comes first. Equal keys
/// keep the store's order (newest first).
pub fn rank_inbox(rows: Vec<EmailRecord>, min_body_words: usize) -> Vec<EmailRecord> {
    let mut kept: Vec<EmailRecord> = rows
        .into_iter()
        .filter(|e| e.body_words() > min_body_words)
        .collect();

    kept.sort_by(|a, b| {
        is_routine(a).cmp(&is_routine(b)).then_with(|| {
            let (ra, rb) = (a.final_score.unwrap_or(0.0), b.final_score.unwrap_or(0.0));
            rb.total_cmp(&ra)
        })
    });

    kept
}

/// Mailbox folder from a maildir path such as `maildir\lay-k\inbox\12.`.
///
/// Returns the first non-empty segment enclosed by backslashes, lowercased.
pub fn mail_folder(path: Option<&str>) -> String {
    let Some(path) = path else {
        return "N/A".to_string();
    };

    let parts: Vec<&str> = path.split('\\').collect();
    if parts.len() < 3 {
        return "N/A".to_string();
    }

    parts[1..parts.len() - 1]
        .iter()
        .find(|p| !p.is_empty())
        .map(|p| p.to_lowercase())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Render an address column for display.
pub fn address_list(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return "—".to_string();
    };

    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(list) if list.is_empty() => "—".to_string(),
        Ok(list) => list.join(", "),
        Err(_) => raw.to_string(),
    }
}

/// Collapse runs of three or more newlines into a single blank line.
pub fn tidy_body(body: Option<&str>) -> String {
    let Some(body) = body else {
        return String::new();
    };

    let mut out = String::with_capacity(body.len());
    let mut newlines = 0usize;
    for ch in body.chars() {
        if ch == '\n' {
            newlines += 1;
            continue;
        }
        if newlines > 0 {
            out.push_str(if newlines >= 3 { "\n\n" } else { &"\n\n"[..newlines] });
            newlines = 0;
        }
        out.push(ch);
    }
    if newlines > 0 {
        out.push_str(&"\n\n"[..newlines.min(2)]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(id: &str, words: usize, risk_label: Option<&str>, score: Option<f64>) -> EmailRecord {
        EmailRecord {
            email_id: Some(id.to_string()),
            body_raw: Some(vec!["word"; words].join(" ")),
            risk_label: risk_label.map(str::to_string),
            final_score: score,
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_inbox() {
        let rows = vec![
            email("routine-high", 60, Some(ROUTINE_RISK_LABEL), Some(0.99)),
            email("short", 10, Some("fraud"), Some(0.9)),
            email("risky-low", 60, Some("fraud"), Some(0.3)),
            email("unscored", 60, None, None),
            email("risky-high", 60, Some("fraud"), Some(0.8)),
            email("exactly-fifty", 50, Some("fraud"), Some(1.0)),
        ];

        let ranked = rank_inbox(rows, DEFAULT_MIN_BODY_WORDS);
        let ids: Vec<_> = ranked.iter().map(|e| e.email_id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["risky-high", "risky-low", "unscored", "routine-high"]);
    }

    #[test]
    fn test_rank_inbox_counts_surrounding_whitespace() {
        let body = format!("\n{}\n", vec!["word"; 50].join(" "));
        let padded = EmailRecord {
            email_id: Some("padded".to_string()),
            body_raw: Some(body),
            ..Default::default()
        };
        let bare = email("bare", 50, None, None);

        let kept = rank_inbox(vec![padded, bare], DEFAULT_MIN_BODY_WORDS);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].email_id.as_deref(), Some("padded"));
    }

    #[test]
    fn test_mail_folder() {
        assert_eq!(mail_folder(Some(r"maildir\lay-k\Inbox\12.")), "lay-k");
        assert_eq!(mail_folder(Some(r"\\Sent\x")), "sent");
        assert_eq!(mail_folder(Some("no-separators")), "N/A");
        assert_eq!(mail_folder(Some(r"one\two")), "N/A");
        assert_eq!(mail_folder(None), "N/A");
    }

    #[test]
    fn test_address_list() {
        assert_eq!(address_list(Some(r#"["a@enron.com", "b@enron.com"]"#)), "a@enron.com, b@enron.com");
        assert_eq!(address_list(Some("[]")), "—");
        assert_eq!(address_list(Some("")), "—");
        assert_eq!(address_list(None), "—");
        assert_eq!(address_list(Some("plain@enron.com")), "plain@enron.com");
    }

    #[test]
    fn test_tidy_body() {
        assert_eq!(tidy_body(Some("a\n\n\n\nb")), "a\n\nb");
        assert_eq!(tidy_body(Some("a\nb\n\nc")), "a\nb\n\nc");
        assert_eq!(tidy_body(Some("end\n\n\n")), "end\n\n");
        assert_eq!(tidy_body(None), "");
    }
}
