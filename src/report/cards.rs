//! Detail views: nodes, emails, threads and hover cards.

use crate::models::{parse_timestamp, EmailRecord, Edge, Node, Thread, ThreadText};
use crate::store::{address_list, mail_folder, tidy_body};

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("N/A")
}

fn joined_or_na<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        "N/A".to_string()
    } else {
        items.iter().map(T::to_string).collect::<Vec<_>>().join(", ")
    }
}

fn format_date(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => parse_timestamp(raw)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| raw.to_string()),
        None => "N/A".to_string(),
    }
}

/// Code fence one backtick longer than any backtick run in `text`.
fn fence_for(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

fn format_score(score: Option<f64>) -> String {
    score
        .map(|s| format!("{:.3}", s))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Full profile of one person.
pub fn node_detail(node: &Node) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", node.id));

    out.push_str("## General Information\n\n");
    out.push_str(&format!("- **Aliases:** {}\n", joined_or_na(&node.aliases)));
    out.push_str(&format!(
        "- **Community:** {}\n",
        node.community
            .map(|c| c.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    ));
    out.push_str(&format!(
        "- **Risk Label:** {}\n",
        node.risk_label.as_deref().unwrap_or("None")
    ));
    out.push_str(&format!("- **Risk Intensity:** {:.3}\n", node.risk_intensity));
    out.push_str(&format!(
        "- **Sentiment Label:** {}\n",
        or_na(node.sentiment_label.as_deref())
    ));
    out.push_str(&format!(
        "- **Sentiment Intensity:** {:.3}\n",
        node.sentiment_intensity
    ));
    out.push_str(&format!(
        "- **Emotion Label:** {}\n",
        or_na(node.emotion_label.as_deref())
    ));
    out.push_str(&format!("- **Emotion Intensity:** {:.3}\n", node.emotion_intensity));
    out.push_str(&format!("- **Total Emails:** {}\n", node.total_emails));
    out.push_str(&format!("- **Risk Emails:** {}\n", node.risk_emails));
    out.push_str(&format!("- **First Date:** {}\n", format_date(node.first_date.as_deref())));
    out.push_str(&format!("- **Last Date:** {}\n", format_date(node.last_date.as_deref())));
    out.push_str(&format!("- **Years Active:** {}\n\n", joined_or_na(&node.years)));

    out.push_str("## Network Metrics\n\n");
    out.push_str(&format!("- **Degree:** {}\n", node.degree));
    out.push_str(&format!("- **In-Degree:** {}\n", node.in_degree));
    out.push_str(&format!("- **Out-Degree:** {}\n", node.out_degree));
    out.push_str(&format!("- **Weighted Degree:** {:.2}\n", node.w_degree));
    out.push_str(&format!("- **Pagerank:** {:.2e}\n", node.pagerank));
    out.push_str(&format!(
        "- **Clustering Coefficient:** {:.3}\n",
        node.clustering_coef
    ));
    out.push_str(&format!("- **K-Core:** {}\n\n", node.kcore));

    out
}

/// Section listing a person's ranked emails.
pub fn email_section(person_id: &str, emails: &[EmailRecord]) -> String {
    if emails.is_empty() {
        return "## Emails\n\nNo emails found for this person.\n\n".to_string();
    }

    let mut out = format!("## Emails related to {}\n\n", person_id);
    for email in emails {
        out.push_str(&email_card(email));
    }
    out
}

/// One email rendered as a card.
pub fn email_card(email: &EmailRecord) -> String {
    let mut card = String::new();

    card.push_str(&format!(
        "### {}\n\n",
        email
            .subject
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("(No Subject)")
    ));
    card.push_str(&format!("- **Email ID:** {}\n", or_na(email.email_id.as_deref())));
    card.push_str(&format!("- **Risk label:** {}\n", or_na(email.risk_label.as_deref())));
    card.push_str(&format!("- **Risk score:** {}\n", format_score(email.final_score)));
    card.push_str(&format!(
        "- **Sentiment label:** {}\n",
        or_na(email.sentiment_label.as_deref())
    ));
    card.push_str(&format!(
        "- **Sentiment score:** {}\n",
        format_score(email.sentiment_score)
    ));
    card.push_str(&format!(
        "- **Emotion label:** {}\n",
        or_na(email.emotion_label.as_deref())
    ));
    card.push_str(&format!("- **Emotion score:** {}\n", format_score(email.emotion_score)));
    card.push_str(&format!("- **Date:** {}\n", format_date(email.dt_utc.as_deref())));
    card.push_str(&format!("- **Folder:** {}\n", mail_folder(email.path.as_deref())));
    card.push_str(&format!("- **From:** {}\n", address_list(email.from_norm.as_deref())));
    card.push_str(&format!("- **To:** {}\n", address_list(email.to_norm.as_deref())));
    card.push_str(&format!("- **CC:** {}\n", address_list(email.cc_norm.as_deref())));
    card.push_str(&format!("- **BCC:** {}\n\n", address_list(email.bcc_norm.as_deref())));

    let body = tidy_body(email.body_raw.as_deref());
    if !body.is_empty() {
        let fence = fence_for(&body);
        card.push_str(&format!("{}text\n{}\n{}\n\n", fence, body, fence));
    }
    card.push_str("---\n\n");

    card
}

/// Search results, one id per line with its aliases.
pub fn search_results(matches: &[&Node]) -> String {
    if matches.is_empty() {
        return "(No results)\n".to_string();
    }

    let mut out = String::new();
    for node in matches {
        if node.aliases.is_empty() {
            out.push_str(&format!("{}\n", node.id));
        } else {
            out.push_str(&format!("{}  ({})\n", node.id, node.aliases.join(", ")));
        }
    }
    out
}

/// Table of threads in the given order.
pub fn thread_table(threads: &[&Thread]) -> String {
    if threads.is_empty() {
        return "No thread data found.\n".to_string();
    }

    let mut out = String::new();
    out.push_str("| Thread | Dominant Emotion | Mean Risk | Mean Emotion | Emails |\n");
    out.push_str("|:---|:---|:---:|:---:|:---:|\n");
    for t in threads {
        out.push_str(&format!(
            "| {} | {} | {:.3} | {:.3} | {} |\n",
            t.id, t.dominant_emotion, t.mean_risk, t.mean_emotion_score, t.n_emails
        ));
    }
    out
}

/// Thread metadata and text. Either half may be missing.
pub fn thread_detail(id: &str, meta: Option<&Thread>, text: Option<&ThreadText>) -> String {
    let mut out = format!("# {}\n\n", id);

    match meta {
        None => out.push_str("No metadata found.\n\n"),
        Some(t) => {
            out.push_str(&format!("- **Risk Label:** {}\n", t.risk_label_zeroshot));
            out.push_str(&format!("- **Mean Risk:** {:.2}\n", t.mean_risk));
            out.push_str(&format!("- **Sentiment Label:** {}\n", t.dominant_sentiment));
            out.push_str(&format!("- **Mean Sentiment:** {:.2}\n", t.mean_sentiment_score));
            out.push_str(&format!("- **Emotion Label:** {}\n", t.dominant_emotion));
            out.push_str(&format!("- **Mean Emotion:** {:.2}\n", t.mean_emotion_score));
            out.push_str(&format!("- **Email Count:** {}\n", t.n_emails));
            let participants = if t.participants.is_empty() {
                "None".to_string()
            } else {
                t.participants.join(", ")
            };
            out.push_str(&format!("- **Participants:** {}\n\n", participants));
        }
    }

    match text {
        None => out.push_str("No text available for this thread.\n"),
        Some(t) => {
            out.push_str(&format!(
                "## {}\n\n",
                t.subject_norm
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .unwrap_or("(No Subject)")
            ));
            out.push_str(t.body_concat.as_deref().unwrap_or(""));
            out.push_str(&format!(
                "\n\n---\n\nTokens: {} | Has Text: {}\n",
                t.n_tokens, t.has_text
            ));
        }
    }

    out
}

/// Short plain-text summary shown when hovering a node.
pub fn node_hover_card(node: &Node) -> String {
    [
        node.id.clone(),
        format!(
            "Community: {}",
            node.community
                .map(|c| c.to_string())
                .unwrap_or_else(|| "N/A".to_string())
        ),
        format!("Risk Label: {}", node.risk_label.as_deref().unwrap_or("None")),
        format!("Risk Score: {:.3}", node.risk_intensity),
        format!("Sentiment Label: {}", or_na(node.sentiment_label.as_deref())),
        format!("Sentiment Score: {:.3}", node.sentiment_intensity),
        format!("Emotion Label: {}", or_na(node.emotion_label.as_deref())),
        format!("Emotion Score: {:.3}", node.emotion_intensity),
        format!("Total Emails: {}", node.total_emails),
        format!("Degree: {}", node.degree),
    ]
    .join("\n")
}

/// Short plain-text summary shown when hovering an edge.
pub fn edge_hover_card(edge: &Edge) -> String {
    [
        format!("Source: {}", edge.source),
        format!("Target: {}", edge.target),
        format!("Direction: {} -> {}", edge.source, edge.target),
        format!("Years in contact: {}", joined_or_na(&edge.years)),
        format!("Interaction Count: {}", edge.weight),
    ]
    .join("\n")
}
