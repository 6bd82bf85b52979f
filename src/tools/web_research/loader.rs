use anyhow::Result;
use encoding_rs::{Encoding, UTF_8};
use futures::future::join_all;
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Text extracted from one web page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub page_content: String,
    pub source: String,
}

/// Fetches pages and reduces them to readable text.
pub struct WebPageLoader {
    client: Client,
}

impl WebPageLoader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Load every URL concurrently. Pages that fail to load are skipped.
    pub async fn load(&self, urls: &[String]) -> Vec<Document> {
        let results = join_all(urls.iter().map(|url| self.load_one(url))).await;

        results
            .into_iter()
            .zip(urls)
            .filter_map(|(result, url)| match result {
                Ok(doc) => Some(doc),
                Err(e) => {
                    warn!("Skipping {}: {:#}", url, e);
                    None
                }
            })
            .collect()
    }

    async fn load_one(&self, url: &str) -> Result<Document> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type);
        let bytes = response.bytes().await?;
        let html = decode_body(&bytes, charset.as_deref());
        let page_content = html_to_text(&html);
        debug!("Loaded {} ({} chars)", url, page_content.chars().count());

        Ok(Document {
            page_content,
            source: url.to_string(),
        })
    }
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        key.eq_ignore_ascii_case("charset")
            .then(|| value.trim_matches('"').to_string())
    })
}

/// Decode a body with the declared charset, defaulting to UTF-8.
pub fn decode_body(bytes: &[u8], charset: Option<&str>) -> String {
    let encoding = charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

struct HtmlPatterns {
    invisible: Vec<Regex>,
    block: Regex,
    tag: Regex,
    spaces: Regex,
}

fn patterns() -> &'static HtmlPatterns {
    static PATTERNS: OnceLock<HtmlPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| HtmlPatterns {
        invisible: [
            r"(?is)<!--.*?-->",
            r"(?is)<script\b[^>]*>.*?</script\s*>",
            r"(?is)<style\b[^>]*>.*?</style\s*>",
            r"(?is)<noscript\b[^>]*>.*?</noscript\s*>",
            r"(?is)<svg\b[^>]*>.*?</svg\s*>",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("invisible element regex"))
        .collect(),
        block: Regex::new(
            r"(?i)</?(?:p|div|br|li|ul|ol|h[1-6]|tr|table|section|article|header|footer|nav|title|blockquote|pre)\b[^>]*>",
        )
        .expect("block tag regex"),
        tag: Regex::new(r"<[^>]+>").expect("tag regex"),
        spaces: Regex::new(r"[ \t\r\x0C\u{a0}]+").expect("whitespace regex"),
    })
}

/// Strip markup from an HTML page, keeping one line per block element.
pub fn html_to_text(html: &str) -> String {
    let patterns = patterns();

    let mut text = html.to_string();
    for pattern in &patterns.invisible {
        text = pattern.replace_all(&text, " ").into_owned();
    }
    let text = patterns.block.replace_all(&text, "\n");
    let text = patterns.tag.replace_all(&text, " ");
    let text = decode_entities(&text);

    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = patterns.spaces.replace_all(line, " ").trim().to_string();
        if line.is_empty() {
            // At most one blank line between paragraphs.
            if lines.last().is_some_and(|l| !l.is_empty()) {
                lines.push(line);
            }
        } else {
            lines.push(line);
        }
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
