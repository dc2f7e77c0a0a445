// Link Content Fetcher
// Downloads pages and extracts readable text for the text pipeline

use crate::services::providers::ProviderError;
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;

const FETCH_TIMEOUT_SECS: u64 = 10;
const FETCH_USER_AGENT: &str = "SatyaCheck/0.1 content-verification";

/// Extracted page text below this length is not analyzable.
pub const MIN_CONTENT_CHARS: usize = 120;
/// Page text forwarded to the text pipeline is cut at this length.
pub const MAX_CONTENT_CHARS: usize = 6_000;

pub struct LinkFetcher {
    client: Client,
}

impl Default for LinkFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent(FETCH_USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch the page and strip it down to readable text. Length gating is
    /// the caller's concern; this only retrieves and cleans.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ProviderError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let html = response.text().await?;
        let text = extract_readable_text(&html);
        info!(
            "[LINK_FETCHER] fetched {} ({} bytes html, {} chars text)",
            url,
            html.len(),
            text.chars().count()
        );
        Ok(text)
    }
}

/// Strip scripts, styles and markup, decode common entities and collapse
/// whitespace into single spaces.
pub fn extract_readable_text(html: &str) -> String {
    let without_scripts = script_re().replace_all(html, " ");
    let without_styles = style_re().replace_all(&without_scripts, " ");
    let without_tags = tag_re().replace_all(&without_styles, " ");

    // `&amp;` last, so double-encoded entities decode one level only.
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    whitespace_re().replace_all(&decoded, " ").trim().to_string()
}

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("script regex"))
}

fn style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("style regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]+>").expect("tag regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_strips_markup() {
        let html = "<html><body><h1>Title</h1><p>First para.</p><p>Second para.</p></body></html>";
        assert_eq!(extract_readable_text(html), "Title First para. Second para.");
    }

    #[test]
    fn test_extract_drops_scripts_and_styles() {
        let html = concat!(
            "<head><style>body { color: red; }</style>",
            "<script>var tracking = 'evil';</script></head>",
            "<body>Visible text only.</body>"
        );
        assert_eq!(extract_readable_text(html), "Visible text only.");
    }

    #[test]
    fn test_extract_decodes_entities() {
        let html = "<p>Tom&nbsp;&amp;&nbsp;Jerry &quot;cartoon&quot;</p>";
        assert_eq!(extract_readable_text(html), "Tom & Jerry \"cartoon\"");
    }

    #[test]
    fn test_extract_decodes_double_encoding_one_level() {
        let html = "<p>use &amp;lt;b&amp;gt; for bold, &amp;amp; for ampersand</p>";
        assert_eq!(
            extract_readable_text(html),
            "use &lt;b&gt; for bold, &amp; for ampersand"
        );
    }

    #[test]
    fn test_extract_collapses_whitespace() {
        let html = "<div>\n  spread \n\n over\t lines  </div>";
        assert_eq!(extract_readable_text(html), "spread over lines");
    }

    #[test]
    fn test_extract_handles_multiline_script() {
        let html = "<script>\nfunction a() {\n  return 1;\n}\n</script><p>kept</p>";
        assert_eq!(extract_readable_text(html), "kept");
    }
}
