// =============================================================================
// Share Link — social-post intent URL for a strategy summary
// =============================================================================

use anyhow::{Context, Result};

/// Appended to every strategy shown to a user.
pub const DISCLAIMER_JA: &str = "※本戦略はAIによるテクニカル分析結果に基づいて生成されたものであり、投資判断の最終決定はご自身の責任で行ってください。本サービスは投資助言ではありません。";

pub const DISCLAIMER_EN: &str = "This strategy was generated by AI from technical indicators only. All investment decisions are your own responsibility. This service is not investment advice.";

/// Post text: summary on the first line, hashtags on the second.
pub fn share_text(summary: &str, hashtags: &str) -> String {
    let summary = summary.trim();
    let hashtags = hashtags.trim();
    if hashtags.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}\n{hashtags}")
    }
}

/// Build `{intent_url}?text=<encoded text>`.
pub fn share_url(intent_url: &str, summary: &str, hashtags: &str) -> Result<reqwest::Url> {
    let text = share_text(summary, hashtags);
    reqwest::Url::parse_with_params(intent_url, &[("text", text.as_str())])
        .with_context(|| format!("invalid share intent URL {intent_url}"))
}
