// =============================================================================
// Prompt Templates — strategy commentary and share-post summary
// =============================================================================
//
// Placeholders use `{name}` syntax and are filled by plain substitution, so a
// literal brace in a symbol or strategy text is passed through unchanged.

use crate::advisor::summary::IndicatorSummary;
use crate::types::PromptLanguage;

const STRATEGY_TEMPLATE_JA: &str = "\
あなたはプロのテクニカルトレーダーです。
以下のテクニカル指標に基づいて、{symbol} の今後1週間の戦略を生成してください：
・最新の指標データに基づいています
・ロングとショートの両戦略をそれぞれ提示してください

- MACD: {macd}
- RSI: {rsi}
- SMA: {sma}
- ボリンジャーバンド: {bb}
- ストキャスティクス: {stoch}

【出力フォーマット】
1. 現在のトレンド分析
2. 勝率の高いエントリータイミング
3. 利確と損切り目安
4. 注意点とアドバイス
";

const STRATEGY_TEMPLATE_EN: &str = "\
You are a professional technical trader.
Based on the technical indicators below, write a one-week trading strategy for {symbol}:
- The figures are the most recent indicator values
- Present both a long plan and a short plan

- MACD: {macd}
- RSI: {rsi}
- SMA: {sma}
- Bollinger Bands: {bb}
- Stochastics: {stoch}

[Output format]
1. Current trend analysis
2. High-probability entry timing
3. Take-profit and stop-loss levels
4. Cautions and advice
";

const SHARE_TEMPLATE_JA: &str = "\
以下のトレード戦略を、SNSに投稿できるよう120文字以内の日本語で要約してください。
ハッシュタグは含めないでください。

{strategy}
";

const SHARE_TEMPLATE_EN: &str = "\
Summarise the trading strategy below into a social-media post of at most 240 characters.
Do not include hashtags.

{strategy}
";

/// Substitute each `{key}` in `template` with its value.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    })
}

/// Strategy prompt for `symbol` built from the indicator summary.
pub fn strategy_prompt(symbol: &str, summary: &IndicatorSummary, lang: PromptLanguage) -> String {
    let template = match lang {
        PromptLanguage::Japanese => STRATEGY_TEMPLATE_JA,
        PromptLanguage::English => STRATEGY_TEMPLATE_EN,
    };
    // `symbol` goes last so text inside it is never re-scanned for placeholders.
    fill(
        template,
        &[
            ("macd", summary.macd.as_str()),
            ("rsi", summary.rsi.as_str()),
            ("sma", summary.sma.as_str()),
            ("bb", summary.bb.as_str()),
            ("stoch", summary.stoch.as_str()),
            ("symbol", symbol),
        ],
    )
}

/// Prompt asking for a short shareable summary of a generated strategy.
pub fn share_prompt(strategy: &str, lang: PromptLanguage) -> String {
    let template = match lang {
        PromptLanguage::Japanese => SHARE_TEMPLATE_JA,
        PromptLanguage::English => SHARE_TEMPLATE_EN,
    };
    fill(template, &[("strategy", strategy)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> IndicatorSummary {
        IndicatorSummary {
            macd: "MACD: 1.00, Signal: 0.50".into(),
            rsi: "RSI14は55.0".into(),
            sma: "SMA5(10.00) vs SMA20(9.00)".into(),
            bb: "価格(10.00)はBB範囲 8.00〜12.00".into(),
            stoch: "%K: 70.0, %D: 65.0".into(),
        }
    }

    #[test]
    fn japanese_strategy_prompt_has_every_indicator() {
        let p = strategy_prompt("日経225", &summary(), PromptLanguage::Japanese);
        assert!(p.contains("日経225 の今後1週間の戦略"));
        assert!(p.contains("- MACD: MACD: 1.00, Signal: 0.50"));
        assert!(p.contains("- RSI: RSI14は55.0"));
        assert!(p.contains("- ボリンジャーバンド: 価格(10.00)はBB範囲 8.00〜12.00"));
        assert!(p.contains("- ストキャスティクス: %K: 70.0, %D: 65.0"));
        assert!(!p.contains('{'));
    }

    #[test]
    fn english_strategy_prompt() {
        let p = strategy_prompt("S&P500", &summary(), PromptLanguage::English);
        assert!(p.contains("strategy for S&P500:"));
        assert!(p.contains("- SMA: SMA5(10.00) vs SMA20(9.00)"));
    }

    #[test]
    fn braces_in_symbol_are_literal() {
        let p = strategy_prompt("{macd}", &summary(), PromptLanguage::English);
        assert!(p.contains("strategy for {macd}:"));
    }

    #[test]
    fn share_prompt_embeds_strategy() {
        let p = share_prompt("ロング優勢", PromptLanguage::Japanese);
        assert!(p.ends_with("ロング優勢\n"));
        assert!(p.contains("120文字以内"));
    }
}
