use regex::Regex;
use std::sync::LazyLock;

/// Ordered matching rules for per-share price phrasings seen in the news
/// feed. Order encodes priority: earlier rules describe more specific
/// phrasings, so their candidates win over the generic "per share" catch.
/// Each rule captures the raw amount in group 1; new phrasings are added
/// here without touching the extraction flow.
const PRICE_RULES: &[&str] = &[
    r"\$(\d*[.,]?\d*) per Common Share",
    r"price/share, EUR</td><td>(\d*[.,]?\d*)</td><td>",
    r"Keskihinta/ osake</td><td>(\d*[.,]?\d*)</td><td>",
    r"at an average price of NOK (\d*[.,]?\d*)",
    r"at an average price per share of NOK (\d*[.,]?\d*)",
    r"shares at NOK (\d*[.,]?\d*) pr share",
    r"(\d*[.,]?\d*) per share",
    r"[Pp]rice per share (\d*[.,]?\d*)",
];

static COMPILED_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    PRICE_RULES
        .iter()
        .map(|p| Regex::new(p).expect("price rule must compile"))
        .collect()
});

/// Scan unstructured article text for a per-share price.
///
/// Collects every capture across all rules (rule order, then text order),
/// then returns the first candidate that parses to a positive number.
/// Comma decimals are normalized to periods before parsing. Candidates
/// that fail to parse, or parse to zero or below, are dropped and the scan
/// continues; `None` means no rule produced a usable amount, which is a
/// normal outcome for most articles.
pub fn extract_price(text: &str) -> Option<f64> {
    let haystack = text.replace('\n', " ");

    COMPILED_RULES
        .iter()
        .flat_map(|rule| {
            rule.captures_iter(&haystack)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
                .collect::<Vec<_>>()
        })
        .filter_map(|raw| parse_candidate(&raw))
        .next()
}

/// Parse one raw capture, discarding anything that is not a positive
/// number. Invalid candidates never abort extraction.
fn parse_candidate(raw: &str) -> Option<f64> {
    let normalized = raw.replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value > 0.0 => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_currency_text_returns_none() {
        assert_eq!(extract_price("The board met on Tuesday."), None);
        assert_eq!(extract_price(""), None);
    }

    #[test]
    fn dollar_per_common_share() {
        let text = "offer to acquire all shares at $12.50 per Common Share in cash";
        assert_eq!(extract_price(text), Some(12.50));
    }

    #[test]
    fn comma_decimal_is_normalized() {
        let text = "repurchased 1000 shares at 12,50 per share today";
        assert_eq!(extract_price(text), Some(12.50));
    }

    #[test]
    fn eur_table_cell_phrasing() {
        let text = "price/share, EUR</td><td>3,41</td><td>total</td>";
        assert_eq!(extract_price(text), Some(3.41));
    }

    #[test]
    fn average_price_nok() {
        let text = "bought back shares at an average price of NOK 104.25 during the period";
        assert_eq!(extract_price(text), Some(104.25));
    }

    #[test]
    fn rule_order_decides_between_phrasings() {
        // The generic "per share" rule also matches, but the Common Share
        // rule comes first in the table and wins.
        let text = "at $9.10 per Common Share, equal to 8.75 per share after fees";
        assert_eq!(extract_price(text), Some(9.10));
    }

    #[test]
    fn text_order_decides_within_one_rule() {
        let text = "first tranche 5.00 per share and second tranche 6.00 per share";
        assert_eq!(extract_price(text), Some(5.00));
    }

    #[test]
    fn invalid_candidates_are_skipped_not_fatal() {
        // "." captures from the sloppy amount pattern parse to nothing;
        // the later valid amount must still be found.
        let text = "priced at . per share, later corrected to 7.25 per share";
        assert_eq!(extract_price(text), Some(7.25));
    }

    #[test]
    fn zero_price_is_discarded() {
        let text = "a nominal 0 per share distribution, plus 2.40 per share in cash";
        assert_eq!(extract_price(text), Some(2.40));
    }

    #[test]
    fn newlines_do_not_break_matches() {
        let text = "at an average price\nof NOK 55,1";
        assert_eq!(extract_price(text), Some(55.1));
    }
}
