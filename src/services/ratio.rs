use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioDecision {
    pub ratio: f64,
    pub qualifies: bool,
}

/// Compare the current market price against the price referenced in the
/// news. Pure: the caller decides what to do with the decision.
///
/// A missing reference price must be handled by the caller as "cannot
/// evaluate"; passing zero (or below) here is `DivisionUndefined`, never
/// a ratio of zero.
pub fn evaluate(
    price_at_news: f64,
    price_now: f64,
    threshold: f64,
) -> Result<RatioDecision, AppError> {
    if price_at_news <= 0.0 {
        return Err(AppError::DivisionUndefined);
    }

    let ratio = price_now / price_at_news;
    Ok(RatioDecision {
        ratio,
        qualifies: ratio > threshold,
    })
}
