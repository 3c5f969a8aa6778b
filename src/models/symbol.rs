use crate::error::AnalysisError;

const QUOTE_ASSET: &str = "USDT";

/// Normalise a user-supplied pair: trim, uppercase, quote in USDT by default.
pub fn normalize_symbol(raw: &str) -> Result<String, AnalysisError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.len() < 3 || symbol.len() > 20 || !symbol.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(AnalysisError::InvalidSymbol(raw.to_string()));
    }

    if symbol.ends_with(QUOTE_ASSET) {
        Ok(symbol)
    } else {
        Ok(format!("{}{}", symbol, QUOTE_ASSET))
    }
}
