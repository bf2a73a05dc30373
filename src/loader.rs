use anyhow::Context;
use core_types::{Bar, PriceSeries};
use std::path::{Path, PathBuf};

/// Reads a JSON array of OHLCV bars.
pub fn load_bars(path: &Path) -> anyhow::Result<Vec<Bar>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read bar file {}", path.display()))?;
    let bars: Vec<Bar> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse bar file {}", path.display()))?;
    tracing::debug!(path = %path.display(), bars = bars.len(), "Loaded bars");
    Ok(bars)
}

/// Closing prices of a bar file.
pub fn load_prices(path: &Path) -> anyhow::Result<PriceSeries> {
    let bars = load_bars(path)?;
    PriceSeries::from_bars(&bars)
        .with_context(|| format!("Invalid price data in {}", path.display()))
}

/// Loads every `(name, file)` pair, keeping the given order.
pub fn load_universe(assets: &[(String, PathBuf)]) -> anyhow::Result<Vec<(String, PriceSeries)>> {
    assets
        .iter()
        .map(|(name, path)| Ok((name.clone(), load_prices(path)?)))
        .collect()
}

/// Parses a `NAME=FILE` command-line argument.
pub fn parse_asset(arg: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = parse_key_value(arg)?;
    Ok((name, PathBuf::from(path)))
}

/// Parses a `KEY=VALUE` command-line argument.
pub fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{arg}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_capitalised_and_lower_case_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"date":"2024-01-02","open":1,"high":2,"low":0.5,"close":1.5,"volume":10}},
                {{"Date":"2024-01-03","Open":1.5,"High":2.5,"Low":1,"Close":2}}
            ]"#
        )
        .unwrap();

        let prices = load_prices(file.path()).unwrap();
        assert_eq!(prices.values(), &[1.5, 2.0]);
        assert_eq!(load_bars(file.path()).unwrap()[1].volume, 0.0);
    }

    #[test]
    fn rejects_unordered_bars() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"date":"2024-01-03","open":1,"high":1,"low":1,"close":1}},
                {{"date":"2024-01-02","open":1,"high":1,"low":1,"close":1}}]"#
        )
        .unwrap();
        assert!(load_prices(file.path()).is_err());
    }

    #[test]
    fn parses_asset_arguments() {
        assert_eq!(
            parse_asset("SPY=data/spy.json").unwrap(),
            ("SPY".to_string(), PathBuf::from("data/spy.json"))
        );
        assert!(parse_asset("SPY").is_err());
        assert!(parse_asset("=x.json").is_err());
    }
}
