use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScreenerError {
    #[error("No tickers were given to screen")]
    NoTickers,

    #[error("Metrics could not be computed for any of the {0} ticker(s)")]
    NoResults(usize),
}
