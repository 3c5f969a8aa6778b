//! External data collaborators.

pub mod market_data;

pub use market_data::{
    BinanceMarketDataProvider, CandleFeed, CoinsFeed, MarketDataProvider, MockMarketDataProvider,
    Provenance,
};
