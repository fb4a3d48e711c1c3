pub mod registry;
pub mod traits;

// Provider implementations
pub mod alpaca;
pub mod coingecko;
pub mod mock_market;
