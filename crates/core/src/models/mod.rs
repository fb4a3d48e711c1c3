pub mod brokerage;
pub mod market;
pub mod portfolio;
pub mod settings;
pub mod transaction;
pub mod user;
pub mod wallet;
pub mod watchlist;
