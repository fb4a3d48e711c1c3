pub mod feed_service;
pub mod market_service;
pub mod portfolio_service;
pub mod transaction_service;
pub mod user_service;
pub mod wallet_service;
