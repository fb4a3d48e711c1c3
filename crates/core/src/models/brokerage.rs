use serde::{Deserialize, Serialize};

/// An open brokerage position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokeragePosition {
    pub symbol: String,
    pub qty: f64,
    pub market_value: f64,
    pub current_price: f64,
    pub change_today: f64,
    pub unrealized_pl: f64,
    pub unrealized_plpc: f64,
    pub asset_class: String,
}

/// Brokerage account summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerageAccount {
    pub id: String,
    pub equity: f64,
    pub cash: f64,
    pub buying_power: f64,
    pub portfolio_value: f64,
}
