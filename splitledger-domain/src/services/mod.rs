pub mod balance_engine;
pub mod settlement_minimizer;

pub use balance_engine::BalanceEngine;
pub use settlement_minimizer::SettlementMinimizer;
