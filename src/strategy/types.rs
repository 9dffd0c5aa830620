//! Signal types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading direction requested by a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
            Action::Hold => "hold",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trading signal for one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Requested direction
    pub action: Action,
    /// Requested quantity, if the strategy sizes its signals
    pub amount: Option<Decimal>,
}

impl Signal {
    pub fn buy(amount: Decimal) -> Self {
        Self {
            action: Action::Buy,
            amount: Some(amount),
        }
    }

    pub fn sell(amount: Decimal) -> Self {
        Self {
            action: Action::Sell,
            amount: Some(amount),
        }
    }

    pub fn hold() -> Self {
        Self {
            action: Action::Hold,
            amount: None,
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::hold()
    }
}
