//! Coin presentation for play rounds.
//!
//! A round is settled by the accounting outcome alone. The coin face the
//! player sees is derived from it: the chosen face on a win, the other
//! face on a loss. An optional cosmetic flip may show the wrong face; the
//! settlement does not change when it does.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::cycle::Outcome;
use crate::domain::foundation::ValidationError;

/// Coin face chosen by the player or shown after a flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinFace {
    Head,
    Tail,
}

impl CoinFace {
    pub fn opposite(&self) -> Self {
        match self {
            CoinFace::Head => CoinFace::Tail,
            CoinFace::Tail => CoinFace::Head,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoinFace::Head => "head",
            CoinFace::Tail => "tail",
        }
    }
}

impl fmt::Display for CoinFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CoinFace {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "head" => Ok(CoinFace::Head),
            "tail" => Ok(CoinFace::Tail),
            other => Err(ValidationError::invalid_format(
                "face",
                format!("expected 'head' or 'tail', got '{}'", other),
            )),
        }
    }
}

/// The face shown for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub coin: CoinFace,
    /// False when the coin disagrees with the accounting outcome.
    pub consistent: bool,
}

/// Picks the face to show for `outcome` given the player's `chosen` face.
pub fn present(chosen: CoinFace, outcome: Outcome, cosmetic_flip: bool) -> Presentation {
    let truthful = if outcome.is_win() {
        chosen
    } else {
        chosen.opposite()
    };

    if cosmetic_flip {
        Presentation {
            coin: truthful.opposite(),
            consistent: false,
        }
    } else {
        Presentation {
            coin: truthful,
            consistent: true,
        }
    }
}

/// Signed balance change for a settled round.
pub fn settlement(outcome: Outcome, amount: i64) -> i64 {
    if outcome.is_win() {
        amount
    } else {
        -amount
    }
}
