//! PlayHandler - Command handler for one coin-flip round.
//!
//! Flow:
//! 1. Check the bet against the configured bounds
//! 2. Check the bet against the player's balance
//! 3. Ask the engine for the accounting outcome
//! 4. Pick the coin face to show
//! 5. Settle the balance on the ledger
//! 6. Commit the outcome to the engine
//!
//! Steps 2 through 6 run under a per-entity turn, so two rounds for the
//! same player can never settle the same engine decision twice.
//!
//! Nothing is consumed before step 5 succeeds: the engine's next outcome
//! is stable until committed, so a failed ledger write leaves the cycle
//! exactly as it was. If step 6 fails to record the round, the
//! settlement is reversed before the error is returned.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::random::ThreadRandom;
use crate::application::engine::OutcomeEngine;
use crate::application::round_locks::RoundLocks;
use crate::config::GameConfig;
use crate::domain::cycle::{CommitError, Outcome};
use crate::domain::foundation::{DomainError, EntityId, ErrorCode};
use crate::domain::play::{self, CoinFace};
use crate::ports::{Balance, Ledger, RandomSource};

/// Command to play one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayCommand {
    /// Player making the bet.
    pub entity_id: EntityId,
    /// Face the player picked.
    pub face: CoinFace,
    /// Stake in minor currency units.
    pub amount: i64,
}

/// Result of a settled round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayResult {
    /// Accounting outcome; the balance change follows this.
    pub outcome: Outcome,
    /// Face shown to the player.
    pub coin: CoinFace,
    /// False when `coin` disagrees with `outcome`.
    pub presentation_consistent: bool,
    /// Balance after settlement.
    pub balance: Balance,
}

/// Error type for play rounds.
#[derive(Debug, Error)]
pub enum PlayError {
    #[error("Bet {amount} outside allowed range {min}..={max}")]
    BetOutOfRange { amount: i64, min: i64, max: i64 },

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Bet {amount} exceeds available balance {available}")]
    BetExceedsBalance { amount: i64, available: i64 },

    #[error(transparent)]
    Ledger(#[from] DomainError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error("Round was discarded by a cycle reset")]
    RoundDiscarded,
}

impl PlayError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PlayError::BetOutOfRange { .. } => ErrorCode::ValidationFailed,
            PlayError::InsufficientBalance | PlayError::BetExceedsBalance { .. } => {
                ErrorCode::InsufficientBalance
            }
            PlayError::Ledger(err) => err.code,
            PlayError::Commit(err) => err.code(),
            PlayError::RoundDiscarded => ErrorCode::InternalError,
        }
    }
}

/// Handler for play rounds.
pub struct PlayHandler {
    engine: Arc<OutcomeEngine>,
    ledger: Arc<dyn Ledger>,
    random: Arc<dyn RandomSource>,
    game: GameConfig,
    rounds: RoundLocks,
    presentation_mismatches: AtomicU64,
}

impl PlayHandler {
    pub fn new(engine: Arc<OutcomeEngine>, ledger: Arc<dyn Ledger>, game: GameConfig) -> Self {
        Self {
            engine,
            ledger,
            random: Arc::new(ThreadRandom::new()),
            game,
            rounds: RoundLocks::new(),
            presentation_mismatches: AtomicU64::new(0),
        }
    }

    /// Replaces the random source used for presentation draws.
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Rounds whose coin disagreed with the accounting outcome.
    pub fn presentation_mismatches(&self) -> u64 {
        self.presentation_mismatches.load(Ordering::Relaxed)
    }

    /// Players with a round running or waiting for their turn.
    pub fn rounds_in_flight(&self) -> usize {
        self.rounds.in_flight()
    }

    pub async fn handle(&self, cmd: PlayCommand) -> Result<PlayResult, PlayError> {
        // 1. Bet bounds
        if !self.game.accepts_bet(cmd.amount) {
            return Err(PlayError::BetOutOfRange {
                amount: cmd.amount,
                min: self.game.min_bet,
                max: self.game.max_bet,
            });
        }

        let _turn = self.rounds.acquire(&cmd.entity_id).await;

        // 2. Affordability
        let available = self.ledger.balance(&cmd.entity_id).await?.total();
        if available <= 0 {
            return Err(PlayError::InsufficientBalance);
        }
        if cmd.amount > available {
            return Err(PlayError::BetExceedsBalance {
                amount: cmd.amount,
                available,
            });
        }

        // 3. Accounting outcome
        let outcome = self.engine.next_outcome(&cmd.entity_id);

        // 4. Presentation
        let rate = self.game.presentation_mismatch_rate;
        let cosmetic_flip = rate > 0.0 && self.random.unit() < rate;
        let shown = play::present(cmd.face, outcome, cosmetic_flip);
        if !shown.consistent {
            self.presentation_mismatches.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                entity_id = %cmd.entity_id,
                outcome = %outcome,
                coin = %shown.coin,
                "Coin shown disagrees with accounting outcome"
            );
        }

        // 5. Settlement
        let delta = play::settlement(outcome, cmd.amount);
        let balance = self.ledger.apply(&cmd.entity_id, delta).await?;

        // 6. Commit
        let committed = match self.engine.commit_outcome(&cmd.entity_id, outcome) {
            Ok(receipt) if receipt.was_reset => Err(PlayError::RoundDiscarded),
            Ok(_) => Ok(()),
            Err(err) => Err(err.into()),
        };
        if let Err(err) = committed {
            tracing::error!(
                entity_id = %cmd.entity_id,
                outcome = %outcome,
                error = %err,
                "Round settled on the ledger but not recorded in the cycle"
            );
            self.reverse_settlement(&cmd.entity_id, delta).await;
            return Err(err);
        }

        tracing::debug!(
            entity_id = %cmd.entity_id,
            outcome = %outcome,
            amount = cmd.amount,
            current_balance = balance.current_balance,
            "Round settled"
        );

        Ok(PlayResult {
            outcome,
            coin: shown.coin,
            presentation_consistent: shown.consistent,
            balance,
        })
    }

    async fn reverse_settlement(&self, entity_id: &EntityId, delta: i64) {
        match self.ledger.apply(entity_id, -delta).await {
            Ok(balance) => tracing::warn!(
                entity_id = %entity_id,
                delta = -delta,
                current_balance = balance.current_balance,
                "Settlement reversed"
            ),
            Err(err) => tracing::error!(
                entity_id = %entity_id,
                delta = -delta,
                error = %err,
                "Settlement reversal failed, ledger needs reconciliation"
            ),
        }
    }
}
