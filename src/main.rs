//! Soak simulation for the outcome-cycle engine.
//!
//! Opens an in-memory account per simulated player, plays rounds through
//! the play handler concurrently with the background sweeper running, and
//! prints the totals as JSON. Ctrl-C stops the run early.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

use outcome_cycle::adapters::{
    CountingEventSink, EventCounts, FanoutEventSink, InMemoryLedger, TracingEventSink,
};
use outcome_cycle::application::{
    EngineStats, EvictionSweeper, OutcomeEngine, PlayCommand, PlayError, PlayHandler,
};
use outcome_cycle::config::{AppConfig, SimulationConfig, TelemetryConfig};
use outcome_cycle::domain::foundation::EntityId;
use outcome_cycle::domain::play::CoinFace;
use outcome_cycle::ports::Balance;

#[derive(Debug, Default, Clone, Copy, Serialize)]
struct PlayerTotals {
    rounds: u64,
    wins: u64,
    losses: u64,
    busted: u64,
    errors: u64,
}

impl PlayerTotals {
    fn merge(&mut self, other: PlayerTotals) {
        self.rounds += other.rounds;
        self.wins += other.wins;
        self.losses += other.losses;
        self.busted += other.busted;
        self.errors += other.errors;
    }
}

#[derive(Debug, Serialize)]
struct Report {
    interrupted: bool,
    totals: PlayerTotals,
    events: EventCounts,
    presentation_mismatches: u64,
    ledger_holdings: i64,
    engine: EngineStats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.telemetry);

    let cycle_events = Arc::new(CountingEventSink::new());
    let sink = FanoutEventSink::new()
        .with(Arc::new(TracingEventSink::new()))
        .with(cycle_events.clone());
    let engine = Arc::new(OutcomeEngine::from_config(&config)?.with_event_sink(Arc::new(sink)));
    let ledger = Arc::new(InMemoryLedger::new());
    let handler = Arc::new(PlayHandler::new(
        engine.clone(),
        ledger.clone(),
        config.game.clone(),
    ));

    tracing::info!(
        entities = config.simulation.entities,
        rounds_per_entity = config.simulation.rounds_per_entity,
        cycle_length = config.cycle.length,
        target_wins = config.cycle.target_wins,
        "Starting soak simulation"
    );

    let sweeper = EvictionSweeper::new(engine.clone()).spawn();
    let (stop, stop_signal) = watch::channel(false);

    let mut players = JoinSet::new();
    for n in 0..config.simulation.entities {
        let entity_id = EntityId::new(format!("player-{:05}", n))?;
        ledger
            .open_account(
                entity_id.clone(),
                Balance::new(0, config.simulation.starting_balance),
            )
            .await;
        players.spawn(play_rounds(
            handler.clone(),
            entity_id,
            config.simulation.clone(),
            stop_signal.clone(),
        ));
    }

    let mut totals = PlayerTotals::default();
    let mut interrupted = false;
    loop {
        tokio::select! {
            joined = players.join_next() => match joined {
                Some(Ok(player)) => totals.merge(player),
                Some(Err(err)) => tracing::error!(error = %err, "Player task failed"),
                None => break,
            },
            _ = tokio::signal::ctrl_c(), if !interrupted => {
                tracing::info!("Shutdown signal received, stopping players");
                interrupted = true;
                let _ = stop.send(true);
            }
        }
    }

    let sweeps = sweeper.shutdown().await?;
    tracing::info!(sweeps, "Soak simulation finished");

    let report = Report {
        interrupted,
        totals,
        events: cycle_events.counts(),
        presentation_mismatches: handler.presentation_mismatches(),
        ledger_holdings: ledger.total_holdings().await,
        engine: engine.system_stats(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

async fn play_rounds(
    handler: Arc<PlayHandler>,
    entity_id: EntityId,
    simulation: SimulationConfig,
    stop: watch::Receiver<bool>,
) -> PlayerTotals {
    let mut totals = PlayerTotals::default();

    for round in 0..simulation.rounds_per_entity {
        if *stop.borrow() {
            break;
        }

        let face = if round % 2 == 0 {
            CoinFace::Head
        } else {
            CoinFace::Tail
        };
        let cmd = PlayCommand {
            entity_id: entity_id.clone(),
            face,
            amount: simulation.bet,
        };

        match handler.handle(cmd).await {
            Ok(result) => {
                totals.rounds += 1;
                if result.outcome.is_win() {
                    totals.wins += 1;
                } else {
                    totals.losses += 1;
                }
            }
            Err(PlayError::InsufficientBalance | PlayError::BetExceedsBalance { .. }) => {
                totals.busted += 1;
                break;
            }
            Err(err) => {
                tracing::warn!(entity_id = %entity_id, error = %err, "Round failed");
                totals.errors += 1;
            }
        }

        tokio::task::yield_now().await;
    }

    totals
}

fn init_tracing(telemetry: &TelemetryConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&telemetry.log_level));
    if telemetry.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
