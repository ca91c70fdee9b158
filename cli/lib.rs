use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ignition_curve::{
    BondingCurve, CurveConstants, Lamports, Market, MarketState, Price,
    Shares, Side, SolverConfig,
    math::fixed_point::Rounding,
    settlement::preview_payout,
};
use serde_json::json;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _};

#[derive(Clone, Debug, Subcommand)]
#[command(arg_required_else_help(true))]
pub enum Command {
    /// Spot price of the next share at a raw supply
    SpotPrice {
        /// Shares minted so far
        supply: f64,
    },
    /// Curve cost of moving supply between two points
    Cost {
        #[arg(long)]
        from: f64,
        #[arg(long)]
        to: f64,
    },
    /// Preview a trade against a supply snapshot.
    /// Buys take an amount in SOL, sells a number of shares.
    Trade {
        #[arg(value_enum)]
        side: Side,
        amount: f64,
        /// Shares minted before the trade
        #[arg(default_value_t = 0.0, long)]
        supply: f64,
        /// Minimum shares out (buy) or SOL back (sell)
        #[arg(long)]
        min_out: Option<f64>,
    },
    /// Supply at which the spot price reaches a target
    SupplyForPrice {
        /// Target price in SOL per share
        price: f64,
    },
    /// Ignition stage and progress of a raw supply
    Classify {
        supply: f64,
    },
    /// Run sequential buys on a fresh market
    Simulate {
        /// Buy amounts in SOL, in order
        #[arg(required = true)]
        amounts: Vec<f64>,
        #[arg(default_value_t = 2, long)]
        outcomes: usize,
        /// Outcome every buy goes to
        #[arg(default_value_t = 0, long)]
        outcome: usize,
    },
    /// Preview a winning position's payout at resolution
    Payout {
        /// Vault balance in SOL
        #[arg(long)]
        vault: f64,
        /// Shares minted on the winning outcome
        #[arg(long)]
        winning_supply: f64,
        /// Shares held
        #[arg(long)]
        shares: f64,
        /// SOL invested in those shares
        #[arg(long)]
        invested: f64,
    },
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// JSON file overriding any subset of the curve constants
    #[arg(long)]
    pub constants: Option<PathBuf>,
    /// Share search iteration cap
    #[arg(long)]
    pub max_iterations: Option<u32>,
    /// Share search tolerance, in shares
    #[arg(long)]
    pub tolerance: Option<f64>,
    /// Rounding applied to SOL inputs
    #[arg(default_value_t = Rounding::Down, long, value_enum)]
    pub rounding: Rounding,
    #[arg(short, long, help = "Log curve evaluation to stderr")]
    pub verbose: bool,
}

impl Cli {
    fn curve(&self) -> anyhow::Result<BondingCurve> {
        let constants = match &self.constants {
            Some(path) => {
                let raw = std::fs::read_to_string(path).with_context(|| {
                    format!("failed to read {}", path.display())
                })?;
                serde_json::from_str(&raw).with_context(|| {
                    format!("failed to parse {}", path.display())
                })?
            }
            None => CurveConstants::default(),
        };
        let mut solver = SolverConfig::default();
        if let Some(max_iterations) = self.max_iterations {
            solver.max_iterations = max_iterations;
        }
        if let Some(tolerance) = self.tolerance {
            solver.tolerance = Shares::from_f64(tolerance)?;
        }
        Ok(BondingCurve::new(constants)?.with_solver(solver))
    }

    fn sol(&self, sol: f64) -> anyhow::Result<Lamports> {
        Ok(Lamports::from_sol(sol, self.rounding)?)
    }
}

/// Handle a command, returning CLI output
fn handle_command(cli: &Cli, curve: &BondingCurve) -> anyhow::Result<String> {
    let output = match &cli.command {
        Command::SpotPrice { supply } => {
            let supply = Shares::from_f64(*supply)?;
            let effective = curve.constants().effective_supply(supply);
            let price = curve.spot_price(supply);
            json!({
                "supply": supply.to_string(),
                "price": price.to_string(),
                "price_sol": price.to_sol(),
                "phase": curve.phase_of(effective),
            })
        }
        Command::Cost { from, to } => {
            let cost = curve.cost(Shares::from_f64(*from)?, Shares::from_f64(*to)?);
            json!({ "cost": cost, "cost_sol": cost.to_sol() })
        }
        Command::Trade {
            side,
            amount,
            supply,
            min_out,
        } => {
            let state = MarketState::new(Shares::from_f64(*supply)?);
            let result = match side {
                Side::Buy => {
                    let result = curve.simulate_buy(cli.sol(*amount)?, &state)?;
                    if let Some(min_out) = min_out {
                        result.ensure_min_shares(Shares::from_f64(*min_out)?)?;
                    }
                    result
                }
                Side::Sell => {
                    let result =
                        curve.simulate_sell(Shares::from_f64(*amount)?, &state)?;
                    if let Some(min_out) = min_out {
                        result.ensure_min_proceeds(cli.sol(*min_out)?)?;
                    }
                    result
                }
            };
            serde_json::to_value(result)?
        }
        Command::SupplyForPrice { price } => {
            let supply = curve.supply_for_price(Price::from_sol(*price)?);
            json!({
                "supply": supply.to_string(),
                "supply_shares": supply.to_f64(),
            })
        }
        Command::Classify { supply } => {
            let supply = Shares::from_f64(*supply)?;
            json!({
                "stage": curve.classify(supply),
                "progress": curve.ignition_progress(supply),
            })
        }
        Command::Simulate {
            amounts,
            outcomes,
            outcome,
        } => {
            let market = Market::new(*curve, *outcomes)?;
            let trades = amounts
                .iter()
                .map(|amount| {
                    let result =
                        market.buy(*outcome, cli.sol(*amount)?, Shares::ZERO)?;
                    Ok(serde_json::to_value(result)?)
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            json!({
                "trades": trades,
                "states": serde_json::to_value(market.states())?,
                "implied_probabilities": market.implied_probabilities(),
                "vault": market.vault_balance(),
            })
        }
        Command::Payout {
            vault,
            winning_supply,
            shares,
            invested,
        } => {
            let preview = preview_payout(
                &curve.constants().fees,
                cli.sol(*vault)?,
                Shares::from_f64(*winning_supply)?,
                Shares::from_f64(*shares)?,
                cli.sol(*invested)?,
            )?;
            serde_json::to_value(preview)?
        }
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn set_tracing_subscriber() -> anyhow::Result<()> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()))
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

impl Cli {
    pub fn run(self) -> anyhow::Result<String> {
        if self.verbose {
            set_tracing_subscriber()?;
        }
        let curve = self.curve()?;
        tracing::info!(command = ?self.command, "running");
        handle_command(&self, &curve)
    }
}
