//! Frontline - terminal driver
//!
//! A thin line-oriented front end over the engine for local play. Each
//! command is dispatched onto the tokio blocking pool, the same way a chat
//! transport would call the engine from its handlers.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use frontline::catalog::UnitCatalog;
use frontline::core::config::EngineConfig;
use frontline::core::error::{GameError, Result};
use frontline::engine::{BattleReport, Overview};
use frontline::combat::{BattleRecord, SeededVariance};
use frontline::{Engine, PlayerId};

#[derive(Parser, Debug)]
#[command(name = "frontline")]
#[command(about = "Play the Frontline strategy engine from a terminal")]
struct Args {
    /// Engine configuration file (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for persistent JSON state; overrides the config file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Unit catalog override (TOML)
    #[arg(long)]
    units: Option<PathBuf>,

    /// Random seed for reproducible battles
    #[arg(long)]
    seed: Option<u64>,

    /// Player id to act as
    #[arg(long = "as", default_value_t = 1)]
    player: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("frontline=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if args.data_dir.is_some() {
        config.data_dir = args.data_dir.clone();
    }

    let mut engine = Engine::new(config)?;
    if let Some(path) = &args.units {
        engine = engine.with_units(UnitCatalog::load_from_toml(path)?);
    }
    if let Some(seed) = args.seed {
        engine = engine.with_variance(SeededVariance::new(seed));
    }
    let engine = Arc::new(engine);

    let rt = Runtime::new()?;
    let mut actor = PlayerId(args.player);

    println!("\n=== FRONTLINE ===");
    println!("Type 'help' for commands.");
    println!();

    loop {
        print!("[{}]> ", actor);
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim().to_string();

        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }
        if let Some(id) = input.strip_prefix("as ") {
            match parse_player(id) {
                Ok(id) => actor = id,
                Err(message) => println!("{}", message),
            }
            continue;
        }

        let shared = Arc::clone(&engine);
        let reply = rt.block_on(tokio::task::spawn_blocking(move || {
            dispatch(&shared, actor, &input)
        }));
        match reply {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::error!(error = %e, "command task failed"),
        }
    }

    println!("\nGoodbye!");
    Ok(())
}

fn parse_player(text: &str) -> std::result::Result<PlayerId, String> {
    text.trim()
        .parse::<u64>()
        .map(PlayerId)
        .map_err(|_| format!("Not a player id: {}", text.trim()))
}

fn parse_amount(text: &str) -> std::result::Result<i64, String> {
    text.parse::<i64>()
        .map_err(|_| format!("Not a number: {}", text))
}

fn render_error(e: &GameError) -> String {
    format!("Error ({:?}): {}", e.category(), e)
}

/// Run one command line as `actor` and render the reply
fn dispatch(engine: &Engine, actor: PlayerId, line: &str) -> String {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((command, rest)) = words.split_first() else {
        return String::new();
    };

    let result: std::result::Result<String, String> = match *command {
        "help" | "h" => Ok(HELP.to_string()),
        "join" => {
            let name = if rest.is_empty() {
                format!("Player {}", actor)
            } else {
                rest.join(" ")
            };
            engine
                .ensure_player(actor, &name)
                .map(|p| format!("Welcome, {}. Budget: {}", p.name, p.budget))
                .map_err(|e| render_error(&e))
        }
        "select" => engine
            .select_country(actor, &rest.join(" "))
            .map(|c| format!("You now lead {}.", c))
            .map_err(|e| render_error(&e)),
        "buy" => match rest {
            [kind, amount] => parse_amount(amount).and_then(|amount| {
                engine
                    .buy_units(actor, kind, amount)
                    .map(|r| {
                        format!(
                            "Bought {} {} for {} (munitions -{}). Budget: {}, munitions: {}",
                            r.amount, r.kind, r.cost, r.munitions_spent, r.budget_after, r.munitions_after
                        )
                    })
                    .map_err(|e| render_error(&e))
            }),
            _ => Err("Usage: buy <unit> <amount>".into()),
        },
        "build" => engine
            .build_facility(actor)
            .map(|f| format!("Factory built, producing {} munitions/hour before modifiers.", f.base_rate))
            .map_err(|e| render_error(&e)),
        "collect" => engine
            .collect_production(actor)
            .map(|amount| format!("Collected {} munitions.", amount))
            .map_err(|e| render_error(&e)),
        "attack" => match rest {
            [target] => parse_player(target).and_then(|target| {
                engine
                    .attack(actor, target)
                    .map(|report| render_battle(&report))
                    .map_err(|e| render_error(&e))
            }),
            _ => Err("Usage: attack <player id>".into()),
        },
        "history" => Ok(render_history(actor, &engine.battle_history(actor, None))),
        "status" | "s" => Ok(render_overview(&engine.overview(actor))),
        "regions" => {
            let views = engine.regions(actor);
            if views.is_empty() {
                Ok("No regions.".into())
            } else {
                Ok(views
                    .iter()
                    .map(|v| {
                        let effects: Vec<String> =
                            v.spec.effects.iter().map(|e| e.to_string()).collect();
                        let state = match (v.control.controlled, v.control.damaged) {
                            (false, _) => "lost".to_string(),
                            (true, true) => format!("damaged {}", v.control.damage_level),
                            (true, false) => "held".to_string(),
                        };
                        format!("  {:<18} {:<14} {:<10} {}", v.spec.id, v.spec.capital, state, effects.join(", "))
                    })
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
        "units" => Ok(engine
            .units()
            .all()
            .iter()
            .map(|u| {
                format!(
                    "  {:<10} cost {:>7}  munitions {:>5}  power {:>4}",
                    u.kind, u.cost, u.munitions, u.power
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
        "admin" => dispatch_admin(engine, actor, rest),
        other => Err(format!("Unknown command '{}'. Type 'help'.", other)),
    };

    result.unwrap_or_else(|message| message)
}

fn dispatch_admin(
    engine: &Engine,
    actor: PlayerId,
    args: &[&str],
) -> std::result::Result<String, String> {
    let (op, target, rest) = match args {
        [op, target, rest @ ..] => (*op, parse_player(target)?, rest),
        _ => return Err(ADMIN_HELP.to_string()),
    };
    let fail = |e: GameError| render_error(&e);

    match (op, rest) {
        ("grant_money", [amount]) => {
            let amount = parse_amount(amount)?;
            engine
                .grant_money(actor, target, amount)
                .map(|b| format!("Budget of {} is now {}.", target, b))
                .map_err(fail)
        }
        ("set_money", [amount]) => {
            let amount = parse_amount(amount)?;
            engine
                .set_money(actor, target, amount)
                .map(|b| format!("Budget of {} set to {}.", target, b))
                .map_err(fail)
        }
        ("grant_munitions", [amount]) => {
            let amount = parse_amount(amount)?;
            engine
                .grant_munitions(actor, target, amount)
                .map(|m| format!("Munitions of {} now {}.", target, m))
                .map_err(fail)
        }
        ("system", [system]) => engine
            .set_political_system(actor, target, system)
            .map(|s| format!("{} now runs {}.", target, s))
            .map_err(fail),
        ("set_country", country) if !country.is_empty() => engine
            .set_country(actor, target, &country.join(" "))
            .map(|c| format!("{} now leads {}.", target, c))
            .map_err(fail),
        ("reset_country", []) => engine
            .reset_country(actor, target)
            .map(|prev| match prev {
                Some(c) => format!("{} released {}.", target, c),
                None => format!("{} had no country.", target),
            })
            .map_err(fail),
        ("region", [region, change]) => {
            let controlled = match *change {
                "gain" => true,
                "lose" => false,
                other => return Err(format!("Expected gain or lose, got '{}'", other)),
            };
            engine
                .set_region_control(actor, target, region, controlled)
                .map(|changed| format!("Region {} updated (changed: {}).", region, changed))
                .map_err(fail)
        }
        ("damage", [region, level]) => {
            let level = parse_amount(level)?;
            engine
                .set_region_damage(actor, target, region, level)
                .map(|changed| format!("Region {} damage set to {} (changed: {}).", region, level, changed))
                .map_err(fail)
        }
        ("repair", [region]) => engine
            .repair_region(actor, target, region)
            .map(|changed| format!("Region {} repaired (changed: {}).", region, changed))
            .map_err(fail),
        _ => Err(ADMIN_HELP.to_string()),
    }
}

fn render_battle(report: &BattleReport) -> String {
    let record = &report.record;
    let outcome = &report.outcome;
    let mut lines = vec![
        format!("Battle: {} attacks {}", record.attacker, record.defender),
        format!(
            "  attacker power {} (x{:.2} -> {:.1}), losses {}",
            outcome.attacker.raw_power,
            outcome.attacker.variance,
            outcome.attacker.final_power,
            outcome.attacker.total_losses
        ),
        format!(
            "  defender power {} (x{:.2} -> {:.1}), losses {}",
            outcome.defender.raw_power,
            outcome.defender.variance,
            outcome.defender.final_power,
            outcome.defender.total_losses
        ),
    ];
    lines.push(format!("  winner: {}", record.winner));
    lines.join("\n")
}

fn render_history(player: PlayerId, battles: &[BattleRecord]) -> String {
    if battles.is_empty() {
        return "No battles yet.".into();
    }
    battles
        .iter()
        .map(|b| {
            let result = if b.winner == player { "won" } else { "lost" };
            format!(
                "  {} {} vs {}: {} ({} - {}), losses {} / {}",
                b.timestamp.format("%Y-%m-%d %H:%M"),
                b.attacker,
                b.defender,
                result,
                b.attacker_power,
                b.defender_power,
                b.attacker_losses,
                b.defender_losses
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_overview(o: &Overview) -> String {
    let country = o.country.map(|c| c.to_string()).unwrap_or_else(|| "none".into());
    let system = o
        .political_system
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".into());
    let units = if o.units.is_empty() {
        "none".to_string()
    } else {
        o.units
            .iter()
            .map(|(kind, count)| format!("{} {}", count, kind))
            .collect::<Vec<_>>()
            .join(", ")
    };

    [
        format!("{} ({})", o.name, o.id),
        format!("  Country: {}  System: {}", country, system),
        format!("  Budget: {}  Munitions: {}", o.budget, o.munitions),
        format!("  Units: {}  (power {})", units, o.raw_power),
        format!("  Factories: {}  Output: {}/h", o.facilities, o.hourly_output),
        format!(
            "  Modifiers: production {:.2}, economy {:.2}, military {:.2}",
            o.modifiers.production, o.modifiers.economy, o.modifiers.military
        ),
        format!(
            "  With regions: production {:.2}, economy {:.2}, military {:.2}",
            o.potential.production, o.potential.economy, o.potential.military
        ),
        format!(
            "  Regions: {} held, {} damaged, {} total",
            o.regions.controlled, o.regions.damaged, o.regions.total
        ),
    ]
    .join("\n")
}

const HELP: &str = "\
Commands:
  join [name]            - Register as the current player
  as <id>                - Switch the acting player
  select <country>       - Choose Ukraine, Russia or Belarus
  buy <unit> <amount>    - Buy units (see 'units')
  build                  - Build a munitions factory
  collect                - Collect factory output
  attack <id>            - Attack another player
  history                - Recent battles
  status / s             - Player overview
  regions                - Region control
  units                  - Unit price list
  admin ...              - Privileged commands (see 'admin')
  quit / q               - Exit";

const ADMIN_HELP: &str = "\
Admin commands:
  admin grant_money <id> <amount>
  admin set_money <id> <amount>
  admin grant_munitions <id> <amount>
  admin system <id> <political system>
  admin set_country <id> <country>
  admin reset_country <id>
  admin region <id> <region> gain|lose
  admin damage <id> <region> <0-4>
  admin repair <id> <region>";
