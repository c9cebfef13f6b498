//! CROUPIER — Screen-Macro Bet Placement Agent
//!
//! Entry point. Loads configuration, initialises structured logging,
//! opens the table layout record (or seeds a fresh one), and runs an
//! interactive command loop against the bet executor with graceful
//! shutdown. No OS pointer is attached: clicks go through the silent
//! driver until a real `PointerDriver` implementation is wired in.

use anyhow::{anyhow, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use croupier::config::AppConfig;
use croupier::executor::BetExecutor;
use croupier::layout::TableLayout;
use croupier::pointer::SilentPointer;
use croupier::storage::LayoutStore;
use croupier::types::{format_amount, BetSide, Role, ScreenRect};

const BANNER: &str = r#"
  ____  ____    ___   _   _  ____   ___  _____  ____
 / ___||  _ \  / _ \ | | | ||  _ \ |_ _|| ____||  _ \
| |    | |_) || | | || | | || |_) | | | |  _|  | |_) |
| |___ |  _ < | |_| || |_| ||  __/  | | | |___ |  _ <
 \____||_| \_\ \___/  \___/ |_|    |___||_____||_| \_\

  Screen-Macro Bet Placement Agent
  v0.1.0 — Interactive Agent
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML (defaults when no file exists)
    let cfg = AppConfig::load_or_default("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        layout_path = %cfg.table.layout_path,
        max_bet = cfg.table.max_bet,
        chip_to_area_ms = cfg.timing.chip_to_area_ms,
        between_chips_ms = cfg.timing.between_chips_ms,
        cancel_presses = cfg.timing.cancel_presses,
        "CROUPIER starting up"
    );

    // -- Open or seed the layout record -----------------------------------

    let mut store = LayoutStore::open(cfg.table.layout_path.clone())?;
    report_readiness(store.layout());

    // -- Initialise components --------------------------------------------

    // Silent driver: computes every click but never touches the OS
    // pointer. A real driver is a drop-in `PointerDriver` impl.
    let executor = BetExecutor::new(Arc::new(SilentPointer), cfg.executor_config())
        .with_logger(|line| println!("  · {line}"));

    println!("No OS pointer attached: every click is simulated.");
    println!("Type 'help' for commands.\n");

    // -- Command loop ------------------------------------------------------

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        prompt();
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        match handle_command(line, &executor, &mut store).await {
                            Ok(true) => {}
                            Ok(false) => break,
                            Err(e) => error!(error = %e, "Command failed"),
                        }
                    }
                    None => {
                        info!("Input stream closed.");
                        break;
                    }
                }
            }
            _ = &mut shutdown => {
                println!();
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!(
        layout_version = store.layout().version(),
        "CROUPIER shut down cleanly."
    );

    Ok(())
}

/// Dispatch one command line. Returns `false` when the session should end.
async fn handle_command(
    line: &str,
    executor: &BetExecutor,
    store: &mut LayoutStore,
) -> Result<bool> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or("").to_lowercase();
    let args: Vec<&str> = parts.collect();

    match verb.as_str() {
        "bet" => match args.as_slice() {
            [amount, side] => {
                let amount: u64 = match amount.parse() {
                    Ok(a) => a,
                    Err(_) => {
                        println!("Amount must be a positive integer.");
                        return Ok(true);
                    }
                };
                match side.parse::<BetSide>() {
                    Ok(side) => match executor.place(store.layout(), amount, side).await {
                        Ok(receipt) => println!("Placed: {receipt}"),
                        Err(e) => println!("Rejected [{}]: {e}", e.code()),
                    },
                    Err(e) => println!("Rejected [{}]: {e}", e.code()),
                }
            }
            _ => println!("Usage: bet <amount> <player|banker>"),
        },

        "cancel" => match executor.cancel(store.layout()).await {
            Ok(receipt) => println!("Done: {receipt}"),
            Err(e) => println!("Rejected [{}]: {e}", e.code()),
        },

        "test" => match args.as_slice() {
            [denomination] => match denomination.parse::<u64>() {
                Ok(d) => match executor.rehearse_chip(store.layout(), d).await {
                    Ok(()) => println!("Clicked the {} chip.", format_amount(d)),
                    Err(e) => println!("Rejected [{}]: {e}", e.code()),
                },
                Err(_) => println!("Denomination must be a positive integer."),
            },
            _ => println!("Usage: test <denomination>"),
        },

        "chips" => {
            let layout = store.layout();
            for slot in layout.chips() {
                println!("  {slot}");
            }
            println!(
                "{} of {} slots recorded.",
                layout.usable_chip_count(),
                layout.chips().len()
            );
        }

        "status" => {
            let layout = store.layout();
            println!("Layout record : {}", store.path());
            println!("Layout version: {}", layout.version());
            println!(
                "Chips recorded: {}/{}",
                layout.usable_chip_count(),
                layout.chips().len()
            );
            if layout.is_complete() {
                println!("Table ready   : yes");
            } else {
                println!("Table ready   : no (missing {})", missing_list(layout));
            }
        }

        "set" => match args.as_slice() {
            [role, x, y, rest @ ..] => {
                let role = match role.parse::<Role>() {
                    Ok(r) => r,
                    Err(e) => {
                        println!("{e}");
                        return Ok(true);
                    }
                };
                match parse_rect(role.as_str(), x, y, rest) {
                    Ok(rect) => {
                        let recorded = rect.to_string();
                        store.set_role(role, rect)?;
                        println!("Recorded {recorded}.");
                        report_readiness(store.layout());
                    }
                    Err(e) => println!("{e}"),
                }
            }
            _ => println!("Usage: set <player|banker|cancel> <x> <y> [w h]"),
        },

        "chip" => match args.as_slice() {
            [denomination, x, y, rest @ ..] => {
                let denomination: u64 = match denomination.parse() {
                    Ok(d) if d > 0 => d,
                    _ => {
                        println!("Denomination must be a positive integer.");
                        return Ok(true);
                    }
                };
                match parse_rect(&format!("chip_{denomination}"), x, y, rest) {
                    Ok(rect) => {
                        let at = rect.center();
                        store.set_chip(denomination, rect)?;
                        println!(
                            "Recorded the {} chip at {at}.",
                            format_amount(denomination)
                        );
                    }
                    Err(e) => println!("{e}"),
                }
            }
            _ => println!("Usage: chip <denomination> <x> <y> [w h]"),
        },

        "rmchip" => match args.as_slice() {
            [denomination] => match denomination.parse::<u64>() {
                Ok(d) => {
                    if store.remove_chip(d)? {
                        println!("Removed the {} slot.", format_amount(d));
                    } else {
                        println!("No slot for {}.", format_amount(d));
                    }
                }
                Err(_) => println!("Denomination must be a positive integer."),
            },
            _ => println!("Usage: rmchip <denomination>"),
        },

        "reload" => {
            store.reload()?;
            println!("Layout re-read from {}.", store.path());
            report_readiness(store.layout());
        }

        "help" => print_help(),

        "quit" | "exit" => return Ok(false),

        other => println!("Unknown command '{other}'. Type 'help' for commands."),
    }

    Ok(true)
}

/// Parse `<x> <y>` plus an optional `<w> <h>` tail into a rectangle.
/// Omitted sizes fall back to the standard 50x50 target.
fn parse_rect(name: &str, x: &str, y: &str, rest: &[&str]) -> Result<ScreenRect> {
    let x: i32 = x.parse().map_err(|_| anyhow!("Coordinates must be integers."))?;
    let y: i32 = y.parse().map_err(|_| anyhow!("Coordinates must be integers."))?;
    let (width, height) = match rest {
        [] => (ScreenRect::PLACEHOLDER_SIZE, ScreenRect::PLACEHOLDER_SIZE),
        [w, h] => (
            w.parse().map_err(|_| anyhow!("Sizes must be integers."))?,
            h.parse().map_err(|_| anyhow!("Sizes must be integers."))?,
        ),
        _ => return Err(anyhow!("Expected <x> <y> or <x> <y> <w> <h>.")),
    };
    Ok(ScreenRect::new(x, y, width, height, name))
}

/// Log whether the table is ready to take bets.
fn report_readiness(layout: &TableLayout) {
    if layout.is_complete() {
        info!(
            version = layout.version(),
            chips = layout.usable_chip_count(),
            "Table layout complete, ready to bet"
        );
    } else {
        warn!(
            version = layout.version(),
            missing = %missing_list(layout),
            "Table layout incomplete, betting disabled"
        );
    }
}

fn missing_list(layout: &TableLayout) -> String {
    layout
        .missing_roles()
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn prompt() {
    print!("croupier> ");
    let _ = std::io::stdout().flush();
}

fn print_help() {
    println!("Commands:");
    println!("  bet <amount> <player|banker>   place a bet (chip click, then area click)");
    println!("  cancel                         run the repeated cancel-button sequence");
    println!("  test <denomination>            click a recorded chip once");
    println!("  chips                          list chip slots and their targets");
    println!("  status                         show layout readiness");
    println!("  set <role> <x> <y> [w h]       record a role rectangle (player|banker|cancel)");
    println!("  chip <denom> <x> <y> [w h]     record a chip rectangle");
    println!("  rmchip <denom>                 remove a chip slot");
    println!("  reload                         re-read the layout record from disk");
    println!("  help                           this text");
    println!("  quit                           exit");
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("croupier=info"));

    let json_logging = std::env::var("CROUPIER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
