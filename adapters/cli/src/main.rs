#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Keris Warrior headlessly and manages the
//! persisted shop, achievements, and player name.

mod autopilot;
mod manifest;
mod settings;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use keris_warrior_core::{keys, Achievement, SettingsStore};
use keris_warrior_system_scoring::is_unlocked;
use keris_warrior_system_shop::{self as shop, Availability, Loadout, Shop};
use keris_warrior_world::World;

use crate::{
    autopilot::{Options, Outcome},
    manifest::Manifest,
    settings::SettingsFile,
};

#[derive(Debug, Parser)]
#[command(name = "keris-warrior", about = "Keris Warrior progression core")]
struct Cli {
    /// Settings file holding coins, purchases, and achievements.
    #[arg(long, global = true, default_value = "keris-warrior-settings.toml")]
    settings: PathBuf,
    /// Enables debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Plays a full game with the autopilot.
    Play(PlayArgs),
    /// Lists or buys shop items.
    Shop {
        #[command(subcommand)]
        action: ShopAction,
    },
    /// Lists every achievement and whether it is unlocked.
    Achievements,
    /// Sets the name scores are submitted under.
    Name {
        /// Player name.
        name: String,
    },
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Game manifest to load instead of the built-in one.
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Overrides the seed used by the game session.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated seconds after which the run is abandoned.
    #[arg(long, default_value_t = 600)]
    max_seconds: u64,
    /// Probability that a player projectile hits.
    #[arg(long, default_value_t = 0.7, value_parser = probability)]
    accuracy: f64,
    /// Probability that an enemy shot hits the player.
    #[arg(long, default_value_t = 0.03, value_parser = probability)]
    enemy_accuracy: f64,
}

#[derive(Debug, Subcommand)]
enum ShopAction {
    /// Lists items with prices and availability.
    List,
    /// Buys and equips the item at the given index.
    Buy {
        /// Zero-based index from `shop list`.
        index: usize,
    },
}

/// Entry point for the Keris Warrior command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut settings = SettingsFile::open(&cli.settings)?;
    match cli.command {
        CliCommand::Play(args) => play(settings, args),
        CliCommand::Shop { action } => run_shop(&mut settings, action),
        CliCommand::Achievements => {
            for achievement in Achievement::ALL {
                let mark = if is_unlocked(&settings, achievement) {
                    "x"
                } else {
                    " "
                };
                println!(
                    "[{mark}] {:<18} {}",
                    achievement.title(),
                    achievement.description()
                );
            }
            Ok(())
        }
        CliCommand::Name { name } => {
            settings.set_string(keys::PLAYER_NAME, name.trim());
            settings.save().context("failed to save player name")?;
            println!("scores will be submitted as {}", name.trim());
            Ok(())
        }
    }
}

fn play(settings: SettingsFile, args: PlayArgs) -> Result<()> {
    let Manifest {
        mut config,
        catalog,
        bonus,
    } = Manifest::load(args.manifest.as_deref())?;
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    let options = Options {
        seed: config.rng_seed.rotate_left(32),
        accuracy: args.accuracy,
        enemy_accuracy: args.enemy_accuracy,
        max_duration: Duration::from_secs(args.max_seconds),
    };
    let path = settings.path().to_owned();
    let mut world =
        World::new(config, catalog, bonus, settings).context("failed to build the game world")?;

    let summary = autopilot::run(&mut world, options);
    let outcome = match summary.outcome {
        Outcome::Won => "won",
        Outcome::GameOver => "game over",
        Outcome::TimedOut => "timed out",
    };
    println!("{outcome} on {} after {:.1}s", summary.level, summary.elapsed.as_secs_f32());
    println!("score: {}", summary.score);
    println!("power-ups collected: {}", summary.power_ups);
    match summary.coins_total {
        Some(total) => println!(
            "coins: +{} ({} total, saved to {})",
            summary.coins_earned,
            total,
            path.display()
        ),
        None => println!("coins: {} (not settled)", summary.coins_earned),
    }
    for achievement in &summary.achievements {
        println!("unlocked: {}", achievement.title());
    }
    Ok(())
}

fn run_shop(settings: &mut SettingsFile, action: ShopAction) -> Result<()> {
    let shop = Shop::default();
    match action {
        ShopAction::List => {
            let loadout = Loadout::load(&*settings);
            println!("coins: {}", shop::balance(&*settings));
            println!("equipped: {:?} keris, {:?} cloth", loadout.keris, loadout.cloth);
            for (index, item) in shop.items().iter().enumerate() {
                let status = match shop.availability(&*settings, index) {
                    Some(Availability::Owned) => "owned",
                    Some(Availability::Affordable) => "buy",
                    Some(Availability::TooExpensive) | None => "locked",
                };
                println!("{index}: {:<14} {:>5} coins  {status}", item.name, item.price);
            }
        }
        ShopAction::Buy { index } => {
            let receipt = shop
                .purchase(settings, index)
                .with_context(|| format!("purchase of item {index} failed"))?;
            println!(
                "bought {}, {} coins left",
                receipt.item.name, receipt.balance
            );
        }
    }
    Ok(())
}

fn probability(value: &str) -> Result<f64, String> {
    let parsed: f64 = value
        .parse()
        .map_err(|error| format!("`{value}` is not a number: {error}"))?;
    if (0.0..=1.0).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(format!("`{value}` is not between 0 and 1"))
    }
}
