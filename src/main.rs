use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use league_lens::analysis::{summarize_performance, PlayerShare};
use league_lens::cache::TieredCache;
use league_lens::client::{BatchOptions, SleeperClient};
use league_lens::config::AppConfig;
use league_lens::models::{LeagueSnapshot, PlayerDirectory, SCORED_POSITIONS};
use league_lens::progress::CancelToken;
use league_lens::scan::{ScanOptions, Scanner};

#[derive(Parser)]
#[command(name = "league-lens")]
#[command(about = "Fantasy league analytics: expected wins, positional benchmarks, history")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Luck-adjusted all-play standings for one league season
    ExpectedWins {
        /// League id
        league_id: String,
    },

    /// Per-owner career averages across a league's whole history chain
    History {
        /// League id of the most recent season
        league_id: String,
    },

    /// Positional output and player impact vs the league average
    Benchmarks {
        /// Sleeper username of the target owner
        username: String,

        /// League id
        league_id: String,

        /// Include playoff weeks in the analysis
        #[arg(long)]
        include_playoffs: bool,

        /// Player impact rows to print
        #[arg(long, default_value = "15")]
        top: usize,
    },

    /// Final rank and playoff outcome across all of a user's leagues
    Performance {
        /// Sleeper username
        username: String,

        /// Season year (default: current year)
        #[arg(long)]
        season: Option<u32>,
    },

    /// Player share counts across all of a user's leagues
    Portfolio {
        /// Sleeper username
        username: String,

        /// Season year (default: current year)
        #[arg(long)]
        season: Option<u32>,

        /// Use one historical week's lineups instead of live rosters
        #[arg(long)]
        week: Option<u32>,

        /// Share rows to print
        #[arg(long, default_value = "25")]
        top: usize,
    },
}

fn load_config(path: &PathBuf) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::from_file(path).with_context(|| format!("loading {}", path.display()))
    } else {
        Ok(AppConfig::default())
    }
}

fn build_scanner(config: &AppConfig) -> Result<Scanner> {
    let cache = Arc::new(TieredCache::new(&config.cache_dir));
    let client = SleeperClient::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_seconds),
        cache,
    )?;
    let options = ScanOptions {
        fetch: BatchOptions {
            batch_size: config.scan.fetch_batch_size,
            delay: Duration::from_millis(config.scan.delay_ms),
        },
        analysis_batch_size: config.scan.analysis_batch_size,
    };
    Ok(Scanner::new(Arc::new(client), options))
}

async fn require_league(scanner: &Scanner, league_id: &str) -> Result<LeagueSnapshot> {
    scanner
        .client()
        .get_league(league_id)
        .await?
        .with_context(|| format!("league {} not found", league_id))
}

fn current_season() -> u32 {
    chrono::Utc::now().year() as u32
}

fn print_progress(completed: usize, total: usize) {
    eprint!("\r  {}/{} leagues analyzed", completed, total);
    if completed == total {
        eprintln!();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let level = cli.log_level.clone().unwrap_or(config.log_level.clone());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let scanner = build_scanner(&config)?;
    let cancel = CancelToken::new();

    match cli.command {
        Commands::ExpectedWins { league_id } => {
            let league = require_league(&scanner, &league_id).await?;
            let result = scanner.analyze_league(&league).await?;

            println!("{} — {} season", league.name, league.season);
            println!(
                "{:<24} {:>6} {:>9} {:>7} {:>9} {:>9}",
                "Owner", "Wins", "Expected", "Luck", "PF", "PA"
            );
            for owner in &result.standings {
                let s = &owner.standing;
                println!(
                    "{:<24} {:>6.1} {:>9.2} {:>+7.2} {:>9.1} {:>9.1}",
                    owner.display_name,
                    s.actual_wins,
                    s.expected_wins,
                    s.actual_wins - s.expected_wins,
                    s.points_for,
                    s.points_against,
                );
            }
        }

        Commands::History { league_id } => {
            let mut progress = print_progress;
            let rollup = scanner
                .league_history_rollup(&league_id, &mut progress, &cancel)
                .await?;

            println!(
                "{:<24} {:>7} {:>9} {:>7} {:>9} {:>8} {:>9}",
                "Owner", "Seasons", "Expected", "Actual", "AvgLuck", "AvgPF", "AboveAvg"
            );
            for owner in &rollup {
                println!(
                    "{:<24} {:>7} {:>9.2} {:>7.2} {:>+8.2} {:>8.1} {:>+9.2}",
                    owner.display_name,
                    owner.seasons,
                    owner.avg_expected_wins,
                    owner.avg_actual_wins,
                    owner.avg_luck,
                    owner.avg_points_for,
                    owner.avg_expected_above_league,
                );
            }
        }

        Commands::Benchmarks {
            username,
            league_id,
            include_playoffs,
            top,
        } => {
            let directory = PlayerDirectory::load(&config.players_path)
                .with_context(|| format!("loading {}", config.players_path.display()))?;
            let user = scanner.resolve_user_id(&username).await?;
            let league = require_league(&scanner, &league_id).await?;
            let result = scanner
                .analyze_positional(&league, &user.user_id, include_playoffs, &directory)
                .await?;

            println!("{} — {} vs league average", result.league_name, username);
            println!(
                "{:<5} {:>10} {:>10} {:>8} {:>12} {:>12}",
                "Pos", "You/Wk", "League/Wk", "Diff", "You/Starter", "Lg/Starter"
            );
            for position in SCORED_POSITIONS {
                let (Some(mine), Some(league_avg)) = (
                    result.user_stats.get(&position),
                    result.league_average_stats.get(&position),
                ) else {
                    continue;
                };
                println!(
                    "{:<5} {:>10.2} {:>10.2} {:>+8.2} {:>12.2} {:>12.2}",
                    position,
                    mine.avg_points_per_week,
                    league_avg.avg_points_per_week,
                    mine.avg_points_per_week - league_avg.avg_points_per_week,
                    mine.avg_points_per_starter,
                    league_avg.avg_points_per_starter,
                );
            }

            println!("\nTop player impact (points over league average):");
            for impact in result.player_impacts.iter().take(top) {
                println!(
                    "  {:<24} {:<4} {:>+8.1} total {:>+7.2}/wk  ({}, {} wks)",
                    impact.name,
                    impact.position,
                    impact.total_pola,
                    impact.avg_pola,
                    impact.owner_name,
                    impact.weeks_started,
                );
            }
        }

        Commands::Performance { username, season } => {
            let season = season.unwrap_or_else(current_season);
            let user = scanner.resolve_user_id(&username).await?;
            let mut progress = print_progress;
            let results = scanner
                .season_performance(&user.user_id, season, &mut progress, &cancel)
                .await?;

            let summary = summarize_performance(&results);
            println!("{} — {} season across {} leagues", username, season, summary.leagues);
            println!(
                "avg finish {:.1}, {} championships, {} podiums, {:.0}% playoff rate\n",
                summary.avg_finish, summary.championships, summary.podiums, summary.playoff_rate
            );

            let mut by_rank = results;
            by_rank.sort_by_key(|r| r.rank);
            for result in &by_rank {
                println!(
                    "  #{:<3} {:<32} {:>8.1} PF  {}",
                    result.rank,
                    result.league_name,
                    result.points_for,
                    if result.made_playoffs { "playoffs" } else { "" },
                );
            }
        }

        Commands::Portfolio {
            username,
            season,
            week,
            top,
        } => {
            let season = season.unwrap_or_else(current_season);
            let directory = PlayerDirectory::load(&config.players_path)
                .with_context(|| format!("loading {}", config.players_path.display()))?;
            let user = scanner.resolve_user_id(&username).await?;
            let mut progress = print_progress;
            let shares = scanner
                .portfolio(&user.user_id, season, week, &directory, &mut progress, &cancel)
                .await?;

            print_portfolio(&shares, top);
        }
    }

    Ok(())
}

fn print_portfolio(shares: &[PlayerShare], top: usize) {
    println!(
        "{:<24} {:<4} {:>6} {:>8} {:>6} {:>9}",
        "Player", "Pos", "Shares", "Started", "Bench", "Exposure"
    );
    for share in shares.iter().take(top) {
        println!(
            "{:<24} {:<4} {:>6} {:>8} {:>6} {:>8.0}%",
            share.name,
            share.position,
            share.shares,
            share.starter_count,
            share.bench_count,
            share.exposure,
        );
    }
}
