use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

mod db;
mod leaderboard;
mod models;
mod report;
mod scoring;

use models::{InternProfile, ManualScores, Role, SocialMetrics};

#[derive(Parser)]
#[command(name = "studiox-leaderboard")]
#[command(about = "Weekly performance leaderboard for Studio X interns", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleFilter {
    All,
    Strategist,
    Support,
}

impl RoleFilter {
    fn to_role(self) -> Option<Role> {
        match self {
            RoleFilter::All => None,
            RoleFilter::Strategist => Some(Role::Strategist),
            RoleFilter::Support => Some(Role::Support),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a realistic demo roster with two graded weeks
    Seed,
    /// Register an intern
    AddIntern {
        #[arg(long)]
        name: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List the roster with graded-week counts
    ListInterns,
    /// Delete an intern and all of their weekly metrics
    RemoveIntern {
        #[arg(long)]
        name: String,
    },
    /// Open a week by assigning its two strategists
    OpenWeek {
        #[arg(long)]
        week: String,
        #[arg(long, num_args = 2, value_names = ["NAME", "NAME"])]
        strategists: Vec<String>,
    },
    /// Reassign an existing week's strategist pair
    SetStrategists {
        #[arg(long)]
        week: String,
        #[arg(long, num_args = 2, value_names = ["NAME", "NAME"])]
        strategists: Vec<String>,
    },
    /// Delete a week and all of its metrics
    RemoveWeek {
        #[arg(long)]
        week: String,
    },
    /// Record one intern's metrics for a week
    Grade {
        #[arg(long)]
        week: String,
        #[arg(long)]
        intern: String,
        #[arg(long, default_value_t = 0)]
        ig_followers: i64,
        #[arg(long, default_value_t = 0)]
        ig_views: i64,
        #[arg(long, default_value_t = 0)]
        ig_interactions: i64,
        #[arg(long, default_value_t = 0)]
        twitter_followers: i64,
        #[arg(long, default_value_t = 0)]
        twitter_impressions: i64,
        #[arg(long, default_value_t = 0)]
        twitter_engagements: i64,
        #[arg(long, default_value_t = 0)]
        creativity: i64,
        #[arg(long, default_value_t = 0)]
        proactivity: i64,
        /// Strategists only; ignored for supports
        #[arg(long)]
        leadership: Option<i64>,
        /// Supports only; ignored for strategists
        #[arg(long)]
        collaboration: Option<i64>,
        #[arg(long, default_value_t = 0)]
        bonus_followers: i64,
        #[arg(long)]
        comments: Option<String>,
    },
    /// Import weekly metrics from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show the ranked leaderboard for one week
    Weekly {
        #[arg(long)]
        week: String,
        #[arg(long, value_enum, default_value = "all")]
        filter: RoleFilter,
        #[arg(long, default_value_t = 25)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show the ranked cumulative leaderboard across all weeks
    Cumulative {
        #[arg(long, value_enum, default_value = "all")]
        filter: RoleFilter,
        #[arg(long, default_value_t = 25)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Export one week's leaderboard as CSV
    Export {
        #[arg(long)]
        week: String,
        #[arg(long, default_value = "leaderboard.csv")]
        out: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        week: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

async fn require_intern(pool: &PgPool, name: &str) -> anyhow::Result<InternProfile> {
    db::find_intern_by_name(pool, name)
        .await?
        .with_context(|| format!("no intern named {name:?}"))
}

async fn resolve_strategist_pair(pool: &PgPool, names: &[String]) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.push(require_intern(pool, name).await?.id);
    }
    Ok(ids)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::AddIntern { name, notes } => {
            let profile = db::create_intern(&pool, &name, notes.as_deref()).await?;
            println!("Registered {} ({}).", profile.name, profile.id);
        }
        Commands::ListInterns => {
            let roster = db::graded_week_counts(&pool).await?;
            if roster.is_empty() {
                println!("No interns registered.");
            }
            for (profile, graded_weeks) in roster {
                match profile.notes.as_deref() {
                    Some(notes) => {
                        println!("- {} — {graded_weeks} graded week(s); {notes}", profile.name)
                    }
                    None => println!("- {} — {graded_weeks} graded week(s)", profile.name),
                }
            }
        }
        Commands::RemoveIntern { name } => {
            let profile = require_intern(&pool, &name).await?;
            db::delete_intern(&pool, profile.id).await?;
            println!("Removed {} and their weekly metrics.", profile.name);
        }
        Commands::OpenWeek { week, strategists } | Commands::SetStrategists { week, strategists } => {
            let ids = resolve_strategist_pair(&pool, &strategists).await?;
            let assigned = db::upsert_week(&pool, &week, &ids).await?;
            println!(
                "{} strategists: {}.",
                assigned.week,
                strategists.join(" and ")
            );
        }
        Commands::RemoveWeek { week } => {
            if db::delete_week(&pool, &week).await? {
                println!("Removed {week} and its metrics.");
            } else {
                println!("No week named {week:?}.");
            }
        }
        Commands::Grade {
            week,
            intern,
            ig_followers,
            ig_views,
            ig_interactions,
            twitter_followers,
            twitter_impressions,
            twitter_engagements,
            creativity,
            proactivity,
            leadership,
            collaboration,
            bonus_followers,
            comments,
        } => {
            let profile = require_intern(&pool, &intern).await?;
            let social_metrics = SocialMetrics {
                ig_followers,
                ig_views,
                ig_interactions,
                twitter_followers,
                twitter_impressions,
                twitter_engagements,
            };
            let manual_scores = ManualScores {
                creativity,
                proactivity,
                leadership,
                collaboration,
            };
            let recorded = db::record_metrics(
                &pool,
                &profile,
                &week,
                &social_metrics,
                &manual_scores,
                bonus_followers,
                comments.as_deref(),
            )
            .await?;
            let score = scoring::compose_score(
                recorded.role,
                &recorded.social_metrics,
                &recorded.manual_scores,
                recorded.bonus_followers,
                recorded.based_on_strategist_growth,
            );
            println!(
                "Graded {} for {} as {}: {:.2} pts.",
                profile.name, recorded.week, recorded.role, score.total
            );
        }
        Commands::Import { csv } => {
            let imported = db::import_csv(&pool, &csv).await?;
            println!("Imported {imported} metric rows from {}.", csv.display());
        }
        Commands::Weekly {
            week,
            filter,
            limit,
            json,
        } => {
            let profiles = db::fetch_profiles(&pool).await?;
            let metrics = db::fetch_metrics(&pool).await?;
            let strategists = db::fetch_strategist_weeks(&pool).await?;
            let board = leaderboard::weekly_leaderboard(
                &profiles,
                &metrics,
                &strategists,
                &week,
                filter.to_role(),
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
                return Ok(());
            }
            if board.is_empty() {
                println!("No graded interns for {week}.");
                return Ok(());
            }
            println!("{week} leaderboard:");
            for entry in board.iter().take(limit) {
                println!(
                    "{:>2}. {} ({}) — {:.2} pts (growth {:.2}, bonus {})",
                    entry.rank,
                    entry.profile.name,
                    entry.weekly_metrics.role,
                    entry.score.total,
                    entry.score.growth,
                    entry.score.bonus
                );
            }
        }
        Commands::Cumulative { filter, limit, json } => {
            let profiles = db::fetch_profiles(&pool).await?;
            let metrics = db::fetch_metrics(&pool).await?;
            let strategists = db::fetch_strategist_weeks(&pool).await?;
            let board = leaderboard::cumulative_leaderboard(
                &profiles,
                &metrics,
                &strategists,
                filter.to_role(),
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
                return Ok(());
            }
            if board.is_empty() {
                println!("No interns graded yet.");
                return Ok(());
            }
            println!("Cumulative leaderboard:");
            for entry in board.iter().take(limit) {
                println!(
                    "{:>2}. {} — {:.2} pts across {} week(s)",
                    entry.rank,
                    entry.profile.name,
                    entry.cumulative_total,
                    entry.weekly_scores.len()
                );
            }
        }
        Commands::Export { week, out } => {
            let profiles = db::fetch_profiles(&pool).await?;
            let metrics = db::fetch_metrics(&pool).await?;
            let strategists = db::fetch_strategist_weeks(&pool).await?;
            let board =
                leaderboard::weekly_leaderboard(&profiles, &metrics, &strategists, &week, None);
            let csv = report::leaderboard_csv(&board)?;
            std::fs::write(&out, csv)?;
            println!("Exported {week} to {}.", out.display());
        }
        Commands::Report { week, out } => {
            let profiles = db::fetch_profiles(&pool).await?;
            let metrics = db::fetch_metrics(&pool).await?;
            let strategists = db::fetch_strategist_weeks(&pool).await?;
            let weekly = match week.as_deref() {
                Some(week) => {
                    leaderboard::weekly_leaderboard(&profiles, &metrics, &strategists, week, None)
                }
                None => Vec::new(),
            };
            let cumulative =
                leaderboard::cumulative_leaderboard(&profiles, &metrics, &strategists, None);
            let rendered = report::build_report(
                week.as_deref(),
                &weekly,
                &cumulative,
                Utc::now().date_naive(),
            );
            std::fs::write(&out, rendered)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
