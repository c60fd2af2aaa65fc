use anyhow::Context;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::leaderboard;
use crate::models::{
    InternProfile, ManualScores, Role, SocialMetrics, WeeklyMetrics, WeeklyStrategists,
};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

// Row-to-model adapters. The snake_case column layout stays on this side of
// the boundary; the rest of the crate only sees the domain types.

fn profile_from_row(row: &PgRow) -> InternProfile {
    InternProfile {
        id: row.get("id"),
        name: row.get("name"),
        notes: row.get("notes"),
    }
}

fn strategists_from_row(row: &PgRow) -> WeeklyStrategists {
    WeeklyStrategists {
        week: row.get("week"),
        strategist_ids: row.get("strategist_ids"),
    }
}

fn metrics_from_row(row: &PgRow) -> anyhow::Result<WeeklyMetrics> {
    let role: Role = row.get::<String, _>("role").parse()?;
    Ok(WeeklyMetrics {
        id: row.get("id"),
        intern_id: row.get("intern_id"),
        week: row.get("week"),
        role,
        social_metrics: SocialMetrics {
            ig_followers: row.get("ig_followers"),
            ig_views: row.get("ig_views"),
            ig_interactions: row.get("ig_interactions"),
            twitter_followers: row.get("twitter_followers"),
            twitter_impressions: row.get("twitter_impressions"),
            twitter_engagements: row.get("twitter_engagements"),
        },
        manual_scores: ManualScores {
            creativity: row.get("creativity"),
            proactivity: row.get("proactivity"),
            leadership: row.get("leadership"),
            collaboration: row.get("collaboration"),
        },
        bonus_followers: row.get("bonus_followers"),
        based_on_strategist_growth: row.get("based_on_strategist_growth"),
        comments: row.get("comments"),
    })
}

pub async fn fetch_profiles(pool: &PgPool) -> anyhow::Result<Vec<InternProfile>> {
    let rows = sqlx::query("SELECT id, name, notes FROM studiox.interns ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(profile_from_row).collect())
}

pub async fn fetch_strategist_weeks(pool: &PgPool) -> anyhow::Result<Vec<WeeklyStrategists>> {
    let rows = sqlx::query(
        "SELECT week, strategist_ids FROM studiox.weekly_strategists ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(strategists_from_row).collect())
}

/// All graded records, ordered by week then grading time. Aggregation tie
/// order follows this fetch order, so equal totals rank in grading order.
pub async fn fetch_metrics(pool: &PgPool) -> anyhow::Result<Vec<WeeklyMetrics>> {
    let rows = sqlx::query("SELECT * FROM studiox.weekly_metrics ORDER BY week, created_at")
        .fetch_all(pool)
        .await?;
    rows.iter().map(metrics_from_row).collect()
}

async fn fetch_metrics_for_week(pool: &PgPool, week: &str) -> anyhow::Result<Vec<WeeklyMetrics>> {
    let rows =
        sqlx::query("SELECT * FROM studiox.weekly_metrics WHERE week = $1 ORDER BY created_at")
            .bind(week)
            .fetch_all(pool)
            .await?;
    rows.iter().map(metrics_from_row).collect()
}

pub async fn create_intern(
    pool: &PgPool,
    name: &str,
    notes: Option<&str>,
) -> anyhow::Result<InternProfile> {
    let row = sqlx::query(
        r#"
        INSERT INTO studiox.interns (id, name, notes)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE
        SET notes = COALESCE(EXCLUDED.notes, studiox.interns.notes)
        RETURNING id, name, notes
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(notes)
    .fetch_one(pool)
    .await?;
    Ok(profile_from_row(&row))
}

pub async fn find_intern_by_name(
    pool: &PgPool,
    name: &str,
) -> anyhow::Result<Option<InternProfile>> {
    let row = sqlx::query("SELECT id, name, notes FROM studiox.interns WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(profile_from_row))
}

/// Deletes an intern; the schema cascades their metric records.
pub async fn delete_intern(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM studiox.interns WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Per-intern count of graded weeks, for the roster listing.
pub async fn graded_week_counts(pool: &PgPool) -> anyhow::Result<Vec<(InternProfile, i64)>> {
    let rows = sqlx::query(
        r#"
        SELECT i.id, i.name, i.notes, COUNT(m.id) AS graded_weeks
        FROM studiox.interns i
        LEFT JOIN studiox.weekly_metrics m ON m.intern_id = i.id
        GROUP BY i.id, i.name, i.notes
        ORDER BY i.name
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .iter()
        .map(|row| (profile_from_row(row), row.get("graded_weeks")))
        .collect())
}

/// Create or reassign a week's strategist pair. Reassignment does not touch
/// roles already stored on that week's metric records.
pub async fn upsert_week(
    pool: &PgPool,
    week: &str,
    strategist_ids: &[Uuid],
) -> anyhow::Result<WeeklyStrategists> {
    anyhow::ensure!(
        strategist_ids.len() == 2 && strategist_ids[0] != strategist_ids[1],
        "exactly 2 distinct strategists must be assigned per week"
    );

    let row = sqlx::query(
        r#"
        INSERT INTO studiox.weekly_strategists (week, strategist_ids)
        VALUES ($1, $2)
        ON CONFLICT (week) DO UPDATE
        SET strategist_ids = EXCLUDED.strategist_ids
        RETURNING week, strategist_ids
        "#,
    )
    .bind(week)
    .bind(strategist_ids)
    .fetch_one(pool)
    .await?;
    Ok(strategists_from_row(&row))
}

/// Deletes a week; the schema cascades that week's metric records.
pub async fn delete_week(pool: &PgPool, week: &str) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM studiox.weekly_strategists WHERE week = $1")
        .bind(week)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Record (or re-record) one intern's metrics for a week.
///
/// The role is decided here, once, by membership in the week's strategist
/// pair, and persisted; Support records snapshot the strategist average
/// growth available at this moment. The role-irrelevant manual score column
/// is stored as NULL.
pub async fn record_metrics(
    pool: &PgPool,
    intern: &InternProfile,
    week: &str,
    social_metrics: &SocialMetrics,
    manual_scores: &ManualScores,
    bonus_followers: i64,
    comments: Option<&str>,
) -> anyhow::Result<WeeklyMetrics> {
    let pair = sqlx::query(
        "SELECT week, strategist_ids FROM studiox.weekly_strategists WHERE week = $1",
    )
    .bind(week)
    .fetch_optional(pool)
    .await?
    .as_ref()
    .map(strategists_from_row)
    .with_context(|| format!("week {week:?} has not been opened"))?;

    let role = if pair.strategist_ids.contains(&intern.id) {
        Role::Strategist
    } else {
        Role::Support
    };

    let based_on_strategist_growth = match role {
        Role::Strategist => None,
        Role::Support => {
            let week_metrics = fetch_metrics_for_week(pool, week).await?;
            leaderboard::strategist_average_growth(
                &week_metrics,
                std::slice::from_ref(&pair),
                week,
            )
        }
    };

    let (leadership, collaboration) = match role {
        Role::Strategist => (Some(manual_scores.leadership.unwrap_or(0)), None),
        Role::Support => (None, Some(manual_scores.collaboration.unwrap_or(0))),
    };

    let row = sqlx::query(
        r#"
        INSERT INTO studiox.weekly_metrics
        (id, intern_id, week, role,
         ig_followers, ig_views, ig_interactions,
         twitter_followers, twitter_impressions, twitter_engagements,
         creativity, proactivity, leadership, collaboration,
         bonus_followers, based_on_strategist_growth, comments)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        ON CONFLICT (intern_id, week) DO UPDATE SET
            role = EXCLUDED.role,
            ig_followers = EXCLUDED.ig_followers,
            ig_views = EXCLUDED.ig_views,
            ig_interactions = EXCLUDED.ig_interactions,
            twitter_followers = EXCLUDED.twitter_followers,
            twitter_impressions = EXCLUDED.twitter_impressions,
            twitter_engagements = EXCLUDED.twitter_engagements,
            creativity = EXCLUDED.creativity,
            proactivity = EXCLUDED.proactivity,
            leadership = EXCLUDED.leadership,
            collaboration = EXCLUDED.collaboration,
            bonus_followers = EXCLUDED.bonus_followers,
            based_on_strategist_growth = EXCLUDED.based_on_strategist_growth,
            comments = EXCLUDED.comments
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(intern.id)
    .bind(week)
    .bind(role.as_str())
    .bind(social_metrics.ig_followers)
    .bind(social_metrics.ig_views)
    .bind(social_metrics.ig_interactions)
    .bind(social_metrics.twitter_followers)
    .bind(social_metrics.twitter_impressions)
    .bind(social_metrics.twitter_engagements)
    .bind(manual_scores.creativity)
    .bind(manual_scores.proactivity)
    .bind(leadership)
    .bind(collaboration)
    .bind(bonus_followers)
    .bind(based_on_strategist_growth)
    .bind(comments)
    .fetch_one(pool)
    .await?;

    metrics_from_row(&row)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        intern: String,
        week: String,
        ig_followers: i64,
        ig_views: i64,
        ig_interactions: i64,
        twitter_followers: i64,
        twitter_impressions: i64,
        twitter_engagements: i64,
        creativity: i64,
        proactivity: i64,
        leadership: Option<i64>,
        collaboration: Option<i64>,
        bonus_followers: i64,
        comments: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut imported = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let intern = create_intern(pool, &row.intern, None).await?;
        let social_metrics = SocialMetrics {
            ig_followers: row.ig_followers,
            ig_views: row.ig_views,
            ig_interactions: row.ig_interactions,
            twitter_followers: row.twitter_followers,
            twitter_impressions: row.twitter_impressions,
            twitter_engagements: row.twitter_engagements,
        };
        let manual_scores = ManualScores {
            creativity: row.creativity,
            proactivity: row.proactivity,
            leadership: row.leadership,
            collaboration: row.collaboration,
        };

        record_metrics(
            pool,
            &intern,
            &row.week,
            &social_metrics,
            &manual_scores,
            row.bonus_followers,
            row.comments.as_deref(),
        )
        .await
        .with_context(|| format!("failed to import row for {} / {}", row.intern, row.week))?;
        imported += 1;
    }

    Ok(imported)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let roster = vec![
        ("Maya Torres", Some("IG native, strong reels")),
        ("Devon Clarke", None),
        ("Priya Shah", Some("Handles partner outreach")),
        ("Jonas Weber", None),
        ("Aisha Bello", None),
        ("Leo Tanaka", Some("Joined mid-cycle")),
    ];

    let mut profiles = Vec::new();
    for (name, notes) in roster {
        profiles.push(create_intern(pool, name, notes).await?);
    }

    upsert_week(pool, "Week 1", &[profiles[0].id, profiles[1].id]).await?;
    upsert_week(pool, "Week 2", &[profiles[2].id, profiles[3].id]).await?;

    // Strategists first so Week 1 supports inherit a growth average.
    let graded: Vec<(usize, &str, [i64; 6], i64, i64, i64, i64)> = vec![
        // (roster index, week, social metrics, creativity, proactivity,
        //  leadership-or-collaboration, bonus followers)
        (0, "Week 1", [120, 38_000, 900, 45, 12_000, 310], 24, 16, 8, 12),
        (1, "Week 1", [80, 22_000, 450, 95, 30_000, 600], 20, 18, 7, 0),
        (2, "Week 1", [0, 0, 0, 0, 0, 0], 15, 8, 16, 20),
        (4, "Week 1", [0, 0, 0, 0, 0, 0], 18, 9, 12, 0),
        (2, "Week 2", [140, 41_000, 1_100, 60, 18_000, 400], 26, 15, 9, 10),
        (3, "Week 2", [95, 27_000, 700, 110, 44_000, 850], 22, 17, 6, 30),
        (0, "Week 2", [0, 0, 0, 0, 0, 0], 17, 9, 18, 10),
        (5, "Week 2", [0, 0, 0, 0, 0, 0], 14, 7, 11, 0),
    ];

    for (index, week, social, creativity, proactivity, role_score, bonus) in graded {
        let social_metrics = SocialMetrics {
            ig_followers: social[0],
            ig_views: social[1],
            ig_interactions: social[2],
            twitter_followers: social[3],
            twitter_impressions: social[4],
            twitter_engagements: social[5],
        };
        // record_metrics keeps whichever of the two applies for the role.
        let manual_scores = ManualScores {
            creativity,
            proactivity,
            leadership: Some(role_score),
            collaboration: Some(role_score),
        };
        record_metrics(
            pool,
            &profiles[index],
            week,
            &social_metrics,
            &manual_scores,
            bonus,
            None,
        )
        .await?;
    }

    Ok(())
}
