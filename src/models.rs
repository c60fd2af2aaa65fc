use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role an intern holds for one specific week. The same intern can be a
/// Strategist one week and Support the next, so the role is stored per
/// metric record and never re-derived from later strategist assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Strategist,
    Support,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Strategist => "Strategist",
            Role::Support => "Support",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Strategist" => Ok(Role::Strategist),
            "Support" => Ok(Role::Support),
            other => Err(anyhow::anyhow!("unknown role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The strategist pair opened for a week. Always exactly two distinct ids;
/// enforced on create/update and by a CHECK constraint in the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStrategists {
    pub week: String,
    pub strategist_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMetrics {
    pub ig_followers: i64,
    pub ig_views: i64,
    pub ig_interactions: i64,
    pub twitter_followers: i64,
    pub twitter_impressions: i64,
    pub twitter_engagements: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualScores {
    pub creativity: i64,
    pub proactivity: i64,
    /// Strategists only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leadership: Option<i64>,
    /// Supports only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaboration: Option<i64>,
}

/// One graded record per (intern, week) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyMetrics {
    pub id: Uuid,
    pub intern_id: Uuid,
    pub week: String,
    pub role: Role,
    pub social_metrics: SocialMetrics,
    pub manual_scores: ManualScores,
    pub bonus_followers: i64,
    /// Snapshot of the strategist average growth this Support record was
    /// graded against. Absent until at least one strategist is graded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on_strategist_growth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IgScores {
    pub followers: f64,
    pub views: f64,
    pub interactions: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TwitterScores {
    pub followers: f64,
    pub impressions: f64,
    pub engagements: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthBreakdown {
    pub ig: IgScores,
    pub twitter: TwitterScores,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthDetails {
    pub followers_score: f64,
    pub views_score: f64,
    pub interactions_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on_strategist_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<GrowthBreakdown>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthResult {
    pub total: f64,
    pub details: GrowthDetails,
}

/// Full audit breakdown of one intern's weekly score. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub growth: f64,
    pub creativity: f64,
    pub proactivity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leadership: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaboration: Option<f64>,
    pub bonus: i64,
    pub total: f64,
    pub growth_details: GrowthDetails,
}

impl ScoreBreakdown {
    /// The role-specific manual sub-score, for the shared
    /// "Leadership/Collaboration" display column.
    pub fn leadership_or_collaboration(&self) -> f64 {
        self.leadership.or(self.collaboration).unwrap_or(0.0)
    }
}

/// One row of a weekly leaderboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedIntern {
    pub profile: InternProfile,
    pub weekly_metrics: WeeklyMetrics,
    pub score: ScoreBreakdown,
    pub rank: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyScore {
    pub week: String,
    pub score: f64,
    pub role: Role,
}

/// One row of the cumulative leaderboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeEntry {
    pub profile: InternProfile,
    pub weekly_scores: Vec<WeeklyScore>,
    pub cumulative_total: f64,
    pub rank: usize,
}
