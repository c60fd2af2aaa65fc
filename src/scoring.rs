use crate::models::{
    GrowthBreakdown, GrowthDetails, GrowthResult, IgScores, ManualScores, Role, ScoreBreakdown,
    SocialMetrics, TwitterScores,
};

// Weekly growth benchmarks. Hitting a benchmark earns the full weight for
// that component; over-performance scales past it.
const FOLLOWERS_BENCHMARK: f64 = 100.0;
const VIEWS_BENCHMARK: f64 = 50_000.0;
const INTERACTIONS_BENCHMARK: f64 = 1_000.0;
const FOLLOWERS_WEIGHT: f64 = 10.0;
const VIEWS_WEIGHT: f64 = 5.0;
const INTERACTIONS_WEIGHT: f64 = 5.0;

/// Growth ceiling for Supports: half of the strategist average, capped here.
const SUPPORT_GROWTH_CAP: f64 = 20.0;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Clamp a raw numeric input to a usable non-negative number. Negative and
/// non-finite values become 0. Upper clamps are role- and field-specific and
/// belong to `compose_score`.
pub fn normalize(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.max(0.0)
    } else {
        0.0
    }
}

/// Growth score for a Strategist, from their own social metrics.
///
/// Followers earn 10 pts per platform at 100/week, views and impressions
/// 5 pts per platform at 50k/week, interactions and engagements 5 pts per
/// platform at 1k/week. Nominal max is 40 but the total is uncapped.
pub fn strategist_growth(metrics: &SocialMetrics) -> GrowthResult {
    let ig_followers =
        normalize(metrics.ig_followers as f64) / FOLLOWERS_BENCHMARK * FOLLOWERS_WEIGHT;
    let twitter_followers =
        normalize(metrics.twitter_followers as f64) / FOLLOWERS_BENCHMARK * FOLLOWERS_WEIGHT;
    let followers_score = ig_followers + twitter_followers;

    let ig_views = normalize(metrics.ig_views as f64) / VIEWS_BENCHMARK * VIEWS_WEIGHT;
    let twitter_impressions =
        normalize(metrics.twitter_impressions as f64) / VIEWS_BENCHMARK * VIEWS_WEIGHT;
    let views_score = ig_views + twitter_impressions;

    let ig_interactions =
        normalize(metrics.ig_interactions as f64) / INTERACTIONS_BENCHMARK * INTERACTIONS_WEIGHT;
    let twitter_engagements = normalize(metrics.twitter_engagements as f64)
        / INTERACTIONS_BENCHMARK
        * INTERACTIONS_WEIGHT;
    let interactions_score = ig_interactions + twitter_engagements;

    GrowthResult {
        total: round2(followers_score + views_score + interactions_score),
        details: GrowthDetails {
            followers_score: round2(followers_score),
            views_score: round2(views_score),
            interactions_score: round2(interactions_score),
            based_on_strategist_average: None,
            breakdown: Some(GrowthBreakdown {
                ig: IgScores {
                    followers: round2(ig_followers),
                    views: round2(ig_views),
                    interactions: round2(ig_interactions),
                },
                twitter: TwitterScores {
                    followers: round2(twitter_followers),
                    impressions: round2(twitter_impressions),
                    engagements: round2(twitter_engagements),
                },
            }),
        },
    }
}

/// Growth score for a Support: half of the strategist average for the week,
/// capped at 20.
pub fn support_growth(strategist_average: f64) -> GrowthResult {
    let average = normalize(strategist_average);
    GrowthResult {
        total: round2((average / 2.0).min(SUPPORT_GROWTH_CAP)),
        details: GrowthDetails {
            followers_score: 0.0,
            views_score: 0.0,
            interactions_score: 0.0,
            based_on_strategist_average: Some(average),
            breakdown: None,
        },
    }
}

/// Fallback when no strategist has been graded for the week yet.
pub fn zero_growth() -> GrowthResult {
    GrowthResult {
        total: 0.0,
        details: GrowthDetails {
            followers_score: 0.0,
            views_score: 0.0,
            interactions_score: 0.0,
            based_on_strategist_average: None,
            breakdown: None,
        },
    }
}

/// Bonus points for followers contributed to the Studio X partner brand
/// accounts: 5 pts per complete block of 10, no partial credit, no cap.
pub fn bonus_points(bonus_followers: i64) -> i64 {
    bonus_followers.max(0) / 10 * 5
}

fn capped(raw: i64, cap: f64) -> f64 {
    normalize(raw as f64).min(cap)
}

/// Assemble the complete weekly breakdown for one graded record.
///
/// Strategists: growth (uncapped) + creativity (max 30) + proactivity
/// (max 20) + leadership (max 10) + bonus. Supports: collaboration (max 20) +
/// inherited growth (max 20) + creativity (max 20) + proactivity (max 10) +
/// bonus. Out-of-range manual scores are clamped, never rejected.
pub fn compose_score(
    role: Role,
    social_metrics: &SocialMetrics,
    manual_scores: &ManualScores,
    bonus_followers: i64,
    based_on_strategist_growth: Option<f64>,
) -> ScoreBreakdown {
    let bonus = bonus_points(bonus_followers);

    match role {
        Role::Strategist => {
            let growth = strategist_growth(social_metrics);
            let creativity = capped(manual_scores.creativity, 30.0);
            let proactivity = capped(manual_scores.proactivity, 20.0);
            let leadership = capped(manual_scores.leadership.unwrap_or(0), 10.0);
            let total = growth.total + creativity + proactivity + leadership + bonus as f64;

            ScoreBreakdown {
                growth: growth.total,
                creativity,
                proactivity,
                leadership: Some(leadership),
                collaboration: None,
                bonus,
                total: round2(total),
                growth_details: growth.details,
            }
        }
        Role::Support => {
            let growth = match based_on_strategist_growth {
                Some(average) => support_growth(average),
                None => zero_growth(),
            };
            let collaboration = capped(manual_scores.collaboration.unwrap_or(0), 20.0);
            let creativity = capped(manual_scores.creativity, 20.0);
            let proactivity = capped(manual_scores.proactivity, 10.0);
            let total = collaboration + growth.total + creativity + proactivity + bonus as f64;

            ScoreBreakdown {
                growth: growth.total,
                creativity,
                proactivity,
                leadership: None,
                collaboration: Some(collaboration),
                bonus,
                total: round2(total),
                growth_details: growth.details,
            }
        }
    }
}
