use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{
    CumulativeEntry, InternProfile, RankedIntern, Role, WeeklyMetrics, WeeklyScore,
    WeeklyStrategists,
};
use crate::scoring;

fn profile_by_id<'a>(profiles: &'a [InternProfile], id: Uuid) -> Option<&'a InternProfile> {
    profiles.iter().find(|profile| profile.id == id)
}

fn strategists_for_week<'a>(
    strategists: &'a [WeeklyStrategists],
    week: &str,
) -> Option<&'a WeeklyStrategists> {
    strategists.iter().find(|entry| entry.week == week)
}

/// Mean strategist growth total for a week, from the strategist metrics
/// recorded so far. `None` until at least one strategist is graded. Used at
/// grading time to snapshot `based_on_strategist_growth` onto Support records.
pub fn strategist_average_growth(
    metrics: &[WeeklyMetrics],
    strategists: &[WeeklyStrategists],
    week: &str,
) -> Option<f64> {
    let pair = strategists_for_week(strategists, week)?;
    let totals: Vec<f64> = metrics
        .iter()
        .filter(|m| m.week == week && pair.strategist_ids.contains(&m.intern_id))
        .map(|m| scoring::strategist_growth(&m.social_metrics).total)
        .collect();

    if totals.is_empty() {
        return None;
    }
    Some(totals.iter().sum::<f64>() / totals.len() as f64)
}

/// Score and rank one week. A week with no strategist pair is not scoreable
/// and yields an empty board; metrics of deleted interns are dropped.
///
/// Entries are sorted descending by total; ties keep input order (stable
/// sort), so the caller's fetch order decides tie order. Ranks are strict
/// 1-based positions, assigned before the role filter, so a filtered board
/// can legitimately show holes in its rank sequence.
pub fn weekly_leaderboard(
    profiles: &[InternProfile],
    metrics: &[WeeklyMetrics],
    strategists: &[WeeklyStrategists],
    week: &str,
    filter: Option<Role>,
) -> Vec<RankedIntern> {
    if strategists_for_week(strategists, week).is_none() {
        return Vec::new();
    }

    let mut entries: Vec<RankedIntern> = metrics
        .iter()
        .filter(|m| m.week == week)
        .filter_map(|m| {
            let profile = profile_by_id(profiles, m.intern_id)?;
            let score = scoring::compose_score(
                m.role,
                &m.social_metrics,
                &m.manual_scores,
                m.bonus_followers,
                m.based_on_strategist_growth,
            );
            Some(RankedIntern {
                profile: profile.clone(),
                weekly_metrics: m.clone(),
                score,
                rank: 0,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.score
            .total
            .partial_cmp(&a.score.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }

    match filter {
        Some(role) => entries
            .into_iter()
            .filter(|entry| entry.weekly_metrics.role == role)
            .collect(),
        None => entries,
    }
}

/// Sum each intern's weekly totals across every week they were graded in.
/// Metrics whose week lost its strategist record are skipped; ranks follow
/// the same strict-sequential, filter-after-ranking rules as the weekly
/// board. The filter retains interns who held the role in any counted week.
pub fn cumulative_leaderboard(
    profiles: &[InternProfile],
    metrics: &[WeeklyMetrics],
    strategists: &[WeeklyStrategists],
    filter: Option<Role>,
) -> Vec<CumulativeEntry> {
    let mut entries: Vec<CumulativeEntry> = Vec::new();
    let mut index_by_intern: HashMap<Uuid, usize> = HashMap::new();

    for m in metrics {
        if strategists_for_week(strategists, &m.week).is_none() {
            continue;
        }
        let Some(profile) = profile_by_id(profiles, m.intern_id) else {
            continue;
        };

        let score = scoring::compose_score(
            m.role,
            &m.social_metrics,
            &m.manual_scores,
            m.bonus_followers,
            m.based_on_strategist_growth,
        );

        let index = *index_by_intern.entry(m.intern_id).or_insert_with(|| {
            entries.push(CumulativeEntry {
                profile: profile.clone(),
                weekly_scores: Vec::new(),
                cumulative_total: 0.0,
                rank: 0,
            });
            entries.len() - 1
        });

        let entry = &mut entries[index];
        entry.cumulative_total = scoring::round2(entry.cumulative_total + score.total);
        entry.weekly_scores.push(WeeklyScore {
            week: m.week.clone(),
            score: score.total,
            role: m.role,
        });
    }

    entries.sort_by(|a, b| {
        b.cumulative_total
            .partial_cmp(&a.cumulative_total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }

    match filter {
        Some(role) => entries
            .into_iter()
            .filter(|entry| entry.weekly_scores.iter().any(|w| w.role == role))
            .collect(),
        None => entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ManualScores, SocialMetrics};

    fn profile(name: &str) -> InternProfile {
        InternProfile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            notes: None,
        }
    }

    fn pair(week: &str, a: &InternProfile, b: &InternProfile) -> WeeklyStrategists {
        WeeklyStrategists {
            week: week.to_string(),
            strategist_ids: vec![a.id, b.id],
        }
    }

    fn strategist_metric(intern: &InternProfile, week: &str, ig_followers: i64) -> WeeklyMetrics {
        WeeklyMetrics {
            id: Uuid::new_v4(),
            intern_id: intern.id,
            week: week.to_string(),
            role: Role::Strategist,
            social_metrics: SocialMetrics {
                ig_followers,
                ..SocialMetrics::default()
            },
            manual_scores: ManualScores::default(),
            bonus_followers: 0,
            based_on_strategist_growth: None,
            comments: None,
        }
    }

    fn support_metric(intern: &InternProfile, week: &str, collaboration: i64) -> WeeklyMetrics {
        WeeklyMetrics {
            id: Uuid::new_v4(),
            intern_id: intern.id,
            week: week.to_string(),
            role: Role::Support,
            social_metrics: SocialMetrics::default(),
            manual_scores: ManualScores {
                collaboration: Some(collaboration),
                ..ManualScores::default()
            },
            bonus_followers: 0,
            based_on_strategist_growth: None,
            comments: None,
        }
    }

    #[test]
    fn week_without_strategist_pair_is_empty() {
        let intern = profile("Maya Torres");
        let metrics = vec![strategist_metric(&intern, "Week 1", 100)];
        let board = weekly_leaderboard(&[intern], &metrics, &[], "Week 1", None);
        assert!(board.is_empty());
    }

    #[test]
    fn metrics_of_deleted_interns_are_dropped() {
        let kept = profile("Maya Torres");
        let gone = profile("Devon Clarke");
        let strategists = vec![pair("Week 1", &kept, &gone)];
        let metrics = vec![
            strategist_metric(&kept, "Week 1", 100),
            strategist_metric(&gone, "Week 1", 200),
        ];

        let board = weekly_leaderboard(&[kept.clone()], &metrics, &strategists, "Week 1", None);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].profile.id, kept.id);
    }

    #[test]
    fn weekly_board_sorts_descending_by_total() {
        let a = profile("Maya Torres");
        let b = profile("Devon Clarke");
        let c = profile("Priya Shah");
        let strategists = vec![pair("Week 1", &a, &b)];
        let metrics = vec![
            strategist_metric(&a, "Week 1", 100),
            strategist_metric(&b, "Week 1", 250),
            support_metric(&c, "Week 1", 18),
        ];

        let board = weekly_leaderboard(
            &[a, b.clone(), c],
            &metrics,
            &strategists,
            "Week 1",
            None,
        );
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].profile.id, b.id);
        assert_eq!(board[0].score.total, 25.0);
        assert_eq!(board[1].score.total, 18.0);
        assert_eq!(board[2].score.total, 10.0);
    }

    #[test]
    fn ties_get_consecutive_ranks_in_input_order() {
        let a = profile("Maya Torres");
        let b = profile("Devon Clarke");
        let strategists = vec![pair("Week 1", &a, &b)];
        // Identical metrics, identical totals.
        let metrics = vec![
            strategist_metric(&a, "Week 1", 800),
            strategist_metric(&b, "Week 1", 800),
        ];

        let board = weekly_leaderboard(
            &[a.clone(), b.clone()],
            &metrics,
            &strategists,
            "Week 1",
            None,
        );
        assert_eq!(board[0].score.total, 80.0);
        assert_eq!(board[1].score.total, 80.0);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].rank, 2);
        // Stable sort keeps the fetch order for equal totals.
        assert_eq!(board[0].profile.id, a.id);
        assert_eq!(board[1].profile.id, b.id);
    }

    #[test]
    fn role_filter_keeps_pre_filter_ranks() {
        let a = profile("Maya Torres");
        let b = profile("Devon Clarke");
        let c = profile("Priya Shah");
        let strategists = vec![pair("Week 1", &a, &b)];
        let metrics = vec![
            strategist_metric(&a, "Week 1", 100),
            strategist_metric(&b, "Week 1", 250),
            support_metric(&c, "Week 1", 18),
        ];
        let profiles = vec![a, b, c.clone()];

        let unfiltered = weekly_leaderboard(&profiles, &metrics, &strategists, "Week 1", None);
        let supports = weekly_leaderboard(
            &profiles,
            &metrics,
            &strategists,
            "Week 1",
            Some(Role::Support),
        );

        assert_eq!(supports.len(), 1);
        assert_eq!(supports[0].profile.id, c.id);
        assert_eq!(supports[0].rank, 2);
        assert_eq!(unfiltered[1].profile.id, c.id);
    }

    #[test]
    fn strategist_average_growth_needs_a_graded_strategist() {
        let a = profile("Maya Torres");
        let b = profile("Devon Clarke");
        let c = profile("Priya Shah");
        let strategists = vec![pair("Week 1", &a, &b)];

        // Only a support graded so far: no average.
        let metrics = vec![support_metric(&c, "Week 1", 10)];
        assert_eq!(
            strategist_average_growth(&metrics, &strategists, "Week 1"),
            None
        );

        // One strategist graded: average is their own total.
        let metrics = vec![strategist_metric(&a, "Week 1", 300)];
        assert_eq!(
            strategist_average_growth(&metrics, &strategists, "Week 1"),
            Some(30.0)
        );

        // Both graded: arithmetic mean.
        let metrics = vec![
            strategist_metric(&a, "Week 1", 300),
            strategist_metric(&b, "Week 1", 100),
        ];
        assert_eq!(
            strategist_average_growth(&metrics, &strategists, "Week 1"),
            Some(20.0)
        );
    }

    #[test]
    fn cumulative_total_sums_weekly_totals() {
        let a = profile("Maya Torres");
        let b = profile("Devon Clarke");
        let strategists = vec![pair("Week 1", &a, &b), pair("Week 2", &a, &b)];
        // Week 1: 600 followers -> 60; Week 2: 450 -> 45.
        let metrics = vec![
            strategist_metric(&a, "Week 1", 600),
            strategist_metric(&a, "Week 2", 450),
        ];

        let board = cumulative_leaderboard(&[a.clone(), b], &metrics, &strategists, None);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].cumulative_total, 105.0);
        assert_eq!(board[0].weekly_scores.len(), 2);
        assert_eq!(board[0].rank, 1);
    }

    #[test]
    fn cumulative_skips_weeks_without_strategist_record() {
        let a = profile("Maya Torres");
        let b = profile("Devon Clarke");
        let strategists = vec![pair("Week 1", &a, &b)];
        let metrics = vec![
            strategist_metric(&a, "Week 1", 600),
            // "Week 2" was deleted; its metric must not count.
            strategist_metric(&a, "Week 2", 450),
        ];

        let board = cumulative_leaderboard(&[a, b], &metrics, &strategists, None);
        assert_eq!(board[0].cumulative_total, 60.0);
        assert_eq!(board[0].weekly_scores.len(), 1);
    }

    #[test]
    fn cumulative_filter_keeps_pre_filter_ranks() {
        let a = profile("Maya Torres");
        let b = profile("Devon Clarke");
        let c = profile("Priya Shah");
        let strategists = vec![pair("Week 1", &a, &b)];
        let metrics = vec![
            strategist_metric(&a, "Week 1", 500),
            strategist_metric(&b, "Week 1", 300),
            support_metric(&c, "Week 1", 20),
        ];

        let board = cumulative_leaderboard(
            &[a, b, c.clone()],
            &metrics,
            &strategists,
            Some(Role::Support),
        );
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].profile.id, c.id);
        assert_eq!(board[0].rank, 3);
    }
}
