use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{CumulativeEntry, RankedIntern};

/// Render a ranked week as CSV, in the shared export column order.
pub fn leaderboard_csv(entries: &[RankedIntern]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Rank",
        "Name",
        "Role",
        "Growth",
        "Creativity",
        "Proactivity",
        "Leadership/Collaboration",
        "Bonus",
        "Total Score",
    ])?;

    for entry in entries {
        writer.write_record([
            entry.rank.to_string(),
            entry.profile.name.clone(),
            entry.weekly_metrics.role.to_string(),
            format!("{:.2}", entry.score.growth),
            format!("{:.2}", entry.score.creativity),
            format!("{:.2}", entry.score.proactivity),
            format!("{:.2}", entry.score.leadership_or_collaboration()),
            entry.score.bonus.to_string(),
            format!("{:.2}", entry.score.total),
        ])?;
    }

    Ok(String::from_utf8(writer.into_inner()?)?)
}

pub fn build_report(
    week: Option<&str>,
    weekly: &[RankedIntern],
    cumulative: &[CumulativeEntry],
    generated_on: NaiveDate,
) -> String {
    let mut output = String::new();
    let week_label = week.unwrap_or("all weeks");

    let _ = writeln!(output, "# Studio X Intern Leaderboard");
    let _ = writeln!(
        output,
        "Generated {} for {}",
        generated_on, week_label
    );

    if let Some(week) = week {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {week} Standings");

        if weekly.is_empty() {
            let _ = writeln!(output, "No graded interns for this week.");
        } else {
            for entry in weekly {
                let _ = writeln!(
                    output,
                    "{}. {} ({}) — {:.2} pts (growth {:.2}, creativity {:.2}, proactivity {:.2}, {} {:.2}, bonus {})",
                    entry.rank,
                    entry.profile.name,
                    entry.weekly_metrics.role,
                    entry.score.total,
                    entry.score.growth,
                    entry.score.creativity,
                    entry.score.proactivity,
                    if entry.score.leadership.is_some() {
                        "leadership"
                    } else {
                        "collaboration"
                    },
                    entry.score.leadership_or_collaboration(),
                    entry.score.bonus
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Cumulative Standings");

    if cumulative.is_empty() {
        let _ = writeln!(output, "No interns graded yet.");
    } else {
        for entry in cumulative.iter().take(10) {
            let _ = writeln!(
                output,
                "{}. {} — {:.2} pts across {} week(s)",
                entry.rank,
                entry.profile.name,
                entry.cumulative_total,
                entry.weekly_scores.len()
            );
        }
    }

    let comments: Vec<&RankedIntern> = weekly
        .iter()
        .filter(|entry| entry.weekly_metrics.comments.is_some())
        .collect();
    if !comments.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Grader Comments");
        for entry in comments {
            let _ = writeln!(
                output,
                "- {}: {}",
                entry.profile.name,
                entry.weekly_metrics.comments.as_deref().unwrap_or_default()
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::weekly_leaderboard;
    use crate::models::{
        InternProfile, ManualScores, Role, SocialMetrics, WeeklyMetrics, WeeklyStrategists,
    };
    use uuid::Uuid;

    fn fixture_week() -> (Vec<InternProfile>, Vec<WeeklyMetrics>, Vec<WeeklyStrategists>) {
        let strategist = InternProfile {
            id: Uuid::new_v4(),
            name: "Maya Torres".to_string(),
            notes: None,
        };
        let support = InternProfile {
            id: Uuid::new_v4(),
            name: "Priya Shah".to_string(),
            notes: None,
        };
        let other = InternProfile {
            id: Uuid::new_v4(),
            name: "Devon Clarke".to_string(),
            notes: None,
        };
        let strategists = vec![WeeklyStrategists {
            week: "Week 1".to_string(),
            strategist_ids: vec![strategist.id, other.id],
        }];
        let metrics = vec![
            WeeklyMetrics {
                id: Uuid::new_v4(),
                intern_id: strategist.id,
                week: "Week 1".to_string(),
                role: Role::Strategist,
                social_metrics: SocialMetrics {
                    ig_followers: 100,
                    ..SocialMetrics::default()
                },
                manual_scores: ManualScores {
                    creativity: 20,
                    proactivity: 10,
                    leadership: Some(5),
                    collaboration: None,
                },
                bonus_followers: 10,
                based_on_strategist_growth: None,
                comments: Some("Strong reels week".to_string()),
            },
            WeeklyMetrics {
                id: Uuid::new_v4(),
                intern_id: support.id,
                week: "Week 1".to_string(),
                role: Role::Support,
                social_metrics: SocialMetrics::default(),
                manual_scores: ManualScores {
                    creativity: 12,
                    proactivity: 6,
                    leadership: None,
                    collaboration: Some(15),
                },
                bonus_followers: 0,
                based_on_strategist_growth: Some(10.0),
                comments: None,
            },
        ];
        (vec![strategist, support, other], metrics, strategists)
    }

    #[test]
    fn csv_uses_the_shared_column_order() {
        let (profiles, metrics, strategists) = fixture_week();
        let board = weekly_leaderboard(&profiles, &metrics, &strategists, "Week 1", None);
        let csv = leaderboard_csv(&board).expect("csv rendering");

        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Rank,Name,Role,Growth,Creativity,Proactivity,\
                 Leadership/Collaboration,Bonus,Total Score"
            )
        );
        // Strategist: 10 growth + 20 + 10 + 5 + 5 bonus = 50.
        assert_eq!(
            lines.next(),
            Some("1,Maya Torres,Strategist,10.00,20.00,10.00,5.00,5,50.00")
        );
        // Support: 5 inherited growth + 12 + 6 + 15 = 38.
        assert_eq!(
            lines.next(),
            Some("2,Priya Shah,Support,5.00,12.00,6.00,15.00,0,38.00")
        );
    }

    #[test]
    fn report_covers_weekly_cumulative_and_comments() {
        let (profiles, metrics, strategists) = fixture_week();
        let board = weekly_leaderboard(&profiles, &metrics, &strategists, "Week 1", None);
        let cumulative =
            crate::leaderboard::cumulative_leaderboard(&profiles, &metrics, &strategists, None);
        let generated = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();

        let report = build_report(Some("Week 1"), &board, &cumulative, generated);
        assert!(report.contains("## Week 1 Standings"));
        assert!(report.contains("1. Maya Torres (Strategist) — 50.00 pts"));
        assert!(report.contains("## Cumulative Standings"));
        assert!(report.contains("1. Maya Torres — 50.00 pts across 1 week(s)"));
        assert!(report.contains("## Grader Comments"));
        assert!(report.contains("- Maya Torres: Strong reels week"));
    }

    #[test]
    fn report_without_week_skips_the_weekly_section() {
        let report = build_report(
            None,
            &[],
            &[],
            NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
        );
        assert!(report.contains("for all weeks"));
        assert!(!report.contains("Standings\nNo graded interns"));
        assert!(report.contains("No interns graded yet."));
    }
}
