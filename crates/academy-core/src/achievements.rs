//! Achievement badges derived from aggregate progress

use academy_api::Achievement;

/// Minutes of practice needed for the time badge
pub const TIME_INVESTED_MINUTES: u64 = 300;

/// Aggregate figures achievements are computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSummary {
    pub completed_sessions: usize,
    pub total_sessions: usize,
    pub percent: u32,
    pub total_minutes: u64,
}

/// Evaluate every achievement, earned or not, in display order
pub fn evaluate(summary: &ProgressSummary) -> Vec<Achievement> {
    let all_done =
        summary.total_sessions > 0 && summary.completed_sessions >= summary.total_sessions;

    vec![
        Achievement {
            id: "first-session",
            title: "First Steps",
            description: "Complete your first session",
            earned: summary.completed_sessions >= 1,
        },
        Achievement {
            id: "week-one",
            title: "Week One Warrior",
            description: "Complete all Week 1 sessions",
            earned: summary.completed_sessions >= 4,
        },
        Achievement {
            id: "halfway",
            title: "Halfway There",
            description: "Reach 50% overall progress",
            earned: summary.percent >= 50,
        },
        Achievement {
            id: "time-invested",
            title: "Dedicated Learner",
            description: "Spend 5 hours learning",
            earned: summary.total_minutes >= TIME_INVESTED_MINUTES,
        },
        Achievement {
            id: "linux-master",
            title: "Linux Master",
            description: "Complete the entire course",
            earned: all_done,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn earned(summary: ProgressSummary) -> Vec<&'static str> {
        evaluate(&summary)
            .into_iter()
            .filter(|a| a.earned)
            .map(|a| a.id)
            .collect()
    }

    #[test]
    fn nothing_earned_at_start() {
        let summary = ProgressSummary {
            completed_sessions: 0,
            total_sessions: 8,
            percent: 0,
            total_minutes: 0,
        };
        assert!(earned(summary).is_empty());
        assert_eq!(evaluate(&summary).len(), 5);
    }

    #[test]
    fn thresholds() {
        let summary = ProgressSummary {
            completed_sessions: 4,
            total_sessions: 8,
            percent: 50,
            total_minutes: 299,
        };
        assert_eq!(earned(summary), ["first-session", "week-one", "halfway"]);

        let summary = ProgressSummary {
            completed_sessions: 8,
            total_sessions: 8,
            percent: 100,
            total_minutes: 300,
        };
        assert_eq!(earned(summary).len(), 5);
    }

    #[test]
    fn empty_curriculum_is_never_mastered() {
        let summary = ProgressSummary {
            completed_sessions: 0,
            total_sessions: 0,
            percent: 0,
            total_minutes: 0,
        };
        assert!(!earned(summary).contains(&"linux-master"));
    }
}
