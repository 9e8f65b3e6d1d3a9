//! Schedule: lays ranked resources onto upcoming weekdays and adapts durations
//! to the learner's completion rate.

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDateTime, Weekday};
use serde::Serialize;
use tracing::info;

use crate::models::learning::{LearningResource, LearningSession};

/// Hour of day per weekday, indexed by days-from-Monday modulo length.
pub const OPTIMAL_HOURS: [u32; 5] = [7, 19, 20, 7, 19];

const FALLBACK_SKILL_TARGET: &str = "general";

/// Builds one session per weekday starting on `start`'s day.
///
/// A resource longer than `daily_minutes` gets one capped session and the walk
/// moves on to the next day with the same resource only if that session covered
/// it entirely. The remainder of a capped resource is not carried over.
pub fn build_schedule(
    resources: &[Arc<LearningResource>],
    daily_minutes: u32,
    days_ahead: u32,
    start: NaiveDateTime,
) -> Vec<LearningSession> {
    let mut sessions = Vec::new();
    let mut remaining = resources.iter().peekable();
    let start_day = start.date();

    for offset in 0..u64::from(days_ahead) {
        let Some(resource) = remaining.peek() else {
            break;
        };
        let Some(day) = start_day.checked_add_days(Days::new(offset)) else {
            break;
        };
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        let hour = OPTIMAL_HOURS[day.weekday().num_days_from_monday() as usize % OPTIMAL_HOURS.len()];
        let Some(scheduled_time) = day.and_hms_opt(hour, 0, 0) else {
            continue;
        };

        let resource_minutes = resource.estimated_minutes();
        let duration = f64::from(daily_minutes).min(resource_minutes);
        let skill_target = resource
            .skills_covered
            .first()
            .cloned()
            .unwrap_or_else(|| FALLBACK_SKILL_TARGET.to_string());

        sessions.push(LearningSession {
            resource: Arc::clone(resource),
            scheduled_time,
            duration_minutes: (duration as u32).max(1),
            skill_target,
        });

        if resource_minutes <= f64::from(daily_minutes) {
            remaining.next();
        }
    }

    info!(
        sessions_scheduled = sessions.len(),
        days_ahead, daily_minutes, "Built learning schedule"
    );
    sessions
}

/// What `adapt_schedule` did to the durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Adaptation {
    Reduced,
    Increased,
    Unchanged,
}

/// Rescales every session in place from the observed completion rate:
/// below 0.5 shrinks to 70%, above 0.9 grows to 130%, otherwise untouched.
///
/// This mutates the caller's sessions. Repeated calls compound. Durations are
/// truncated to whole minutes, never drop below 1 and saturate at `u32::MAX`.
pub fn adapt_schedule(sessions: &mut [LearningSession], completion_rate: f64) -> Adaptation {
    let (adaptation, percent): (_, u64) = if completion_rate < 0.5 {
        (Adaptation::Reduced, 70)
    } else if completion_rate > 0.9 {
        (Adaptation::Increased, 130)
    } else {
        return Adaptation::Unchanged;
    };

    for session in sessions.iter_mut() {
        let scaled = u64::from(session.duration_minutes) * percent / 100;
        session.duration_minutes = u32::try_from(scaled).unwrap_or(u32::MAX).max(1);
    }

    info!(
        completion_rate,
        sessions = sessions.len(),
        ?adaptation,
        "Adapted schedule"
    );
    adaptation
}
