//! Ordered projection of user timers and pending activity timeouts.
//!
//! The builder caches an ordered view of the run's timers so the handler
//! can tell whether a batch produced a new earliest wake-up that must be
//! persisted to the timer queue. The cache is a projection only: after a
//! timer is deleted the handler discards the builder and reloads from the
//! authoritative mutable state rather than patching the cached view.

use chrono::Duration;

use crate::execution::{ActivityInfo, TimerInfo};
use crate::mutable_state::MutableState;
use crate::tasks::TimerTask;
use tideway_shared::TimeoutType;

#[derive(Default)]
pub struct TimerBuilder {
    /// Live user timers ordered by (expiry time, timer id).
    user_timers: Vec<TimerInfo>,
    /// Started-event ids of timers added since the builder was (re)built.
    new_timer_ids: Vec<i64>,
    /// Activities scheduled since the builder was (re)built.
    new_activities: Vec<ActivityInfo>,
}

impl TimerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the ordered view from the authoritative state.
    pub fn load_user_timers(&mut self, mutable_state: &dyn MutableState) {
        self.user_timers = mutable_state.pending_timer_infos();
        self.sort_timers();
        self.new_timer_ids.clear();
        self.new_activities.clear();
    }

    /// Insert a timer started by the current batch.
    pub fn add_user_timer(&mut self, info: TimerInfo) {
        self.new_timer_ids.push(info.started_id);
        self.user_timers.push(info);
        self.sort_timers();
    }

    /// Record an activity scheduled by the current batch so its
    /// schedule-to-start timeout can be enqueued.
    pub fn add_scheduled_activity(&mut self, info: ActivityInfo) {
        self.new_activities.push(info);
    }

    /// The user-timer task to persist, if the batch produced a new earliest
    /// timer. An earliest timer that was already live needs no task: the
    /// timer queue holds one for it.
    pub fn first_timer_task(&self) -> Option<TimerTask> {
        let first = self.user_timers.first()?;
        if !self.new_timer_ids.contains(&first.started_id) {
            return None;
        }
        Some(TimerTask::UserTimer {
            visibility_time: first.expiry_time,
            event_id: first.started_id,
        })
    }

    /// The schedule-to-start timeout task for the earliest activity
    /// scheduled by the current batch, if any.
    pub fn first_activity_timer_task(&self) -> Option<TimerTask> {
        self.new_activities
            .iter()
            .map(|info| {
                let visibility_time = info.scheduled_time
                    + Duration::seconds(i64::from(info.schedule_to_start_timeout_seconds));
                (visibility_time, info)
            })
            .min_by_key(|(visibility_time, info)| (*visibility_time, info.schedule_id))
            .map(|(visibility_time, info)| TimerTask::ActivityTimeout {
                visibility_time,
                timeout_type: TimeoutType::ScheduleToStart,
                event_id: info.schedule_id,
                attempt: info.attempt,
            })
    }

    fn sort_timers(&mut self) {
        self.user_timers
            .sort_by(|a, b| (a.expiry_time, &a.timer_id).cmp(&(b.expiry_time, &b.timer_id)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn timer(id: &str, started_id: i64, offset_seconds: i64) -> TimerInfo {
        TimerInfo {
            timer_id: id.to_string(),
            started_id,
            expiry_time: Utc::now() + Duration::seconds(offset_seconds),
            task_id: tideway_shared::EMPTY_TASK_ID,
        }
    }

    #[test]
    fn test_new_earliest_timer_yields_task() {
        let mut builder = TimerBuilder::new();
        builder.add_user_timer(timer("t1", 5, 60));
        builder.add_user_timer(timer("t2", 7, 30));

        match builder.first_timer_task() {
            Some(TimerTask::UserTimer { event_id, .. }) => assert_eq!(event_id, 7),
            other => panic!("unexpected task: {other:?}"),
        }
    }

    #[test]
    fn test_preexisting_earliest_timer_yields_no_task() {
        let mut state = crate::testing::InMemoryMutableState::started("d-1", "wf", "run");
        state.put_timer(timer("t1", 5, 10));

        let mut builder = TimerBuilder::new();
        builder.load_user_timers(&state);
        // new timer fires later than the live one
        builder.add_user_timer(timer("t2", 9, 60));
        assert_eq!(builder.first_timer_task(), None);
    }

    #[test]
    fn test_empty_builder_yields_no_task() {
        assert_eq!(TimerBuilder::new().first_timer_task(), None);
        assert_eq!(TimerBuilder::new().first_activity_timer_task(), None);
    }

    #[test]
    fn test_activity_timer_task_uses_schedule_to_start() {
        let mut builder = TimerBuilder::new();
        let scheduled = Utc::now();
        builder.add_scheduled_activity(ActivityInfo {
            schedule_id: 11,
            started_id: tideway_shared::EMPTY_EVENT_ID,
            activity_id: "a1".to_string(),
            scheduled_time: scheduled,
            schedule_to_close_timeout_seconds: 60,
            schedule_to_start_timeout_seconds: 10,
            start_to_close_timeout_seconds: 50,
            heartbeat_timeout_seconds: 0,
            attempt: 0,
            cancel_requested: false,
            cancel_request_id: tideway_shared::EMPTY_EVENT_ID,
        });

        match builder.first_activity_timer_task() {
            Some(TimerTask::ActivityTimeout {
                visibility_time,
                timeout_type,
                event_id,
                ..
            }) => {
                assert_eq!(event_id, 11);
                assert_eq!(timeout_type, TimeoutType::ScheduleToStart);
                assert_eq!(visibility_time, scheduled + Duration::seconds(10));
            }
            other => panic!("unexpected task: {other:?}"),
        }
    }
}
