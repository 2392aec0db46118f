//! Pure projections of timer state.

use serde::{Deserialize, Serialize};

use super::state::{duration_secs, TimerPhase, TimerState};

/// `MM:SS`, zero padded. Minutes grow past two digits for long sessions.
pub fn format_time(remaining_seconds: u32) -> String {
    format!("{:02}:{:02}", remaining_seconds / 60, remaining_seconds % 60)
}

/// Percent of the session still remaining, 0.0 ..= 100.0.
/// A zero-minute session counts as 100.
pub fn progress(remaining_seconds: u32, selected_duration: u32) -> f64 {
    let total = duration_secs(selected_duration);
    if total == 0 {
        return 100.0;
    }
    (f64::from(remaining_seconds) / f64::from(total) * 100.0).min(100.0)
}

/// The gradation after `current` in ascending order. Wraps to the smallest
/// when `current` is the largest or not a gradation at all.
pub fn next_duration(current: u32, gradations: &[u32]) -> Option<u32> {
    let mut sorted = gradations.to_vec();
    sorted.sort_unstable();
    match sorted.iter().position(|&g| g == current) {
        Some(i) if i + 1 < sorted.len() => Some(sorted[i + 1]),
        _ => sorted.first().copied(),
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerView {
    pub formatted_time: String,
    pub progress: f64,
    pub phase: TimerPhase,
    pub is_cooldown: bool,
    pub task_name: String,
}

impl From<&TimerState> for TimerView {
    fn from(state: &TimerState) -> Self {
        Self {
            formatted_time: state.formatted_time(),
            progress: state.progress(),
            phase: state.phase(),
            is_cooldown: state.is_cooldown,
            task_name: state.task_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const GRADATIONS: [u32; 5] = [1, 5, 10, 20, 40];

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(3599), "59:59");
        assert_eq!(format_time(6000), "100:00");
    }

    #[test]
    fn progress_edges() {
        assert_eq!(progress(600, 10), 100.0);
        assert_eq!(progress(0, 10), 0.0);
        assert_eq!(progress(300, 10), 50.0);
        assert_eq!(progress(0, 0), 100.0);
    }

    #[test]
    fn next_duration_advances_and_wraps() {
        assert_eq!(next_duration(10, &GRADATIONS), Some(20));
        assert_eq!(next_duration(40, &GRADATIONS), Some(1));
        assert_eq!(next_duration(7, &GRADATIONS), Some(1));
        assert_eq!(next_duration(1, &[20, 1, 5]), Some(5));
        assert_eq!(next_duration(5, &[]), None);
    }

    #[test]
    fn view_reflects_state() {
        let state = TimerState {
            selected_duration: 20,
            remaining_seconds: 65,
            is_running: true,
            task_name: "docs".into(),
            ..TimerState::default()
        };
        let view = TimerView::from(&state);
        assert_eq!(view.formatted_time, "01:05");
        assert_eq!(view.phase, TimerPhase::Running);
        assert_eq!(view.task_name, "docs");
    }

    proptest! {
        #[test]
        fn progress_stays_in_bounds(minutes in 0u32..600, frac in 0.0f64..=1.0) {
            let total = minutes * 60;
            let remaining = (f64::from(total) * frac) as u32;
            let p = progress(remaining, minutes);
            prop_assert!((0.0..=100.0).contains(&p));
            if remaining == total {
                prop_assert_eq!(p, 100.0);
            }
        }

        #[test]
        fn formatted_time_parses_back(secs in 0u32..360_000) {
            let text = format_time(secs);
            let (m, s) = text.split_once(':').unwrap();
            prop_assert_eq!(s.len(), 2);
            prop_assert!(m.len() >= 2);
            prop_assert_eq!(m.parse::<u32>().unwrap() * 60 + s.parse::<u32>().unwrap(), secs);
        }

        #[test]
        fn next_duration_is_a_gradation(current in 0u32..100, grads in proptest::collection::vec(1u32..100, 1..8)) {
            let next = next_duration(current, &grads).unwrap();
            prop_assert!(grads.contains(&next));
        }
    }
}
