//! Playback controls for algorithm traces.

use std::time::Duration;

use algoviz_trace::{generate_trace_with, Algorithm, Error as TraceError, GenerationOptions, Input, Step, Trace};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::timer::{Timer, TimerToken};

/// Auto-advance speed on a 1 (slowest) to 10 (fastest) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct PlaybackSpeed(u8);

impl PlaybackSpeed {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(10);
    pub const DEFAULT: Self = Self(5);

    /// Clamp `value` into the valid range.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(Self::MIN.0 as i64, Self::MAX.0 as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Delay between ticks: 1000ms at speed 1 down to 100ms at speed 10.
    pub fn period(self) -> Duration {
        Duration::from_millis(1100 - u64::from(self.0) * 100)
    }
}

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i64> for PlaybackSpeed {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<PlaybackSpeed> for u8 {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.0
    }
}

/// Current state of playback, as shown to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Parked on the first step
    Stopped,
    /// Auto-advancing
    Playing,
    /// Stopped part-way through
    Paused,
    /// Parked on the terminal step
    Finished,
}

/// Playback controller for one algorithm over one input.
///
/// Owns the trace. The trace is generated lazily the first time it is needed
/// and dropped whenever the input, algorithm, or generation options change.
pub struct Playback<T: Timer> {
    algorithm: Algorithm,
    input: Input,
    options: GenerationOptions,
    trace: Option<Trace>,
    current: usize,
    running: bool,
    speed: PlaybackSpeed,
    timer: T,
    pending: Option<TimerToken>,
}

impl<T: Timer> Playback<T> {
    /// Create a playback controller. Fails if `algorithm` can't run on `input`.
    pub fn new(algorithm: Algorithm, input: Input, timer: T) -> Result<Self> {
        check_compatible(algorithm, &input)?;
        Ok(Self {
            algorithm,
            input,
            options: GenerationOptions::default(),
            trace: None,
            current: 0,
            running: false,
            speed: PlaybackSpeed::default(),
            timer,
            pending: None,
        })
    }

    /// Builder-style override of generation options.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.invalidate();
        self.options = options;
        self
    }

    /// The algorithm being played.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The input being played.
    pub fn input(&self) -> &Input {
        &self.input
    }

    /// The current trace, if one has been generated.
    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    /// The step the viewer should show.
    pub fn current_step(&self) -> Option<&Step> {
        self.trace.as_ref()?.get(self.current)
    }

    /// Index of the current step.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Number of steps in the trace (0 before generation).
    pub fn total_steps(&self) -> usize {
        self.trace.as_ref().map_or(0, Trace::len)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Derived viewer state.
    pub fn state(&self) -> PlaybackState {
        if self.running {
            PlaybackState::Playing
        } else if self.trace.is_some() && self.current == self.last_index() && self.current > 0 {
            PlaybackState::Finished
        } else if self.current == 0 {
            PlaybackState::Stopped
        } else {
            PlaybackState::Paused
        }
    }

    /// Progress through the trace as a fraction (0.0 - 1.0).
    ///
    /// A single-step trace is complete as soon as it exists.
    pub fn progress(&self) -> f64 {
        match &self.trace {
            None => 0.0,
            Some(trace) if trace.last_index() == 0 => 1.0,
            Some(trace) => self.current as f64 / trace.last_index() as f64,
        }
    }

    /// Generate the trace now if it doesn't exist yet.
    pub fn prepare(&mut self) -> Result<&Trace> {
        let trace = match self.trace.take() {
            Some(trace) => trace,
            None => {
                let trace = generate_trace_with(&self.input, self.algorithm, &self.options)?;
                if let Some(limit) = trace.limit_exceeded() {
                    tracing::warn!(%limit, algorithm = %self.algorithm, "playing a truncated trace");
                }
                trace
            }
        };
        Ok(self.trace.insert(trace))
    }

    /// Begin auto-advancing. Does nothing if already running.
    ///
    /// Playback parked on the terminal step starts over from the beginning.
    pub fn start(&mut self) -> Result<()> {
        if self.running {
            return Ok(());
        }
        let last = self.prepare()?.last_index();
        if self.current >= last {
            self.current = 0;
        }
        self.running = true;
        self.schedule();
        tracing::info!(algorithm = %self.algorithm, index = self.current, "playback started");
        Ok(())
    }

    /// Stop auto-advancing, keeping position and trace. Does nothing if
    /// already paused.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.cancel_pending();
        tracing::info!(index = self.current, "playback paused");
    }

    /// Start if paused, pause if running.
    pub fn toggle(&mut self) -> Result<()> {
        if self.running {
            self.pause();
            Ok(())
        } else {
            self.start()
        }
    }

    /// Advance one step without starting auto-advance.
    ///
    /// Returns the new current step, or `None` if already at the end.
    pub fn step_forward(&mut self) -> Result<Option<&Step>> {
        let last = self.prepare()?.last_index();
        if self.current >= last {
            return Ok(None);
        }
        self.current += 1;
        Ok(self.current_step())
    }

    /// Move back one step. Pauses auto-advance.
    pub fn step_backward(&mut self) {
        if self.current > 0 {
            self.pause();
            self.current -= 1;
        }
    }

    /// Jump straight to `index`, clamped to the trace. Pauses auto-advance.
    pub fn set_index(&mut self, index: usize) -> Result<()> {
        let last = self.prepare()?.last_index();
        self.pause();
        self.current = index.min(last);
        Ok(())
    }

    /// Stop and return to the first step. The trace is kept for replay.
    pub fn reset(&mut self) {
        self.running = false;
        self.cancel_pending();
        self.current = 0;
    }

    /// Change the speed. A tick already scheduled keeps its old period.
    pub fn set_speed(&mut self, value: i64) -> PlaybackSpeed {
        self.speed = PlaybackSpeed::new(value);
        self.speed
    }

    /// Replace the input. Validation happens first; on error nothing changes.
    pub fn set_input(&mut self, input: Input) -> Result<()> {
        self.load(self.algorithm, input)
    }

    /// Switch algorithm, keeping the input.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) -> Result<()> {
        check_compatible(algorithm, &self.input)?;
        self.replace(|pb| pb.algorithm = algorithm)
    }

    /// Replace algorithm and input together.
    pub fn load(&mut self, algorithm: Algorithm, input: Input) -> Result<()> {
        check_compatible(algorithm, &input)?;
        self.replace(move |pb| {
            pb.algorithm = algorithm;
            pb.input = input;
        })
    }

    /// Handle a fired timer token.
    ///
    /// Returns true if playback state changed. Stale tokens are ignored.
    pub fn on_tick(&mut self, token: TimerToken) -> bool {
        if self.pending != Some(token) {
            tracing::debug!(?token, "ignoring stale tick");
            return false;
        }
        self.pending = None;
        if !self.running {
            return false;
        }

        let last = self.last_index();
        if self.current >= last {
            self.running = false;
            tracing::info!(index = self.current, "playback finished");
        } else {
            self.current += 1;
            self.schedule();
        }
        true
    }

    fn last_index(&self) -> usize {
        self.trace.as_ref().map_or(0, Trace::last_index)
    }

    /// Stop, drop the trace, apply `change`, then resume if we were running.
    fn replace(&mut self, change: impl FnOnce(&mut Self)) -> Result<()> {
        let was_running = self.running;
        self.invalidate();
        change(self);
        tracing::info!(algorithm = %self.algorithm, restart = was_running, "input replaced");
        if was_running {
            self.start()?;
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.running = false;
        self.cancel_pending();
        self.trace = None;
        self.current = 0;
    }

    fn schedule(&mut self) {
        self.cancel_pending();
        self.pending = Some(self.timer.schedule_after(self.speed.period()));
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            self.timer.cancel(token);
        }
    }
}

fn check_compatible(algorithm: Algorithm, input: &Input) -> std::result::Result<(), TraceError> {
    if algorithm.input_kind() != input.kind() {
        return Err(TraceError::InputMismatch {
            algorithm,
            expected: algorithm.input_kind(),
            actual: input.kind(),
        });
    }
    Ok(())
}

/// Playback status for sending to the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub algorithm: Algorithm,
    pub current_index: usize,
    pub total_steps: usize,
    pub state: PlaybackState,
    pub running: bool,
    pub speed: PlaybackSpeed,
    pub period_ms: u64,
    pub progress: f64,
    /// Set when the trace stopped at the generation safety bound
    pub warning: Option<String>,
}

impl<T: Timer> From<&Playback<T>> for PlaybackStatus {
    fn from(playback: &Playback<T>) -> Self {
        Self {
            algorithm: playback.algorithm,
            current_index: playback.current,
            total_steps: playback.total_steps(),
            state: playback.state(),
            running: playback.running,
            speed: playback.speed,
            period_ms: playback.speed.period().as_millis() as u64,
            progress: playback.progress(),
            warning: playback
                .trace
                .as_ref()
                .and_then(Trace::limit_exceeded)
                .map(ToString::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualTimer;
    use algoviz_trace::Graph;

    fn sort_playback(values: &str) -> Playback<ManualTimer> {
        let input = Input::parse_sequence(values).unwrap();
        Playback::new(Algorithm::BubbleSort, input, ManualTimer::new()).unwrap()
    }

    /// Deliver fired tokens until the clock has moved `ms` forward.
    fn run_for(playback: &mut Playback<ManualTimer>, ms: u64) {
        for _ in 0..ms {
            let fired = playback.timer_mut().advance(Duration::from_millis(1));
            for token in fired {
                playback.on_tick(token);
            }
        }
    }

    fn run_to_end(playback: &mut Playback<ManualTimer>) {
        while let Some(token) = playback.timer_mut().fire_next() {
            playback.on_tick(token);
        }
    }

    #[test]
    fn speed_maps_to_period() {
        assert_eq!(PlaybackSpeed::new(1).period(), Duration::from_millis(1000));
        assert_eq!(PlaybackSpeed::new(5).period(), Duration::from_millis(600));
        assert_eq!(PlaybackSpeed::new(10).period(), Duration::from_millis(100));
    }

    #[test]
    fn speed_clamps() {
        assert_eq!(PlaybackSpeed::new(0), PlaybackSpeed::MIN);
        assert_eq!(PlaybackSpeed::new(-3), PlaybackSpeed::MIN);
        assert_eq!(PlaybackSpeed::new(99), PlaybackSpeed::MAX);
    }

    #[test]
    fn playback_starts_at_zero_without_trace() {
        let playback = sort_playback("3,1,2");
        assert_eq!(playback.current_index(), 0);
        assert!(playback.trace().is_none());
        assert_eq!(playback.state(), PlaybackState::Stopped);
        assert_eq!(playback.progress(), 0.0);
    }

    #[test]
    fn mismatched_algorithm_is_rejected() {
        let input = Input::parse_sequence("1,2").unwrap();
        assert!(Playback::new(Algorithm::BreadthFirst, input, ManualTimer::new()).is_err());
    }

    #[test]
    fn step_forward_generates_and_advances() {
        let mut playback = sort_playback("3,1,2");

        let step = playback.step_forward().unwrap();
        assert!(step.is_some());
        assert_eq!(playback.current_index(), 1);
        assert!(playback.trace().is_some());
        assert!(!playback.is_running());
        assert_eq!(playback.timer().pending(), 0);
    }

    #[test]
    fn step_forward_at_end_is_noop() {
        let mut playback = sort_playback("3,1,2");
        let last = playback.prepare().unwrap().last_index();
        playback.set_index(last).unwrap();

        assert!(playback.step_forward().unwrap().is_none());
        assert_eq!(playback.current_index(), last);
        assert!(!playback.is_running());
        assert_eq!(playback.state(), PlaybackState::Finished);
    }

    #[test]
    fn autoplay_runs_to_end_without_wrapping() {
        let mut playback = sort_playback("3,1,2");
        playback.start().unwrap();
        assert!(playback.is_running());

        run_to_end(&mut playback);

        let last = playback.trace().unwrap().last_index();
        assert_eq!(playback.current_index(), last);
        assert!(!playback.is_running());
        assert!(playback.current_step().unwrap().terminal);
        assert_eq!(playback.progress(), 1.0);
    }

    #[test]
    fn ticks_follow_speed_period() {
        let mut playback = sort_playback("5,4,3,2,1");
        playback.set_speed(10);
        playback.start().unwrap();

        run_for(&mut playback, 99);
        assert_eq!(playback.current_index(), 0);
        run_for(&mut playback, 1);
        assert_eq!(playback.current_index(), 1);
        run_for(&mut playback, 300);
        assert_eq!(playback.current_index(), 4);
    }

    #[test]
    fn speed_change_applies_from_next_tick() {
        let mut playback = sort_playback("5,4,3,2,1");
        playback.set_speed(1);
        playback.start().unwrap();

        // The first tick was scheduled at 1000ms and keeps that period
        playback.set_speed(10);
        run_for(&mut playback, 999);
        assert_eq!(playback.current_index(), 0);
        run_for(&mut playback, 1);
        assert_eq!(playback.current_index(), 1);

        run_for(&mut playback, 100);
        assert_eq!(playback.current_index(), 2);
    }

    #[test]
    fn start_is_idempotent() {
        let mut playback = sort_playback("3,1,2");
        playback.start().unwrap();
        playback.start().unwrap();
        assert_eq!(playback.timer().pending(), 1);
    }

    #[test]
    fn pause_keeps_position_and_trace() {
        let mut playback = sort_playback("3,1,2");
        playback.start().unwrap();
        run_for(&mut playback, 1200);
        let index = playback.current_index();
        assert!(index > 0);

        playback.pause();
        playback.pause();
        assert!(!playback.is_running());
        assert_eq!(playback.timer().pending(), 0);
        assert_eq!(playback.current_index(), index);
        assert!(playback.trace().is_some());
        assert_eq!(playback.state(), PlaybackState::Paused);

        run_for(&mut playback, 5000);
        assert_eq!(playback.current_index(), index);
    }

    #[test]
    fn toggle_flips_running() {
        let mut playback = sort_playback("3,1,2");
        playback.toggle().unwrap();
        assert!(playback.is_running());
        playback.toggle().unwrap();
        assert!(!playback.is_running());
    }

    #[test]
    fn reset_keeps_trace() {
        let mut playback = sort_playback("3,1,2");
        playback.start().unwrap();
        run_for(&mut playback, 1200);

        let before = playback.trace().cloned();
        playback.reset();
        assert_eq!(playback.current_index(), 0);
        assert!(!playback.is_running());
        assert_eq!(playback.trace().cloned(), before);
    }

    #[test]
    fn start_from_end_replays() {
        let mut playback = sort_playback("2,1");
        playback.start().unwrap();
        run_to_end(&mut playback);
        assert_eq!(playback.state(), PlaybackState::Finished);

        playback.start().unwrap();
        assert_eq!(playback.current_index(), 0);
        assert!(playback.is_running());
    }

    #[test]
    fn input_change_mid_run_regenerates_and_restarts() {
        let mut playback = sort_playback("3,1,2");
        playback.start().unwrap();
        run_for(&mut playback, 1800);
        assert!(playback.current_index() > 0);

        playback
            .set_input(Input::parse_sequence("9,8,7,6").unwrap())
            .unwrap();

        assert_eq!(playback.current_index(), 0);
        assert!(playback.is_running());
        assert_eq!(playback.timer().pending(), 1);
        assert_eq!(playback.trace().unwrap().steps()[0].sequence, vec![9, 8, 7, 6]);

        run_to_end(&mut playback);
        assert_eq!(playback.current_step().unwrap().sequence, vec![6, 7, 8, 9]);
    }

    #[test]
    fn stale_tick_after_input_change_is_ignored() {
        let mut playback = sort_playback("5,4,3,2,1");
        playback.start().unwrap();
        let stale = playback.timer_mut().fire_next().unwrap();

        playback.set_input(Input::parse_sequence("1").unwrap()).unwrap();
        assert!(!playback.on_tick(stale));
        assert_eq!(playback.current_index(), 0);
    }

    #[test]
    fn input_change_while_paused_drops_trace() {
        let mut playback = sort_playback("3,1,2");
        playback.step_forward().unwrap();

        playback.set_input(Input::parse_sequence("1,2").unwrap()).unwrap();
        assert!(playback.trace().is_none());
        assert_eq!(playback.current_index(), 0);
        assert!(!playback.is_running());
    }

    #[test]
    fn rejected_input_leaves_state_untouched() {
        let mut playback = sort_playback("3,1,2");
        playback.step_forward().unwrap();

        let graph: Input = Graph::sample().unwrap().into();
        assert!(playback.set_input(graph).is_err());
        assert_eq!(playback.current_index(), 1);
        assert!(playback.trace().is_some());
    }

    #[test]
    fn algorithm_switch_invalidates() {
        let mut playback = sort_playback("3,1,2");
        playback.step_forward().unwrap();

        playback.set_algorithm(Algorithm::SelectionSort).unwrap();
        assert!(playback.trace().is_none());
        assert_eq!(playback.algorithm(), Algorithm::SelectionSort);

        assert!(playback.set_algorithm(Algorithm::BreadthFirst).is_err());
        assert_eq!(playback.algorithm(), Algorithm::SelectionSort);

        let graph: Input = Graph::sample().unwrap().into();
        playback.load(Algorithm::BreadthFirst, graph).unwrap();
        assert_eq!(playback.algorithm(), Algorithm::BreadthFirst);
    }

    #[test]
    fn set_index_clamps_and_pauses() {
        let mut playback = sort_playback("3,1,2");
        playback.start().unwrap();

        playback.set_index(1000).unwrap();
        assert_eq!(playback.current_index(), playback.trace().unwrap().last_index());
        assert!(!playback.is_running());

        playback.set_index(2).unwrap();
        assert_eq!(playback.current_index(), 2);
    }

    #[test]
    fn step_backward_stops_at_zero() {
        let mut playback = sort_playback("3,1,2");
        playback.step_forward().unwrap();
        playback.step_backward();
        playback.step_backward();
        assert_eq!(playback.current_index(), 0);
    }

    #[test]
    fn single_step_trace_finishes_on_first_tick() {
        let mut playback = sort_playback("");
        playback.start().unwrap();
        assert_eq!(playback.progress(), 1.0);

        run_to_end(&mut playback);
        assert!(!playback.is_running());
        assert_eq!(playback.current_index(), 0);
    }

    #[test]
    fn truncated_trace_surfaces_warning() {
        let graph: Input = Graph::parse(4, "0-1,1-2,2-3", false, 0).unwrap().into();
        let mut playback = Playback::new(Algorithm::BreadthFirst, graph, ManualTimer::new())
            .unwrap()
            .with_options(GenerationOptions { max_dequeues: 1 });
        playback.prepare().unwrap();

        let status = PlaybackStatus::from(&playback);
        assert!(status.warning.is_some());
    }

    #[test]
    fn status_conversion() {
        let mut playback = sort_playback("3,1,2");
        playback.set_index(3).unwrap();
        playback.set_speed(8);

        let status = PlaybackStatus::from(&playback);
        assert_eq!(status.current_index, 3);
        assert_eq!(status.total_steps, playback.total_steps());
        assert_eq!(status.speed, PlaybackSpeed::new(8));
        assert_eq!(status.period_ms, 300);
        assert!(status.warning.is_none());

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["speed"], 8);
        assert_eq!(json["state"], "paused");
    }
}
