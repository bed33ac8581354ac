//! Slot machine — pull/spin/stop/evaluate state machine

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::MachineConfig;
use crate::error::MachineResult;
use crate::outcome::{CenterSymbol, MachineEvent, MachineEventKind, SpinOutcome};
use crate::paytable::{WinKind, WinTables};
use crate::presenter::{NullPresenter, Presenter};
use crate::reel::Reel;
use crate::scheduler::Scheduler;

/// Lifecycle of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineState {
    /// Waiting for a pull; the trigger is enabled
    Idle,
    /// Reels are stepping; pulls are ignored
    Spinning,
    /// All reels stopped; the centre row is being classified
    Evaluating,
}

/// Answer to a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullStatus {
    /// A new spin was scheduled
    Started { pull_id: u64 },
    /// A spin is already in progress; nothing changed
    Rejected,
}

impl PullStatus {
    pub fn is_started(&self) -> bool {
        matches!(self, PullStatus::Started { .. })
    }
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub pulls: u64,
    pub regular_wins: u64,
    pub super_wins: u64,
    pub losses: u64,
}

impl SessionStats {
    fn record(&mut self, win: WinKind) {
        self.pulls += 1;
        match win {
            WinKind::None => self.losses += 1,
            WinKind::Regular => self.regular_wins += 1,
            WinKind::Super => self.super_wins += 1,
        }
    }

    pub fn wins(&self) -> u64 {
        self.regular_wins + self.super_wins
    }

    /// Percentage of evaluated pulls that won anything
    pub fn hit_rate(&self) -> f64 {
        if self.pulls > 0 {
            (self.wins() as f64 / self.pulls as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Queued animation callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpinEvent {
    /// One symbol finished a single-row move
    StepCompleted { reel: usize, symbol: usize },
    /// A reel's driver symbol finished its last step
    ReelStopped { reel: usize },
}

/// Per-reel bookkeeping of the current spin
#[derive(Debug, Clone)]
struct ReelRun {
    steps: u32,
    step_ms: f64,
    steps_done: Vec<u32>,
    stopped: bool,
}

/// Bookkeeping of the spin in progress
#[derive(Debug, Clone)]
struct SpinState {
    pull_id: u64,
    started_at_ms: f64,
    runs: Vec<ReelRun>,
    stopped_reels: usize,
}

/// Builder for [`Machine`]
#[derive(Debug, Clone)]
pub struct MachineBuilder {
    config: MachineConfig,
    seed: Option<u64>,
}

impl MachineBuilder {
    pub fn new(config: MachineConfig) -> Self {
        Self { config, seed: None }
    }

    /// Seed the RNG for reproducible reels and spins
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build without a presenter
    pub fn build(self) -> MachineResult<Machine<NullPresenter>> {
        self.build_with(NullPresenter)
    }

    /// Build with a rendering collaborator
    pub fn build_with<P: Presenter>(self, presenter: P) -> MachineResult<Machine<P>> {
        let rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        Machine::assemble(self.config, presenter, rng)
    }
}

/// Slot machine
///
/// Owns the reels, the win tables, the RNG and the event queue. Time only
/// moves when the host calls [`Machine::advance`] (once per frame) or
/// [`Machine::run_until_idle`].
pub struct Machine<P: Presenter = NullPresenter> {
    config: MachineConfig,
    reels: Vec<Reel>,
    tables: WinTables,
    presenter: P,
    rng: ChaCha8Rng,
    scheduler: Scheduler<SpinEvent>,
    state: MachineState,
    spin: Option<SpinState>,
    pull_count: u64,
    stats: SessionStats,
    events: Vec<MachineEvent>,
    last_outcome: Option<SpinOutcome>,
}

impl Machine<NullPresenter> {
    /// Build a machine with an OS-seeded RNG and no presenter
    pub fn new(config: MachineConfig) -> MachineResult<Self> {
        MachineBuilder::new(config).build()
    }

    pub fn builder(config: MachineConfig) -> MachineBuilder {
        MachineBuilder::new(config)
    }
}

impl<P: Presenter> Machine<P> {
    fn assemble(config: MachineConfig, mut presenter: P, mut rng: ChaCha8Rng) -> MachineResult<Self> {
        config.validate()?;
        let tables = config.win_tables()?;

        let layout = config.layout;
        let mut reels = Vec::with_capacity(config.reel_count);
        for reel_idx in 0..config.reel_count {
            let template = config.shuffle.apply(&config.reel_template, &mut rng);
            let reel = Reel::new(template.as_slice(), 0, layout.reel_x(reel_idx), &layout)?;
            log::debug!("built {} at x={}", reel.name(), reel.x());
            for symbol in reel.symbols() {
                presenter.place_symbol(reel_idx, symbol.index(), reel.x(), symbol.y());
            }
            reels.push(reel);
        }
        presenter.set_trigger_enabled(true);

        log::info!(
            "machine '{}' ready: {} reels of {} symbols, {} regular / {} super combinations",
            config.name,
            reels.len(),
            config.reel_template.len(),
            tables.regular_len(),
            tables.super_len()
        );

        Ok(Self {
            config,
            reels,
            tables,
            presenter,
            rng,
            scheduler: Scheduler::new(),
            state: MachineState::Idle,
            spin: None,
            pull_count: 0,
            stats: SessionStats::default(),
            events: Vec::new(),
            last_outcome: None,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    /// True from pull until the outcome is decided
    pub fn is_running(&self) -> bool {
        self.state != MachineState::Idle
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn tables(&self) -> &WinTables {
        &self.tables
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
    }

    pub fn last_outcome(&self) -> Option<&SpinOutcome> {
        self.last_outcome.as_ref()
    }

    /// Number of pulls accepted so far
    pub fn pull_count(&self) -> u64 {
        self.pull_count
    }

    /// Current virtual time
    pub fn now_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    /// Queued animation callbacks
    pub fn pending_events(&self) -> usize {
        self.scheduler.len()
    }

    /// Take the event log accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<MachineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Identities currently on the centre row, in reel order
    pub fn center_combination(&self) -> String {
        self.reels
            .iter()
            .map(|r| r.symbol_at_center().identity())
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PULL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start a spin
    ///
    /// Ignored while a spin is running. Otherwise disables the trigger,
    /// cancels leftover animations and schedules every reel's first step.
    pub fn pull(&mut self) -> PullStatus {
        if self.is_running() {
            log::debug!("pull ignored while {:?}", self.state);
            return PullStatus::Rejected;
        }

        self.state = MachineState::Spinning;
        self.presenter.set_trigger_enabled(false);
        self.presenter.cancel_animations();

        self.pull_count += 1;
        let pull_id = self.pull_count;
        let started_at_ms = self.scheduler.now_ms();

        let mut runs = Vec::with_capacity(self.reels.len());
        for reel_idx in 0..self.reels.len() {
            let step_ms = self.config.timing.sample_step_ms(&mut self.rng);
            let steps = self.config.steps.sample(&mut self.rng);
            let len = self.reels[reel_idx].len();

            if steps == 0 {
                self.scheduler
                    .schedule_in(0.0, SpinEvent::ReelStopped { reel: reel_idx });
            } else {
                for symbol in 0..len {
                    self.start_step(reel_idx, symbol, step_ms);
                }
            }

            runs.push(ReelRun {
                steps,
                step_ms,
                steps_done: vec![0; len],
                stopped: false,
            });
        }

        let steps: Vec<u32> = runs.iter().map(|r| r.steps).collect();
        log::info!("pull #{pull_id} started, steps per reel {steps:?}");
        self.events.push(MachineEvent::new(
            started_at_ms,
            MachineEventKind::PullStarted { pull_id, steps },
        ));

        self.spin = Some(SpinState {
            pull_id,
            started_at_ms,
            runs,
            stopped_reels: 0,
        });

        PullStatus::Started { pull_id }
    }

    /// Pull and drive the spin to its outcome
    pub fn pull_and_wait(&mut self) -> Option<SpinOutcome> {
        if self.pull().is_started() {
            self.run_until_idle()
        } else {
            None
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TIME
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance virtual time, handling every callback that falls due
    ///
    /// Returns the outcomes decided inside the window (at most one per pull).
    /// Negative and non-finite windows do not move the clock.
    pub fn advance(&mut self, elapsed_ms: f64) -> Vec<SpinOutcome> {
        let elapsed_ms = if elapsed_ms.is_finite() {
            elapsed_ms.max(0.0)
        } else {
            log::warn!("ignoring non-finite frame time {elapsed_ms}");
            0.0
        };
        let until_ms = self.scheduler.now_ms() + elapsed_ms;
        let mut outcomes = Vec::new();
        while let Some((_, event)) = self.scheduler.pop_due(until_ms) {
            if let Some(outcome) = self.handle(event) {
                outcomes.push(outcome);
            }
        }
        self.scheduler.advance_to(until_ms);
        outcomes
    }

    /// Handle callbacks until the current spin is evaluated
    ///
    /// Returns `None` when nothing is in flight.
    pub fn run_until_idle(&mut self) -> Option<SpinOutcome> {
        while let Some((_, event)) = self.scheduler.pop_next() {
            if let Some(outcome) = self.handle(event) {
                return Some(outcome);
            }
        }
        None
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STEPPING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Wrap a symbol into the reel window and start its next single-row move
    fn start_step(&mut self, reel_idx: usize, symbol_idx: usize, step_ms: f64) {
        let layout = self.config.layout;
        let reel = &mut self.reels[reel_idx];
        let (len, x) = (reel.len(), reel.x());
        let Some(symbol) = reel.symbol_mut(symbol_idx) else {
            return;
        };

        let from_y = layout.wrap_y(symbol.y(), len);
        if from_y != symbol.y() {
            symbol.set_y(from_y);
            self.presenter.place_symbol(reel_idx, symbol_idx, x, from_y);
        }
        let to_y = from_y + layout.symbol_height;
        self.presenter
            .move_symbol(reel_idx, symbol_idx, from_y, to_y, step_ms);
        self.scheduler.schedule_in(
            step_ms,
            SpinEvent::StepCompleted {
                reel: reel_idx,
                symbol: symbol_idx,
            },
        );
    }

    fn handle(&mut self, event: SpinEvent) -> Option<SpinOutcome> {
        match event {
            SpinEvent::StepCompleted { reel, symbol } => {
                self.on_step_completed(reel, symbol);
                None
            }
            SpinEvent::ReelStopped { reel } => self.on_reel_stopped(reel),
        }
    }

    fn on_step_completed(&mut self, reel_idx: usize, symbol_idx: usize) {
        let Some(spin) = self.spin.as_mut() else {
            return;
        };
        let Some(run) = spin.runs.get_mut(reel_idx) else {
            return;
        };
        run.steps_done[symbol_idx] += 1;
        let (done, total, step_ms) = (run.steps_done[symbol_idx], run.steps, run.step_ms);

        let height = self.config.layout.symbol_height;
        let reel = &mut self.reels[reel_idx];
        let mut is_driver = false;
        if let Some(symbol) = reel.symbol_mut(symbol_idx) {
            symbol.set_y(symbol.y() + height);
            is_driver = symbol.is_driver();
        }
        if is_driver {
            reel.advance(1);
            log::trace!("reel {reel_idx} step {done}/{total}, offset {}", reel.offset());
        }

        if done < total {
            self.start_step(reel_idx, symbol_idx, step_ms);
        } else if is_driver {
            self.scheduler
                .schedule_in(0.0, SpinEvent::ReelStopped { reel: reel_idx });
        }
    }

    fn on_reel_stopped(&mut self, reel_idx: usize) -> Option<SpinOutcome> {
        let spin = self.spin.as_mut()?;
        let run = spin.runs.get_mut(reel_idx)?;
        if run.stopped {
            log::warn!("reel {reel_idx} signalled completion twice in pull #{}", spin.pull_id);
            return None;
        }
        run.stopped = true;
        spin.stopped_reels += 1;
        let all_stopped = spin.stopped_reels == self.reels.len();

        let offset = self.reels[reel_idx].offset();
        log::debug!("reel {reel_idx} stopped at offset {offset}");
        self.events.push(MachineEvent::new(
            self.scheduler.now_ms(),
            MachineEventKind::ReelStopped {
                reel: reel_idx,
                offset,
            },
        ));

        if all_stopped { self.evaluate() } else { None }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EVALUATION
    // ═══════════════════════════════════════════════════════════════════════════

    fn evaluate(&mut self) -> Option<SpinOutcome> {
        let spin = self.spin.take()?;
        self.state = MachineState::Evaluating;

        let center_symbols: Vec<CenterSymbol> = self
            .reels
            .iter()
            .enumerate()
            .map(|(reel, r)| {
                let symbol = r.symbol_at_center();
                CenterSymbol {
                    reel,
                    index: symbol.index(),
                    identity: symbol.identity().to_string(),
                }
            })
            .collect();
        let combination: String = center_symbols.iter().map(|c| c.identity.as_str()).collect();
        let win = self.tables.classify(&combination);

        if win.is_win() {
            log::info!("pull #{} landed '{combination}': {win}", spin.pull_id);
            let looping = self.config.highlight.looping(win);
            let fps = self.config.timing.highlight_fps;
            for c in &center_symbols {
                self.presenter
                    .play_win_highlight(c.reel, c.index, fps, looping);
            }
        } else {
            log::info!("pull #{} landed '{combination}': no win", spin.pull_id);
        }

        self.stats.record(win);
        let outcome = SpinOutcome {
            pull_id: spin.pull_id,
            combination,
            center_symbols,
            win,
            steps: spin.runs.iter().map(|r| r.steps).collect(),
            started_at_ms: spin.started_at_ms,
            finished_at_ms: self.scheduler.now_ms(),
        };
        self.events.push(MachineEvent::new(
            outcome.finished_at_ms,
            MachineEventKind::Evaluated {
                outcome: outcome.clone(),
            },
        ));
        self.last_outcome = Some(outcome.clone());

        self.state = MachineState::Idle;
        self.presenter.set_trigger_enabled(true);
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::StepRange;

    fn machine(config: MachineConfig, seed: u64) -> Machine {
        MachineBuilder::new(config).seed(seed).build().unwrap()
    }

    #[test]
    fn test_machine_creation() {
        let m = machine(MachineConfig::words(), 1);
        assert_eq!(m.reels().len(), 3);
        assert_eq!(m.state(), MachineState::Idle);
        assert_eq!(m.stats().pulls, 0);
        assert!(m.reels().iter().all(|r| r.len() == 18));
    }

    #[test]
    fn test_reels_are_independently_shuffled() {
        let m = machine(MachineConfig::words().with_reel_count(4), 21);
        let names: Vec<String> = m.reels().iter().map(Reel::name).collect();
        assert!(names.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_pull_reaches_outcome() {
        let mut m = machine(MachineConfig::words(), 42);
        assert_eq!(m.pull(), PullStatus::Started { pull_id: 1 });
        assert!(m.is_running());

        let outcome = m.run_until_idle().expect("outcome");
        assert_eq!(outcome.pull_id, 1);
        assert_eq!(outcome.combination.len(), 3);
        assert_eq!(outcome.combination, m.center_combination());
        assert_eq!(m.state(), MachineState::Idle);
        assert_eq!(m.pending_events(), 0);
        assert_eq!(m.stats().pulls, 1);
    }

    #[test]
    fn test_pull_while_running_is_ignored() {
        let mut m = machine(MachineConfig::words(), 7);
        m.pull();
        let pending = m.pending_events();
        let events = m.events.len();
        let offsets: Vec<usize> = m.reels().iter().map(Reel::offset).collect();

        assert_eq!(m.pull(), PullStatus::Rejected);
        assert_eq!(m.pending_events(), pending);
        assert_eq!(m.events.len(), events);
        assert_eq!(m.pull_count(), 1);
        assert_eq!(
            m.reels().iter().map(Reel::offset).collect::<Vec<_>>(),
            offsets
        );
    }

    #[test]
    fn test_duplicate_stop_signal_does_not_double_evaluate() {
        let mut m = machine(MachineConfig::words().with_steps(StepRange::new(2, 2)), 3);
        m.pull();
        // A stray completion from reel 0 queued ahead of the real ones
        m.scheduler.schedule_in(0.0, SpinEvent::ReelStopped { reel: 0 });
        m.scheduler.schedule_in(1.0, SpinEvent::ReelStopped { reel: 0 });

        let mut outcomes = Vec::new();
        while let Some((_, event)) = m.scheduler.pop_next() {
            if let Some(o) = m.handle(event) {
                outcomes.push(o);
            }
        }
        assert_eq!(outcomes.len(), 1);
        assert_eq!(m.stats().pulls, 1);
    }

    #[test]
    fn test_offsets_track_steps() {
        let mut m = machine(MachineConfig::words().with_steps(StepRange::new(5, 5)), 9);
        let outcome = m.pull_and_wait().unwrap();
        assert_eq!(outcome.steps, vec![5, 5, 5]);
        assert!(m.reels().iter().all(|r| r.offset() == 5));

        m.pull_and_wait().unwrap();
        assert!(m.reels().iter().all(|r| r.offset() == 10));
    }

    #[test]
    fn test_zero_steps_stops_immediately() {
        let mut m = machine(MachineConfig::variant_b().with_steps(StepRange::new(0, 0)), 5);
        let start = m.now_ms();
        let outcome = m.pull_and_wait().unwrap();
        assert_eq!(outcome.finished_at_ms, start);
        assert!(m.reels().iter().all(|r| r.offset() == 0));
        assert_eq!(outcome.combination, m.center_combination());
    }

    #[test]
    fn test_non_finite_frame_time_keeps_clock() {
        let config = MachineConfig::words().with_steps(StepRange::new(3, 3));
        let mut m = machine(config, 11);
        m.pull();
        for bad in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN, -5.0] {
            assert!(m.advance(bad).is_empty());
            assert_eq!(m.now_ms(), 0.0);
        }

        let outcome = m.run_until_idle().unwrap();
        assert!(outcome.duration_ms().is_finite());
        assert!(m.now_ms().is_finite());
    }

    #[test]
    fn test_stats_hit_rate() {
        let mut stats = SessionStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        stats.record(WinKind::Regular);
        stats.record(WinKind::None);
        stats.record(WinKind::Super);
        stats.record(WinKind::None);
        assert_eq!(stats.wins(), 2);
        assert_eq!(stats.hit_rate(), 50.0);
    }
}
