use std::fmt;

use fieldsweep_core::{PathStrategy, PoseControl, StepOutcome};

/// Object-safe slot pairing a strategy with the state of its current run.
///
/// The state is created on the first invocation from the pose observed at
/// that moment and is only ever handed to the strategy that created it.
pub trait Drive: fmt::Debug {
    /// Human-readable name of the strategy.
    fn name(&self) -> &'static str;

    /// Invokes the strategy for one frame.
    fn step(&mut self, pose: &mut dyn PoseControl, elapsed: f64) -> StepOutcome;

    /// Whether the strategy has created its run state yet.
    fn is_started(&self) -> bool;

    /// Discards the run state so the next invocation starts a fresh run.
    fn restart(&mut self);
}

/// Wraps a strategy in a [`Drive`] slot with no run state yet.
pub fn boxed<S>(strategy: S) -> Box<dyn Drive>
where
    S: PathStrategy + fmt::Debug + 'static,
{
    Box::new(Driver {
        strategy,
        state: None,
    })
}

#[derive(Debug)]
struct Driver<S: PathStrategy> {
    strategy: S,
    state: Option<S::State>,
}

impl<S> Drive for Driver<S>
where
    S: PathStrategy + fmt::Debug,
{
    fn name(&self) -> &'static str {
        self.strategy.name()
    }

    fn step(&mut self, pose: &mut dyn PoseControl, elapsed: f64) -> StepOutcome {
        let strategy = &self.strategy;
        let state = self
            .state
            .get_or_insert_with(|| strategy.initial_state(&pose.pose()));
        strategy.step(state, pose, elapsed)
    }

    fn is_started(&self) -> bool {
        self.state.is_some()
    }

    fn restart(&mut self) {
        self.state = None;
    }
}
