//! Hook into a training loop.
use anyhow::Result;

/// A hook called by a training loop.
///
/// [`Trainer`](crate::Trainer) calls [`Callback::init`] once before the first
/// training step and [`Callback::on_step`] after every training step.
pub trait Callback<A> {
    /// Prepares the callback before training starts.
    fn init(&mut self, agent: &A) -> Result<()>;

    /// Called after each training step.
    ///
    /// `n_calls` is the cumulative number of training steps reported by the
    /// agent. Returning `false` asks the training loop to stop.
    fn on_step(&mut self, agent: &mut A, n_calls: usize) -> Result<bool>;
}
