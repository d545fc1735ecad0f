//! Ticking many locomotives at once.

use crate::error::{SimError, SimResult};
use crate::locomotive::{LocoState, Locomotive, TickInputs, TickOutputs};
use rayon::prelude::*;

/// Tick every state with its matching inputs in parallel.
///
/// All locomotives share one parameter set. Each state is touched by exactly
/// one worker; results come back in input order.
pub fn tick_fleet(
    loco: &Locomotive,
    states: &mut [LocoState],
    inputs: &[TickInputs],
) -> SimResult<Vec<Option<TickOutputs>>> {
    if states.len() != inputs.len() {
        return Err(SimError::InvalidArg {
            what: "fleet states and inputs must have the same length",
        });
    }

    states
        .par_iter_mut()
        .zip(inputs.par_iter())
        .map(|(state, input)| loco.tick(state, input))
        .collect()
}
