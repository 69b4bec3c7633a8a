//! Focal-plane geometry: the 21 populated CCD modules, their four outputs, and
//! the channel numbering (1..=84) used throughout the pipeline.

use serde::Deserialize;
use serde::Serialize;
use std::fmt;

use crate::error::BinningError;
use crate::error::Result;

pub const OUTPUTS_PER_MODULE: i32 = 4;
pub const MODULE_OUTPUTS: i32 = 84;

/// Populated modules of the 5x5 module grid, corners excluded.
pub const MODULES: [i32; 21] = [
    2, 3, 4, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 22, 23, 24,
];

/// A `(ccd module, ccd output)` address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModOut {
    pub ccd_module: i32,
    pub ccd_output: i32,
}

impl ModOut {
    pub fn new(ccd_module: i32, ccd_output: i32) -> Self {
        Self {
            ccd_module,
            ccd_output,
        }
    }

    /// Channel number for this pair, or `None` when the pair falls into one of
    /// the grid gaps.
    pub fn channel(self) -> Option<i32> {
        channel_number(self.ccd_module, self.ccd_output)
    }
}

impl fmt::Display for ModOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.ccd_module, self.ccd_output)
    }
}

pub fn valid_module(ccd_module: i32) -> bool {
    MODULES.contains(&ccd_module)
}

pub fn valid_output(ccd_output: i32) -> bool {
    (1..=OUTPUTS_PER_MODULE).contains(&ccd_output)
}

pub fn channel_number(ccd_module: i32, ccd_output: i32) -> Option<i32> {
    if !valid_module(ccd_module) || !valid_output(ccd_output) {
        return None;
    }
    let module_index = MODULES.iter().position(|m| *m == ccd_module)?;
    let module_index = i32::try_from(module_index).ok()?;
    Some(module_index * OUTPUTS_PER_MODULE + ccd_output)
}

pub fn module_output(channel: i32) -> Result<ModOut> {
    if !(1..=MODULE_OUTPUTS).contains(&channel) {
        return Err(BinningError::invalid(format!(
            "channel number {channel} is out of range (1-{MODULE_OUTPUTS})"
        )));
    }

    let mut ccd_module = (channel - 1) / OUTPUTS_PER_MODULE + 2;
    if ccd_module > 4 {
        ccd_module += 1;
    }
    if ccd_module > 20 {
        ccd_module += 1;
    }
    let ccd_output = 1 + (channel - 1) % OUTPUTS_PER_MODULE;

    Ok(ModOut::new(ccd_module, ccd_output))
}

/// Every valid pair, module-major, output-minor. Channel `n` is element `n - 1`.
pub fn module_outputs() -> impl Iterator<Item = ModOut> {
    MODULES.into_iter().flat_map(|ccd_module| {
        (1..=OUTPUTS_PER_MODULE).map(move |ccd_output| ModOut::new(ccd_module, ccd_output))
    })
}
