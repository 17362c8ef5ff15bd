pub mod sceua;
pub mod traits;

pub use sceua::{
    Hyperparameters, OptimizeOptions, Phase, SceUa, SceUaConfig, Tolerance, optimize_sce_ua,
};
pub use traits::{Objective, Observer, Progress, TryObjective};
