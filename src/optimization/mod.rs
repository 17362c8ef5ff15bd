pub mod callback;
pub mod solvers;

pub use callback::CancelToken;
pub use solvers::{
    Hyperparameters, Objective, Observer, OptimizeOptions, Phase, Progress, SceUa, SceUaConfig,
    Tolerance, TryObjective, optimize_sce_ua,
};
