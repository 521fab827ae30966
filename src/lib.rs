// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod celebration;
pub mod config;
pub mod expr;
pub mod form;
pub mod input;
pub mod runtime;
pub mod scoring;
pub mod series;
pub mod session;
pub mod sweep;
pub mod target;
pub mod trainer;
pub mod util;

pub use expr::{compile, CompiledExpr, ExprError};
pub use scoring::{score, Score};
pub use series::Sample;
pub use session::{ExerciseConfig, ExerciseInputs, Mode, SessionPhase, TrainerError};
pub use trainer::Trainer;
