pub mod error;
pub mod scene;

pub use error::{BookError, FailureReason, Result, SceneFailure};
pub use scene::{OutlineStructure, SceneMetrics, ScenePath, SceneRecord};
