// gorod-core: domain layer between gorod-api and consumers (CLI, embedders).

pub mod auth;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::{AccountInfo, AuthFlow, AuthStage};
pub use coordinator::{Coordinator, DEFAULT_SNAPSHOT_WIDTH};
pub use entity::{BalanceSensor, CameraEntity, LockEntity, LockState, RelaySettings};
pub use error::CoreError;
pub use model::{Balance, Camera, Lock, dedupe_by_id};
