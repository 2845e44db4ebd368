// Entity adapters.
//
// Embeddable wrappers over the coordinator, one per exposed surface:
// camera (snapshots + stream, optionally proxied through go2rtc), lock
// (optimistic unlock state machine with a cancellable relock timer), and
// the balance sensor (formatted read-only value).

mod camera;
mod lock;
mod sensor;

pub use camera::{CameraEntity, RelaySettings};
pub use lock::{LockEntity, LockState};
pub use sensor::{BalanceAttributes, BalanceSensor};
