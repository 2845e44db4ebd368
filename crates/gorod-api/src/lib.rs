// gorod-api: raw clients for the Elektronny Gorod cloud and the optional
// go2rtc media relay. `gorod-core` builds the domain layer on top.

pub mod cloud;
pub mod error;
pub mod hash;
pub mod relay;
pub mod transport;
pub mod user_agent;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cloud::CloudClient;
pub use cloud::models::{
    AccessControl, AccessControlId, AuthTokens, CameraId, CameraRecord, Contract,
    ContractsOutcome, Entrance, EntranceId, FinanceInfo, Place, PlaceId, Profile, Section,
    Subscriber, SubscriberPlace,
};
pub use error::Error;
pub use relay::{RelayClient, RelayError};
pub use transport::{CloudTransport, TransportConfig, BASE_API_URL};
pub use user_agent::{AppVersion, UserAgent};
