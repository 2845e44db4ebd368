// Finance endpoint.

use tracing::debug;

use crate::error::Error;

use super::client::CloudClient;
use super::models::{FinanceInfo, PlaceId};

impl CloudClient {
    /// Fetch the finance snapshot of a place. The backend returns an
    /// empty payload for places without billing, hence the `Option`.
    ///
    /// `GET /api/mh-payment/mobile/v1/finance?placeId={place}`
    pub async fn query_balance(&self, place_id: PlaceId) -> Result<Option<FinanceInfo>, Error> {
        debug!(place_id, "querying balance");
        let resp = self
            .transport()
            .get(
                &format!("/api/mh-payment/mobile/v1/finance?placeId={place_id}"),
                Some(place_id),
            )
            .await?;
        Self::parse_optional_envelope(resp).await
    }
}
