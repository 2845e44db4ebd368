// Place and access-control endpoints.
//
// Place-scoped calls take the place id explicitly; it is forwarded to the
// transport so the user-agent header carries it, as the mobile app does.

use serde_json::json;
use tracing::debug;

use crate::error::Error;

use super::client::CloudClient;
use super::models::{AccessControl, AccessControlId, EntranceId, PlaceId, SubscriberPlace};

impl CloudClient {
    /// List the subscriber's places.
    ///
    /// `GET /rest/v3/subscriber-places`
    pub async fn query_places(&self) -> Result<Vec<SubscriberPlace>, Error> {
        debug!("querying subscriber places");
        let resp = self.transport().get("/rest/v3/subscriber-places", None).await?;
        Self::parse_envelope(resp).await
    }

    /// List the access controls of a place.
    ///
    /// `GET /rest/v1/places/{place}/accesscontrols`
    pub async fn query_access_controls(
        &self,
        place_id: PlaceId,
    ) -> Result<Vec<AccessControl>, Error> {
        debug!(place_id, "querying access controls");
        let resp = self
            .transport()
            .get(
                &format!("/rest/v1/places/{place_id}/accesscontrols"),
                Some(place_id),
            )
            .await?;
        Self::parse_envelope(resp).await
    }

    /// Fire the open action on an access control or one of its entrances.
    ///
    /// `POST /rest/v1/places/{p}/accesscontrols/{ac}/actions` or
    /// `POST /rest/v1/places/{p}/accesscontrols/{ac}/entrances/{e}/actions`
    /// depending on whether the door is entrance-scoped.
    pub async fn open_lock(
        &self,
        place_id: PlaceId,
        access_control_id: AccessControlId,
        entrance_id: Option<EntranceId>,
    ) -> Result<(), Error> {
        debug!(place_id, access_control_id, ?entrance_id, "opening lock");

        let path = match entrance_id {
            Some(entrance_id) => format!(
                "/rest/v1/places/{place_id}/accesscontrols/{access_control_id}/entrances/{entrance_id}/actions"
            ),
            None => format!(
                "/rest/v1/places/{place_id}/accesscontrols/{access_control_id}/actions"
            ),
        };

        let payload = json!({ "name": "accessControlOpen" });
        self.transport().post(&path, Some(place_id), &payload).await?;
        Ok(())
    }
}
