// Domain model.
//
// Flat records the coordinator hands to entities and the CLI, plus the
// conversions from the wire types. Wire records with missing ids are
// dropped during conversion rather than surfaced as half-formed entities.

use serde::Serialize;

use gorod_api::cloud::models::{
    AccessControl, AccessControlId, CameraId, CameraRecord, EntranceId, FinanceInfo, PlaceId,
};

/// One camera, deduplicated across the three source listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Camera {
    pub id: CameraId,
    pub name: String,
}

impl Camera {
    /// Camera behind an access control, if it advertises one.
    pub(crate) fn from_access_control(access_control: &AccessControl) -> Option<Self> {
        access_control.external_camera_id.map(|id| Self {
            id,
            name: access_control.name.clone().unwrap_or_default(),
        })
    }

    /// Camera from the private/public listings; the external (forpost) id
    /// wins over the record's own id.
    pub(crate) fn from_record(record: &CameraRecord) -> Option<Self> {
        record.stream_id().map(|id| Self {
            id,
            name: record.name.clone().unwrap_or_default(),
        })
    }
}

/// Keep one camera per distinct id. First occurrence wins; input order is
/// preserved, so the access-control cameras shadow the public and private
/// listings.
pub fn dedupe_by_id(cameras: Vec<Camera>) -> Vec<Camera> {
    let mut seen = std::collections::HashSet::new();
    cameras
        .into_iter()
        .filter(|camera| seen.insert(camera.id))
        .collect()
}

/// One openable door. Entrance-scoped when the access control has
/// entrances, access-control-scoped otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lock {
    pub place_id: PlaceId,
    pub access_control_id: AccessControlId,
    pub entrance_id: Option<EntranceId>,
    pub name: String,
    pub openable: bool,
}

/// Derive the lock records of one access control: one per entrance, or a
/// single access-control-keyed lock when there are none.
pub(crate) fn locks_from_access_control(
    place_id: PlaceId,
    access_control: &AccessControl,
) -> Vec<Lock> {
    if access_control.entrances.is_empty() {
        return vec![Lock {
            place_id,
            access_control_id: access_control.id,
            entrance_id: None,
            name: access_control.name.clone().unwrap_or_default(),
            openable: access_control.allow_open.unwrap_or(false),
        }];
    }

    access_control
        .entrances
        .iter()
        .map(|entrance| Lock {
            place_id,
            access_control_id: access_control.id,
            entrance_id: Some(entrance.id),
            name: entrance.name.clone().unwrap_or_default(),
            openable: entrance.allow_open.unwrap_or(false),
        })
        .collect()
}

/// Per-place finance snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    pub place_id: PlaceId,
    pub balance: Option<f64>,
    pub block_type: Option<String>,
    pub blocked: Option<bool>,
    pub payment_date: Option<String>,
    pub payment_sum: Option<f64>,
    pub payment_link: Option<String>,
}

impl Balance {
    pub(crate) fn from_finance(place_id: PlaceId, finance: FinanceInfo) -> Self {
        Self {
            place_id,
            balance: finance.balance,
            block_type: finance.block_type,
            blocked: finance.blocked,
            payment_date: finance.target_date,
            payment_sum: finance.amount_sum,
            payment_link: finance.payment_link,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use gorod_api::cloud::models::{AccessControl, Entrance};

    use super::{Camera, dedupe_by_id, locks_from_access_control};

    fn camera(id: i64, name: &str) -> Camera {
        Camera {
            id,
            name: name.into(),
        }
    }

    fn access_control(entrances: Vec<Entrance>) -> AccessControl {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Подъезд 1",
            "allowOpen": true,
        }))
        .map(|mut ac: AccessControl| {
            ac.entrances = entrances;
            ac
        })
        .unwrap()
    }

    fn entrance(id: i64, name: &str, allow_open: bool) -> Entrance {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "allowOpen": allow_open,
        }))
        .unwrap()
    }

    #[test]
    fn dedupe_keeps_the_first_occurrence() {
        // Aggregation order: access controls, then public, then private.
        let deduped = dedupe_by_id(vec![
            camera(1, "entrance door"),
            camera(2, "yard"),
            camera(1, "public copy of entrance door"),
            camera(3, "parking"),
            camera(2, "private copy of yard"),
        ]);

        assert_eq!(
            deduped,
            vec![
                camera(1, "entrance door"),
                camera(2, "yard"),
                camera(3, "parking"),
            ]
        );
    }

    #[test]
    fn dedupe_of_distinct_ids_is_identity() {
        let cameras = vec![camera(1, "a"), camera(2, "b")];
        assert_eq!(dedupe_by_id(cameras.clone()), cameras);
    }

    #[test]
    fn two_entrances_yield_two_locks_sharing_the_access_control() {
        let ac = access_control(vec![
            entrance(71, "Дверь 1", true),
            entrance(72, "Дверь 2", false),
        ]);

        let locks = locks_from_access_control(101, &ac);
        assert_eq!(locks.len(), 2);
        assert_eq!(locks[0].access_control_id, 7);
        assert_eq!(locks[1].access_control_id, 7);
        assert_eq!(locks[0].entrance_id, Some(71));
        assert_eq!(locks[1].entrance_id, Some(72));
        assert!(locks[0].openable);
        assert!(!locks[1].openable);
    }

    #[test]
    fn zero_entrances_yield_one_access_control_lock() {
        let ac = access_control(Vec::new());

        let locks = locks_from_access_control(101, &ac);
        assert_eq!(locks.len(), 1);
        assert_eq!(locks[0].entrance_id, None);
        assert_eq!(locks[0].name, "Подъезд 1");
        assert!(locks[0].openable);
    }
}
