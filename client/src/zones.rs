//! Child zone management (`/zones`).

use reqwest::Method;
use serde::{Deserialize, Serialize};

use gantt_types::{NewZone, Zone, ZoneInfo, ZoneUpdate};

use crate::{Client, Result};

#[derive(Deserialize)]
struct ZoneList {
    zones: Vec<Zone>,
}

#[derive(Deserialize)]
struct ZoneEnvelope<T> {
    zone: T,
}

#[derive(Serialize)]
struct ZoneBody<'a, T> {
    zone: &'a T,
}

/// Zone operations, borrowed from a [`Client`].
#[derive(Debug, Clone, Copy)]
pub struct ZonesClient<'a> {
    client: &'a Client,
}

impl<'a> ZonesClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Zone>> {
        let list: ZoneList = self.client.get_json("zones", "zone list").await?;
        Ok(list.zones)
    }

    pub async fn get(&self, id: u64) -> Result<Zone> {
        let envelope: ZoneEnvelope<Zone> =
            self.client.get_json(&format!("zones/{id}"), "zone").await?;
        Ok(envelope.zone)
    }

    pub async fn create(&self, zone: &NewZone) -> Result<Zone> {
        tracing::info!(api_url = %zone.api_url, "Registering child zone");
        let envelope: ZoneEnvelope<Zone> = self
            .client
            .send_json(Method::POST, "zones", &ZoneBody { zone }, "created zone")
            .await?;
        Ok(envelope.zone)
    }

    pub async fn update(&self, id: u64, update: &ZoneUpdate) -> Result<Zone> {
        let envelope: ZoneEnvelope<Zone> = self
            .client
            .send_json(
                Method::PUT,
                &format!("zones/{id}"),
                &ZoneBody { zone: update },
                "updated zone",
            )
            .await?;
        Ok(envelope.zone)
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        tracing::info!(id, "Deleting child zone");
        self.client.delete(&format!("zones/{id}")).await
    }

    /// Name and capabilities of the zone serving this endpoint.
    pub async fn info(&self) -> Result<ZoneInfo> {
        let envelope: ZoneEnvelope<ZoneInfo> =
            self.client.get_json("zones/info", "zone info").await?;
        Ok(envelope.zone)
    }
}
