use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::StreamExt;
use givd_core::constants::CONSUMPTION_TABLE;
use givd_core::consumption::{
    ConsumptionEvent, ConsumptionStoreTrait, NewConsumptionEvent, PushSubscription,
};
use givd_core::errors::{Error, Result};
use log::{debug, info, warn};
use tokio::sync::mpsc;

use super::model::{ConsumptionRow, NewConsumptionRow};
use super::realtime::{decode_insert, SseDecoder};
use crate::client::{Query, RestClient};

/// Events buffered between the realtime stream and the feed.
const SUBSCRIPTION_BUFFER: usize = 64;

pub struct ConsumptionStore {
    client: Arc<RestClient>,
}

impl ConsumptionStore {
    pub fn new(client: Arc<RestClient>) -> Self {
        ConsumptionStore { client }
    }

    async fn select(&self, query: Query) -> Result<Vec<ConsumptionEvent>> {
        let rows: Vec<ConsumptionRow> = self.client.select(CONSUMPTION_TABLE, &query).await?;
        Ok(rows.into_iter().map(ConsumptionEvent::from).collect())
    }
}

#[async_trait]
impl ConsumptionStoreTrait for ConsumptionStore {
    async fn fetch_recent(&self, owner: &str, limit: usize) -> Result<Vec<ConsumptionEvent>> {
        self.select(
            Query::all()
                .eq("user_id", owner)
                .order_desc("timestamp")
                .limit(limit),
        )
        .await
    }

    async fn fetch_since(
        &self,
        owner: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ConsumptionEvent>> {
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        self.select(
            Query::all()
                .eq("user_id", owner)
                .gte("timestamp", &since)
                .order_desc("timestamp"),
        )
        .await
    }

    async fn insert_event(
        &self,
        owner: &str,
        new_event: NewConsumptionEvent,
    ) -> Result<ConsumptionEvent> {
        let row = NewConsumptionRow::new(owner, new_event, Utc::now());
        let rows: Vec<ConsumptionRow> = self.client.insert(CONSUMPTION_TABLE, &[row]).await?;
        rows.into_iter()
            .next()
            .map(ConsumptionEvent::from)
            .ok_or_else(|| Error::Unexpected("Insert returned no consumption row".to_string()))
    }

    /// Opens the realtime stream filtered on `owner` and forwards decoded
    /// inserts. Closing the subscription aborts the reader task; the stream
    /// ending closes the subscription's channel.
    async fn subscribe_inserts(&self, owner: &str) -> Result<PushSubscription> {
        let query = Query::default()
            .param("table", CONSUMPTION_TABLE)
            .param("event", "INSERT")
            .param("filter", format!("user_id=eq.{}", owner));
        let response = self.client.open_stream(&query).await?;
        info!("Realtime consumption stream open for {}", owner);

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let owner = owner.to_string();
        let reader = tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut decoder = SseDecoder::new();
            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        warn!("Realtime stream for {} failed: {}", owner, e);
                        break;
                    }
                };
                for payload in decoder.push(&chunk) {
                    match decode_insert(&payload) {
                        Ok(Some(event)) => {
                            if tx.send(event).await.is_err() {
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => warn!("Skipping unreadable realtime payload: {}", e),
                    }
                }
            }
            debug!("Realtime stream for {} ended", owner);
        });

        Ok(PushSubscription::new(rx).with_close_hook(move || reader.abort()))
    }
}
