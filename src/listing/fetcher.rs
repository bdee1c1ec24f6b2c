use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::api::ApiError;
use crate::app::AppMessage;
use crate::commands::Command;
use crate::listing::controller::FetchRequest;
use crate::listing::query::{ListQuery, ListResult};

/// Loads one page of records for a listing.
#[async_trait]
pub trait DataFetcher<T>: Send + Sync {
    /// Resource name used in status messages, e.g. "roles".
    fn resource(&self) -> &'static str;

    async fn fetch(&self, query: &ListQuery) -> Result<ListResult<T>, ApiError>;
}

/// Outcome of a fetch, tagged with the generation that requested it.
#[derive(Debug)]
pub struct PageLoaded<T> {
    pub generation: u64,
    pub result: std::result::Result<ListResult<T>, String>,
}

/// Runs a [`DataFetcher`] and reports the page back to the screen.
pub struct FetchPageCmd<T, M> {
    fetcher: Arc<dyn DataFetcher<T>>,
    request: FetchRequest,
    tx: UnboundedSender<M>,
    wrap: fn(PageLoaded<T>) -> M,
}

impl<T, M> FetchPageCmd<T, M> {
    pub fn new(
        fetcher: Arc<dyn DataFetcher<T>>,
        request: FetchRequest,
        tx: UnboundedSender<M>,
        wrap: fn(PageLoaded<T>) -> M,
    ) -> Self {
        Self {
            fetcher,
            request,
            tx,
            wrap,
        }
    }
}

#[async_trait]
impl<T, M> Command for FetchPageCmd<T, M>
where
    T: Send + 'static,
    M: Send + 'static,
{
    fn name(&self) -> String {
        format!("Loading {} (page {})", self.fetcher.resource(), self.request.query.page)
    }

    async fn execute(self: Box<Self>, _app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let FetchRequest { generation, query } = self.request;
        let result = self
            .fetcher
            .fetch(&query)
            .await
            .map_err(|e| {
                debug!(resource = self.fetcher.resource(), error = %e, "Fetch failed");
                e.user_message()
            });

        let msg = (self.wrap)(PageLoaded { generation, result });
        if self.tx.send(msg).is_err() {
            debug!(
                resource = self.fetcher.resource(),
                generation, "Screen closed before page arrived, dropping it"
            );
        }
        Ok(())
    }
}
