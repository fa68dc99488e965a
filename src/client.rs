use std::sync::Arc;

use schema::{Model, Typed};
use tradewire_config::Config;
use tradewire_http::{HttpTransport, HttpTransportConfig, DEFAULT_USER_AGENT};
use transport::{ApiRequest, DynTransport, RetryPolicy, Transport};

use crate::response::{typed_view, typed_views, Decoded, Endpoint, NdjsonStream, Page};
use crate::{ClientError, Result};

/// Entry point for API calls.
///
/// A client pairs a transport with response handling: each call names an
/// [`Endpoint`] that says how the body is decoded. Cloning is cheap; clones
/// share the transport.
#[derive(Clone)]
pub struct Client {
    transport: DynTransport,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("endpoint", &self.transport.endpoint()).finish()
    }
}

impl Client {
    /// A client over any transport.
    pub fn new(transport: DynTransport) -> Self { Self { transport } }

    /// An HTTP client built from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let client = &config.client;
        let transport = HttpTransport::with_config(HttpTransportConfig {
            base_url: client.base_url.clone(),
            timeout: client.timeout(),
            user_agent: client.user_agent.clone().unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            retry: RetryPolicy {
                max_retries: client.max_retries,
                initial_delay: client.initial_retry_delay(),
                max_delay: client.max_retry_delay(),
            },
        });
        Ok(Self::new(Arc::new(transport)))
    }

    /// The transport in use.
    pub fn transport(&self) -> &DynTransport { &self.transport }

    /// Send `request` and decode the response as `endpoint` describes.
    pub async fn execute(&self, request: &ApiRequest, endpoint: &Endpoint) -> Result<Decoded> {
        logging::trace(
            "CLIENT",
            &format!("→ {} {} ({:?})", request.method, request.path, endpoint.strategy),
        );
        let response = self.transport.execute(request).await.map_err(|e| {
            tracing::debug!("Client - {} {} failed: {}", request.method, request.path, e);
            e
        })?;
        endpoint.handle(request, response)
    }

    /// Fetch a single `M`.
    pub async fn fetch<M: Model>(&self, request: &ApiRequest) -> Result<M> {
        let value = self.execute(request, &Endpoint::model::<M>()).await?.into_model()?;
        typed_view(&value)
    }

    /// Fetch a list of `M`.
    pub async fn fetch_list<M: Model>(&self, request: &ApiRequest) -> Result<Vec<M>> {
        let items = self.execute(request, &Endpoint::list::<M>()).await?.into_list()?;
        typed_views(&items)
    }

    /// Send `model` as the body of `request` and read the answer as `M`.
    ///
    /// Required fields are checked before anything goes over the wire.
    pub async fn send<M: Model>(&self, request: ApiRequest, model: &M) -> Result<M> {
        models::validate(model)?;
        let request = request.with_body(convert::encode_model(model));
        self.fetch(&request).await
    }

    /// Fetch the first page of a paginated endpoint.
    pub async fn page(&self, request: &ApiRequest, endpoint: &Endpoint) -> Result<Page> {
        self.execute(request, endpoint).await?.into_page()
    }

    /// Fetch the page following `page`, or `None` on the last page.
    pub async fn next_page(&self, page: &Page) -> Result<Option<Page>> {
        let Some(request) = page.next_request() else {
            return Ok(None);
        };
        let next = self.execute(&request, &page.endpoint).await?.into_page()?;
        Ok(Some(next))
    }

    /// Follow cursors from the first page until the last one, reading at
    /// most `max_pages` pages.
    ///
    /// Stopping at the limit is not an error; it is logged and the items
    /// read so far are returned.
    pub async fn collect_all(
        &self,
        request: &ApiRequest,
        endpoint: &Endpoint,
        max_pages: usize,
    ) -> Result<Vec<Typed>> {
        if max_pages == 0 {
            return Err(ClientError::Strategy("max_pages must be at least 1".to_string()));
        }
        let mut page = self.page(request, endpoint).await?;
        let mut items = std::mem::take(&mut page.items);
        let mut pages = 1;

        while page.has_next() {
            if pages >= max_pages {
                tracing::warn!(
                    pages,
                    "Client - stopping pagination of {} at the page limit",
                    request.path
                );
                break;
            }
            match self.next_page(&page).await? {
                Some(mut next) => {
                    items.append(&mut next.items);
                    page = next;
                    pages += 1;
                }
                None => break,
            }
        }

        logging::trace("CLIENT", &format!("← {} items over {} pages", items.len(), pages));
        Ok(items)
    }

    /// Like [`Client::collect_all`], read through the typed view `M`.
    pub async fn collect_models<M: Model>(
        &self,
        request: &ApiRequest,
        endpoint: &Endpoint,
        max_pages: usize,
    ) -> Result<Vec<M>> {
        let items = self.collect_all(request, endpoint, max_pages).await?;
        typed_views(&items)
    }

    /// Open a newline-delimited JSON stream.
    pub async fn stream(&self, request: &ApiRequest, endpoint: &Endpoint) -> Result<NdjsonStream> {
        self.execute(request, endpoint).await?.into_stream()
    }
}

impl From<HttpTransport> for Client {
    fn from(transport: HttpTransport) -> Self { Self::new(Arc::new(transport)) }
}
