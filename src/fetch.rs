use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use wreq::Client;

use crate::config::{DEFAULT_API_HOST, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::{self, FlightError};
use crate::model::{
    Airport, AirportResponse, Envelope, Flight, FlightSearchResponse, PriceGraphResponse,
    PricePoint,
};
use crate::query::{self, FlightSearchParams, Locale, PriceGraphParams};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub base_url: String,
    pub api_key: String,
    pub api_host: String,
    pub proxy: Option<String>,
    pub timeout: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            api_host: DEFAULT_API_HOST.to_string(),
            proxy: None,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// The four provider endpoints. Everything above the HTTP layer talks to
/// this trait so it can run against an in-memory double.
#[async_trait]
pub trait FlightApi: Send + Sync {
    async fn search_airport(&self, query: &str, locale: &Locale)
        -> Result<Vec<Airport>, FlightError>;

    async fn search_flights(&self, params: &FlightSearchParams)
        -> Result<Vec<Flight>, FlightError>;

    async fn price_graph(&self, params: &PriceGraphParams)
        -> Result<Vec<PricePoint>, FlightError>;

    async fn calendar(&self, params: &PriceGraphParams) -> Result<Vec<PricePoint>, FlightError>;
}

pub struct HttpApi {
    client: Client,
    options: FetchOptions,
}

impl std::fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApi")
            .field("base_url", &self.options.base_url)
            .field("api_host", &self.options.api_host)
            .finish_non_exhaustive()
    }
}

impl HttpApi {
    pub fn new(options: FetchOptions) -> Result<Self, FlightError> {
        if options.api_key.is_empty() {
            return Err(FlightError::MissingApiKey);
        }

        let mut builder = Client::builder().timeout(Duration::from_secs(options.timeout));

        if let Some(ref proxy) = options.proxy {
            builder = builder.proxy(wreq::Proxy::all(proxy).map_err(error::from_http_error)?);
        }

        let client = builder.build().map_err(error::from_http_error)?;
        Ok(Self { client, options })
    }

    async fn get_text(&self, path: &str, params: &[(String, String)]) -> Result<String, FlightError> {
        let url = format!("{}/{}", self.options.base_url.trim_end_matches('/'), path);
        debug!(%url, ?params, "GET");

        let response = self
            .client
            .get(&url)
            .header("x-rapidapi-key", self.options.api_key.as_str())
            .header("x-rapidapi-host", self.options.api_host.as_str())
            .query(params)
            .send()
            .await
            .map_err(error::from_http_error)?;

        let status = response.status().as_u16();
        if let Some(err) = error::from_status(status) {
            warn!(%url, status, "flight API request failed");
            return Err(err);
        }

        response.text().await.map_err(error::from_http_error)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Envelope<T>, FlightError> {
        let body = self.get_text(path, params).await?;
        decode_envelope(&body)
    }
}

/// Parses an envelope, treating `status: false` without data as a provider error.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<Envelope<T>, FlightError> {
    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|e| FlightError::Decode(e.to_string()))?;

    if !envelope.status && envelope.data.is_none() {
        let message = if envelope.message.is_empty() {
            "no data returned".to_string()
        } else {
            envelope.message
        };
        return Err(FlightError::Provider(message));
    }

    Ok(envelope)
}

#[async_trait]
impl FlightApi for HttpApi {
    async fn search_airport(
        &self,
        query: &str,
        locale: &Locale,
    ) -> Result<Vec<Airport>, FlightError> {
        let params = query::airport_params(query, locale);
        let response: AirportResponse = self.get("searchAirport", &params).await?;
        Ok(response.into_data())
    }

    async fn search_flights(
        &self,
        params: &FlightSearchParams,
    ) -> Result<Vec<Flight>, FlightError> {
        let response: FlightSearchResponse =
            self.get("searchFlights", &params.to_url_params()).await?;
        Ok(response.into_flights())
    }

    async fn price_graph(&self, params: &PriceGraphParams) -> Result<Vec<PricePoint>, FlightError> {
        let response: PriceGraphResponse =
            self.get("getPriceGraph", &params.to_url_params()).await?;
        Ok(response.into_data())
    }

    async fn calendar(&self, params: &PriceGraphParams) -> Result<Vec<PricePoint>, FlightError> {
        let response: PriceGraphResponse = self
            .get("getCalendarPicker", &params.to_calendar_params())
            .await?;
        Ok(response.into_data())
    }
}

#[async_trait]
impl<T: FlightApi + ?Sized> FlightApi for Arc<T> {
    async fn search_airport(
        &self,
        query: &str,
        locale: &Locale,
    ) -> Result<Vec<Airport>, FlightError> {
        (**self).search_airport(query, locale).await
    }

    async fn search_flights(
        &self,
        params: &FlightSearchParams,
    ) -> Result<Vec<Flight>, FlightError> {
        (**self).search_flights(params).await
    }

    async fn price_graph(&self, params: &PriceGraphParams) -> Result<Vec<PricePoint>, FlightError> {
        (**self).price_graph(params).await
    }

    async fn calendar(&self, params: &PriceGraphParams) -> Result<Vec<PricePoint>, FlightError> {
        (**self).calendar(params).await
    }
}
