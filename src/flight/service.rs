use async_trait::async_trait;
use log::warn;
use serde::Deserialize;
use url::Url;

use crate::integration;

use super::Config;

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    origin: Option<String>,
    destination: Option<String>,
    departure_date: Option<String>,
    return_date: Option<String>,
    adults: Option<u8>,
    travel_class: Option<String>,
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> super::Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(super::Error::MissingParam(name))
}

#[async_trait]
pub trait FlightService {
    async fn autocomplete(&self, keyword: &str) -> super::Result<serde_json::Value>;

    async fn search(&self, params: &SearchParams) -> super::Result<serde_json::Value>;
}

#[derive(Clone)]
pub struct FlightServiceImpl {
    cfg: Config,
    http: reqwest::Client,
}

impl FlightServiceImpl {
    pub fn new(cfg: &Config) -> Self {
        Self {
            cfg: cfg.clone(),
            http: integration::init_http_client(),
        }
    }

    fn autocomplete_url(&self, keyword: &str) -> super::Result<Url> {
        let mut url = Url::parse(self.cfg.base_url())?.join("/v1/reference-data/locations")?;
        url.query_pairs_mut()
            .append_pair("subType", "AIRPORT,CITY")
            .append_pair("keyword", keyword);
        Ok(url)
    }

    fn search_url(&self, p: &SearchParams) -> super::Result<Url> {
        let origin = required(&p.origin, "origin")?;
        let destination = required(&p.destination, "destination")?;
        let departure_date = required(&p.departure_date, "departureDate")?;

        let mut url = Url::parse(self.cfg.base_url())?.join("/v2/shopping/flight-offers")?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("originLocationCode", origin)
                .append_pair("destinationLocationCode", destination)
                .append_pair("departureDate", departure_date)
                .append_pair("adults", &p.adults.unwrap_or(1).to_string());
            if let Ok(return_date) = required(&p.return_date, "returnDate") {
                q.append_pair("returnDate", return_date);
            }
            if let Ok(travel_class) = required(&p.travel_class, "travelClass") {
                q.append_pair("travelClass", travel_class);
            }
        }
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> super::Result<serde_json::Value> {
        let response = self
            .http
            .get(url)
            .bearer_auth(self.cfg.api_key())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("flight provider answered with {status}");
            return Err(super::Error::Provider(status.as_u16()));
        }

        let body = response.json::<serde_json::Value>().await?;
        Ok(body)
    }
}

#[async_trait]
impl FlightService for FlightServiceImpl {
    async fn autocomplete(&self, keyword: &str) -> super::Result<serde_json::Value> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(super::Error::MissingParam("keyword"));
        }

        let url = self.autocomplete_url(keyword)?;
        self.fetch(url).await
    }

    async fn search(&self, params: &SearchParams) -> super::Result<serde_json::Value> {
        let url = self.search_url(params)?;
        self.fetch(url).await
    }
}
