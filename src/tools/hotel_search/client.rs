use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::HotelConfig;
use crate::tools::ToolError;

/// Client for the RapidAPI "hotels4" endpoints.
#[derive(Debug, Clone)]
pub struct HotelApiClient {
    client: Client,
    base_url: String,
    api_host: String,
    currency: String,
    locale: String,
    site_id: u64,
    results_size: u32,
}

impl HotelApiClient {
    pub fn new(client: Client, config: &HotelConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_host: config.api_host.clone(),
            currency: config.currency.clone(),
            locale: config.locale.clone(),
            site_id: config.site_id,
            results_size: config.results_size,
        }
    }

    /// Resolve a free-text place name to the provider's region id.
    pub async fn find_destination_id(
        &self,
        api_key: &str,
        location: &str,
    ) -> Result<Option<String>, ToolError> {
        let url = format!("{}/locations/v3/search", self.base_url);
        let site_id = self.site_id.to_string();
        debug!("Searching for destination ID for location: {}", location);

        let response = self
            .client
            .get(&url)
            .header("x-rapidapi-key", api_key)
            .header("x-rapidapi-host", &self.api_host)
            .query(&[
                ("q", location),
                ("locale", self.locale.as_str()),
                ("langid", "1033"),
                ("siteid", site_id.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = serde_json::from_slice(&response.bytes().await?)?;
        Ok(select_city_destination(&body))
    }

    /// Fetch properties for a region, cheapest first.
    pub async fn list_properties(
        &self,
        api_key: &str,
        destination_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        adults: u32,
    ) -> Result<Vec<Value>, ToolError> {
        let url = format!("{}/properties/v2/list", self.base_url);
        let payload = json!({
            "currency": self.currency,
            "eapid": 1,
            "locale": self.locale,
            "siteId": self.site_id,
            "destination": { "regionId": destination_id },
            "checkInDate": date_parts(check_in),
            "checkOutDate": date_parts(check_out),
            "rooms": [{ "adults": adults }],
            "resultsStartingIndex": 0,
            "resultsSize": self.results_size,
            "sort": "PRICE_LOW_TO_HIGH"
        });

        let response = self
            .client
            .post(&url)
            .header("x-rapidapi-key", api_key)
            .header("x-rapidapi-host", &self.api_host)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = serde_json::from_slice(&response.bytes().await?)?;
        let properties = body
            .pointer("/data/propertySearch/properties")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        debug!("Received {} properties for region {}", properties.len(), destination_id);
        Ok(properties)
    }
}

fn date_parts(date: NaiveDate) -> Value {
    json!({ "day": date.day(), "month": date.month(), "year": date.year() })
}

/// Region id of the first result tagged as a city, if any.
pub fn select_city_destination(body: &Value) -> Option<String> {
    let city = body
        .get("sr")?
        .as_array()?
        .iter()
        .find(|item| item.get("type").and_then(|t| t.as_str()) == Some("CITY"))?;

    match city.get("gaiaId")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
