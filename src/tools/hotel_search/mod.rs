pub mod client;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::fmt;

pub use client::HotelApiClient;

use crate::tools::{Tool, ToolError, ToolResult};

pub const TOOL_NAME: &str = "hotel_search";

const DESCRIPTION: &str = "Use this tool to search for real, live hotel prices. The input must be \
    a single JSON string containing the keys 'location', 'check_in', 'check_out', and 'adults'.";

const NO_HOTELS_FOUND: &str = "No hotels found for the specified criteria.";

/// Parsed input of a hotel search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelSearchRequest {
    pub location: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
}

impl HotelSearchRequest {
    /// Parse the JSON object embedded in `input`. The model often wraps the
    /// object in prose or code fences, so everything from the first `{` to
    /// the last `}` is taken.
    pub fn parse(input: &str) -> Result<Self, ToolError> {
        let json = extract_json_object(input).ok_or_else(|| {
            ToolError::InvalidInput("Could not find a valid JSON object in the input.".to_string())
        })?;
        let data: Value = serde_json::from_str(json).map_err(|e| {
            ToolError::InvalidInput(format!("Could not parse the JSON object in the input: {}", e))
        })?;

        let location = data
            .get("location")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| missing_key("location"))?
            .to_string();
        let check_in = parse_date(&data, "check_in")?;
        let check_out = parse_date(&data, "check_out")?;
        let adults = parse_adults(&data)?;

        if check_out <= check_in {
            return Err(ToolError::InvalidInput(format!(
                "check_out ({}) must be after check_in ({}).",
                check_out, check_in
            )));
        }

        Ok(Self {
            location,
            check_in,
            check_out,
            adults,
        })
    }
}

fn extract_json_object(input: &str) -> Option<&str> {
    let start = input.find('{')?;
    let end = input.rfind('}')?;
    (end > start).then(|| &input[start..=end])
}

fn missing_key(key: &str) -> ToolError {
    ToolError::InvalidInput(format!("The input is missing the required key '{}'.", key))
}

fn parse_date(data: &Value, key: &str) -> Result<NaiveDate, ToolError> {
    let raw = data
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| missing_key(key))?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        ToolError::InvalidInput(format!(
            "'{}' must be a date in YYYY-MM-DD format, got '{}'.",
            key, raw
        ))
    })
}

fn parse_adults(data: &Value) -> Result<u32, ToolError> {
    let value = data.get("adults").ok_or_else(|| missing_key("adults"))?;
    let adults = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    adults
        .filter(|n| *n >= 1)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            ToolError::InvalidInput(format!("'adults' must be a positive integer, got {}.", value))
        })
}

/// One line of the tool's output.
#[derive(Debug, Clone, PartialEq)]
pub struct HotelSummary {
    pub name: String,
    pub rating: Option<String>,
    pub price: Option<String>,
}

impl HotelSummary {
    pub fn from_property(property: &Value) -> Self {
        let name = property
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("N/A")
            .to_string();
        let rating = match property.pointer("/reviews/score") {
            Some(Value::Number(score)) => Some(score.to_string()),
            Some(Value::String(score)) if !score.is_empty() => Some(score.clone()),
            _ => None,
        };
        let price = property
            .pointer("/price/displayMessages/0/lineItems/0/value")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Self {
            name,
            rating,
            price,
        }
    }
}

impl fmt::Display for HotelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}, Rating: {}/10, Price: {}",
            self.name,
            self.rating.as_deref().unwrap_or("unknown"),
            self.price.as_deref().unwrap_or("unknown")
        )
    }
}

/// Format the first `limit` properties, keeping the provider's order.
pub fn format_hotel_summaries(properties: &[Value], limit: usize) -> String {
    properties
        .iter()
        .take(limit)
        .map(|p| HotelSummary::from_property(p).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Live hotel prices for a destination and date range.
pub struct HotelSearchTool {
    client: HotelApiClient,
    api_key: Option<String>,
    max_results: usize,
}

impl HotelSearchTool {
    pub fn new(client: HotelApiClient, api_key: Option<String>, max_results: usize) -> Self {
        Self {
            client,
            api_key,
            max_results,
        }
    }
}

#[async_trait]
impl Tool for HotelSearchTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn run(&self, input: &str) -> ToolResult {
        let request = HotelSearchRequest::parse(input)?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ToolError::MissingCredential("RapidAPI Key"))?;

        let destination_id = self
            .client
            .find_destination_id(api_key, request.location.trim())
            .await?
            .ok_or_else(|| {
                ToolError::NotFound(format!(
                    "Could not find a valid destination ID for the location: {}",
                    request.location
                ))
            })?;
        tracing::debug!("Found destination ID: {}", destination_id);

        let properties = self
            .client
            .list_properties(
                api_key,
                &destination_id,
                request.check_in,
                request.check_out,
                request.adults,
            )
            .await?;
        if properties.is_empty() {
            return Err(ToolError::NotFound(NO_HOTELS_FOUND.to_string()));
        }

        Ok(format_hotel_summaries(&properties, self.max_results))
    }
}
