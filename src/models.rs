//! Domain objects and the hydrator that builds them from JSON payloads.
//!
//! Every key listed on a model is required: a payload missing one fails with
//! [`Error::MalformedPayload`] instead of falling back to a default. Keys
//! whose value may be `null` are still required to be present.

use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Builds a typed object from a decoded payload.
///
/// Returns `Ok(None)` when there is no payload (absent or JSON `null`), never
/// a partially built object.
///
/// # Examples
///
/// ```
/// use azion::{hydrate, Address};
/// use serde_json::json;
///
/// let address: Option<Address> = hydrate(Some(json!({
///     "address": "www.example.com",
///     "weight": null,
///     "server_role": "primary",
///     "is_active": true
/// }))).unwrap();
/// assert_eq!(address.unwrap().address, "www.example.com");
///
/// assert!(hydrate::<Address>(None).unwrap().is_none());
/// ```
pub fn hydrate<T>(payload: Option<Value>) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    match payload {
        None | Some(Value::Null) => Ok(None),
        Some(value) => from_value(value).map(Some),
    }
}

/// Builds a list of typed objects from a decoded JSON array.
///
/// An absent payload yields an empty list. Elements are hydrated in order.
///
/// # Errors
///
/// Fails when the payload is not an array or when any element is malformed.
pub fn hydrate_many<T>(payload: Option<Value>) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    match payload {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.into_iter().map(from_value).collect(),
        Some(other) => Err(Error::malformed(
            short_type_name::<T>(),
            format!("expected a JSON array, got {}", json_type(&other)),
        )),
    }
}

fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_value(value).map_err(|e| {
        let model = short_type_name::<T>();
        tracing::error!(model, error = %e, "Failed to hydrate payload");
        Error::malformed(model, e)
    })
}

fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Deserializes a key that must be present but may hold `null`.
///
/// Plain `Option` fields would silently accept a missing key.
fn required_nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// Timestamps without an offset are read as UTC.
fn iso8601<'de, D>(deserializer: D) -> std::result::Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_timestamp(&value).map_err(serde::de::Error::custom)
}

fn parse_timestamp(value: &str) -> std::result::Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).or_else(|rfc3339_error| {
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .map(|naive| naive.and_utc().fixed_offset())
            .ok_or(rfc3339_error)
    })
}

/// An API token obtained with [`Client::authorize`](crate::Client::authorize).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token to send with authenticated requests.
    pub token: String,
    /// When the token was issued.
    #[serde(deserialize_with = "iso8601")]
    pub created_at: DateTime<FixedOffset>,
    /// When the token stops being accepted.
    #[serde(deserialize_with = "iso8601")]
    pub expires_at: DateTime<FixedOffset>,
}

impl Token {
    /// Returns `true` if the token is no longer valid at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.with_timezone(&Utc) <= now
    }

    /// Returns `true` if the token is no longer valid.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

// Never print the whole secret.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.token.chars().take(6).collect();
        f.debug_struct("Token")
            .field("token", &format_args!("{}...", prefix))
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// A content delivery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Unique ID.
    pub id: u64,
    /// Human-readable name.
    pub name: String,
    /// Domain name unique to this configuration across the whole CDN.
    pub domain_name: String,
    /// Whether the configuration is currently deployed.
    pub active: bool,
    /// Protocol(s) used to deliver content, e.g. `http` or `http,https`.
    pub delivery_protocol: String,
    /// ID of the digital certificate used for HTTPS delivery.
    #[serde(deserialize_with = "required_nullable")]
    pub digital_certificate: Option<u64>,
    /// Alternate domains pointing at this configuration.
    pub cname: Vec<String>,
    /// Whether content is delivered only through the cnames.
    pub cname_access_only: bool,
    /// Whether raw logs are stored for this configuration.
    pub rawlogs: bool,
}

/// An origin serving content to a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub id: u64,
    pub name: String,
    pub origin_type: String,
    pub method: String,
    pub host_header: String,
    pub origin_protocol_policy: String,
    /// Addresses in the order the API lists them.
    pub addresses: Vec<Address>,
    /// Seconds to wait while connecting to the origin.
    pub connection_timeout: u64,
    /// Seconds to wait between bytes received from the origin.
    pub timeout_between_bytes: u64,
}

impl Origin {
    /// Addresses currently taking traffic.
    pub fn active_addresses(&self) -> impl Iterator<Item = &Address> {
        self.addresses.iter().filter(|address| address.is_active)
    }
}

/// A single address of an [`Origin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// IP or FQDN.
    pub address: String,
    /// Load balancing weight, `None` when the origin does not balance.
    #[serde(deserialize_with = "required_nullable")]
    pub weight: Option<u32>,
    /// `primary` or `backup`.
    pub server_role: String,
    pub is_active: bool,
}
