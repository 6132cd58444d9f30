//! Request bodies for the configuration, origin and purge endpoints.
//!
//! Optional fields left as `None` are omitted from the JSON body, so the API
//! applies its own defaults (or, for partial updates, keeps current values).

use serde::Serialize;

/// Body of [`Client::create_configuration`](crate::Client::create_configuration).
///
/// # Examples
///
/// ```
/// use azion::NewConfiguration;
///
/// let configuration = NewConfiguration::new("Dummy configuration", "www.example.com", "ww2.example.com")
///     .with_cnames(vec!["www.example-cname.com".to_string()])
///     .with_delivery_protocol("http,https");
///
/// assert!(!configuration.cname_access_only);
/// assert_eq!(configuration.origin_protocol_policy, "preserve");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewConfiguration {
    pub name: String,
    /// IP or hostname (FQDN) of the origin.
    pub origin_address: String,
    /// Host header sent to the origin.
    pub origin_host_header: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cname: Option<Vec<String>>,
    pub cname_access_only: bool,
    pub delivery_protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_certificate: Option<u64>,
    pub origin_protocol_policy: String,
    /// Whether browsers should honor the cache headers sent by the origin.
    pub browser_cache_settings: bool,
    pub browser_cache_settings_maximum_ttl: u64,
    pub cdn_cache_settings: String,
    pub cdn_cache_settings_maximum_ttl: u64,
}

impl NewConfiguration {
    /// Creates a configuration body with the API's documented defaults.
    pub fn new(
        name: impl Into<String>,
        origin_address: impl Into<String>,
        origin_host_header: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            origin_address: origin_address.into(),
            origin_host_header: origin_host_header.into(),
            cname: None,
            cname_access_only: false,
            delivery_protocol: "http".to_string(),
            digital_certificate: None,
            origin_protocol_policy: "preserve".to_string(),
            browser_cache_settings: false,
            browser_cache_settings_maximum_ttl: 0,
            cdn_cache_settings: "honor".to_string(),
            cdn_cache_settings_maximum_ttl: 0,
        }
    }

    pub fn with_cnames(mut self, cnames: Vec<String>) -> Self {
        self.cname = Some(cnames);
        self
    }

    pub fn with_delivery_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.delivery_protocol = protocol.into();
        self
    }

    pub fn with_digital_certificate(mut self, certificate_id: u64) -> Self {
        self.digital_certificate = Some(certificate_id);
        self
    }
}

/// Body of partial updates and replacements of a configuration.
///
/// With [`Client::replace_configuration`](crate::Client::replace_configuration)
/// the fields left out are reset to their defaults by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigurationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cname: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cname_access_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_certificate: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rawlogs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// An address in the body of an origin request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAddress {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl NewAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            weight: None,
            server_role: None,
            is_active: None,
        }
    }
}

/// Body of [`Client::create_origin`](crate::Client::create_origin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrigin {
    pub name: String,
    pub origin_type: String,
    pub addresses: Vec<NewAddress>,
    pub host_header: String,
    pub origin_protocol_policy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_between_bytes: Option<u64>,
}

impl NewOrigin {
    /// A single origin with one address and the `preserve` protocol policy.
    pub fn single(name: impl Into<String>, address: impl Into<String>, host_header: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin_type: "single_origin".to_string(),
            addresses: vec![NewAddress::new(address)],
            host_header: host_header.into(),
            origin_protocol_policy: "preserve".to_string(),
            method: None,
            connection_timeout: None,
            timeout_between_bytes: None,
        }
    }
}

/// Body of [`Client::partial_update_origin`](crate::Client::partial_update_origin).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OriginUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<NewAddress>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_protocol_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_between_bytes: Option<u64>,
}

/// How purged content is evicted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PurgeMethod {
    /// Remove the objects from the edge caches.
    #[default]
    Delete,
    /// Mark the objects stale so they are revalidated with the origin.
    Refresh,
}

#[derive(Debug, Serialize)]
pub(crate) struct PurgeRequest {
    pub urls: Vec<String>,
    pub method: PurgeMethod,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_configuration_omits_unset_fields() {
        let body = serde_json::to_value(NewConfiguration::new(
            "Dummy configuration",
            "www.example.com",
            "ww2.example.com",
        ))
        .unwrap();

        assert_eq!(
            body,
            json!({
                "name": "Dummy configuration",
                "origin_address": "www.example.com",
                "origin_host_header": "ww2.example.com",
                "cname_access_only": false,
                "delivery_protocol": "http",
                "origin_protocol_policy": "preserve",
                "browser_cache_settings": false,
                "browser_cache_settings_maximum_ttl": 0,
                "cdn_cache_settings": "honor",
                "cdn_cache_settings_maximum_ttl": 0
            })
        );
    }

    #[test]
    fn test_update_keeps_false_values() {
        let update = ConfigurationUpdate {
            active: Some(false),
            rawlogs: None,
            ..Default::default()
        };

        assert_eq!(serde_json::to_value(update).unwrap(), json!({"active": false}));
    }

    #[test]
    fn test_purge_request_body() {
        let body = PurgeRequest {
            urls: vec!["www.example.com/static/*".to_string()],
            method: PurgeMethod::Refresh,
        };

        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"urls": ["www.example.com/static/*"], "method": "refresh"})
        );
    }
}
