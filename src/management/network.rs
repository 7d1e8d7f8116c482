use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pager::{ContinuationToken, Page};
use crate::response::RawResponse;

/// Comparison applied by a web application firewall exclusion entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwaspCrsExclusionEntrySelectorMatchOperator {
    ///
    Equals,
    ///
    Contains,
    ///
    StartsWith,
    ///
    EndsWith,
    /// Matches every selector, the selector value must be empty
    EqualsAny,
    /// An operator added to the service after this release
    #[serde(other)]
    Unknown,
}

/// A VPN gateway resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpnGateway {
    /// Resource id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    ///
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Map<String, Value>>,
    /// Gateway properties, kept as raw JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

/// One page of a VPN gateway listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVpnGatewaysResult {
    ///
    #[serde(default)]
    pub value: Vec<VpnGateway>,
    /// URL of the next page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

impl ListVpnGatewaysResult {
    /// Convert into a [`Page`] whose continuation token is the next link
    pub fn into_page(self, raw: RawResponse) -> Page<VpnGateway> {
        let token = self
            .next_link
            .filter(|link| !link.is_empty())
            .map(|link| ContinuationToken::from_header(&link));
        Page::with_token(self.value, token, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::{HeaderMap, StatusCode};
    use serde_json::json;

    fn raw() -> RawResponse {
        RawResponse::new(StatusCode::OK, HeaderMap::new())
    }

    #[test]
    fn operators_keep_pascal_case() {
        assert_eq!(
            serde_json::to_value(OwaspCrsExclusionEntrySelectorMatchOperator::EqualsAny).unwrap(),
            json!("EqualsAny")
        );
        assert_eq!(
            serde_json::from_value::<OwaspCrsExclusionEntrySelectorMatchOperator>(json!("StartsWith"))
                .unwrap(),
            OwaspCrsExclusionEntrySelectorMatchOperator::StartsWith
        );
    }

    #[test]
    fn unrecognised_operator_is_tolerated() {
        assert_eq!(
            serde_json::from_value::<OwaspCrsExclusionEntrySelectorMatchOperator>(json!("Matches"))
                .unwrap(),
            OwaspCrsExclusionEntrySelectorMatchOperator::Unknown
        );
    }

    #[test]
    fn next_link_becomes_continuation_token() {
        let result: ListVpnGatewaysResult = serde_json::from_value(json!({
            "value": [{"name": "gw-1", "location": "westus"}],
            "nextLink": "https://management.azure.com/next?page=2"
        }))
        .unwrap();

        let page = result.into_page(raw());
        assert_eq!(page.items()[0].name.as_deref(), Some("gw-1"));
        assert_eq!(
            page.continuation_token().map(|t| t.as_str()),
            Some("https://management.azure.com/next?page=2")
        );
    }

    #[test]
    fn missing_or_empty_next_link_is_last_page() {
        let last: ListVpnGatewaysResult = serde_json::from_value(json!({"value": []})).unwrap();
        assert!(last.into_page(raw()).is_last());

        let empty = ListVpnGatewaysResult {
            value: vec![],
            next_link: Some(String::new()),
        };
        assert!(empty.into_page(raw()).is_last());
    }
}
