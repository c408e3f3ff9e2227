//! Ledger gateway client
//!
//! Queries the ledger's GraphQL index for notarization records and the info
//! endpoint for the current chain height. Pagination is strictly sequential:
//! each page's request carries the previous page's final cursor.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{VerifyError, VerifyResult};

/// Ledger gateway configuration
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Gateway base URL (e.g., "https://arweave.net")
    pub gateway_url: String,

    /// Value of the `App-Name` tag filter
    pub app_name: String,

    /// Records per GraphQL page
    pub page_size: u32,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl LedgerConfig {
    /// Create a configuration for the given gateway
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            app_name: "chainproof".to_string(),
            page_size: 100,
            timeout: 30,
        }
    }

    /// Set the `App-Name` tag value
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Set the page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Create a ledger client from this configuration
    pub fn build_client(&self) -> LedgerClient {
        LedgerClient::new(self)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new("https://arweave.net")
    }
}

/// One notarization record retrieved from the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Transaction id
    pub id: String,
    /// Content hash asserted by the notarizer (`Hash` tag)
    pub content_hash: String,
    /// Notarization timestamp (`Notarized-At` tag)
    pub notarized_at: String,
    /// Notarization date (`Notarized-Date-UTC` tag)
    pub notarized_date: String,
    /// Notarizer session id (`Session-ID` tag)
    pub session_id: String,
    /// Sequence number within the session (`Sequence` tag)
    pub sequence: u64,
    /// Height of the containing block, if mined
    pub block_height: Option<u64>,
    /// Timestamp of the containing block, if mined
    pub block_timestamp: Option<i64>,
    /// Blocks mined after the containing block; back-filled by the
    /// reconciliation engine, 0 until then and for unmined records
    pub confirmations: u64,
}

const RECORDS_QUERY: &str = r#"
query($owners: [String!], $tags: [TagFilter!], $first: Int!, $after: String) {
    transactions(owners: $owners, tags: $tags, first: $first, after: $after, sort: HEIGHT_DESC) {
        pageInfo { hasNextPage }
        edges {
            cursor
            node {
                id
                block { timestamp height }
                tags { name value }
            }
        }
    }
}
"#;

// ========== GraphQL wire types ==========

#[derive(Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct QueryData {
    transactions: TransactionPage,
}

#[derive(Deserialize)]
struct TransactionPage {
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Deserialize)]
struct PageInfo {
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
}

#[derive(Deserialize)]
struct Edge {
    cursor: String,
    node: TxNode,
}

#[derive(Deserialize)]
struct TxNode {
    id: String,
    #[serde(default)]
    block: Option<BlockMeta>,
    #[serde(default)]
    tags: Vec<TxTag>,
}

#[derive(Deserialize)]
struct BlockMeta {
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    height: Option<u64>,
}

#[derive(Deserialize)]
struct TxTag {
    name: String,
    value: String,
}

#[derive(Deserialize)]
struct GatewayInfo {
    height: u64,
}

/// HTTP client for the ledger gateway
#[derive(Debug, Clone)]
pub struct LedgerClient {
    client: reqwest::Client,
    gateway_url: String,
    app_name: String,
    page_size: u32,
}

impl LedgerClient {
    /// Create a new ledger client from configuration
    pub fn new(config: &LedgerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            gateway_url: config.gateway_url.trim_end_matches('/').to_string(),
            app_name: config.app_name.clone(),
            page_size: config.page_size,
        }
    }

    /// Enumerate every notarization record tagged with the given owner,
    /// namespace, and any date in `dates`.
    ///
    /// Loops through gateway pages until `hasNextPage` is false or a page
    /// comes back empty — an empty page with `hasNextPage=true` is treated as
    /// exhaustion, not an error, so an inconsistent backend cannot cause an
    /// infinite loop. `on_page` fires once per page with (page number,
    /// cumulative record count).
    pub async fn query_records(
        &self,
        owner: &str,
        namespace: &str,
        dates: &[String],
        mut on_page: impl FnMut(usize, usize),
    ) -> VerifyResult<Vec<LedgerRecord>> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_no = 0usize;

        loop {
            let page = self
                .fetch_page(owner, namespace, dates, cursor.as_deref())
                .await?;
            page_no += 1;

            let page_empty = page.edges.is_empty();
            cursor = page.edges.last().map(|e| e.cursor.clone());
            for edge in page.edges {
                records.push(decode_record(edge.node));
            }

            on_page(page_no, records.len());

            if page_empty || !page.page_info.has_next_page {
                break;
            }
        }

        Ok(records)
    }

    /// Fetch the gateway's current chain height
    pub async fn current_height(&self) -> VerifyResult<u64> {
        let url = format!("{}/info", self.gateway_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| VerifyError::LedgerUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::LedgerUnavailable(format!("HTTP {status}")));
        }

        let info: GatewayInfo = response
            .json()
            .await
            .map_err(|e| VerifyError::LedgerUnavailable(e.to_string()))?;
        Ok(info.height)
    }

    async fn fetch_page(
        &self,
        owner: &str,
        namespace: &str,
        dates: &[String],
        cursor: Option<&str>,
    ) -> VerifyResult<TransactionPage> {
        let url = format!("{}/graphql", self.gateway_url);
        let body = json!({
            "query": RECORDS_QUERY,
            "variables": {
                "owners": [owner],
                "tags": [
                    { "name": "App-Name", "values": [self.app_name] },
                    { "name": "Namespace", "values": [namespace] },
                    { "name": "Notarized-Date-UTC", "values": dates },
                ],
                "first": self.page_size,
                "after": cursor,
            },
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| VerifyError::LedgerUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VerifyError::LedgerUnavailable(format!("HTTP {status}: {text}")));
        }

        let parsed: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::LedgerUnavailable(e.to_string()))?;

        if let Some(errors) = parsed.errors
            && let Some(first) = errors.first()
        {
            return Err(VerifyError::LedgerQueryError(first.message.clone()));
        }

        parsed
            .data
            .map(|d| d.transactions)
            .ok_or_else(|| VerifyError::LedgerQueryError("response missing transactions data".to_string()))
    }
}

/// Decode a transaction's tag bag into a record.
///
/// Unexpected tag absence degrades to defaults rather than aborting the scan.
fn decode_record(node: TxNode) -> LedgerRecord {
    let tag = |name: &str| -> String {
        node.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.clone())
            .unwrap_or_default()
    };

    let sequence = tag("Sequence").parse().unwrap_or(0);
    let (block_height, block_timestamp) = match &node.block {
        Some(block) => (block.height, block.timestamp),
        None => (None, None),
    };

    LedgerRecord {
        content_hash: tag("Hash"),
        notarized_at: tag("Notarized-At"),
        notarized_date: tag("Notarized-Date-UTC"),
        session_id: tag("Session-ID"),
        sequence,
        block_height,
        block_timestamp,
        confirmations: 0,
        id: node.id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(json: serde_json::Value) -> TxNode {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_decode_record_full_tag_bag() {
        let record = decode_record(node(serde_json::json!({
            "id": "tx-1",
            "block": { "timestamp": 1767225600, "height": 990 },
            "tags": [
                { "name": "Hash", "value": "abc123" },
                { "name": "Notarized-At", "value": "2026-01-01T12:00:00Z" },
                { "name": "Notarized-Date-UTC", "value": "2026-01-01" },
                { "name": "Session-ID", "value": "s-1" },
                { "name": "Sequence", "value": "7" },
            ],
        })));

        assert_eq!(record.id, "tx-1");
        assert_eq!(record.content_hash, "abc123");
        assert_eq!(record.notarized_date, "2026-01-01");
        assert_eq!(record.session_id, "s-1");
        assert_eq!(record.sequence, 7);
        assert_eq!(record.block_height, Some(990));
        assert_eq!(record.block_timestamp, Some(1767225600));
        assert_eq!(record.confirmations, 0);
    }

    #[test]
    fn test_decode_record_missing_tags_default() {
        let record = decode_record(node(serde_json::json!({
            "id": "tx-2",
            "block": null,
            "tags": [],
        })));

        assert_eq!(record.content_hash, "");
        assert_eq!(record.notarized_at, "");
        assert_eq!(record.sequence, 0);
        assert_eq!(record.block_height, None);
        assert_eq!(record.block_timestamp, None);
    }

    #[test]
    fn test_decode_record_unparseable_sequence_defaults_to_zero() {
        let record = decode_record(node(serde_json::json!({
            "id": "tx-3",
            "tags": [{ "name": "Sequence", "value": "not-a-number" }],
        })));
        assert_eq!(record.sequence, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = LedgerConfig::new("http://localhost:1984/")
            .with_app_name("my-notary")
            .with_page_size(25)
            .with_timeout(5);
        assert_eq!(config.app_name, "my-notary");
        assert_eq!(config.page_size, 25);

        let client = config.build_client();
        assert_eq!(client.gateway_url, "http://localhost:1984");
    }
}
