//! Wire entities of the cluster REST API.
//!
//! Every endpoint answers with an [`ApiResponse`] envelope whose `data` field
//! is endpoint specific. The envelope is decoded first and `data` is decoded
//! lazily by whoever knows what the endpoint returns.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::ResponseError;
use crate::validate::ValidatedArguments;

/// Response envelope shared by all endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// Endpoint specific payload.
    #[serde(default)]
    pub data: Value,
    /// Error message when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    /// A successful response carrying `data`.
    #[must_use]
    pub const fn ok(data: Value) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    /// A failed response carrying an error message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Value::Null,
            error: Some(message.into()),
        }
    }

    /// The server's error message, or a placeholder when it sent none.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.error
            .as_deref()
            .filter(|msg| !msg.is_empty())
            .unwrap_or("no error message returned")
            .to_string()
    }

    /// Decode `data` as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Failed`] when the server reported a failure and
    /// [`ResponseError::Decode`] when `data` does not match `T`.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ResponseError> {
        if !self.success {
            return Err(ResponseError::Failed(self.error_message()));
        }
        serde_json::from_value(self.data).map_err(|e| ResponseError::Decode(e.to_string()))
    }

    /// Decode `data` as a list of `T`, skipping malformed rows.
    ///
    /// # Errors
    ///
    /// Fails when the server reported a failure or `data` is not a list.
    pub fn into_rows<T: DeserializeOwned>(self) -> Result<Vec<T>, ResponseError> {
        let rows: Vec<Value> = self.into_data()?;
        let total = rows.len();

        let decoded: Vec<T> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| match serde_json::from_value(row) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(index, error = %e, "skipping malformed row in list response");
                    None
                }
            })
            .collect();

        if decoded.len() < total {
            warn!(skipped = total - decoded.len(), total, "list response contained malformed rows");
        }
        Ok(decoded)
    }

    /// The `job_id` handle in `data`, if any.
    #[must_use]
    pub fn job_id(&self) -> Option<String> {
        match self.data.get("job_id")? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Request body of `POST /api/operator/trigger/{operator}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorPayload {
    /// Operation to run.
    pub operation: String,
    /// Validated operation parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: ValidatedArguments,
    /// Validated operator configuration.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: ValidatedArguments,
    /// Validated namespace arguments, rendered as text.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub namespace: BTreeMap<String, String>,
    /// Ask the cluster to run on the targets in parallel.
    pub parallel: bool,
    /// Nodes to run on; empty lets the cluster decide.
    pub target_nodes: Vec<String>,
}

/// A row of `GET /api/nodes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node identifier.
    pub id: String,
    /// Node address.
    pub address: String,
    /// Last time the node was seen, as sent by the server.
    #[serde(default)]
    pub last_seen: String,
    /// Membership state.
    #[serde(default)]
    pub state: String,
}

/// Data of `GET /api/leader`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderRecord {
    /// Leader node identifier.
    pub id: String,
    /// Leader address.
    pub address: String,
}

/// A row of `GET /api/operator/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSummary {
    /// Operator name.
    pub name: String,
    /// Operator version.
    #[serde(default)]
    pub version: String,
    /// Operator author.
    #[serde(default)]
    pub author: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypedValue;
    use serde_json::json;

    #[test]
    fn decode_envelope_without_error_field() {
        let resp: ApiResponse =
            serde_json::from_value(json!({"success": true, "data": {"status": "ok"}}))
                .expect("decode");
        assert!(resp.success);
        assert_eq!(resp.error, None);
    }

    #[test]
    fn decode_envelope_with_null_fields() {
        let resp: ApiResponse =
            serde_json::from_value(json!({"success": false, "data": null, "error": null}))
                .expect("decode");
        assert_eq!(resp.error_message(), "no error message returned");
    }

    #[test]
    fn into_data_surfaces_failure() {
        let err = ApiResponse::failure("not the leader")
            .into_data::<LeaderRecord>()
            .expect_err("failed response");
        assert_eq!(err, ResponseError::Failed("not the leader".into()));
    }

    #[test]
    fn into_data_decodes_leader() {
        let leader: LeaderRecord =
            ApiResponse::ok(json!({"id": "node-1", "address": "10.0.0.1:7946"}))
                .into_data()
                .expect("decode");
        assert_eq!(leader.id, "node-1");
    }

    #[test]
    fn into_rows_skips_malformed_entries() {
        let resp = ApiResponse::ok(json!([
            {"id": "n1", "address": "10.0.0.1", "last_seen": "2024-05-01T10:00:00Z", "state": "alive"},
            "garbage",
            {"address": "missing id"},
            {"id": "n2", "address": "10.0.0.2"}
        ]));
        let nodes: Vec<NodeRecord> = resp.into_rows().expect("list");
        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n2"]);
        assert_eq!(nodes[1].state, "");
    }

    #[test]
    fn into_rows_requires_a_list() {
        let err = ApiResponse::ok(json!({"id": "n1"}))
            .into_rows::<NodeRecord>()
            .expect_err("not a list");
        assert!(matches!(err, ResponseError::Decode(_)));
    }

    #[test]
    fn job_id_accepts_strings_and_numbers() {
        assert_eq!(
            ApiResponse::ok(json!({"job_id": "123"})).job_id(),
            Some("123".to_string())
        );
        assert_eq!(
            ApiResponse::ok(json!({"job_id": 77})).job_id(),
            Some("77".to_string())
        );
        assert_eq!(ApiResponse::ok(json!({})).job_id(), None);
        assert_eq!(ApiResponse::ok(Value::Null).job_id(), None);
    }

    #[test]
    fn payload_omits_empty_namespaces() {
        let mut params = ValidatedArguments::new();
        params.insert("name".into(), TypedValue::String("ns1".into()));
        params.insert("high_water_disk_pct".into(), TypedValue::Int(70));

        let payload = OperatorPayload {
            operation: "add_namespace".into(),
            params,
            config: ValidatedArguments::new(),
            namespace: BTreeMap::new(),
            parallel: false,
            target_nodes: vec![],
        };

        let value = serde_json::to_value(&payload).expect("encode");
        assert_eq!(
            value,
            json!({
                "operation": "add_namespace",
                "params": {"name": "ns1", "high_water_disk_pct": 70},
                "parallel": false,
                "target_nodes": []
            })
        );
    }
}
