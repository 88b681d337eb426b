//! Service registration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Message type of a micro-service info response
pub const INFO_RESPONSE_TYPE: &str = "io.nats.micro.v1.info_response";

/// Parameters used to register a running pipeline as a discoverable service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Instances sharing a queue group split inbound work between them
    pub queue_group: String,
}

/// Registration info reported by the status endpoint
///
/// Same shape as the info response of the micro-service protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub name: String,
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub endpoints: Vec<EndpointInfo>,
}

/// An endpoint exposed by a registered service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub name: String,
    pub subject: String,
    #[serde(default)]
    pub queue_group: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_wire_names() {
        let info = ServiceInfo {
            kind: INFO_RESPONSE_TYPE.to_string(),
            name: "conflux-orders".to_string(),
            id: "ABC123".to_string(),
            version: "1.0.0".to_string(),
            description: "Orders".to_string(),
            metadata: HashMap::new(),
            endpoints: vec![],
        };

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "io.nats.micro.v1.info_response");
        assert_eq!(json["name"], "conflux-orders");
        assert_eq!(json["endpoints"], serde_json::json!([]));
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_info_from_micro_response() {
        let raw = r#"{
            "type": "io.nats.micro.v1.info_response",
            "name": "conflux-orders",
            "id": "ABC123",
            "version": "1.0.0",
            "description": "Orders",
            "metadata": {"region": "eu"},
            "endpoints": [{"name": "run", "subject": "orders.run", "queue_group": "orders"}]
        }"#;

        let info: ServiceInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(info.metadata["region"], "eu");
        assert_eq!(info.endpoints[0].queue_group, "orders");
        assert!(info.endpoints[0].metadata.is_empty());
    }
}
