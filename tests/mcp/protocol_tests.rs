//! MCP protocol unit tests

#[cfg(test)]
mod tests {
    use serde_json::json;
    use websift::mcp::protocol::*;

    #[test]
    fn test_parse_initialize_request() {
        let json = r#"{
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {"roots": {}},
                "clientInfo": {
                    "name": "test",
                    "version": "1.0"
                }
            }
        }"#;

        let req: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.method, "initialize");
        assert_eq!(req.jsonrpc, "2.0");

        let params: InitializeParams = serde_json::from_value(req.params.unwrap()).unwrap();
        assert_eq!(params.protocol_version, "2025-03-26");
        assert_eq!(params.client_info.name, "test");
    }

    #[test]
    fn test_serialize_initialize_result() {
        let result = InitializeResult {
            protocol_version: "2024-11-05".to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
                logging: LoggingCapability::default(),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: "0.1.0".to_string(),
            },
            instructions: None,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["protocolVersion"], "2024-11-05");
        assert_eq!(json["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(json["capabilities"]["logging"], json!({}));
        assert_eq!(json["serverInfo"]["name"], "websift-mcp");
        assert!(json.get("instructions").is_none());
    }

    #[test]
    fn test_success_response_shape() {
        let response = JsonRpcResponse::success(Some(json!(1)), json!({"ok": true}));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], 1);
        assert_eq!(json["result"]["ok"], true);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_response_shape() {
        let response = JsonRpcResponse::failure(Some(json!("a")), METHOD_NOT_FOUND, "nope");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"]["code"], -32601);
        assert_eq!(json["error"]["message"], "nope");
        assert!(json.get("result").is_none());
        assert!(response.is_error());
    }

    #[test]
    fn test_message_classification() {
        let request = JsonRpcMessage::from_value(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}));
        assert!(request.unwrap().is_request());

        let notification =
            JsonRpcMessage::from_value(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
                .unwrap();
        assert!(matches!(notification, JsonRpcMessage::Notification(_)));
        assert_eq!(notification.method(), Some("notifications/initialized"));

        let response =
            JsonRpcMessage::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": {}})).unwrap();
        assert!(matches!(response, JsonRpcMessage::Response(_)));
        assert_eq!(response.method(), None);
    }

    #[test]
    fn test_invalid_messages_rejected() {
        for value in [
            json!({"type": "initialize"}),
            json!({"jsonrpc": "1.0", "id": 1, "method": "ping"}),
            json!({"jsonrpc": "2.0", "id": 1}),
            json!("initialize"),
            json!(42),
        ] {
            let err = JsonRpcMessage::from_value(value.clone()).unwrap_err();
            assert_eq!(err.code, INVALID_REQUEST, "{value} should be invalid");
        }
    }

    #[test]
    fn test_tool_call_params_roundtrip_meta() {
        let params: ToolCallParams = serde_json::from_value(json!({
            "name": "web_search",
            "arguments": {"query": "rust"},
            "_meta": {"progressToken": 7}
        }))
        .unwrap();

        assert_eq!(params.name, "web_search");
        assert_eq!(params.arguments["query"], "rust");
        assert_eq!(params.meta.unwrap().progress_token, Some(json!(7)));
    }

    #[test]
    fn test_tool_result_serialization() {
        let result = ToolResult {
            content: vec![ContentBlock::Text {
                text: "failed".to_string(),
            }],
            is_error: true,
        };
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][0]["text"], "failed");
        assert_eq!(json["isError"], true);
    }

    #[test]
    fn test_version_negotiation() {
        assert_eq!(negotiate_version("2024-11-05"), "2024-11-05");
        assert_eq!(negotiate_version("2025-03-26"), "2025-03-26");
        assert_eq!(negotiate_version("1999-01-01"), LATEST_PROTOCOL_VERSION);
    }
}
