//! 转发服务层
//!
//! 两个无状态的直通操作：命令转发（POST）与同步查询转发（GET）。
//! 网关不重试、不设超时、不鉴权 —— 授权完全交给上游表格服务。
//! 与 HTTP 运行时解耦：所有逻辑只依赖 `HttpClient` 抽象。

use crate::request::{HttpClient, HttpMethod, HttpRequest};
use leadflow_shared::protocol::Command;
use serde_json::{Map, Value, json};
use uuid::Uuid;

/// 网关运行配置
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 固定的上游服务地址
    pub upstream_url: String,
    /// CORS 允许的来源
    pub allow_origin: String,
}

/// 一次转发的最终结果，交由入口层转换为 HTTP 响应
#[derive(Debug, Clone)]
pub struct ForwardOutcome {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ForwardOutcome {
    fn relay(cfg: &GatewayConfig, methods: &str, body: String) -> Self {
        Self {
            // 上游即使在 body 里报告逻辑失败，转发本身也算成功
            status: 200,
            headers: cors_headers(cfg, methods),
            body,
        }
    }

    fn rejected(status: u16, message: &str) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: json!({ "error": message }).to_string(),
        }
    }

    /// 转发异常的兜底：固定文案，不泄漏底层错误细节
    fn server_error(cfg: &GatewayConfig, methods: &str) -> Self {
        Self {
            status: 500,
            headers: cors_headers(cfg, methods),
            body: json!({ "error": "Server error" }).to_string(),
        }
    }
}

fn cors_headers(cfg: &GatewayConfig, methods: &str) -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        (
            "Access-Control-Allow-Origin".to_string(),
            cfg.allow_origin.clone(),
        ),
        (
            "Access-Control-Allow-Methods".to_string(),
            methods.to_string(),
        ),
        (
            "Access-Control-Allow-Headers".to_string(),
            "Content-Type, Authorization".to_string(),
        ),
    ]
}

/// 命令转发：只接受 POST
///
/// 请求体解析规则：
/// - 缺失或非法 JSON → 按空对象转发（保持与上游的历史契约）
/// - 合法 JSON 但不在 [`Command`] 闭集内 → 400 拒绝，不转发
/// - 合法命令 → 原样（重新序列化后）POST 给上游，原文转回上游响应体
pub async fn forward_command<C: HttpClient>(
    client: &C,
    cfg: &GatewayConfig,
    method: &str,
    body: Option<&str>,
) -> ForwardOutcome {
    if method != "POST" {
        return ForwardOutcome::rejected(405, "Method not allowed");
    }

    let payload = body
        .and_then(|b| serde_json::from_str::<Value>(b).ok())
        .unwrap_or_else(|| Value::Object(Map::new()));

    let is_empty_object = payload.as_object().is_some_and(|o| o.is_empty());
    if !is_empty_object {
        if let Err(e) = serde_json::from_value::<Command>(payload.clone()) {
            let request_id = Uuid::new_v4();
            log_error!("[gw {}] rejected command: {}", request_id, e);
            return ForwardOutcome::rejected(400, "Unknown command");
        }
    }

    let request_id = Uuid::new_v4();
    let action = payload
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or("<none>")
        .to_string();
    log_info!("[gw {}] forward command '{}'", request_id, action);

    let req = HttpRequest::new(&cfg.upstream_url, HttpMethod::Post)
        .with_header("Content-Type", "application/json")
        .with_body(payload.to_string());

    match client.send(req).await {
        Ok(resp) => {
            log_info!("[gw {}] upstream status {}", request_id, resp.status);
            ForwardOutcome::relay(cfg, "POST, OPTIONS", resp.body)
        }
        Err(e) => {
            log_error!("[gw {}] forward failed: {}", request_id, e);
            ForwardOutcome::server_error(cfg, "POST, OPTIONS")
        }
    }
}

/// 同步查询转发：任何方法都接受，按 GET 转发
///
/// 入站查询串原样拼到上游 URL 后面，响应体原文转回。
pub async fn forward_sync<C: HttpClient>(
    client: &C,
    cfg: &GatewayConfig,
    raw_query: &str,
) -> ForwardOutcome {
    let url = if raw_query.is_empty() {
        cfg.upstream_url.clone()
    } else {
        format!("{}?{}", cfg.upstream_url, raw_query)
    };

    let request_id = Uuid::new_v4();
    log_info!("[gw {}] forward sync query '{}'", request_id, raw_query);

    let req = HttpRequest::new(&url, HttpMethod::Get).with_header("Content-Type", "application/json");

    match client.send(req).await {
        Ok(resp) => {
            log_info!("[gw {}] upstream status {}", request_id, resp.status);
            ForwardOutcome::relay(cfg, "GET, OPTIONS", resp.body)
        }
        Err(e) => {
            log_error!("[gw {}] sync forward failed: {}", request_id, e);
            ForwardOutcome::server_error(cfg, "GET, OPTIONS")
        }
    }
}

// =========================================================
// 单元测试 (Unit Tests)
// =========================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{MockHttpClient, ReqwestHttpClient};
    use serde_json::json;

    const UPSTREAM: &str = "https://script.example.com/exec";

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            upstream_url: UPSTREAM.to_string(),
            allow_origin: "*".to_string(),
        }
    }

    fn header<'a>(outcome: &'a ForwardOutcome, key: &str) -> Option<&'a str> {
        outcome
            .headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn non_post_on_command_path_is_405() {
        let client = MockHttpClient::new();
        let outcome = forward_command(&client, &test_config(), "GET", None).await;

        assert_eq!(outcome.status, 405);
        assert!(outcome.body.contains("Method not allowed"));
        // 没有任何出站请求
        assert!(client.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_forwards_empty_object() {
        let client = MockHttpClient::new();
        client.mock_response(UPSTREAM, 200, json!({ "success": true }));

        let outcome =
            forward_command(&client, &test_config(), "POST", Some("not-json{{{")).await;

        assert_eq!(outcome.status, 200);
        let reqs = client.requests.borrow();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].body.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn absent_body_forwards_empty_object() {
        let client = MockHttpClient::new();
        client.mock_response(UPSTREAM, 200, json!({ "success": true }));

        let outcome = forward_command(&client, &test_config(), "POST", None).await;

        assert_eq!(outcome.status, 200);
        assert_eq!(client.requests.borrow()[0].body.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn unknown_action_is_rejected_without_forwarding() {
        let client = MockHttpClient::new();
        client.mock_response(UPSTREAM, 200, json!({ "success": true }));

        let outcome = forward_command(
            &client,
            &test_config(),
            "POST",
            Some(r#"{"action":"dropAllTables","id":"x"}"#),
        )
        .await;

        assert_eq!(outcome.status, 400);
        assert!(outcome.body.contains("Unknown command"));
        assert!(client.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn valid_command_relays_upstream_body_unchanged() {
        let client = MockHttpClient::new();
        let upstream_body = json!({ "success": false, "error": "Invalid credentials" });
        client.mock_response(UPSTREAM, 200, upstream_body.clone());

        let outcome = forward_command(
            &client,
            &test_config(),
            "POST",
            Some(r#"{"action":"login","uid":"ravi","password":"pw"}"#),
        )
        .await;

        // 上游的逻辑失败原文透传，HTTP 状态仍是 200
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.body, upstream_body.to_string());

        let reqs = client.requests.borrow();
        let sent: serde_json::Value = serde_json::from_str(reqs[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["action"], "login");
        assert_eq!(sent["uid"], "ravi");
    }

    #[tokio::test]
    async fn upstream_http_failure_still_relays_as_200() {
        let client = MockHttpClient::new();
        client.mock_response(UPSTREAM, 500, json!({ "error": "boom" }));

        let outcome = forward_command(
            &client,
            &test_config(),
            "POST",
            Some(r#"{"action":"deleteLead","id":"L-1"}"#),
        )
        .await;

        assert_eq!(outcome.status, 200);
        assert!(outcome.body.contains("boom"));
    }

    #[tokio::test]
    async fn transport_failure_is_generic_500() {
        // 没有为上游 URL 配置 mock → NetworkError
        let client = MockHttpClient::new();

        let outcome = forward_command(
            &client,
            &test_config(),
            "POST",
            Some(r#"{"action":"deleteLead","id":"L-1"}"#),
        )
        .await;

        assert_eq!(outcome.status, 500);
        assert!(outcome.body.contains("Server error"));
        // 不泄漏底层错误细节
        assert!(!outcome.body.contains("no mock"));
    }

    #[tokio::test]
    async fn command_outcome_carries_cors_headers() {
        let client = MockHttpClient::new();
        client.mock_response(UPSTREAM, 200, json!({ "success": true }));

        let outcome = forward_command(&client, &test_config(), "POST", None).await;

        assert_eq!(header(&outcome, "Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(
            header(&outcome, "Access-Control-Allow-Methods"),
            Some("POST, OPTIONS")
        );
        assert_eq!(
            header(&outcome, "Access-Control-Allow-Headers"),
            Some("Content-Type, Authorization")
        );
    }

    #[tokio::test]
    async fn sync_appends_query_string_to_upstream_url() {
        let client = MockHttpClient::new();
        let expected_url = format!("{}?since=1700000000000", UPSTREAM);
        client.mock_response(&expected_url, 200, json!({ "success": true, "data": {} }));

        let outcome = forward_sync(&client, &test_config(), "since=1700000000000").await;

        assert_eq!(outcome.status, 200);
        let reqs = client.requests.borrow();
        assert_eq!(reqs[0].url, expected_url);
        assert_eq!(reqs[0].method, HttpMethod::Get);
        assert_eq!(
            header(&outcome, "Access-Control-Allow-Methods"),
            Some("GET, OPTIONS")
        );
    }

    #[tokio::test]
    async fn sync_with_empty_query_hits_bare_upstream_url() {
        let client = MockHttpClient::new();
        client.mock_response(UPSTREAM, 200, json!({ "success": true }));

        let outcome = forward_sync(&client, &test_config(), "").await;

        assert_eq!(outcome.status, 200);
        assert_eq!(client.requests.borrow()[0].url, UPSTREAM);
    }

    #[tokio::test]
    async fn sync_transport_failure_is_generic_500() {
        let client = MockHttpClient::new();
        let outcome = forward_sync(&client, &test_config(), "since=0").await;

        assert_eq!(outcome.status, 500);
        assert!(outcome.body.contains("Server error"));
    }

    /// 对真实上游的连通性检查，手动运行：
    /// `cargo test live_sync_forward -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn live_sync_forward() {
        let client = ReqwestHttpClient::new();
        let cfg = GatewayConfig {
            upstream_url: crate::DEFAULT_UPSTREAM_URL.to_string(),
            allow_origin: "*".to_string(),
        };

        let outcome = forward_sync(&client, &cfg, "since=0").await;
        assert_eq!(header(&outcome, "Access-Control-Allow-Origin"), Some("*"));
    }
}
