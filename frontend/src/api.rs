//! API 客户端
//!
//! 暴露给 store 的两个逻辑操作："执行一条命令"和"拉取同步快照"。
//! 契约：错误永远不会越过本模块边界抛出 —— 传输失败、解析失败
//! 一律折叠成 `{success: false, error}` 信封返回。

use crate::serde_helper;
use crate::web::HttpClient;
use leadflow_shared::protocol::{ApiResponse, Command, SyncData};
use leadflow_shared::{FN_COMMAND_PATH, FN_SYNC_PATH, QUERY_SINCE, Timestamp};
use leptos::prelude::*;
use serde::de::DeserializeOwned;

#[derive(Clone, Debug, PartialEq)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 同源部署：函数路径直接挂在当前站点下
    pub fn same_origin() -> Self {
        Self::new("")
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 执行一条命令
    ///
    /// POST 到命令转发函数；上游的逻辑失败（body 里 success=false）
    /// 原样返回，调用方只看信封，不看 HTTP 状态。
    pub async fn execute<T: DeserializeOwned>(&self, cmd: &Command) -> ApiResponse<T> {
        let body = match serde_helper::to_json_string(cmd) {
            Ok(body) => body,
            Err(e) => {
                web_sys::console::error_1(&format!("[api] serialize failed: {}", e).into());
                return ApiResponse::fail("Request serialization failed");
            }
        };

        let sent = HttpClient::post(&self.url(FN_COMMAND_PATH))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                web_sys::console::error_1(
                    &format!("[api] command '{}' failed: {}", cmd.action(), e).into(),
                );
                return ApiResponse::fail("Network request failed");
            }
        };

        Self::parse_envelope(response).await
    }

    /// 拉取自 `since` 以来的同步快照
    pub async fn sync_data(&self, since: Timestamp) -> ApiResponse<SyncData> {
        let sent = HttpClient::get(&self.url(FN_SYNC_PATH))
            .query(QUERY_SINCE, &since.to_string())
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                web_sys::console::error_1(&format!("[api] sync failed: {}", e).into());
                return ApiResponse::fail("Network request failed");
            }
        };

        Self::parse_envelope(response).await
    }

    async fn parse_envelope<T: DeserializeOwned>(
        response: crate::web::HttpResponse,
    ) -> ApiResponse<T> {
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                web_sys::console::error_1(&format!("[api] read body failed: {}", e).into());
                return ApiResponse::fail("Network request failed");
            }
        };

        match serde_helper::from_json_string::<ApiResponse<T>>(&text) {
            Ok(envelope) => envelope,
            Err(e) => {
                web_sys::console::error_1(&format!("[api] parse envelope failed: {}", e).into());
                ApiResponse::fail("Invalid server response")
            }
        }
    }
}

/// 从 Context 获取 API 客户端
pub fn use_api() -> ApiClient {
    use_context::<ApiClient>().expect("ApiClient should be provided")
}
