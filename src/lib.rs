//! LeadFlow 网关
//!
//! 一组无状态的 serverless 转发函数：把客户端请求转给固定的上游
//! 表格服务，并把上游响应体原文带着宽松的 CORS 头返回。
//! 命令载荷在边界上按 [`leadflow_shared::protocol::Command`] 闭集校验。

// =========================================================
// 跨平台日志宏
// =========================================================

#[cfg(target_arch = "wasm32")]
macro_rules! log_info {
    ($($t:tt)*) => (worker::console_log!($($t)*))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info {
    ($($t:tt)*) => (println!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_error {
    ($($t:tt)*) => (worker::console_error!($($t)*))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_error {
    ($($t:tt)*) => (eprintln!($($t)*))
}

pub mod gateway;
pub mod request;

// =========================================================
// 动态运行时配置 (Runtime Configuration)
// =========================================================

/// 这些是默认值，如果 wrangler.toml 的 [vars] 中没有定义，则使用这些值
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://script.google.com/macros/s/AKfycbyGxFUPk-kvRMd4-w7Gy-hOvUN72yAohXDS21CNdfuEQMPvq4hWPyRS3Jguydj5xjK3/exec";
pub const DEFAULT_ALLOW_ORIGIN: &str = "*";

/// 从 Env 读取 [vars]，实现配置解耦
#[cfg(target_arch = "wasm32")]
struct RuntimeConfig {
    upstream_url: String,
    allow_origin: String,
}

#[cfg(target_arch = "wasm32")]
impl RuntimeConfig {
    fn new(env: &worker::Env) -> Self {
        Self {
            // 尝试读取 [vars] UPSTREAM_URL，读不到就用默认上游地址
            upstream_url: env
                .var("UPSTREAM_URL")
                .map(|v| v.to_string())
                .unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string()),

            allow_origin: env
                .var("ALLOW_ORIGIN")
                .map(|v| v.to_string())
                .unwrap_or_else(|_| DEFAULT_ALLOW_ORIGIN.to_string()),
        }
    }

    fn into_gateway_config(self) -> gateway::GatewayConfig {
        gateway::GatewayConfig {
            upstream_url: self.upstream_url,
            allow_origin: self.allow_origin,
        }
    }
}

// =========================================================
// 控制器层 (Entry Point)
// =========================================================

#[cfg(target_arch = "wasm32")]
mod entry {
    use super::gateway::{ForwardOutcome, forward_command, forward_sync};
    use super::request::WorkerHttpClient;
    use leadflow_shared::{FN_COMMAND_PATH, FN_SYNC_PATH};
    use worker::*;

    fn method_name(method: &Method) -> String {
        format!("{:?}", method).to_uppercase()
    }

    fn into_response(outcome: ForwardOutcome) -> Result<Response> {
        let headers = Headers::new();
        for (k, v) in &outcome.headers {
            headers.set(k, v)?;
        }
        Ok(Response::ok(outcome.body)?
            .with_headers(headers)
            .with_status(outcome.status))
    }

    #[event(fetch)]
    pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
        console_error_panic_hook::set_once();

        let router = Router::new();
        router
            .on_async(FN_COMMAND_PATH, |mut req, ctx| async move {
                let cfg = super::RuntimeConfig::new(&ctx.env).into_gateway_config();
                let method = method_name(&req.method());
                let body = req.text().await.unwrap_or_default();
                let body = if body.is_empty() { None } else { Some(body) };

                let outcome =
                    forward_command(&WorkerHttpClient, &cfg, &method, body.as_deref()).await;
                into_response(outcome)
            })
            .on_async(FN_SYNC_PATH, |req, ctx| async move {
                let cfg = super::RuntimeConfig::new(&ctx.env).into_gateway_config();
                let query = req.url()?.query().unwrap_or_default().to_string();

                let outcome = forward_sync(&WorkerHttpClient, &cfg, &query).await;
                into_response(outcome)
            })
            .run(req, env)
            .await
    }
}
