//! 定时器封装模块
//!
//! 使用 `web_sys` 的原生 `setTimeout` API 实现一次性定时器。

use wasm_bindgen::prelude::*;

/// 一次性定时器
///
/// 封装 `setTimeout`。被 drop 时自动取消；调用 [`Timeout::forget`]
/// 则放手让回调触发（用于通知的自动消失这类"发后不理"场景）。
pub struct Timeout {
    handle: i32,
    closure: Option<Closure<dyn Fn()>>,
}

impl Timeout {
    /// 创建新的一次性定时器
    ///
    /// # 参数
    /// - `millis`: 延迟时间（毫秒）
    /// - `callback`: 到期触发的回调函数
    ///
    /// # Panics
    /// 如果无法获取 window 对象或设置定时器失败
    pub fn new<F>(millis: u32, callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        let closure = Closure::new(callback);
        let window = web_sys::window().expect("无法获取 window 对象");

        let handle = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis as i32,
            )
            .expect("设置定时器失败");

        Self {
            handle,
            closure: Some(closure),
        }
    }

    /// 取消定时器
    ///
    /// 通常不需要手动调用，因为 drop 时会自动取消。
    pub fn cancel(&self) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(self.handle);
        }
    }

    /// 放弃所有权，让定时器自然触发
    ///
    /// 回调闭包被泄漏给 JS 运行时，之后无法再取消。
    pub fn forget(mut self) {
        if let Some(closure) = self.closure.take() {
            closure.forget();
        }
        std::mem::forget(self);
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        self.cancel();
    }
}
