//! 会话上下文模块
//!
//! 持久化令牌有唯一的属主：认证 store 在启动时加载、登录时写入、
//! 注销时清除。路由守卫通过同一接口判断令牌是否存在。
//! 其他任何调用点都不直接触碰存储。

use crate::web::LocalStorage;
use leadflow_shared::STORAGE_TOKEN_KEY;

/// 会话令牌的读写接口
///
/// 令牌是不透明字符串；它的存在与否是"已登录"在本地的唯一信号。
pub trait SessionStore {
    /// 读取持久化的令牌
    fn load(&self) -> Option<String>;
    /// 写入令牌
    fn save(&self, token: &str);
    /// 清除令牌
    fn clear(&self);
}

/// 浏览器 LocalStorage 实现（生产环境）
#[derive(Clone, Copy, Default)]
pub struct BrowserSession;

impl SessionStore for BrowserSession {
    fn load(&self) -> Option<String> {
        LocalStorage::get(STORAGE_TOKEN_KEY)
    }

    fn save(&self, token: &str) {
        LocalStorage::set(STORAGE_TOKEN_KEY, token);
    }

    fn clear(&self) {
        LocalStorage::delete(STORAGE_TOKEN_KEY);
    }
}

/// 内存实现（测试环境，模拟"重新加载页面"时换一个状态实例即可）
#[cfg(test)]
#[derive(Default)]
pub struct MemorySession(std::cell::RefCell<Option<String>>);

#[cfg(test)]
impl MemorySession {
    pub fn with_token(token: &str) -> Self {
        Self(std::cell::RefCell::new(Some(token.to_string())))
    }
}

#[cfg(test)]
impl SessionStore for MemorySession {
    fn load(&self) -> Option<String> {
        self.0.borrow().clone()
    }

    fn save(&self, token: &str) {
        *self.0.borrow_mut() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.0.borrow_mut() = None;
    }
}
