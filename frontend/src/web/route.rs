//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其认证要求。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 总览面板（默认路由，需要认证）
    #[default]
    Dashboard,
    /// 登录页面
    Login,
    /// 线索列表
    Leads,
    /// 跟进活动
    Activities,
    /// 待办任务
    Tasks,
    /// 报表
    Reports,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        match path {
            "/" => Self::Dashboard,
            "/login" => Self::Login,
            "/leads" => Self::Leads,
            "/activities" => Self::Activities,
            "/tasks" => Self::Tasks,
            "/reports" => Self::Reports,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Dashboard => "/",
            Self::Login => "/login",
            Self::Leads => "/leads",
            Self::Activities => "/activities",
            Self::Tasks => "/tasks",
            Self::Reports => "/reports",
            Self::NotFound => "/404",
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    ///
    /// 守卫只看持久化令牌是否存在，不校验其有效性。
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::NotFound)
    }

    /// 定义已持有令牌的用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// 一次导航请求经过守卫后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    /// 放行目标路由
    Allow(AppRoute),
    /// 重定向到别的路由
    Redirect(AppRoute),
}

/// 纯函数守卫：根据令牌存在与否裁决目标路由
pub fn evaluate_guard(target: AppRoute, has_token: bool) -> GuardVerdict {
    if target.requires_auth() && !has_token {
        return GuardVerdict::Redirect(AppRoute::auth_failure_redirect());
    }
    if target.should_redirect_when_authenticated() && has_token {
        return GuardVerdict::Redirect(AppRoute::auth_success_redirect());
    }
    GuardVerdict::Allow(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_round_trip() {
        for route in [
            AppRoute::Dashboard,
            AppRoute::Login,
            AppRoute::Leads,
            AppRoute::Activities,
            AppRoute::Tasks,
            AppRoute::Reports,
        ] {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
    }

    #[test]
    fn protected_route_without_token_redirects_to_login() {
        assert_eq!(
            evaluate_guard(AppRoute::Leads, false),
            GuardVerdict::Redirect(AppRoute::Login)
        );
        assert_eq!(
            evaluate_guard(AppRoute::Dashboard, false),
            GuardVerdict::Redirect(AppRoute::Login)
        );
    }

    #[test]
    fn login_with_token_redirects_to_default_route() {
        assert_eq!(
            evaluate_guard(AppRoute::Login, true),
            GuardVerdict::Redirect(AppRoute::Dashboard)
        );
    }

    #[test]
    fn login_without_token_is_allowed() {
        assert_eq!(
            evaluate_guard(AppRoute::Login, false),
            GuardVerdict::Allow(AppRoute::Login)
        );
    }

    #[test]
    fn protected_route_with_token_is_allowed() {
        for route in [
            AppRoute::Dashboard,
            AppRoute::Leads,
            AppRoute::Activities,
            AppRoute::Tasks,
            AppRoute::Reports,
        ] {
            assert_eq!(evaluate_guard(route, true), GuardVerdict::Allow(route));
        }
    }

    #[test]
    fn not_found_never_requires_auth() {
        assert_eq!(
            evaluate_guard(AppRoute::NotFound, false),
            GuardVerdict::Allow(AppRoute::NotFound)
        );
    }
}
