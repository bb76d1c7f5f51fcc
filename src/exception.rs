// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了链接路由引擎在注册、匹配、生成链接过程中可能抛出的各类异常情况。
//!
//! ## 设计意图
//! - **错误分类**：区分配置错误（启动期）与调用错误（请求期）。
//! - **确定性**：路由是纯函数式的字符串计算，所有错误都不应被重试，而是直接交给调用方处理。
//! - **注意**：匹配不到路由并不是错误，`match_path` 会返回 `Ok(None)`，由上层分发器渲染 404。

use std::error::Error;
use std::fmt;

/// 路由引擎处理过程中发生的异常类型。
///
/// 每个变体都携带一段人类可读的说明，便于记录日志或直接展示给开发者。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exception {
    /// 链接模式语法错误、模式重复注册、路由名被其他页面占用、模式列表为空，
    /// 或者配置文件无法解析。
    Configuration(String),
    /// 无法为给定页面（或路由名）与参数生成链接：没有任何模式可以被满足，
    /// 或者该页面根本没有注册。
    NoSuchLink(String),
    /// 按页面或路由名查询时，目标从未注册。
    NoSuchRoute(String),
    /// 传给匹配器的路径不是以 `/` 开头。对应 `400 Bad Request`。
    InvalidPath(String),
    /// 调用参数不合法，例如键值对列表的长度为奇数。
    InvalidArgument(String),
}

use Exception::*;

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Configuration(msg) => write!(f, "Configuration error: {}", msg),
            NoSuchLink(msg) => write!(f, "No such link: {}", msg),
            NoSuchRoute(msg) => write!(f, "No such route: {}", msg),
            InvalidPath(msg) => write!(f, "Invalid path (400): {}", msg),
            InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl Error for Exception {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            Exception::Configuration("bad".to_string()).to_string(),
            "Configuration error: bad"
        );
        assert_eq!(
            Exception::InvalidPath("page".to_string()).to_string(),
            "Invalid path (400): page"
        );
        assert!(Exception::NoSuchLink("x".to_string())
            .to_string()
            .starts_with("No such link"));
    }

    #[test]
    fn test_is_std_error() {
        let boxed: Box<dyn Error> = Box::new(Exception::NoSuchRoute("ghost".to_string()));
        assert!(boxed.to_string().contains("ghost"));
    }
}
