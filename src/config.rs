use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, warn};
use std::fs;

use crate::exception::Exception;

/// 一条路由声明：页面标识、若干链接模式，以及可选的路由名。
///
/// `patterns` 中的每个元素也可以是用 `;` 拼接起来的多个模式。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RouteDecl {
    pub page: String,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    context_path: String,
    #[serde(default = "default_match_cache_size")]
    match_cache_size: usize,
    #[serde(default, rename = "route")]
    routes: Vec<RouteDecl>,
}

fn default_match_cache_size() -> usize {
    128
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            context_path: String::new(),
            match_cache_size: default_match_cache_size(),
            routes: vec![],
        }
    }

    pub fn from_toml(filename: &str) -> Result<Self, Exception> {
        let str_val = match fs::read_to_string(filename) {
            Ok(s) => s,
            Err(e) => {
                error!("无法读取配置文件{}：{}", filename, e);
                return Err(Exception::Configuration(format!(
                    "can't read config file {}: {}",
                    filename, e
                )));
            }
        };
        Self::from_toml_str(&str_val)
    }

    pub fn from_toml_str(str_val: &str) -> Result<Self, Exception> {
        let mut raw_config: Config = match toml::from_str(str_val) {
            Ok(t) => t,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象：{}", e);
                return Err(Exception::Configuration(format!(
                    "malformed config: {}",
                    e
                )));
            }
        };
        let normalized = normalize_context_path(&raw_config.context_path);
        if normalized != raw_config.context_path {
            warn!(
                "context_path被设置为\"{}\"，已规范化为\"{}\"",
                raw_config.context_path, normalized
            );
            raw_config.context_path = normalized;
        }
        Ok(raw_config)
    }

    pub fn with_context_path(mut self, context_path: &str) -> Self {
        self.context_path = normalize_context_path(context_path);
        self
    }

    pub fn with_match_cache_size(mut self, size: usize) -> Self {
        self.match_cache_size = size;
        self
    }

    pub fn with_route(mut self, decl: RouteDecl) -> Self {
        self.routes.push(decl);
        self
    }
}

impl Config {
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    pub fn match_cache_size(&self) -> usize {
        self.match_cache_size
    }

    pub fn routes(&self) -> &[RouteDecl] {
        &self.routes
    }
}

/// 规范化部署上下文路径：去掉末尾的 `/`，补上开头的 `/`，根路径 `/` 记为空串。
pub fn normalize_context_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
