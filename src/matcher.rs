// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 请求路径匹配
//!
//! 把请求路径解析为页面标识与参数绑定。匹配不到是正常结果（`Ok(None)`），
//! 由上层分发器决定返回 404；只有路径本身不合法才会返回错误。

use std::collections::HashMap;

use log::debug;
use serde_derive::Serialize;

use crate::{
    exception::Exception,
    param::PATH_DELIMITER,
    pattern::{LinkPattern, Segment},
    table::{PageId, RouteTable, Routes},
};

/// 一次成功匹配的结果。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub(crate) page: PageId,
    pub(crate) pattern: String,
    pub(crate) name: String,
    pub(crate) attributes: HashMap<String, String>,
}

impl MatchResult {
    pub fn page(&self) -> &PageId {
        &self.page
    }

    /// 命中的原始模式文本
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// 页面的路由名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 从路径中提取出的参数
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// 去掉片段（`#` 之后）与查询字符串（`?` 之后）。
pub fn strip_query(path: &str) -> &str {
    let path = path.split('#').next().unwrap_or("");
    path.split('?').next().unwrap_or("")
}

/// 把已去掉查询串的路径切分为 token。
///
/// 路径必须以 `/` 开头；`/` 本身切分为零个 token。
pub fn tokenize(path: &str) -> Result<Vec<&str>, Exception> {
    let rest = match path.strip_prefix(PATH_DELIMITER) {
        Some(rest) => rest,
        None => {
            return Err(Exception::InvalidPath(format!(
                "path \"{}\" must start with '/'",
                path
            )))
        }
    };
    if rest.is_empty() {
        Ok(vec![])
    } else {
        Ok(rest.split(PATH_DELIMITER).collect())
    }
}

/// 模式与 token 序列是否结构上匹配。
pub fn pattern_matches(pattern: &LinkPattern, tokens: &[&str]) -> bool {
    pattern.segments().len() == tokens.len()
        && pattern
            .segments()
            .iter()
            .zip(tokens)
            .all(|(segment, token)| segment.accepts(token))
}

fn bind(pattern: &LinkPattern, tokens: &[&str]) -> HashMap<String, String> {
    pattern
        .segments()
        .iter()
        .zip(tokens)
        .filter_map(|(segment, token)| match segment {
            Segment::Parameter { name, .. } => Some((name.clone(), token.to_string())),
            Segment::Literal(_) => None,
        })
        .collect()
}

// 页面按注册顺序、模式按声明顺序遍历，返回第一个命中
fn find_match(routes: &Routes, tokens: &[&str]) -> Option<MatchResult> {
    for route in &routes.routes {
        for pattern in &route.patterns {
            if pattern_matches(pattern, tokens) {
                return Some(MatchResult {
                    page: route.page.clone(),
                    pattern: pattern.text().to_string(),
                    name: route.name.clone(),
                    attributes: bind(pattern, tokens),
                });
            }
        }
    }
    None
}

impl RouteTable {
    /// 匹配请求路径（不含上下文路径），路径可以带查询串与片段。
    ///
    /// # 错误处理
    /// 去掉查询串后的路径不以 `/` 开头时返回 `Exception::InvalidPath`。
    pub fn match_path(&self, path: &str) -> Result<Option<MatchResult>, Exception> {
        let path = strip_query(path);
        let tokens = tokenize(path)?;

        if let Some(cache) = &self.match_cache {
            let generation = self.generation();
            let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = cache.find(path, generation) {
                debug!("匹配缓存命中：{}", path);
                return Ok(hit);
            }
        }

        // 缓存锁与表读锁互不嵌套
        let state = self.read();
        let generation = state.generation;
        let result = find_match(&state, &tokens);
        drop(state);
        match &result {
            Some(m) => debug!("路径{}匹配到页面{}，模式\"{}\"", path, m.page, m.pattern),
            None => debug!("路径{}没有匹配的路由", path),
        }

        if let Some(cache) = &self.match_cache {
            let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.push(path, result.clone(), generation);
        }
        Ok(result)
    }

    /// 匹配完整的请求 URI：若以上下文路径开头（按整段），先去掉它再匹配。
    pub fn match_uri(&self, uri: &str) -> Result<Option<MatchResult>, Exception> {
        let context = self.context_path();
        if context.is_empty() {
            return self.match_path(uri);
        }
        match uri.strip_prefix(context) {
            Some("") => self.match_path("/"),
            Some(rest) if rest.starts_with(['/', '?', '#']) => {
                if rest.starts_with('/') {
                    self.match_path(rest)
                } else {
                    self.match_path(&format!("/{}", rest))
                }
            }
            _ => self.match_path(uri),
        }
    }
}
