// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由表模块
//!
//! 路由表是页面标识与链接模式之间的权威映射，负责：
//! 1. 页面 → 模式集合、路由名 → 页面 两张表的维护；
//! 2. 注册时的全局唯一性校验（模式文本、路由名）；
//! 3. 拦截器链的登记与移除。
//!
//! 所有可变状态都由同一把读写锁保护：注册、登记拦截器持有写锁，
//! 匹配与生成链接只持有读锁，因此读方永远看不到注册到一半的路由表。

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{error, info};
use serde::Serializer;
use serde_derive::Serialize;

use crate::{
    cache::MatchCache,
    config::{normalize_context_path, Config},
    exception::Exception,
    interceptor::{InterceptorChain, LinkInterceptor},
    param::PATTERN_SEPARATOR,
    pattern::LinkPattern,
};

/// 页面标识，不透明、可廉价克隆、可哈希。
///
/// 通常使用类似 `"blog.UserPage"` 的全限定名；默认路由名取最后一段（`UserPage`）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(Arc<str>);

impl PageId {
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 去掉 `.` 或 `::` 限定前缀之后的简单名称。
    pub fn simple_name(&self) -> &str {
        self.0.rsplit(['.', ':']).next().unwrap_or(self.as_str())
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(value: &str) -> Self {
        PageId::new(value)
    }
}

impl From<String> for PageId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl serde::Serialize for PageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// 一个已注册页面的全部信息。
pub(crate) struct Route {
    pub(crate) page: PageId,
    pub(crate) name: String,
    pub(crate) patterns: Vec<Arc<LinkPattern>>,
}

/// 读写锁保护的全部可变状态。
#[derive(Default)]
pub(crate) struct Routes {
    /// 按注册顺序排列
    pub(crate) routes: Vec<Route>,
    by_page: HashMap<PageId, usize>,
    by_name: HashMap<String, usize>,
    /// 已注册的模式文本，用于全局唯一性校验
    patterns: HashSet<String>,
    pub(crate) interceptors: InterceptorChain,
    /// 每次注册加一，匹配缓存据此判断条目是否过期
    pub(crate) generation: u64,
}

impl Routes {
    pub(crate) fn route_of(&self, page: &PageId) -> Option<&Route> {
        self.by_page.get(page).map(|&i| &self.routes[i])
    }

    pub(crate) fn route_named(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|&i| &self.routes[i])
    }
}

/// 路由列表中的一项，供诊断输出使用。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInfo {
    pub page: PageId,
    pub name: String,
    pub patterns: Vec<String>,
}

/// 路由表。
///
/// 由应用的组合根创建并共享（通常包在 `Arc` 里），而不是全局静态变量。
pub struct RouteTable {
    context_path: String,
    pub(crate) state: RwLock<Routes>,
    pub(crate) match_cache: Option<Mutex<MatchCache>>,
}

impl RouteTable {
    /// 使用默认配置（空上下文路径）创建路由表。
    pub fn new() -> Self {
        Self::with_config(&Config::new())
    }

    /// 按配置中的上下文路径与缓存容量创建空路由表，不注册任何路由。
    pub fn with_config(config: &Config) -> Self {
        let match_cache = MatchCache::from_capacity(config.match_cache_size()).map(Mutex::new);
        if match_cache.is_none() {
            info!("match_cache_size为0，匹配缓存已禁用");
        }
        Self {
            context_path: normalize_context_path(config.context_path()),
            state: RwLock::new(Routes::default()),
            match_cache,
        }
    }

    /// 创建路由表并注册配置中声明的全部路由。
    pub fn from_config(config: &Config) -> Result<Self, Exception> {
        let table = Self::with_config(config);
        for decl in config.routes() {
            let patterns: Vec<&str> = decl
                .patterns
                .iter()
                .flat_map(|p| p.split(PATTERN_SEPARATOR))
                .collect();
            table.register(decl.page.as_str(), &patterns, decl.name.as_deref())?;
        }
        Ok(table)
    }

    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Routes> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Routes> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 注册一个页面的若干链接模式。
    ///
    /// # 逻辑步骤
    /// 1. 模式列表不能为空；
    /// 2. 计算路由名（显式给出，或取页面的简单名称），并检查名称与页面的一一对应；
    /// 3. 逐条解析模式，并检查模式文本在整张表内（包括本次调用内）从未出现过；
    /// 4. 全部校验通过后才修改路由表。
    ///
    /// 整个过程持有写锁，与其他注册和所有读操作互斥。
    pub fn register<P, S>(&self, page: P, patterns: &[S], name: Option<&str>) -> Result<(), Exception>
    where
        P: Into<PageId>,
        S: AsRef<str>,
    {
        let page = page.into();
        if patterns.is_empty() {
            error!("页面{}注册时没有给出任何链接模式", page);
            return Err(Exception::Configuration(format!(
                "page {} must declare at least one link pattern",
                page
            )));
        }
        let name = match name {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => page.simple_name().to_string(),
        };

        let mut state = self.write();

        if let Some(existing) = state.route_named(&name) {
            if existing.page != page {
                error!("路由名{}已被页面{}占用", name, existing.page);
                return Err(Exception::Configuration(format!(
                    "route name \"{}\" is already bound to page {}, can't bind it to {}",
                    name, existing.page, page
                )));
            }
        }
        if let Some(existing) = state.route_of(&page) {
            if existing.name != name {
                error!("页面{}已以路由名{}注册", page, existing.name);
                return Err(Exception::Configuration(format!(
                    "page {} is already registered under name \"{}\", not \"{}\"",
                    page, existing.name, name
                )));
            }
        }

        let mut compiled = Vec::with_capacity(patterns.len());
        let mut seen = HashSet::new();
        for text in patterns {
            let text = text.as_ref();
            let pattern = LinkPattern::parse(text)?;
            if state.patterns.contains(text) || !seen.insert(text.to_string()) {
                error!("链接模式\"{}\"重复注册", text);
                return Err(Exception::Configuration(format!(
                    "link pattern \"{}\" is already registered",
                    text
                )));
            }
            compiled.push(Arc::new(pattern));
        }

        for pattern in &compiled {
            state.patterns.insert(pattern.text().to_string());
        }
        let existing = state.by_page.get(&page).copied();
        let index = match existing {
            Some(i) => {
                state.routes[i].patterns.extend(compiled);
                i
            }
            None => {
                state.routes.push(Route {
                    page: page.clone(),
                    name: name.clone(),
                    patterns: compiled,
                });
                let i = state.routes.len() - 1;
                state.by_page.insert(page.clone(), i);
                state.by_name.insert(name.clone(), i);
                i
            }
        };
        state.generation += 1;
        info!(
            "页面{}以路由名{}注册，当前模式：{:?}",
            page,
            name,
            state.routes[index]
                .patterns
                .iter()
                .map(|p| p.text())
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    /// 注册以 `;` 拼接的多个模式，例如 `";page/{pageIndex}"`。
    pub fn register_joined<P: Into<PageId>>(
        &self,
        page: P,
        joined: &str,
        name: Option<&str>,
    ) -> Result<(), Exception> {
        let patterns: Vec<&str> = joined.split(PATTERN_SEPARATOR).collect();
        self.register(page, &patterns, name)
    }

    /// 页面已注册的全部模式文本，按声明顺序。
    pub fn patterns_of(&self, page: &PageId) -> Result<Vec<String>, Exception> {
        let state = self.read();
        match state.route_of(page) {
            Some(route) => Ok(pattern_texts(route)),
            None => Err(Exception::NoSuchRoute(format!("page {}", page))),
        }
    }

    /// 路由名对应页面的全部模式文本。
    pub fn patterns_named(&self, name: &str) -> Result<Vec<String>, Exception> {
        let state = self.read();
        match state.route_named(name) {
            Some(route) => Ok(pattern_texts(route)),
            None => Err(Exception::NoSuchRoute(format!("name \"{}\"", name))),
        }
    }

    pub fn page_named(&self, name: &str) -> Result<PageId, Exception> {
        let state = self.read();
        match state.route_named(name) {
            Some(route) => Ok(route.page.clone()),
            None => Err(Exception::NoSuchRoute(format!("name \"{}\"", name))),
        }
    }

    pub fn name_of(&self, page: &PageId) -> Result<String, Exception> {
        let state = self.read();
        match state.route_of(page) {
            Some(route) => Ok(route.name.clone()),
            None => Err(Exception::NoSuchRoute(format!("page {}", page))),
        }
    }

    /// 按注册顺序列出全部路由的快照。
    pub fn routes(&self) -> Vec<RouteInfo> {
        let state = self.read();
        state
            .routes
            .iter()
            .map(|route| RouteInfo {
                page: route.page.clone(),
                name: route.name.clone(),
                patterns: pattern_texts(route),
            })
            .collect()
    }

    /// 当前代数，每次成功注册后加一。
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// 登记拦截器；同名拦截器会被原地替换。
    pub fn add_interceptor<I: LinkInterceptor + 'static>(&self, name: &str, interceptor: I) {
        self.write().interceptors.add(name, interceptor);
    }

    /// 移除拦截器，名称不存在时什么也不做。
    pub fn remove_interceptor(&self, name: &str) -> bool {
        self.write().interceptors.remove(name)
    }

    pub fn interceptor_names(&self) -> Vec<String> {
        self.read()
            .interceptors
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

fn pattern_texts(route: &Route) -> Vec<String> {
    route.patterns.iter().map(|p| p.text().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteDecl;

    #[test]
    fn test_page_id_simple_name() {
        assert_eq!(PageId::new("blog.web.UserPage").simple_name(), "UserPage");
        assert_eq!(PageId::new("blog::UserPage").simple_name(), "UserPage");
        assert_eq!(PageId::new("UserPage").simple_name(), "UserPage");
    }

    #[test]
    fn test_register_and_lookup() {
        let table = RouteTable::new();
        table
            .register("blog.IndexPage", &["", "page/{pageIndex}"], None)
            .unwrap();
        let page = PageId::new("blog.IndexPage");
        assert_eq!(
            table.patterns_of(&page).unwrap(),
            vec!["".to_string(), "page/{pageIndex}".to_string()]
        );
        assert_eq!(table.name_of(&page).unwrap(), "IndexPage");
        assert_eq!(table.page_named("IndexPage").unwrap(), page);
        assert_eq!(table.patterns_named("IndexPage").unwrap().len(), 2);
    }

    #[test]
    fn test_register_empty_patterns() {
        let table = RouteTable::new();
        let empty: [&str; 0] = [];
        let result = table.register("blog.IndexPage", &empty, None);
        assert!(matches!(result, Err(Exception::Configuration(_))));
        assert!(table.routes().is_empty());
    }

    #[test]
    fn test_register_duplicate_pattern_same_page() {
        let table = RouteTable::new();
        table.register("blog.IndexPage", &["home"], None).unwrap();
        let result = table.register("blog.IndexPage", &["home"], None);
        assert!(matches!(result, Err(Exception::Configuration(_))));
    }

    #[test]
    fn test_register_duplicate_pattern_within_call() {
        let table = RouteTable::new();
        let result = table.register("blog.IndexPage", &["home", "home"], None);
        assert!(matches!(result, Err(Exception::Configuration(_))));
        assert_eq!(table.generation(), 0);
    }

    #[test]
    fn test_register_duplicate_pattern_other_page() {
        let table = RouteTable::new();
        table.register("blog.IndexPage", &["home"], None).unwrap();
        let result = table.register("blog.OtherPage", &["home"], None);
        assert!(matches!(result, Err(Exception::Configuration(_))));
        assert!(table.patterns_of(&PageId::new("blog.OtherPage")).is_err());
    }

    #[test]
    fn test_register_name_conflict() {
        let table = RouteTable::new();
        table.register("a.Page", &["a"], Some("page")).unwrap();
        let result = table.register("b.Page", &["b"], Some("page"));
        assert!(matches!(result, Err(Exception::Configuration(_))));
        // 默认名称同样参与冲突检查
        let result = table.register("c.Page", &["c"], None);
        assert!(result.is_ok());
        let result = table.register("d.Page", &["d"], None);
        assert!(matches!(result, Err(Exception::Configuration(_))));
    }

    #[test]
    fn test_register_same_page_same_name_appends() {
        let table = RouteTable::new();
        table.register("a.Page", &["a"], Some("page")).unwrap();
        table.register("a.Page", &["b"], Some("page")).unwrap();
        assert_eq!(
            table.patterns_named("page").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(table.generation(), 2);
    }

    #[test]
    fn test_register_same_page_other_name() {
        let table = RouteTable::new();
        table.register("a.Page", &["a"], Some("first")).unwrap();
        let result = table.register("a.Page", &["b"], Some("second"));
        assert!(matches!(result, Err(Exception::Configuration(_))));
    }

    #[test]
    fn test_register_malformed_is_atomic() {
        let table = RouteTable::new();
        let result = table.register("a.Page", &["ok", "/bad"], None);
        assert!(matches!(result, Err(Exception::Configuration(_))));
        // 第一条合法模式也不应被登记
        table.register("b.Page", &["ok"], None).unwrap();
    }

    #[test]
    fn test_register_joined() {
        let table = RouteTable::new();
        table
            .register_joined("blog.IndexPage", ";page/{pageIndex}", Some("index"))
            .unwrap();
        assert_eq!(
            table.patterns_named("index").unwrap(),
            vec!["".to_string(), "page/{pageIndex}".to_string()]
        );
    }

    #[test]
    fn test_lookup_missing() {
        let table = RouteTable::new();
        assert!(matches!(
            table.patterns_named("ghost"),
            Err(Exception::NoSuchRoute(_))
        ));
        assert!(matches!(
            table.name_of(&PageId::new("ghost")),
            Err(Exception::NoSuchRoute(_))
        ));
    }

    #[test]
    fn test_routes_in_registration_order() {
        let table = RouteTable::new();
        table.register("z.Last", &["z"], None).unwrap();
        table.register("a.First", &["a"], None).unwrap();
        let names: Vec<String> = table.routes().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Last".to_string(), "First".to_string()]);
    }

    #[test]
    fn test_from_config() {
        let config = Config::new()
            .with_context_path("app")
            .with_route(RouteDecl {
                page: "blog.UserPage".to_string(),
                patterns: vec!["profile/{userName:Mike,Max};profiles/all".to_string()],
                name: Some("user".to_string()),
            });
        let table = RouteTable::from_config(&config).unwrap();
        assert_eq!(table.context_path(), "/app");
        assert_eq!(table.patterns_named("user").unwrap().len(), 2);
    }

    #[test]
    fn test_from_config_duplicate() {
        let decl = RouteDecl {
            page: "blog.UserPage".to_string(),
            patterns: vec!["profiles/all".to_string()],
            name: None,
        };
        let mut other = decl.clone();
        other.page = "blog.OtherPage".to_string();
        let config = Config::new().with_route(decl).with_route(other);
        assert!(RouteTable::from_config(&config).is_err());
    }

    #[test]
    fn test_interceptor_registration() {
        let table = RouteTable::new();
        table.add_interceptor(
            "noop",
            |link: &str, _: &PageId, _: Option<&str>, _: &crate::param::ParameterMap| {
                link.to_string()
            },
        );
        assert_eq!(table.interceptor_names(), vec!["noop".to_string()]);
        assert!(table.remove_interceptor("noop"));
        assert!(table.interceptor_names().is_empty());
    }

    #[test]
    fn test_route_info_serializes_page_as_string() {
        let table = RouteTable::new();
        table
            .register("blog.PostPage", &["post/{postId}"], Some("post"))
            .unwrap();
        let json = serde_json::to_string(&table.routes()).unwrap();
        assert_eq!(
            json,
            r#"[{"page":"blog.PostPage","name":"post","patterns":["post/{postId}"]}]"#
        );
        assert_eq!(
            serde_json::to_value(PageId::new("a.APage")).unwrap(),
            serde_json::json!("a.APage")
        );
    }
}
