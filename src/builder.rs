//! # 链接生成
//!
//! 匹配的逆运算：给定页面（或路由名）与参数表，挑选最合适的模式，
//! 代入参数得到规范链接，未被模式消耗的参数拼成查询字符串，
//! 最后交给拦截器链做后处理。

use log::{debug, warn};

use crate::{
    exception::Exception,
    param::{ParamValue, ParameterMap, PATH_DELIMITER, RESERVED_PATH_CHARS},
    pattern::{LinkPattern, Segment},
    table::{PageId, Route, RouteTable},
};

/// 模式能否被（已规范化的）参数表满足：每个参数段都有单值，在允许值之内，
/// 且不含 `/`、`?`、`#`。
pub fn is_satisfiable(pattern: &LinkPattern, params: &ParameterMap) -> bool {
    pattern.segments().iter().all(|segment| match segment {
        Segment::Literal(_) => true,
        Segment::Parameter { name, .. } => match params.get(name).and_then(ParamValue::as_single) {
            Some(value) if !value.contains(RESERVED_PATH_CHARS) => segment.accepts(value),
            _ => false,
        },
    })
}

/// 在可满足的模式中选参数段最多的一个；数量相同时取先声明的。
pub fn select_pattern<'a, I>(patterns: I, params: &ParameterMap) -> Option<&'a LinkPattern>
where
    I: IntoIterator<Item = &'a LinkPattern>,
{
    let mut best: Option<&LinkPattern> = None;
    for pattern in patterns {
        if !is_satisfiable(pattern, params) {
            continue;
        }
        match best {
            Some(current) if current.parameter_count() >= pattern.parameter_count() => {}
            _ => best = Some(pattern),
        }
    }
    best
}

/// 代入参数并拼接查询字符串，结果以上下文路径开头。
pub fn render(context_path: &str, pattern: &LinkPattern, params: &ParameterMap) -> String {
    let mut link = String::from(context_path);
    link.push(PATH_DELIMITER);

    let mut consumed = Vec::new();
    let mut parts = Vec::with_capacity(pattern.segments().len());
    for segment in pattern.segments() {
        match segment {
            Segment::Literal(text) => parts.push(text.as_str()),
            Segment::Parameter { name, .. } => {
                // 调用方保证模式可满足
                let value = params.get(name).and_then(ParamValue::as_single).unwrap_or("");
                parts.push(value);
                consumed.push(name.as_str());
            }
        }
    }
    link.push_str(&parts.join("/"));

    let mut separator = '?';
    for (key, value) in params.iter() {
        if consumed.contains(&key) {
            continue;
        }
        for v in value.values() {
            link.push(separator);
            link.push_str(key);
            link.push('=');
            link.push_str(v);
            separator = '&';
        }
    }
    link
}

impl RouteTable {
    /// 为页面生成链接。
    ///
    /// 参数值不做转义：含 `/`、`?`、`#` 的值不能填入路径参数，只会进入查询字符串。
    ///
    /// # 错误处理
    /// 页面未注册，或没有任何模式能被给定参数满足时，返回 `Exception::NoSuchLink`。
    pub fn link(&self, page: &PageId, params: &ParameterMap) -> Result<String, Exception> {
        let (route_page, link, interceptors) = {
            let state = self.read();
            let route = match state.route_of(page) {
                Some(route) => route,
                None => {
                    warn!("为未注册的页面{}生成链接", page);
                    return Err(Exception::NoSuchLink(format!("page {} is not registered", page)));
                }
            };
            let link = self.render_route(route, params)?;
            (route.page.clone(), link, state.interceptors.clone())
        };
        Ok(interceptors.apply(link, &route_page, None, params))
    }

    /// 按路由名生成链接，拦截器会收到该路由名。
    pub fn link_named(&self, name: &str, params: &ParameterMap) -> Result<String, Exception> {
        let (route_page, link, interceptors) = {
            let state = self.read();
            let route = match state.route_named(name) {
                Some(route) => route,
                None => {
                    warn!("为未注册的路由名{}生成链接", name);
                    return Err(Exception::NoSuchLink(format!(
                        "route name \"{}\" is not registered",
                        name
                    )));
                }
            };
            let link = self.render_route(route, params)?;
            (route.page.clone(), link, state.interceptors.clone())
        };
        Ok(interceptors.apply(link, &route_page, Some(name), params))
    }

    /// 以扁平键值序列 `[k1, v1, k2, v2, ...]` 为参数生成链接。
    pub fn link_pairs<I, T>(&self, page: &PageId, pairs: I) -> Result<String, Exception>
    where
        I: IntoIterator<Item = T>,
        T: Into<ParamValue>,
    {
        self.link(page, &ParameterMap::from_flat(pairs)?)
    }

    pub fn link_named_pairs<I, T>(&self, name: &str, pairs: I) -> Result<String, Exception>
    where
        I: IntoIterator<Item = T>,
        T: Into<ParamValue>,
    {
        self.link_named(name, &ParameterMap::from_flat(pairs)?)
    }

    fn render_route(&self, route: &Route, params: &ParameterMap) -> Result<String, Exception> {
        let normalized = params.normalized();
        let pattern = select_pattern(route.patterns.iter().map(|p| &**p), &normalized);
        match pattern {
            Some(pattern) => {
                let link = render(self.context_path(), pattern, &normalized);
                debug!("页面{}使用模式\"{}\"生成链接{}", route.page, pattern.text(), link);
                Ok(link)
            }
            None => {
                warn!("页面{}没有可被参数{:?}满足的模式", route.page, normalized);
                Err(Exception::NoSuchLink(format!(
                    "no link pattern of page {} (name \"{}\") can be satisfied by parameters {:?}",
                    route.page,
                    route.name,
                    normalized.iter().map(|(k, _)| k).collect::<Vec<_>>()
                )))
            }
        }
    }
}
