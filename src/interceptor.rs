//! # 链接拦截器
//!
//! 每一个生成出来的链接在返回前都会依次经过已注册的拦截器，
//! 拦截器可以原样返回，也可以返回改写后的链接（例如追加语言参数、切换域名）。

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::{param::ParameterMap, table::PageId};

/// 对生成的链接做后处理的能力。
///
/// `name` 只在按路由名生成链接时才是 `Some`。
pub trait LinkInterceptor: Send + Sync {
    fn intercept(
        &self,
        link: &str,
        page: &PageId,
        name: Option<&str>,
        params: &ParameterMap,
    ) -> String;
}

impl<F> LinkInterceptor for F
where
    F: Fn(&str, &PageId, Option<&str>, &ParameterMap) -> String + Send + Sync,
{
    fn intercept(
        &self,
        link: &str,
        page: &PageId,
        name: Option<&str>,
        params: &ParameterMap,
    ) -> String {
        self(link, page, name, params)
    }
}

/// 按名称登记、按登记顺序执行的拦截器链。
///
/// 以已存在的名称再次登记会原地替换，保留其原有位置。
#[derive(Clone, Default)]
pub struct InterceptorChain {
    entries: Vec<(String, Arc<dyn LinkInterceptor>)>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    pub fn add<I: LinkInterceptor + 'static>(&mut self, name: &str, interceptor: I) {
        self.add_shared(name, Arc::new(interceptor));
    }

    pub fn add_shared(&mut self, name: &str, interceptor: Arc<dyn LinkInterceptor>) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => {
                debug!("替换链接拦截器：{}", name);
                entry.1 = interceptor;
            }
            None => {
                debug!("添加链接拦截器：{}", name);
                self.entries.push((name.to_string(), interceptor));
            }
        }
    }

    /// 移除拦截器，名称不存在时什么也不做。返回是否真的移除了。
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        before != self.entries.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 让链接依次流过每个拦截器，前一个的输出是后一个的输入。
    pub fn apply(
        &self,
        link: String,
        page: &PageId,
        name: Option<&str>,
        params: &ParameterMap,
    ) -> String {
        self.entries.iter().fold(link, |current, (_, interceptor)| {
            interceptor.intercept(&current, page, name, params)
        })
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
