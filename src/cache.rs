use std::num::NonZeroUsize;

use lru::LruCache;

use crate::matcher::MatchResult;

#[derive(Clone)]
struct CacheEntry {
    result: Option<MatchResult>,
    generation: u64,
}

/// 请求路径到匹配结果的 LRU 缓存。
///
/// 每个条目都记录写入时路由表的代数（generation），路由表每次注册都会让代数加一，
/// 代数不一致的条目视为过期。"没有匹配"同样会被缓存。
pub struct MatchCache {
    cache: LruCache<String, CacheEntry>,
}

impl MatchCache {
    // 根据容量构造，容量为 0 时返回 None
    pub fn from_capacity(capacity: usize) -> Option<Self> {
        NonZeroUsize::new(capacity).map(|cap| Self {
            cache: LruCache::new(cap),
        })
    }

    // 放入
    pub fn push(&mut self, path: &str, result: Option<MatchResult>, generation: u64) {
        let entry = CacheEntry { result, generation };
        self.cache.put(path.to_string(), entry);
    }

    // 查询有效缓存，外层 None 表示未命中
    pub fn find(&mut self, path: &str, current_generation: u64) -> Option<Option<MatchResult>> {
        match self.cache.get(path) {
            Some(entry) if entry.generation == current_generation => Some(entry.result.clone()),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}
