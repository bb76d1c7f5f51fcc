// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由参数与常量模块
//!
//! 该模块定义了链接模式语言相关的常量和参数数据结构，包括：
//! - 模式语法中使用的分隔符与合法示例。
//! - 参数值 `ParamValue`：单值、多值（展开为重复的查询参数）或缺失。
//! - 有序的参数表 `ParameterMap`，用于生成链接。

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::exception::Exception;

/// 多个链接模式拼接在一起时使用的分隔符，例如 `"" + ";" + "page/{pageIndex}"`
pub const PATTERN_SEPARATOR: char = ';';

/// 模式与请求路径中的段分隔符
pub const PATH_DELIMITER: char = '/';

/// 参数段内部名称与允许值之间的分隔符
pub const VALUES_SEPARATOR: char = ':';

/// 允许值列表内部的分隔符
pub const VALUE_LIST_SEPARATOR: char = ',';

/// 路径参数值中不能出现的字符：出现后生成的链接无法再匹配回原值
pub const RESERVED_PATH_CHARS: [char; 3] = ['/', '?', '#'];

/// 报告模式语法错误时附带的合法示例
pub const PATTERN_EXAMPLES: &str =
    r#""profile/{userName}", "profile/{userName:Mike,Max}", "profiles/all", """#;

lazy_static! {
    /// 识别参数段：整个 token 被一对花括号包裹，且内部不再出现花括号。
    pub static ref PARAMETER_TOKEN: Regex = Regex::new(r"^\{([^{}]*)\}$").unwrap();
}

/// 单个参数的取值。
///
/// 缺失值（`Null`、空字符串、空列表）在生成链接时会被忽略；
/// 多值只会出现在查询字符串中，每个元素展开为一个 `key=value`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// 缺失值
    Null,
    /// 单个字符串值
    Single(String),
    /// 多个值，按迭代顺序展开
    Multi(Vec<String>),
}

impl ParamValue {
    /// 值是否"缺失"：`Null`、空字符串或空列表。
    pub fn is_missing(&self) -> bool {
        match self {
            ParamValue::Null => true,
            ParamValue::Single(s) => s.is_empty(),
            ParamValue::Multi(v) => v.is_empty(),
        }
    }

    /// 如果是单值，返回其字符串形式。
    pub fn as_single(&self) -> Option<&str> {
        match self {
            ParamValue::Single(s) => Some(s),
            _ => None,
        }
    }

    /// 以查询参数的形式展开：单值产生一项，多值每个元素一项，缺失值不产生。
    pub fn values(&self) -> Vec<&str> {
        match self {
            ParamValue::Null => vec![],
            ParamValue::Single(s) => vec![s.as_str()],
            ParamValue::Multi(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => write!(f, ""),
            ParamValue::Single(s) => write!(f, "{}", s),
            ParamValue::Multi(v) => write!(f, "{}", v.join(",")),
        }
    }
}

macro_rules! display_param_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(value: $t) -> Self {
                    ParamValue::Single(value.to_string())
                }
            }
        )*
    };
}

display_param_value!(
    &str, String, &String, char, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128,
    usize, f32, f64
);

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => ParamValue::Null,
        }
    }
}

impl<T: fmt::Display> From<Vec<T>> for ParamValue {
    fn from(value: Vec<T>) -> Self {
        ParamValue::Multi(value.iter().map(|v| v.to_string()).collect())
    }
}

impl<T: fmt::Display> From<&[T]> for ParamValue {
    fn from(value: &[T]) -> Self {
        ParamValue::Multi(value.iter().map(|v| v.to_string()).collect())
    }
}

impl From<&Value> for ParamValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ParamValue::Null,
            Value::Array(items) => ParamValue::Multi(
                items
                    .iter()
                    .filter(|item| !item.is_null())
                    .map(json_scalar_to_string)
                    .collect(),
            ),
            other => ParamValue::Single(json_scalar_to_string(other)),
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::from(&value)
    }
}

// 字符串不带引号，其余类型使用 JSON 文本
fn json_scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 生成链接时使用的有序参数表。
///
/// 保留插入顺序（查询字符串按该顺序输出）；对已存在的键再次插入会原地替换值。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: Vec<(String, ParamValue)>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    /// 插入或替换一个参数。
    pub fn insert<K: Into<String>, V: Into<ParamValue>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// 链式插入，便于在调用处直接构造。
    pub fn with<K: Into<String>, V: Into<ParamValue>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// 从扁平的键值序列构造：`[k1, v1, k2, v2, ...]`。
    ///
    /// # 错误处理
    /// 序列长度为奇数，或某个键不是非空单值时，返回 `Exception::InvalidArgument`。
    pub fn from_flat<I, T>(items: I) -> Result<Self, Exception>
    where
        I: IntoIterator<Item = T>,
        T: Into<ParamValue>,
    {
        let items: Vec<ParamValue> = items.into_iter().map(Into::into).collect();
        if items.len() % 2 != 0 {
            return Err(Exception::InvalidArgument(format!(
                "key/value list must have even length, got {} items",
                items.len()
            )));
        }
        let mut map = ParameterMap::new();
        for pair in items.chunks(2) {
            let key = match &pair[0] {
                ParamValue::Single(k) if !k.is_empty() => k.clone(),
                other => {
                    return Err(Exception::InvalidArgument(format!(
                        "parameter key must be a non-empty string, got {:?}",
                        other
                    )))
                }
            };
            map.insert(key, pair[1].clone());
        }
        Ok(map)
    }

    /// 从 JSON 对象构造参数表，键顺序与对象迭代顺序一致。
    pub fn from_json(value: &Value) -> Result<Self, Exception> {
        match value {
            Value::Object(object) => Ok(object
                .iter()
                .map(|(k, v)| (k.clone(), ParamValue::from(v)))
                .collect()),
            other => Err(Exception::InvalidArgument(format!(
                "expected a JSON object of parameters, got {}",
                other
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 去掉所有缺失值后的副本，只有它会参与模式匹配。
    pub fn normalized(&self) -> ParameterMap {
        Self {
            entries: self
                .entries
                .iter()
                .filter_map(|(k, v)| {
                    let v = match v {
                        ParamValue::Multi(values) => ParamValue::Multi(
                            values.iter().filter(|s| !s.is_empty()).cloned().collect(),
                        ),
                        other => other.clone(),
                    };
                    if v.is_missing() {
                        None
                    } else {
                        Some((k.clone(), v))
                    }
                })
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ParameterMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl From<HashMap<String, String>> for ParameterMap {
    fn from(value: HashMap<String, String>) -> Self {
        value.into_iter().collect()
    }
}
