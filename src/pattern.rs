//! # 链接模式解析
//!
//! 将一条模式字符串（例如 `"profile/{userName:Mike,Max}"`）编译为有序的段序列。
//!
//! 语法规则：
//! - 模式按 `/` 切分，每个 token 恰好对应一个段；
//! - 被 `{` `}` 包裹的 token 是参数段，内部可选 `name:v1,v2` 形式的允许值列表；
//! - 其余 token 是字面量段，必须逐字相等；
//! - 空模式 `""` 表示根路径，不含任何段。

use log::error;

use crate::{exception::Exception, param::*};

/// 模式中的一个段。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// 字面量，逐字匹配
    Literal(String),
    /// 命名参数；`allowed` 为空表示不受限制
    Parameter { name: String, allowed: Vec<String> },
}

impl Segment {
    /// 该段是否接受给定的 token。
    pub fn accepts(&self, token: &str) -> bool {
        match self {
            Segment::Literal(text) => text == token,
            Segment::Parameter { allowed, .. } => {
                allowed.is_empty() || allowed.iter().any(|v| v == token)
            }
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, Segment::Parameter { .. })
    }
}

/// 编译后的链接模式。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPattern {
    text: String,
    segments: Vec<Segment>,
}

impl LinkPattern {
    /// 解析一条模式字符串。
    ///
    /// # 错误处理
    /// 以 `/` 开头或结尾、花括号不成对、参数内冒号超过一个、参数名为空时，
    /// 返回 `Exception::Configuration`，信息中包含出错的模式与合法示例。
    pub fn parse(text: &str) -> Result<Self, Exception> {
        if text.starts_with(PATH_DELIMITER) || text.ends_with(PATH_DELIMITER) {
            return Err(malformed(text, "pattern must not start or end with '/'"));
        }
        if text.is_empty() {
            return Ok(Self {
                text: String::new(),
                segments: vec![],
            });
        }

        let mut segments = Vec::new();
        for token in text.split(PATH_DELIMITER) {
            segments.push(parse_segment(text, token)?);
        }
        Ok(Self {
            text: text.to_string(),
            segments,
        })
    }

    /// 原始模式字符串，同时也是全局唯一性校验的键。
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// 参数段的数量，生成链接时用于挑选最具体的模式。
    pub fn parameter_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_parameter()).count()
    }

    /// 所有参数名，按出现顺序。
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Parameter { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

fn parse_segment(pattern: &str, token: &str) -> Result<Segment, Exception> {
    let inner = match PARAMETER_TOKEN.captures(token) {
        Some(caps) => match caps.get(1) {
            Some(m) => m.as_str(),
            None => "",
        },
        // 未被花括号整体包住的 token（包括空 token）原样作为字面量
        None => return Ok(Segment::Literal(token.to_string())),
    };

    let parts: Vec<&str> = inner.split(VALUES_SEPARATOR).collect();
    let (name, allowed) = match parts.len() {
        1 => (parts[0], vec![]),
        2 => (
            parts[0],
            parts[1]
                .split(VALUE_LIST_SEPARATOR)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => return Err(malformed(pattern, "parameter contains more than one ':'")),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(malformed(pattern, "parameter name is empty"));
    }
    Ok(Segment::Parameter {
        name: name.to_string(),
        allowed,
    })
}

fn malformed(pattern: &str, reason: &str) -> Exception {
    error!("链接模式\"{}\"不合法：{}", pattern, reason);
    Exception::Configuration(format!(
        "illegal link pattern \"{}\" ({}), valid examples: {}",
        pattern, reason, PATTERN_EXAMPLES
    ))
}
