pub mod builder;
pub mod cache;
pub mod config;
pub mod exception;
pub mod interceptor;
pub mod matcher;
pub mod param;
pub mod pattern;
pub mod table;

pub use cache::MatchCache;
pub use config::{Config, RouteDecl};
pub use exception::Exception;
pub use interceptor::{InterceptorChain, LinkInterceptor};
pub use matcher::MatchResult;
pub use param::{ParamValue, ParameterMap};
pub use pattern::{LinkPattern, Segment};
pub use table::{PageId, RouteInfo, RouteTable};
