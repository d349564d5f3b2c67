//! Search query compiler and result-shaping engine.
//!
//! Every request path runs through the same pieces: [`validate`] and
//! [`fields`] gate untrusted input, [`compiler`] turns it into bound SQL,
//! [`shaper`] cleans up what the store returns, and [`negative_cache`]
//! remembers searches that came back empty.

pub mod compiler;
pub mod fields;
pub mod negative_cache;
pub mod shaper;
pub mod validate;

pub use compiler::{
    CompiledQuery, Fact, LimitPolicy, Param, QueryLimits, SearchRequest, compile_by_identifier,
    compile_by_key, compile_fact, compile_search, compile_siblings,
};
pub use fields::{Field, FieldSelection};
pub use negative_cache::{NegativeCache, NegativeCacheStats, OverflowPolicy};
pub use shaper::{SearchResult, Siblings};
pub use validate::is_acceptable;
