//! Compiles FlyQL syntax trees into Elasticsearch query documents.
//!
//! The output of [`to_query`] is a [`serde_json::Value`] shaped like the
//! Elasticsearch boolean query DSL (`bool`/`term`/`range`/`terms`/
//! `wildcard`/`match`/`exists`/`regexp` clauses), ready to be posted to a
//! search backend. This crate performs no execution and no schema
//! validation; field names pass through as opaque strings.
//!
//! # Example
//!
//! ```
//! use flyql_query::parse_query;
//! use flyql_elastic::to_query;
//!
//! let tree = parse_query("subject.age == 32").unwrap();
//! assert_eq!(
//!     to_query(&tree),
//!     serde_json::json!({"bool": {"must": [{"term": {"subject.age": 32}}]}})
//! );
//! ```

#![warn(missing_docs)]

mod compile;

pub use compile::to_query;
