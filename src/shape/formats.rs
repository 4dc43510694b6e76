//! Diagnostic renderers for parsed lines
//!
//! Both renderers walk the element tree and quote the original text of every element by its
//! span, so they need the input line alongside the elements.

pub mod dump;
pub mod treeviz;

pub use dump::{result_to_dump_str, to_dump_str};
pub use treeviz::{result_to_treeviz_str, to_treeviz_str};
