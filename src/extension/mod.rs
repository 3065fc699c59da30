//! Template extensions
//!
//! An extension is a named bundle of functions and filters registered into a
//! template environment. This module contains:
//! - `interface`: the `Extension` trait and the function/filter descriptors
//! - `url`: URL and asset helpers, with the collaborator traits they delegate to
//! - `datetime`: timezone-aware date formatting
//! - `debug`: the `dump` function registered in debug mode

pub mod datetime;
pub mod debug;
pub mod interface;
pub mod url;

pub use datetime::DateTimeExtension;
pub use debug::DebugExtension;
pub use interface::{Extension, TemplateFilter, TemplateFunction};
pub use self::url::{
    BaseUrlServerHelper, Params, Router, RouterUrlHelper, ServerUrlHelper, UrlExtension,
    UrlHelper,
};
