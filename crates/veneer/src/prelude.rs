//! Prelude re-exporting the commonly used surface.
//!
//! ```ignore
//! use veneer::prelude::*;
//! ```
//!
//! This brings the following into scope:
//!
//! - Wrapper plumbing: `Handle`, `Overlay`, `SizedOverlay`, `overlay_at`, `Weak`
//! - Field proxies: `Field`, `EnumField`, `ArrayField`, `PtrField`, ...
//! - Callable proxies: `Function`, `MemberFunction`, `VirtualFunction`
//! - Instantiation: `Instance`, `Lifecycle`, `ConstructWith`
//! - Facades: `Global`, `Module`
//! - Resolvers: `OffsetResolver`, `AbsoluteResolver`, `VtableResolver`
//! - Error handling: `Error`, `Result`

pub use crate::error::{Error, Result};
pub use crate::field::{
    ArrayField, EnumField, Field, ForeignEnum, PtrField, RefField, WrapperArrayField, WrapperField,
    WrapperPtrField,
};
pub use crate::func::{Function, MemberFunction, VirtualFunction};
pub use crate::module::{Global, Module};
pub use crate::overlay::{
    ConstructWith, Handle, Instance, Lifecycle, Overlay, SizedOverlay, Weak, overlay_at,
};
pub use crate::resolve::{AbsoluteResolver, Address, OffsetResolver, Resolver, VtableResolver};
