//! # veneer
//!
//! Typed overlays for foreign memory: structures belonging to a closed
//! binary, another module, or a buffer off the wire, whose layout is known
//! only by offset and size.
//!
//! A wrapper type declares thin proxies that compute, on every access, the
//! address of a field or function inside externally owned memory, and read
//! or write through that address with ordinary accessor syntax. The
//! structure's real definition is never needed, no padding assumptions are
//! made, and nothing is copied into an owned value.
//!
//! This crate provides:
//! - Wrapper handles and the casting entry point ([`overlay`])
//! - Address resolution strategies: offset, absolute, virtual-table ([`resolve`])
//! - Field proxies, one per category of wrapped type ([`field`])
//! - Free, member and virtual function proxies ([`func`])
//! - Instantiable wrappers with owned storage and lifecycle hooks
//! - Global and per-module address-space facades ([`module`])
//!
//! ## Example
//!
//! ```ignore
//! use veneer::prelude::*;
//!
//! veneer::overlay! {
//!     /// A structure of a foreign process; 128 bytes, layout known by offset.
//!     pub struct Dog: 128;
//! }
//!
//! impl Dog {
//!     pub fn age(&self) -> Field<u8> {
//!         self.handle().field(124)
//!     }
//!
//!     pub fn fluffiness(&self) -> VirtualFunction<unsafe extern "C" fn() -> i32> {
//!         MemberFunction::in_table(self.handle(), 0)
//!     }
//! }
//!
//! let dog: Dog = unsafe { veneer::overlay_at(dog_address) };
//! let next_year = dog.age() + 1;
//! ```
//!
//! ## Safety model
//!
//! The crate performs no bounds checking, no address validation and no type
//! tagging: offsets, sizes and table indices are the caller's claim about
//! memory the crate cannot verify. That claim is asserted once, at the
//! `unsafe` roots ([`overlay_at`], [`Weak::to_strong`], and every function
//! call); every proxy accessor afterwards relies on it, in the manner of
//! `slice::from_raw_parts`. Accessing anything derived from a null or stale
//! handle is undefined behavior. There is no locking and no thread-safety
//! guarantee: synchronizing concurrent access to the underlying memory is
//! the caller's job, exactly as with a shared native struct.

pub mod error;
pub mod field;
pub mod func;
mod macros;
pub mod module;
pub mod overlay;
pub mod prelude;
pub mod resolve;

pub use error::{Error, Result};
pub use field::{
    ArrayField, EnumField, Field, ForeignEnum, PtrField, RefField, WrapperArrayField, WrapperField,
    WrapperPtrField,
};
pub use func::{Function, MemberFunction, VirtualFunction};
pub use module::{Global, Module};
pub use overlay::{
    ConstructWith, Handle, Instance, Lifecycle, Overlay, SizedOverlay, Weak, overlay_at,
};
pub use resolve::{AbsoluteResolver, Address, OffsetResolver, Resolver, VtableResolver};

// Free functions and absolute globals share one address representation, so
// code pointers must be storable in a data-pointer-sized slot.
const _: () = assert!(
    size_of::<fn()>() == size_of::<*const ()>(),
    "code and data pointers must have the same size"
);
