//! Overlay handles and the wrapper object model.
//!
//! An overlay is a typed view superimposed on foreign memory without copying
//! or owning it. The building blocks:
//!
//! - [`Handle`] — the non-owning raw pointer every proxy resolves against
//! - [`Overlay`] / [`SizedOverlay`] — traits implemented by wrapper types
//! - [`overlay_at`] — the casting entry point rooting a wrapper at an address
//! - [`Weak`] — pointer-sized placeholder for a sized overlay
//! - [`Instance`] — a wrapper bound to storage it owns

mod instance;

pub use instance::{ConstructWith, Instance, Lifecycle};

use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use crate::resolve::Address;

/// Non-owning handle to a foreign object.
///
/// A handle holds exactly one raw pointer and nothing else. Copying a handle
/// copies the pointer value, never the pointee, and the pointee's lifetime is
/// not managed here. A default handle is null; any field computed from a
/// null-based handle must not be accessed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    raw: *mut u8,
}

impl Handle {
    /// The null handle.
    pub const fn null() -> Self {
        Self {
            raw: ptr::null_mut(),
        }
    }

    pub(crate) fn from_address(address: Address) -> Self {
        Self {
            raw: address as *mut u8,
        }
    }

    /// Raw address of the wrapped object.
    pub fn address(self) -> Address {
        self.raw as Address
    }

    pub fn is_null(self) -> bool {
        self.raw.is_null()
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:#x})", self.address())
    }
}

/// A typed overlay over foreign memory.
///
/// Implementors hold a [`Handle`] and nothing else; every field accessor is
/// computed from it on demand. The [`overlay!`](crate::overlay!) macro
/// expands the boilerplate.
pub trait Overlay {
    /// Binds a wrapper of this type over `handle`.
    fn bind(handle: Handle) -> Self;

    /// The handle this overlay reads through.
    fn handle(&self) -> Handle;

    /// Raw address of the wrapped object.
    fn object_address(&self) -> Address {
        self.handle().address()
    }
}

/// An overlay declaring the byte size of the foreign structure it covers.
///
/// The size is required before a wrapper type may be nested as a field
/// inside another wrapper, pointed at, held in arrays, or instantiated with
/// owned storage; a wrapper without it can only be used as a top-level
/// overlay. Declaring the wrong size is a latent caller error this crate
/// never detects.
pub trait SizedOverlay: Overlay {
    /// Claimed size of the wrapped structure, in bytes.
    const OBJECT_SIZE: usize;
}

/// Overlays `W` onto the structure at `address`.
///
/// This is the only way to root a wrapper at an arbitrary address.
///
/// # Safety
///
/// `address` must point at a live object laid out as `W` declares, and must
/// stay valid for every access performed through the returned wrapper or any
/// proxy derived from it. Nothing is validated here or at any later point;
/// every subsequent accessor relies on this assertion.
pub unsafe fn overlay_at<W: Overlay>(address: Address) -> W {
    W::bind(Handle::from_address(address))
}

/// Pointer-sized placeholder for a sized overlay.
///
/// Where a pointer to a wrapped structure must exist as a plain value (the
/// content of a pointer field, an operand of pointer arithmetic), `Weak`
/// stands in for the full wrapper. It records only the referent's address,
/// strides in units of `W::OBJECT_SIZE`, and is promoted to a strong wrapper
/// when access is needed.
#[repr(transparent)]
pub struct Weak<W> {
    address: Address,
    _wrapper: PhantomData<fn() -> W>,
}

impl<W: SizedOverlay> Weak<W> {
    /// Placeholder for the object at `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            _wrapper: PhantomData,
        }
    }

    /// The null placeholder.
    pub fn null() -> Self {
        Self::new(0)
    }

    pub fn address(self) -> Address {
        self.address
    }

    pub fn is_null(self) -> bool {
        self.address == 0
    }

    /// Moves `count` objects towards higher addresses.
    pub fn add(self, count: usize) -> Self {
        Self::new(self.address.wrapping_add(count * W::OBJECT_SIZE))
    }

    /// Moves `count` objects towards lower addresses.
    pub fn sub(self, count: usize) -> Self {
        Self::new(self.address.wrapping_sub(count * W::OBJECT_SIZE))
    }

    /// Promotes this placeholder to a strong wrapper.
    ///
    /// # Safety
    ///
    /// Equivalent to [`overlay_at`]: the recorded address must point at a
    /// live, correctly laid out `W` for as long as the wrapper is used.
    pub unsafe fn to_strong(self) -> W {
        // SAFETY: forwarded to the caller, see above.
        unsafe { overlay_at(self.address) }
    }
}

impl<W> Clone for Weak<W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W> Copy for Weak<W> {}

impl<W> PartialEq for Weak<W> {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl<W> Eq for Weak<W> {}

impl<W> fmt::Debug for Weak<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Weak({:#x})", self.address)
    }
}
