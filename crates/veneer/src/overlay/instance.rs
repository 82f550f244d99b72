//! Wrapper instantiation with owned storage.
//!
//! Most overlays borrow someone else's memory. An [`Instance`] instead owns
//! a buffer sized to the wrapped structure and binds the wrapper over it,
//! running the optional lifecycle hooks at the edges: construct once before
//! the wrapper is first usable, destruct once right before the storage is
//! released.

use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::overlay::{Handle, SizedOverlay};
use crate::resolve::Address;

/// Optional lifecycle hooks for instantiable wrapper types.
///
/// Implementing this trait (even empty) is what makes a wrapper usable with
/// [`Instance`]. The defaults do nothing: the backing storage stays as the
/// zero-filled bytes the instance starts from, and teardown releases the
/// storage without further ado. Whether the foreign type actually needs
/// field-by-field initialization is the caller's knowledge, not ours.
pub trait Lifecycle: SizedOverlay {
    /// Runs once when an [`Instance`] is created without arguments.
    fn construct(&mut self) {}

    /// Runs once right before an [`Instance`] releases its storage.
    fn destruct(&mut self) {}
}

/// Argument-taking construction hook, selected by [`Instance::with`].
pub trait ConstructWith<A>: Lifecycle {
    /// Runs once with `args` when the instance is created.
    fn construct_with(&mut self, args: A);
}

/// A wrapper bound to storage it owns.
///
/// `Instance<W>` allocates a buffer of exactly `W::OBJECT_SIZE` bytes, binds
/// `W` over it, and walks the lifecycle: the buffer comes up zero-filled, a
/// construct hook runs once before the wrapper is first usable, and the
/// destruct hook runs once before the storage is released. The instance is
/// the buffer's only owner; raw pointers taken from it are plain views.
/// Panics raised inside the hooks propagate to the caller unmodified.
pub struct Instance<W: Lifecycle> {
    overlay: W,
    _buffer: Box<[u8]>,
}

impl<W: Lifecycle> Instance<W> {
    /// Creates an instance and runs [`Lifecycle::construct`].
    pub fn new() -> Self {
        let mut instance = Self::allocate();
        instance.overlay.construct();
        instance
    }

    /// Creates an instance and runs [`ConstructWith::construct_with`] with
    /// `args`.
    pub fn with<A>(args: A) -> Self
    where
        W: ConstructWith<A>,
    {
        let mut instance = Self::allocate();
        instance.overlay.construct_with(args);
        instance
    }

    fn allocate() -> Self {
        let mut buffer = vec![0u8; W::OBJECT_SIZE].into_boxed_slice();
        trace!(
            ty = std::any::type_name::<W>(),
            size = W::OBJECT_SIZE,
            "allocating instantiable overlay"
        );
        let overlay = W::bind(Handle::from_address(buffer.as_mut_ptr() as Address));
        Self {
            overlay,
            _buffer: buffer,
        }
    }
}

impl<W: Lifecycle> Default for Instance<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Lifecycle> Drop for Instance<W> {
    fn drop(&mut self) {
        self.overlay.destruct();
    }
}

impl<W: Lifecycle> Deref for Instance<W> {
    type Target = W;

    fn deref(&self) -> &W {
        &self.overlay
    }
}

impl<W: Lifecycle> DerefMut for Instance<W> {
    fn deref_mut(&mut self) -> &mut W {
        &mut self.overlay
    }
}
