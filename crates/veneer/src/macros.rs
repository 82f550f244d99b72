//! Wrapper declaration boilerplate.

/// Declares a wrapper type bound to a [`Handle`](crate::Handle).
///
/// With a declared size the type also implements
/// [`SizedOverlay`](crate::SizedOverlay), which is what allows it to be
/// nested inside other wrappers, pointed at, held in arrays and
/// instantiated. Without one it is restricted to top-level overlay use.
///
/// ```ignore
/// veneer::overlay! {
///     /// Six bytes of foreign structure, layout known by offset.
///     pub struct Cat: 6;
/// }
///
/// veneer::overlay! {
///     // No declared size: top-level overlay use only.
///     pub struct Shelter;
/// }
/// ```
///
/// Field accessors are then ordinary methods constructing proxies from the
/// handle:
///
/// ```ignore
/// impl Cat {
///     pub fn age(&self) -> Field<u8> {
///         self.handle().field(0)
///     }
/// }
/// ```
#[macro_export]
macro_rules! overlay {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident : $size:expr;
    ) => {
        $(#[$attr])*
        $vis struct $name {
            handle: $crate::Handle,
        }

        impl $crate::Overlay for $name {
            fn bind(handle: $crate::Handle) -> Self {
                Self { handle }
            }

            fn handle(&self) -> $crate::Handle {
                self.handle
            }
        }

        impl $crate::SizedOverlay for $name {
            const OBJECT_SIZE: usize = $size;
        }
    };

    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident;
    ) => {
        $(#[$attr])*
        $vis struct $name {
            handle: $crate::Handle,
        }

        impl $crate::Overlay for $name {
            fn bind(handle: $crate::Handle) -> Self {
                Self { handle }
            }

            fn handle(&self) -> $crate::Handle {
                self.handle
            }
        }
    };
}
