//! Callable wrappers: free, member and virtual function proxies.
//!
//! A callable proxy resolves a code address exactly the way a field proxy
//! resolves a data address, reinterprets it as a function pointer of the
//! statically declared signature at the moment of the call, and forwards the
//! arguments unchanged. Member variants inject the parent's raw pointer as
//! the implicit first argument, passed as a plain [`Address`] at the call
//! boundary.
//!
//! `call` impls are provided for `unsafe extern "C" fn` signatures of up to
//! eight arguments; on x86 Windows an `extern "thiscall"` set mirrors them
//! for foreign instance methods. The calling convention is a fixed part of
//! the declared signature, never selected at runtime.

use std::marker::PhantomData;
use std::mem;

use crate::overlay::Handle;
use crate::resolve::{AbsoluteResolver, Address, Resolver, VtableResolver};

/// Proxy for a free function.
pub struct Function<Sig, R: Resolver = AbsoluteResolver> {
    resolver: R,
    _sig: PhantomData<Sig>,
}

impl<Sig, R: Resolver> Function<Sig, R> {
    /// Proxy resolving the code address through `resolver`.
    pub fn by(resolver: R) -> Self {
        Self {
            resolver,
            _sig: PhantomData,
        }
    }

    /// The resolved code address.
    pub fn address(&self) -> Address {
        // SAFETY: a free function resolves against no object; the standard
        // resolvers for free functions perform pure arithmetic here.
        unsafe { self.resolver.resolve(0) }
    }
}

impl<Sig: Copy, R: Resolver> Function<Sig, R> {
    /// Recovers the wrapped function pointer.
    ///
    /// # Safety
    ///
    /// The resolved address must be a function of exactly the signature and
    /// calling convention `Sig` declares.
    pub unsafe fn get(&self) -> Sig {
        debug_assert!(
            size_of::<Sig>() == size_of::<Address>(),
            "function wrappers expect a function pointer type"
        );
        // SAFETY: a function pointer's bits are its code address; the
        // crate-level assertion pins both to the same width.
        unsafe { mem::transmute_copy::<Address, Sig>(&self.address()) }
    }
}

impl<Sig> Function<Sig, AbsoluteResolver> {
    /// Proxy for the function at `address`.
    pub fn at(address: Address) -> Self {
        Self::by(AbsoluteResolver::new(address))
    }
}

impl<Sig: Copy> Function<Sig, AbsoluteResolver> {
    /// Proxy wrapping an actual function pointer.
    ///
    /// Stores the code address in the uniform data-address representation;
    /// the crate-level size assertion guarantees the pun is lossless.
    pub fn of(f: Sig) -> Self {
        assert!(
            size_of::<Sig>() == size_of::<Address>(),
            "function wrappers expect a function pointer type"
        );
        // SAFETY: sizes checked above; a function pointer's bits are its
        // code address.
        let address = unsafe { mem::transmute_copy::<Sig, Address>(&f) };
        Self::at(address)
    }
}

/// Proxy for a member function, bound to the object it belongs to.
///
/// The declared signature lists the explicit arguments only; the object
/// address travels as the implicit first argument, matching the calling
/// convention of foreign instance methods.
pub struct MemberFunction<Sig, R: Resolver = AbsoluteResolver> {
    parent: Handle,
    resolver: R,
    _sig: PhantomData<Sig>,
}

impl<Sig, R: Resolver> MemberFunction<Sig, R> {
    /// Proxy resolving the code address through `resolver`.
    pub fn by(parent: Handle, resolver: R) -> Self {
        Self {
            parent,
            resolver,
            _sig: PhantomData,
        }
    }

    /// The object passed as the implicit first argument.
    pub fn this(&self) -> Address {
        self.parent.address()
    }

    /// The resolved code address.
    pub fn address(&self) -> Address {
        // SAFETY: validity of the parent pointer (and, for virtual dispatch,
        // of the table it carries) was asserted when the owning overlay was
        // rooted.
        unsafe { self.resolver.resolve(self.parent.address()) }
    }
}

impl<Sig> MemberFunction<Sig, AbsoluteResolver> {
    /// Member function at a fixed code address.
    pub fn at(parent: Handle, address: Address) -> Self {
        Self::by(parent, AbsoluteResolver::new(address))
    }
}

/// Proxy for a virtual member function, dispatched through the table.
pub type VirtualFunction<Sig> = MemberFunction<Sig, VtableResolver>;

impl<Sig> MemberFunction<Sig, VtableResolver> {
    /// Virtual function at `index` in the table pointed to by the object's
    /// first word.
    pub fn in_table(parent: Handle, index: usize) -> Self {
        Self::by(parent, VtableResolver::new(index))
    }

    /// Virtual function at `index` in the table whose pointer lives at
    /// `table_offset` inside the object.
    pub fn in_table_at(parent: Handle, index: usize, table_offset: usize) -> Self {
        Self::by(parent, VtableResolver::with_table_offset(index, table_offset))
    }
}

macro_rules! impl_callable {
    ($($ty:ident $arg:ident),*) => {
        impl<Ret, $($ty,)* R: Resolver> Function<unsafe extern "C" fn($($ty),*) -> Ret, R> {
            /// Resolves the code address and invokes it.
            ///
            /// # Safety
            ///
            /// The resolved address must be a function of exactly this
            /// signature and calling convention, safe to call with the given
            /// arguments.
            pub unsafe fn call(&self, $($arg: $ty),*) -> Ret {
                let f: unsafe extern "C" fn($($ty),*) -> Ret =
                    // SAFETY: the caller asserts the signature, see above.
                    unsafe { mem::transmute_copy(&self.address()) };
                // SAFETY: the caller asserts the call is sound, see above.
                unsafe { f($($arg),*) }
            }
        }

        impl<Ret, $($ty,)* R: Resolver> MemberFunction<unsafe extern "C" fn($($ty),*) -> Ret, R> {
            /// Resolves the code address and invokes it on the parent
            /// object, injected as the first argument.
            ///
            /// # Safety
            ///
            /// The resolved address must be a function taking the object
            /// address first, followed by exactly this signature; the parent
            /// handle must satisfy whatever the callee expects of it.
            pub unsafe fn call(&self, $($arg: $ty),*) -> Ret {
                let f: unsafe extern "C" fn(Address $(, $ty)*) -> Ret =
                    // SAFETY: the caller asserts the signature, see above.
                    unsafe { mem::transmute_copy(&self.address()) };
                // SAFETY: the caller asserts the call is sound, see above.
                unsafe { f(self.this() $(, $arg)*) }
            }
        }
    };
}

impl_callable!();
impl_callable!(A1 a1);
impl_callable!(A1 a1, A2 a2);
impl_callable!(A1 a1, A2 a2, A3 a3);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_callable!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);

#[cfg(all(windows, target_arch = "x86"))]
macro_rules! impl_callable_thiscall {
    ($($ty:ident $arg:ident),*) => {
        impl<Ret, $($ty,)* R: Resolver> MemberFunction<unsafe extern "thiscall" fn($($ty),*) -> Ret, R> {
            /// Resolves the code address and invokes it on the parent
            /// object with the `thiscall` convention.
            ///
            /// # Safety
            ///
            /// The resolved address must be a `thiscall` function taking the
            /// object address first, followed by exactly this signature; the
            /// parent handle must satisfy whatever the callee expects of it.
            pub unsafe fn call(&self, $($arg: $ty),*) -> Ret {
                let f: unsafe extern "thiscall" fn(Address $(, $ty)*) -> Ret =
                    // SAFETY: the caller asserts the signature, see above.
                    unsafe { mem::transmute_copy(&self.address()) };
                // SAFETY: the caller asserts the call is sound, see above.
                unsafe { f(self.this() $(, $arg)*) }
            }
        }
    };
}

#[cfg(all(windows, target_arch = "x86"))]
mod thiscall_impls {
    use super::*;

    impl_callable_thiscall!();
    impl_callable_thiscall!(A1 a1);
    impl_callable_thiscall!(A1 a1, A2 a2);
    impl_callable_thiscall!(A1 a1, A2 a2, A3 a3);
    impl_callable_thiscall!(A1 a1, A2 a2, A3 a3, A4 a4);
    impl_callable_thiscall!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
    impl_callable_thiscall!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
    impl_callable_thiscall!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
    impl_callable_thiscall!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{Overlay, overlay_at};

    #[test]
    fn free_function_roundtrips_through_its_address() {
        extern "C" fn add_pair(a: i32, b: i32) -> i32 {
            a + b
        }

        let native: unsafe extern "C" fn(i32, i32) -> i32 = add_pair;
        let proxy = Function::of(native);
        assert_eq!(proxy.address(), native as usize);
        assert_eq!(unsafe { proxy.call(30, 12) }, 42);
        assert_eq!(unsafe { (proxy.get())(1, 2) }, 3);
    }

    #[test]
    fn free_function_resolves_from_a_raw_address() {
        extern "C" fn triple(x: u32) -> u32 {
            x * 3
        }

        let proxy =
            Function::<unsafe extern "C" fn(u32) -> u32>::at(triple as usize);
        assert_eq!(unsafe { proxy.call(14) }, 42);
    }

    crate::overlay! {
        struct Holder;
    }

    #[test]
    fn member_function_injects_the_parent_address() {
        extern "C" fn read_first(this: usize, bonus: u32) -> u32 {
            // SAFETY: tests pass the address of a live u32.
            unsafe { *(this as *const u32) + bonus }
        }

        let mut value: u32 = 40;
        let holder: Holder = unsafe { overlay_at(&mut value as *mut u32 as usize) };
        let proxy = MemberFunction::<unsafe extern "C" fn(u32) -> u32>::at(
            holder.handle(),
            read_first as usize,
        );

        assert_eq!(proxy.this(), holder.object_address());
        assert_eq!(unsafe { proxy.call(2) }, 42);
    }

    #[repr(C)]
    struct FakeObject {
        table: *const usize,
        data: u32,
    }

    extern "C" fn speak(_this: usize) -> u32 {
        7
    }

    extern "C" fn fetch(this: usize) -> u32 {
        // SAFETY: tests pass a FakeObject whose data sits one word in.
        unsafe { *((this + size_of::<usize>()) as *const u32) }
    }

    #[test]
    fn virtual_function_dispatches_through_the_table() {
        let table: [usize; 2] = [speak as usize, fetch as usize];
        let object = FakeObject {
            table: table.as_ptr(),
            data: 41,
        };

        let pet: Holder = unsafe { overlay_at(&object as *const FakeObject as usize) };
        let speak_proxy: VirtualFunction<unsafe extern "C" fn() -> u32> =
            MemberFunction::in_table(pet.handle(), 0);
        let fetch_proxy: VirtualFunction<unsafe extern "C" fn() -> u32> =
            MemberFunction::in_table(pet.handle(), 1);

        // The proxy resolves to the very pointer the table holds.
        assert_eq!(speak_proxy.address(), speak as usize);
        assert_eq!(fetch_proxy.address(), fetch as usize);
        assert_eq!(unsafe { speak_proxy.call() }, 7);
        assert_eq!(unsafe { fetch_proxy.call() }, 41);
        assert_eq!(object.data, 41);
        assert_eq!(object.table, table.as_ptr());
    }

    #[test]
    fn virtual_function_honors_the_table_offset() {
        let table: [usize; 1] = [speak as usize];
        // Table pointer one word past the object start.
        let shifted: [usize; 2] = [0, table.as_ptr() as usize];

        let pet: Holder = unsafe { overlay_at(shifted.as_ptr() as usize) };
        let proxy: VirtualFunction<unsafe extern "C" fn() -> u32> =
            MemberFunction::in_table_at(pet.handle(), 0, size_of::<usize>());

        assert_eq!(proxy.address(), speak as usize);
        assert_eq!(unsafe { proxy.call() }, 7);
    }
}
