//! Field proxies: typed accessors computed over foreign memory.
//!
//! A proxy never stores the value it exposes, only a [`Handle`] to the
//! owning structure and a [`Resolver`] locating the field inside it. Every
//! read and write recomputes the live address and performs a raw, unaligned,
//! typed access there.
//!
//! One proxy type exists per category of wrapped type, each exposing only
//! the operations that category supports:
//!
//! - [`Field`] — scalars and plain `Pod` structs
//! - [`EnumField`] — enums, through an explicit repr conversion
//! - [`ArrayField`] / [`WrapperArrayField`] — fixed-size arrays
//! - [`WrapperField`] — a nested, size-bearing wrapper
//! - [`PtrField`] / [`WrapperPtrField`] — pointer slots
//! - [`RefField`] — the pointer-as-reference convention
//!
//! Proxies are created on demand by accessor methods on wrapper types (see
//! the factory methods on [`Handle`]), so each access resolves against the
//! owning handle's current pointer. Proxies are deliberately not `Clone`:
//! copying one would ambiguously mean "copy the locator" or "copy the
//! value", and value copies are what [`Field::copy_from`] is for.

mod ops;

use std::marker::PhantomData;

use bytemuck::Pod;

use crate::overlay::{Handle, SizedOverlay, Weak};
use crate::resolve::{AbsoluteResolver, Address, OffsetResolver, Resolver};

/// Typed accessor for a scalar or plain-struct field.
///
/// The value type must be trivially copyable with a stable layout
/// ([`Pod`]); reads and writes reinterpret the bytes at the resolved
/// address and never run the type's own construction or drop logic. Scalar
/// fields carry the full operator surface (see the trait impls in this
/// module); plain structs are read and written as whole values.
pub struct Field<T, R: Resolver = OffsetResolver> {
    parent: Handle,
    resolver: R,
    _value: PhantomData<*mut T>,
}

impl<T, R: Resolver> Field<T, R> {
    /// Proxy resolving against `parent` through `resolver`.
    pub fn new(parent: Handle, resolver: R) -> Self {
        Self {
            parent,
            resolver,
            _value: PhantomData,
        }
    }

    /// The live address of the field.
    pub fn address(&self) -> Address {
        // SAFETY: validity of the parent pointer was asserted when the
        // owning overlay was rooted.
        unsafe { self.resolver.resolve(self.parent.address()) }
    }

    fn target(&self) -> *mut T {
        self.address() as *mut T
    }
}

impl<T: Pod, R: Resolver> Field<T, R> {
    /// Reads the field.
    pub fn get(&self) -> T {
        // SAFETY: see `address`; foreign layouts guarantee no alignment.
        unsafe { self.target().read_unaligned() }
    }

    /// Writes the field.
    pub fn set(&self, value: T) {
        // SAFETY: see `address`.
        unsafe { self.target().write_unaligned(value) }
    }

    /// Writes `value` and returns the previous value.
    pub fn replace(&self, value: T) -> T {
        let old = self.get();
        self.set(value);
        old
    }

    /// Applies `f` to the current value, writes the result back and returns
    /// it.
    pub fn update(&self, f: impl FnOnce(T) -> T) -> T {
        let value = f(self.get());
        self.set(value);
        value
    }

    /// Copies the value behind `other` into this field.
    pub fn copy_from<R2: Resolver>(&self, other: &Field<T, R2>) {
        self.set(other.get());
    }
}

/// Conversion between a foreign enum and its in-memory representation.
///
/// Foreign memory can hold any bit pattern, so the conversion from the raw
/// representation is supplied by the implementor, including the decision of
/// what an out-of-range discriminant maps to.
pub trait ForeignEnum: Copy {
    /// The integer representation stored in memory.
    type Repr: Pod;

    fn from_repr(repr: Self::Repr) -> Self;

    fn to_repr(self) -> Self::Repr;
}

/// Typed accessor for an enum field, stored as its integer representation.
pub struct EnumField<E: ForeignEnum, R: Resolver = OffsetResolver> {
    raw: Field<E::Repr, R>,
}

impl<E: ForeignEnum, R: Resolver> EnumField<E, R> {
    pub fn new(parent: Handle, resolver: R) -> Self {
        Self {
            raw: Field::new(parent, resolver),
        }
    }

    pub fn address(&self) -> Address {
        self.raw.address()
    }

    pub fn get(&self) -> E {
        E::from_repr(self.raw.get())
    }

    pub fn set(&self, value: E) {
        self.raw.set(value.to_repr());
    }

    /// The untyped representation currently stored in memory.
    pub fn repr(&self) -> E::Repr {
        self.raw.get()
    }
}

impl<E: ForeignEnum + PartialEq, R: Resolver> PartialEq<E> for EnumField<E, R> {
    fn eq(&self, other: &E) -> bool {
        self.get() == *other
    }
}

/// Typed accessor for a fixed-size array field.
///
/// The length is part of the declaration; an array without a known length
/// has no byte extent and cannot be declared at all.
pub struct ArrayField<T, const N: usize, R: Resolver = OffsetResolver> {
    parent: Handle,
    resolver: R,
    _value: PhantomData<*mut T>,
}

impl<T: Pod, const N: usize, R: Resolver> ArrayField<T, N, R> {
    pub fn new(parent: Handle, resolver: R) -> Self {
        Self {
            parent,
            resolver,
            _value: PhantomData,
        }
    }

    /// Address of the first element.
    pub fn address(&self) -> Address {
        // SAFETY: see `Field::address`.
        unsafe { self.resolver.resolve(self.parent.address()) }
    }

    /// Decays to a raw pointer to the first element.
    pub fn as_ptr(&self) -> *mut T {
        self.address() as *mut T
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Element proxy at `index`.
    ///
    /// Indexing past the declared length is not defended against in release
    /// builds; the resulting address is as undefined as any other wrong
    /// offset.
    pub fn at(&self, index: usize) -> Field<T, AbsoluteResolver> {
        debug_assert!(index < N, "index {} out of bounds for array of {}", index, N);
        let element = self.address() + index * size_of::<T>();
        Field::new(Handle::null(), AbsoluteResolver::new(element))
    }

    pub fn get(&self, index: usize) -> T {
        self.at(index).get()
    }

    pub fn set(&self, index: usize, value: T) {
        self.at(index).set(value);
    }

    /// Loads the whole array.
    pub fn read(&self) -> [T; N] {
        // SAFETY: see `Field::get`.
        unsafe { (self.as_ptr() as *const [T; N]).read_unaligned() }
    }

    /// Stores the whole array.
    pub fn write(&self, values: [T; N]) {
        // SAFETY: see `Field::set`.
        unsafe { (self.as_ptr() as *mut [T; N]).write_unaligned(values) }
    }

    /// Iterates over element values.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..N).map(move |index| self.get(index))
    }
}

/// Accessor for a field whose type is itself a wrapper.
///
/// The field does not store a `W`; it builds one lazily, over the resolved
/// address, on every access. Two accesses yield wrappers over the same
/// address. Only size-bearing wrappers can be embedded; without a size the
/// field would have no byte extent inside its parent.
pub struct WrapperField<W: SizedOverlay, R: Resolver = OffsetResolver> {
    parent: Handle,
    resolver: R,
    _wrapper: PhantomData<fn() -> W>,
}

impl<W: SizedOverlay, R: Resolver> WrapperField<W, R> {
    pub fn new(parent: Handle, resolver: R) -> Self {
        Self {
            parent,
            resolver,
            _wrapper: PhantomData,
        }
    }

    pub fn address(&self) -> Address {
        // SAFETY: see `Field::address`.
        unsafe { self.resolver.resolve(self.parent.address()) }
    }

    /// Builds a wrapper over the field's current address.
    pub fn get(&self) -> W {
        W::bind(Handle::from_address(self.address()))
    }

    /// Pointer-sized placeholder for the field's current address.
    pub fn weak(&self) -> Weak<W> {
        Weak::new(self.address())
    }
}

/// Accessor for a fixed-size array of nested wrappers.
///
/// Elements stride by `W::OBJECT_SIZE`, the declared size of the wrapped
/// structure.
pub struct WrapperArrayField<W: SizedOverlay, const N: usize, R: Resolver = OffsetResolver> {
    parent: Handle,
    resolver: R,
    _wrapper: PhantomData<fn() -> W>,
}

impl<W: SizedOverlay, const N: usize, R: Resolver> WrapperArrayField<W, N, R> {
    pub fn new(parent: Handle, resolver: R) -> Self {
        Self {
            parent,
            resolver,
            _wrapper: PhantomData,
        }
    }

    /// Address of the first element.
    pub fn address(&self) -> Address {
        // SAFETY: see `Field::address`.
        unsafe { self.resolver.resolve(self.parent.address()) }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Wrapper over the element at `index`.
    pub fn at(&self, index: usize) -> W {
        debug_assert!(index < N, "index {} out of bounds for array of {}", index, N);
        W::bind(Handle::from_address(
            self.address() + index * W::OBJECT_SIZE,
        ))
    }

    /// Placeholder for the element at `index`.
    pub fn weak_at(&self, index: usize) -> Weak<W> {
        debug_assert!(index < N, "index {} out of bounds for array of {}", index, N);
        Weak::new(self.address() + index * W::OBJECT_SIZE)
    }
}

/// Accessor for a pointer field holding the address of plain data.
///
/// `get` and `set` operate on the stored pointer value; the subscript and
/// indirection helpers read or write through it. Anything past that is
/// native raw-pointer arithmetic on the value `get` returns.
pub struct PtrField<T, R: Resolver = OffsetResolver> {
    parent: Handle,
    resolver: R,
    _value: PhantomData<*mut T>,
}

impl<T: Pod, R: Resolver> PtrField<T, R> {
    pub fn new(parent: Handle, resolver: R) -> Self {
        Self {
            parent,
            resolver,
            _value: PhantomData,
        }
    }

    /// Address of the pointer slot itself.
    pub fn address(&self) -> Address {
        // SAFETY: see `Field::address`.
        unsafe { self.resolver.resolve(self.parent.address()) }
    }

    fn slot(&self) -> *mut *mut T {
        self.address() as *mut *mut T
    }

    /// Reads the stored pointer.
    pub fn get(&self) -> *mut T {
        // SAFETY: see `Field::get`.
        unsafe { self.slot().read_unaligned() }
    }

    /// Stores a pointer.
    pub fn set(&self, ptr: *mut T) {
        // SAFETY: see `Field::set`.
        unsafe { self.slot().write_unaligned(ptr) }
    }

    pub fn set_null(&self) {
        self.set(std::ptr::null_mut());
    }

    pub fn is_null(&self) -> bool {
        self.get().is_null()
    }

    /// Reads the pointee `index` elements past the stored pointer.
    pub fn read_at(&self, index: usize) -> T {
        // SAFETY: the stored pointer is caller data; whether it is valid to
        // read through is exactly as checked as any other foreign address.
        unsafe { self.get().add(index).read_unaligned() }
    }

    /// Writes the pointee `index` elements past the stored pointer.
    pub fn write_at(&self, index: usize, value: T) {
        // SAFETY: see `read_at`.
        unsafe { self.get().add(index).write_unaligned(value) }
    }

    /// Reads the pointee.
    pub fn read(&self) -> T {
        self.read_at(0)
    }

    /// Writes the pointee.
    pub fn write(&self, value: T) {
        self.write_at(0, value);
    }
}

/// Accessor for a pointer field whose pointee is a wrapped structure.
///
/// The slot holds the referent's address; reading yields a [`Weak`]
/// placeholder, which strides by the wrapped structure's declared size and
/// is promoted to a strong wrapper when access is needed.
pub struct WrapperPtrField<W: SizedOverlay, R: Resolver = OffsetResolver> {
    parent: Handle,
    resolver: R,
    _wrapper: PhantomData<fn() -> W>,
}

impl<W: SizedOverlay, R: Resolver> WrapperPtrField<W, R> {
    pub fn new(parent: Handle, resolver: R) -> Self {
        Self {
            parent,
            resolver,
            _wrapper: PhantomData,
        }
    }

    /// Address of the pointer slot itself.
    pub fn address(&self) -> Address {
        // SAFETY: see `Field::address`.
        unsafe { self.resolver.resolve(self.parent.address()) }
    }

    fn slot(&self) -> *mut Address {
        self.address() as *mut Address
    }

    /// Reads the stored pointer as a placeholder.
    pub fn get(&self) -> Weak<W> {
        // SAFETY: see `Field::get`.
        Weak::new(unsafe { self.slot().read_unaligned() })
    }

    /// Stores a placeholder's address.
    pub fn set(&self, target: Weak<W>) {
        // SAFETY: see `Field::set`.
        unsafe { self.slot().write_unaligned(target.address()) }
    }

    pub fn set_null(&self) {
        self.set(Weak::null());
    }

    pub fn is_null(&self) -> bool {
        self.get().is_null()
    }

    /// Promotes the stored pointer to a strong wrapper.
    ///
    /// # Safety
    ///
    /// As [`Weak::to_strong`]: the stored address must point at a live,
    /// correctly laid out `W` for as long as the wrapper is used.
    pub unsafe fn strong(&self) -> W {
        // SAFETY: forwarded to the caller, see above.
        unsafe { self.get().to_strong() }
    }
}

/// Accessor for a field stored by the reference-as-pointer convention: the
/// resolved address holds the referent's address, and value access
/// dereferences twice.
///
/// Whether a foreign producer encodes references this way is a property of
/// that producer, not a law; declaring a field with this proxy rather than
/// [`Field`] is the caller's statement that it does.
pub struct RefField<T, R: Resolver = OffsetResolver> {
    parent: Handle,
    resolver: R,
    _value: PhantomData<*mut T>,
}

impl<T: Pod, R: Resolver> RefField<T, R> {
    pub fn new(parent: Handle, resolver: R) -> Self {
        Self {
            parent,
            resolver,
            _value: PhantomData,
        }
    }

    /// Address of the slot holding the referent's address.
    pub fn slot_address(&self) -> Address {
        // SAFETY: see `Field::address`.
        unsafe { self.resolver.resolve(self.parent.address()) }
    }

    /// Address of the referent.
    pub fn referent_address(&self) -> Address {
        // SAFETY: see `Field::get`.
        unsafe { (self.slot_address() as *const Address).read_unaligned() }
    }

    fn target(&self) -> *mut T {
        self.referent_address() as *mut T
    }

    /// Reads the referent.
    pub fn get(&self) -> T {
        // SAFETY: see `Field::get`.
        unsafe { self.target().read_unaligned() }
    }

    /// Writes the referent.
    pub fn set(&self, value: T) {
        // SAFETY: see `Field::set`.
        unsafe { self.target().write_unaligned(value) }
    }
}

/// Factory methods constructing field proxies against this handle.
///
/// These are the declaration points of wrapper accessors: the proxy type
/// chosen here fixes the operation set of the field.
impl Handle {
    /// Scalar or plain-struct field at `offset`.
    pub fn field<T: Pod>(self, offset: isize) -> Field<T> {
        Field::new(self, OffsetResolver::new(offset))
    }

    /// Field located by an arbitrary resolver.
    pub fn field_by<T: Pod, R: Resolver>(self, resolver: R) -> Field<T, R> {
        Field::new(self, resolver)
    }

    /// Enum field at `offset`.
    pub fn enum_field<E: ForeignEnum>(self, offset: isize) -> EnumField<E> {
        EnumField::new(self, OffsetResolver::new(offset))
    }

    /// Fixed-size array field at `offset`.
    pub fn array<T: Pod, const N: usize>(self, offset: isize) -> ArrayField<T, N> {
        ArrayField::new(self, OffsetResolver::new(offset))
    }

    /// Nested wrapper field at `offset`.
    pub fn wrapper<W: SizedOverlay>(self, offset: isize) -> WrapperField<W> {
        WrapperField::new(self, OffsetResolver::new(offset))
    }

    /// Fixed-size array of nested wrappers at `offset`.
    pub fn wrapper_array<W: SizedOverlay, const N: usize>(
        self,
        offset: isize,
    ) -> WrapperArrayField<W, N> {
        WrapperArrayField::new(self, OffsetResolver::new(offset))
    }

    /// Pointer field at `offset`.
    pub fn ptr<T: Pod>(self, offset: isize) -> PtrField<T> {
        PtrField::new(self, OffsetResolver::new(offset))
    }

    /// Pointer-to-wrapper field at `offset`.
    pub fn wrapper_ptr<W: SizedOverlay>(self, offset: isize) -> WrapperPtrField<W> {
        WrapperPtrField::new(self, OffsetResolver::new(offset))
    }

    /// Reference-convention field at `offset`.
    pub fn ref_field<T: Pod>(self, offset: isize) -> RefField<T> {
        RefField::new(self, OffsetResolver::new(offset))
    }
}

#[cfg(test)]
mod tests {
    use std::mem::offset_of;

    use bytemuck::{Pod, Zeroable};

    use super::*;
    use crate::overlay::{Overlay, overlay_at};

    crate::overlay! {
        struct View;
    }

    fn view_of<T>(value: &mut T) -> View {
        // SAFETY: tests overlay live locals for the duration of the test.
        unsafe { overlay_at(value as *mut T as Address) }
    }

    #[test]
    fn round_trip_all_primitives() {
        let mut backing = [0u8; 32];
        let base = backing.as_mut_ptr() as Address;
        let view: View = unsafe { overlay_at(base) };

        macro_rules! check {
            ($ty:ty, $value:expr) => {{
                let field = view.handle().field::<$ty>(5);
                field.set($value);
                assert_eq!(field.get(), $value);
                // The raw bytes at base + 5 hold exactly the written value.
                assert_eq!(
                    unsafe { ((base + 5) as *const $ty).read_unaligned() },
                    $value
                );
            }};
        }

        check!(u8, 0xA5);
        check!(u16, 0xBEEF);
        check!(u32, 0xCAFE_BABE);
        check!(u64, 0x0123_4567_89AB_CDEF);
        check!(u128, 0x0102_0304_0506_0708_090A_0B0C_0D0E_0F10);
        check!(usize, 7);
        check!(i8, -5);
        check!(i16, -1234);
        check!(i32, -123_456);
        check!(i64, -1);
        check!(isize, -7);
        check!(f32, 567.89);
        check!(f64, 123.625);
    }

    #[test]
    fn scalar_field_matches_native_member_access() {
        let mut value = 1000i32;
        let view = view_of(&mut value);
        let x = || view.handle().field::<i32>(0);

        assert!(x() + 100 == 1100);
        assert_eq!(x().replace(x().get() + 1), 1000);
        assert_eq!(x().get(), 1001);

        x().set(200);
        assert_eq!(unsafe { *(x().address() as *const i32) }, 200);
    }

    #[test]
    fn arithmetic_operators_match_native() {
        let mut value = 1000i32;
        let view = view_of(&mut value);
        let x = || view.handle().field::<i32>(0);

        // proxy OP value
        assert!(x() + 100 == 1000 + 100);
        assert!(x() - 100 == 1000 - 100);
        assert!(x() * 100 == 1000 * 100);
        assert!(x() / 100 == 1000 / 100);
        assert!(x() % 100 == 1000 % 100);

        // proxy OP proxy
        assert!(x() + x() == 1000 + 1000);
        assert!(x() - x() == 1000 - 1000);
        assert!(x() * x() == 1000 * 1000);
        assert!(x() / x() == 1000 / 1000);

        // value OP proxy
        assert!(2000 + x() == 2000 + 1000);
        assert!(2000 - x() == 2000 - 1000);
        assert!(2000 * x() == 2000 * 1000);
        assert!(2000 / x() == 2000 / 1000);
        assert!(2000 % x() == 2000 % 1000);

        // unary
        assert_eq!(-x(), -1000);
    }

    #[test]
    fn compound_assignment_mutates_backing_memory() {
        let mut value = 1000i32;
        let view = view_of(&mut value);

        let mut x = view.handle().field::<i32>(0);
        x += 100;
        x -= 50;
        x *= 2;
        x /= 3;
        x %= 500;

        let mut native = 1000i32;
        native += 100;
        native -= 50;
        native *= 2;
        native /= 3;
        native %= 500;

        assert_eq!(x.get(), native);
        assert_eq!(unsafe { *(x.address() as *const i32) }, native);

        // proxy OP= proxy
        let other = view.handle().field::<i32>(0);
        x += other;
        assert_eq!(x.get(), native + native);
    }

    #[test]
    fn value_compound_assignment_reads_the_proxy() {
        let mut value = 1000i32;
        let view = view_of(&mut value);
        let x = || view.handle().field::<i32>(0);

        let mut native = 100i32;
        native += x();
        native -= x();
        native *= x();
        native /= x();
        assert_eq!(native, ((100 + 1000 - 1000) * 1000) / 1000);
    }

    #[test]
    fn bitwise_operators_match_native() {
        let mut value = 0xCAFE_BABEu32;
        let view = view_of(&mut value);
        let x = || view.handle().field::<u32>(0);

        assert!(x() | 100 == 0xCAFE_BABE | 100);
        assert!(x() & 100 == 0xCAFE_BABE & 100);
        assert!(x() ^ 100 == 0xCAFE_BABE ^ 100);
        assert!(x() << 12 == 0xCAFE_BABE << 12);
        assert!(x() >> 12 == 0xCAFE_BABE >> 12);
        assert!(x() | x() == 0xCAFE_BABE);
        assert!(x() & x() == 0xCAFE_BABE);
        assert!(x() ^ x() == 0);
        assert_eq!(!x(), !0xCAFE_BABEu32);

        x().set(3);
        assert!(0x1234 << x() == 0x1234 << 3);
        assert!(0x1234 >> x() == 0x1234 >> 3);

        x().set(0xCAFE_BABE);
        let mut f = x();
        f |= 0x100;
        f &= 0x100;
        f ^= 0x100;
        assert_eq!(f.get(), ((0xCAFE_BABE | 0x100) & 0x100) ^ 0x100);
    }

    #[test]
    fn comparison_operators_match_native() {
        #[repr(C)]
        #[derive(Clone, Copy, Pod, Zeroable)]
        struct Pair {
            x: u32,
            y: f32,
        }

        let mut pair = Pair { x: 1234, y: 567.89 };
        let view = view_of(&mut pair);
        let x = || view.handle().field::<u32>(offset_of!(Pair, x) as isize);
        let y = || view.handle().field::<f32>(offset_of!(Pair, y) as isize);

        assert_eq!(pair.x, 1234);
        assert_eq!(pair.y, 567.89);
        assert!(x() == 1234);
        assert!(y() == 567.89);
        assert!(x() != 1233);
        assert!(x() > 1233);
        assert!(!(x() > 1234));
        assert!(y() < 567.90);
        assert!(x() >= 1234);
        assert!(x() <= 1234);
        assert!(y() >= 567.88);
        assert!(!(y() <= 567.88));

        // value OP proxy
        assert!(1234 == x());
        assert!(567.89 == y());
        assert!(1233 < x());
        assert!(567.90 > y());

        // proxy OP proxy
        assert!(x() == x());
        assert!(y() >= y());
        assert!(!(x() < x()));
    }

    #[test]
    fn plain_struct_field_reads_and_writes_whole_values() {
        #[repr(C)]
        #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
        struct Vec2 {
            x: f32,
            y: f32,
        }

        #[repr(C)]
        struct Body {
            id: u32,
            position: Vec2,
        }

        let mut body = Body {
            id: 4,
            position: Vec2 { x: 1.0, y: 2.0 },
        };
        let view = view_of(&mut body);
        let position = view
            .handle()
            .field::<Vec2>(offset_of!(Body, position) as isize);

        assert_eq!(position.get(), Vec2 { x: 1.0, y: 2.0 });
        position.set(Vec2 { x: 3.0, y: 4.0 });
        assert_eq!(position.get().y, 4.0);
        position.update(|mut p| {
            p.x += 1.0;
            p
        });
        assert_eq!(position.get(), Vec2 { x: 4.0, y: 4.0 });
        // The sibling field is untouched.
        assert_eq!(body.id, 4);
    }

    #[test]
    fn copy_from_copies_the_value_not_the_locator() {
        let mut values = [11u32, 0];
        let view = view_of(&mut values);
        let first = view.handle().field::<u32>(0);
        let second = view.handle().field::<u32>(4);

        second.copy_from(&first);
        assert_eq!(second.get(), 11);
        assert_ne!(first.address(), second.address());
    }

    #[test]
    fn array_subscript_is_pointer_arithmetic() {
        let mut values = [10u16, 20, 30, 40];
        let view = view_of(&mut values);
        let array = view.handle().array::<u16, 4>(0);

        assert_eq!(array.len(), 4);
        for index in 0..4 {
            assert_eq!(array.get(index), unsafe { *array.as_ptr().add(index) });
        }
        // Indirection through the decayed pointer is subscript zero.
        assert_eq!(unsafe { *array.as_ptr() }, array.get(0));

        array.set(2, 99);
        assert_eq!(values[2], 99);

        assert_eq!(array.read(), [10, 20, 99, 40]);
        array.write([1, 2, 3, 4]);
        assert_eq!(array.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn enum_field_converts_through_its_repr() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Gender {
            Male,
            Female,
        }

        impl ForeignEnum for Gender {
            type Repr = u8;

            fn from_repr(repr: u8) -> Self {
                if repr == 1 { Gender::Female } else { Gender::Male }
            }

            fn to_repr(self) -> u8 {
                match self {
                    Gender::Male => 0,
                    Gender::Female => 1,
                }
            }
        }

        let mut raw = 1u8;
        let view = view_of(&mut raw);
        let gender = view.handle().enum_field::<Gender>(0);

        assert_eq!(gender.get(), Gender::Female);
        gender.set(Gender::Male);
        assert_eq!(gender.repr(), 0);
        assert!(gender == Gender::Male);
    }

    #[test]
    fn ptr_field_reads_through_the_stored_pointer() {
        let mut values = [10u32, 20, 30];
        let mut slot: usize = 0;
        let view = view_of(&mut slot);
        let link = view.handle().ptr::<u32>(0);

        link.set(values.as_mut_ptr());
        assert!(!link.is_null());
        assert_eq!(link.get(), values.as_mut_ptr());

        assert_eq!(link.read(), 10);
        assert_eq!(link.read_at(1), 20);
        link.write_at(2, 99);
        assert_eq!(values[2], 99);

        link.set_null();
        assert!(link.is_null());
    }

    #[test]
    fn ref_field_dereferences_twice() {
        let mut target = 5i64;
        let mut slot = &mut target as *mut i64 as usize;
        let view = view_of(&mut slot);
        let reference = view.handle().ref_field::<i64>(0);

        assert_eq!(reference.referent_address(), &target as *const i64 as usize);
        assert_eq!(reference.get(), 5);
        reference.set(9);
        assert_eq!(unsafe { *(slot as *const i64) }, 9);
    }

    crate::overlay! {
        struct PairView: 8;
    }

    impl PairView {
        fn a(&self) -> Field<u32> {
            self.handle().field(0)
        }

        fn b(&self) -> Field<u32> {
            self.handle().field(4)
        }
    }

    #[repr(C)]
    #[derive(Clone, Copy, Pod, Zeroable)]
    struct RawPair {
        a: u32,
        b: u32,
    }

    #[test]
    fn nested_wrapper_resolves_the_same_address_every_access() {
        #[repr(C)]
        struct Outer {
            head: u64,
            pair: RawPair,
        }

        let mut outer = Outer {
            head: 0,
            pair: RawPair { a: 3, b: 4 },
        };
        let view = view_of(&mut outer);
        let pair = view
            .handle()
            .wrapper::<PairView>(offset_of!(Outer, pair) as isize);

        // A fresh wrapper per access, always over the same address.
        assert_eq!(pair.get().object_address(), pair.get().object_address());
        assert_eq!(
            pair.get().object_address(),
            &outer.pair as *const RawPair as Address
        );
        assert_eq!(pair.get().a().get(), 3);
        assert_eq!(pair.get().b().get(), 4);
        assert_eq!(pair.weak().address(), pair.address());
        assert_eq!(outer.head, 0);
    }

    #[test]
    fn wrapper_array_strides_by_declared_size() {
        let mut pairs = [
            RawPair { a: 1, b: 2 },
            RawPair { a: 3, b: 4 },
            RawPair { a: 5, b: 6 },
        ];
        let view = view_of(&mut pairs);
        let array = view.handle().wrapper_array::<PairView, 3>(0);

        assert_eq!(array.len(), 3);
        for index in 0..3 {
            assert_eq!(
                array.at(index).object_address(),
                array.address() + index * PairView::OBJECT_SIZE
            );
        }
        assert_eq!(array.at(2).a().get(), 5);
        assert_eq!(array.weak_at(1).address(), array.at(1).object_address());
    }

    #[test]
    fn wrapper_ptr_promotes_to_a_strong_wrapper() {
        let mut pair = RawPair { a: 7, b: 8 };
        let mut slot: usize = 0;
        let view = view_of(&mut slot);
        let link = view.handle().wrapper_ptr::<PairView>(0);

        assert!(link.is_null());
        link.set(Weak::new(&mut pair as *mut RawPair as Address));
        assert!(!link.is_null());
        assert_eq!(link.get().address(), &pair as *const RawPair as Address);

        let strong = unsafe { link.strong() };
        assert_eq!(strong.a().get(), 7);
        assert_eq!(strong.b().get(), 8);
        strong.a().set(70);
        assert_eq!(pair.a, 70);
        assert_eq!(pair.b, 8);

        link.set_null();
        assert!(link.is_null());
    }

    #[test]
    fn display_forwards_to_the_value() {
        let mut value = 41u32;
        let view = view_of(&mut value);
        let field = view.handle().field::<u32>(0);
        assert_eq!(format!("{field}"), "41");
        assert_eq!(format!("{field:?}"), format!("Field({:#x})", field.address()));
    }
}
