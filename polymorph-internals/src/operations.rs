//! The trait that ties an interface's operation table to a payload type.

/// An interface: a table of type-erased operations that can be instantiated
/// for the payload type `V`.
///
/// An interface is an ordinary struct of `unsafe fn` pointers taking a
/// [`RawValueRef`] or [`RawValueMut`] as their first argument. Implementing
/// this trait for a payload type `V` means "`V` satisfies the capability
/// contract of this interface". The implementation provides the table whose
/// function pointers are instantiated with `V`.
///
/// Interfaces normally implement this trait once, as a blanket impl whose
/// bounds *are* the capability contract:
///
/// ```
/// use polymorph_internals::{Operations, RawValueRef};
///
/// trait Area {
///     fn area(&self) -> f64;
/// }
///
/// struct AreaOps {
///     area: unsafe fn(RawValueRef<'_, AreaOps>) -> f64,
/// }
///
/// // SAFETY: `area::<V>` only downcasts to `V`.
/// unsafe impl<V: Area + Clone + 'static> Operations<V> for AreaOps {
///     const OPERATIONS: &'static Self = &AreaOps { area: area::<V> };
/// }
///
/// /// # Safety
/// ///
/// /// The payload behind `value` must be of type `V`.
/// unsafe fn area<V: Area + 'static>(value: RawValueRef<'_, AreaOps>) -> f64 {
///     // SAFETY: Guaranteed by the caller.
///     let value = unsafe { value.downcast_unchecked::<V>() };
///     value.area()
/// }
/// ```
///
/// The storage types only ever hand a [`RawValueRef`] to the table that was
/// instantiated with its own payload type.
///
/// A table reached through `Operations<V>` is trusted for `V`, so an impl
/// cannot be written without `unsafe`. Reusing another payload's table is
/// rejected:
///
/// ```compile_fail,E0200
/// use polymorph_internals::{Operations, RawValueRef};
///
/// struct LenOps {
///     len: unsafe fn(RawValueRef<'_, LenOps>) -> usize,
/// }
///
/// unsafe fn len(value: RawValueRef<'_, LenOps>) -> usize {
///     // SAFETY: Guaranteed by the caller.
///     unsafe { value.downcast_unchecked::<String>() }.len()
/// }
///
/// // SAFETY: `len` only downcasts to `String`.
/// unsafe impl Operations<String> for LenOps {
///     const OPERATIONS: &'static Self = &LenOps { len };
/// }
///
/// impl Operations<u8> for LenOps {
///     const OPERATIONS: &'static Self = <LenOps as Operations<String>>::OPERATIONS;
/// }
/// ```
///
/// # Safety
///
/// Every function pointer in `OPERATIONS` must be sound to call with a handle
/// whose payload is of type `V`.
///
/// [`RawValueRef`]: crate::RawValueRef
/// [`RawValueMut`]: crate::RawValueMut
#[diagnostic::on_unimplemented(
    message = "`{V}` does not satisfy the capability contract of `{Self}`",
    label = "`{Self}` cannot dispatch to `{V}`"
)]
pub unsafe trait Operations<V>: Sized + 'static {
    /// The operation table instantiated with the payload type `V`.
    const OPERATIONS: &'static Self;
}
