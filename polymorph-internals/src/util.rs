//! Internal utility types.

/// Marker type used in place of a payload whose type has been erased.
///
/// A `NonNull<Erased>` points at a payload of some concrete type `V`, but the
/// code holding it does not know which. Only the vtable stored next to the
/// pointer does.
///
/// Using a distinct marker type (rather than `()` or `u8`) makes the intent
/// clearer in type signatures and keeps the pointer from being dereferenced by
/// accident.
pub(crate) struct Erased;
