use core::alloc::Layout;

use polymorph_internals::StorageError;

/// The error returned by the fallible operations of [`Poly`](crate::Poly).
///
/// The infallible counterparts ([`Poly::new`](crate::Poly::new) and
/// [`Clone`]) never return this error: they abort on allocation failure, and
/// reject oversized inline payloads at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The global allocator could not provide memory for the payload.
    #[error(
        "out of memory while storing `{type_name}` ({} bytes, align {})",
        .layout.size(),
        .layout.align()
    )]
    OutOfMemory {
        /// The [`core::any::type_name`] of the payload.
        type_name: &'static str,
        /// The layout of the requested allocation.
        layout: Layout,
    },
    /// The payload does not fit into the inline buffer.
    #[error(
        "`{type_name}` ({} bytes, align {}) does not fit into inline storage of {} bytes (align {})",
        .payload.size(),
        .payload.align(),
        .capacity.size(),
        .capacity.align()
    )]
    Capacity {
        /// The [`core::any::type_name`] of the payload.
        type_name: &'static str,
        /// The layout of the payload.
        payload: Layout,
        /// The layout of the inline buffer.
        capacity: Layout,
    },
}

impl Error {
    /// Returns the [`core::any::type_name`] of the payload that could not be
    /// stored.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match *self {
            Error::OutOfMemory { type_name, .. } | Error::Capacity { type_name, .. } => type_name,
        }
    }

    /// Returns the layout of the payload that could not be stored.
    #[must_use]
    pub fn layout(&self) -> Layout {
        match *self {
            Error::OutOfMemory { layout, .. } => layout,
            Error::Capacity { payload, .. } => payload,
        }
    }

    /// Converts the error reported by the raw storage, and records it.
    pub(crate) fn from_storage(error: StorageError, type_name: &'static str) -> Self {
        match error {
            StorageError::OutOfMemory { layout } => {
                tracing::debug!(
                    type_name,
                    size = layout.size(),
                    align = layout.align(),
                    "allocation for payload failed"
                );
                Error::OutOfMemory { type_name, layout }
            }
            StorageError::Capacity { payload, capacity } => {
                tracing::debug!(
                    type_name,
                    size = payload.size(),
                    align = payload.align(),
                    capacity = capacity.size(),
                    capacity_align = capacity.align(),
                    "payload does not fit into inline storage"
                );
                Error::Capacity {
                    type_name,
                    payload,
                    capacity,
                }
            }
        }
    }
}
