//! Tests for the storage strategies when the global allocator runs out of
//! memory.
//!
//! This test binary installs an allocator that can be told to fail on the
//! current thread, either for one allocation size or for every allocation:
//!
//! - `test_try_new_reports_out_of_memory`: `RawHeap::try_new` returns the
//!   requested layout, and drops the payload it was given
//! - `test_try_clone_reports_out_of_memory`: A failed `RawHeap::try_clone`
//!   does not run `Clone`, and leaves the source usable
//! - `test_storage_without_allocation`: Inline storage and zero-sized heap
//!   payloads keep working while every allocation fails

use std::{
    alloc::{GlobalAlloc, Layout, System},
    cell::Cell,
    ptr,
    rc::Rc,
};

use polymorph_internals::{Operations, RawHeap, RawInline, RawStorage, RawValueRef, StorageError};

/// Fails every allocation, whatever its size.
const FAIL_ALL: usize = usize::MAX;

thread_local! {
    /// Allocations of this size fail on the current thread. Zero fails
    /// nothing.
    static FAIL_SIZE: Cell<usize> = const { Cell::new(0) };
}

struct FailingAllocator;

// SAFETY: Every allocation is either forwarded to `System` or reported as
// failed with a null pointer.
unsafe impl GlobalAlloc for FailingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let fail_size = FAIL_SIZE.try_with(Cell::get).unwrap_or(0);
        if fail_size == FAIL_ALL || fail_size == layout.size() {
            return ptr::null_mut();
        }
        // SAFETY: Guaranteed by the caller
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: Every pointer handed out came from `System`
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static ALLOCATOR: FailingAllocator = FailingAllocator;

/// Makes allocations fail on the current thread until dropped.
struct FailAllocations;

impl FailAllocations {
    fn of_size(size: usize) -> Self {
        FAIL_SIZE.set(size);
        Self
    }

    fn all() -> Self {
        Self::of_size(FAIL_ALL)
    }
}

impl Drop for FailAllocations {
    fn drop(&mut self) {
        FAIL_SIZE.set(0);
    }
}

trait Checksum {
    fn checksum(&self) -> u64;
}

struct ChecksumOps {
    checksum: unsafe fn(RawValueRef<'_, ChecksumOps>) -> u64,
}

// SAFETY: `checksum::<V>` only downcasts to `V`.
unsafe impl<V: Checksum + Clone + 'static> Operations<V> for ChecksumOps {
    const OPERATIONS: &'static Self = &ChecksumOps {
        checksum: checksum::<V>,
    };
}

unsafe fn checksum<V: Checksum + 'static>(value: RawValueRef<'_, ChecksumOps>) -> u64 {
    unsafe { value.downcast_unchecked::<V>() }.checksum()
}

fn checksum_of<S: RawStorage<ChecksumOps>>(storage: &S) -> u64 {
    let value = storage.as_value_ref();
    unsafe { (value.operations().checksum)(value) }
}

#[derive(Default)]
struct Counts {
    clones: Cell<usize>,
    drops: Cell<usize>,
}

/// A payload larger than anything else these tests allocate.
struct Slab {
    bytes: [u8; 200],
    counts: Rc<Counts>,
}

impl Slab {
    fn new(fill: u8, counts: &Rc<Counts>) -> Self {
        Self {
            bytes: [fill; 200],
            counts: counts.clone(),
        }
    }
}

impl Clone for Slab {
    fn clone(&self) -> Self {
        self.counts.clones.set(self.counts.clones.get() + 1);
        Self {
            bytes: self.bytes,
            counts: self.counts.clone(),
        }
    }
}

impl Drop for Slab {
    fn drop(&mut self) {
        self.counts.drops.set(self.counts.drops.get() + 1);
    }
}

impl Checksum for Slab {
    fn checksum(&self) -> u64 {
        self.bytes.iter().map(|&b| u64::from(b)).sum()
    }
}

#[derive(Clone, Copy)]
struct Nothing;

impl Checksum for Nothing {
    fn checksum(&self) -> u64 {
        0
    }
}

#[test]
fn test_try_new_reports_out_of_memory() {
    let counts = Rc::new(Counts::default());
    let layout = Layout::new::<Slab>();

    let result = {
        let _fail = FailAllocations::of_size(layout.size());
        RawHeap::<ChecksumOps>::try_new(Slab::new(1, &counts))
    };
    assert_eq!(result.err(), Some(StorageError::OutOfMemory { layout }));
    assert_eq!(counts.drops.get(), 1);

    let heap = RawHeap::<ChecksumOps>::try_new(Slab::new(1, &counts)).unwrap();
    assert_eq!(checksum_of(&heap), 200);
    drop(heap);
    assert_eq!(counts.drops.get(), 2);
    assert_eq!(counts.clones.get(), 0);
}

#[test]
fn test_try_clone_reports_out_of_memory() {
    let counts = Rc::new(Counts::default());
    let layout = Layout::new::<Slab>();
    let heap = RawHeap::<ChecksumOps>::new(Slab::new(3, &counts));

    let result = {
        let _fail = FailAllocations::of_size(layout.size());
        heap.try_clone()
    };
    assert_eq!(result.err(), Some(StorageError::OutOfMemory { layout }));
    assert_eq!(counts.clones.get(), 0);
    assert_eq!(counts.drops.get(), 0);
    assert_eq!(checksum_of(&heap), 600);

    let copy = heap.try_clone().unwrap();
    assert_eq!(counts.clones.get(), 1);
    drop(heap);
    assert_eq!(checksum_of(&copy), 600);
    drop(copy);
    assert_eq!(counts.drops.get(), 2);
}

#[test]
fn test_storage_without_allocation() {
    let counts = Rc::new(Counts::default());
    let slab = Slab::new(2, &counts);

    // Nothing in this block may allocate, so the results are checked after it
    let (inline, inline_copy, empty, empty_copy) = {
        let _fail = FailAllocations::all();
        let inline = RawInline::<ChecksumOps, [usize; 32]>::try_new(slab);
        let inline_copy = inline.as_ref().map(|storage| storage.try_clone());
        let empty = RawHeap::<ChecksumOps>::try_new(Nothing);
        let empty_copy = empty.as_ref().map(|storage| storage.try_clone());
        (inline, inline_copy, empty, empty_copy)
    };

    let inline = inline.unwrap();
    let inline_copy = inline_copy.unwrap().unwrap();
    assert_eq!(checksum_of(&inline) + checksum_of(&inline_copy), 800);
    assert_eq!(counts.clones.get(), 1);

    let empty = empty.unwrap();
    let empty_copy = empty_copy.unwrap().unwrap();
    assert_eq!(checksum_of(&empty) + checksum_of(&empty_copy), 0);

    drop((inline, inline_copy));
    assert_eq!(counts.drops.get(), 2);
}
