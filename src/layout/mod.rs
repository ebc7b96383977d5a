use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache line size assumed for padding. 128 bytes covers both the adjacent-line
/// prefetcher pairs on x86 and the native line size on Apple silicon.
pub const CACHE_LINE_SIZE: usize = 128;

/// Wrapper to force alignment to 128 bytes.
/// Every wrapped value starts on its own cache line and fills it.
#[repr(align(128))]
#[derive(Debug, Default)]
pub struct CachePadded<T>(pub T);

const _: () = assert!(mem::align_of::<CachePadded<u8>>() == CACHE_LINE_SIZE);

/// One atomically updated integer.
pub type MemoryCell = AtomicU64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Cells sit next to each other; several share a line.
    Packed,
    /// Each cell owns a full cache line.
    Padded,
}

impl Layout {
    pub const ALL: [Layout; 2] = [Layout::Padded, Layout::Packed];

    /// Distance in bytes between the starts of two neighbouring cells.
    pub fn slot_size(self) -> usize {
        match self {
            Layout::Packed => mem::size_of::<MemoryCell>(),
            Layout::Padded => mem::size_of::<CachePadded<MemoryCell>>(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Layout::Packed => "packed",
            Layout::Padded => "padded",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A contiguous heap region of zeroed memory cells.
///
/// The region is a single allocation of `count * layout.slot_size()` bytes. In
/// the padded layout, line isolation follows from the alignment of
/// [`CachePadded`]; nothing is checked at runtime.
pub enum CellRegion {
    Packed(Box<[MemoryCell]>),
    Padded(Box<[CachePadded<MemoryCell>]>),
}

impl CellRegion {
    pub fn new(count: usize, layout: Layout) -> CellRegion {
        match layout {
            Layout::Packed => CellRegion::Packed((0..count).map(|_| AtomicU64::new(0)).collect()),
            Layout::Padded => CellRegion::Padded(
                (0..count)
                    .map(|_| CachePadded(AtomicU64::new(0)))
                    .collect(),
            ),
        }
    }

    pub fn layout(&self) -> Layout {
        match self {
            CellRegion::Packed(_) => Layout::Packed,
            CellRegion::Padded(_) => Layout::Padded,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CellRegion::Packed(cells) => cells.len(),
            CellRegion::Padded(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&MemoryCell> {
        match self {
            CellRegion::Packed(cells) => cells.get(index),
            CellRegion::Padded(cells) => cells.get(index).map(|padded| &padded.0),
        }
    }

    /// Panics if `index` is out of range, like slice indexing.
    pub fn cell(&self, index: usize) -> &MemoryCell {
        match self {
            CellRegion::Packed(cells) => &cells[index],
            CellRegion::Padded(cells) => &cells[index].0,
        }
    }

    /// Snapshot of every cell. Only meaningful once all workers have joined.
    pub fn values(&self) -> Vec<u64> {
        (0..self.len())
            .map(|i| self.cell(i).load(Ordering::Relaxed))
            .collect()
    }
}

impl fmt::Debug for CellRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellRegion")
            .field("layout", &self.layout())
            .field("values", &self.values())
            .finish()
    }
}
