//! Depth sorting of preprocessed splats.
//!
//! The renderer only relies on [`Sorter`] and the buffers it exposes:
//! preprocess writes keys and indices into slot 0, counts them in `info`, and
//! after `sort` slot 0 holds the visible prefix in ascending key order.

mod bitonic;

pub use bitonic::{bitonic_passes, BitonicPass, BitonicSorter};

use bytemuck::{Pod, Zeroable};

/// Per-frame counters shared by preprocess and the sorter (16 bytes).
///
/// `keys_size` is the visible count; preprocess increments it atomically.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct SortInfo {
    pub keys_size: u32,
    pub padded_size: u32,
    pub _pad: [u32; 2],
}

/// Arguments of an indirect compute dispatch.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct DispatchIndirect {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl DispatchIndirect {
    /// Reset state: no workgroups yet, unit y/z.
    pub const EMPTY: Self = Self { x: 0, y: 1, z: 1 };
}

/// One half of the ping-pong pair.
#[derive(Debug)]
pub struct SortSlot {
    pub keys: wgpu::Buffer,
    pub indices: wgpu::Buffer,
}

/// GPU storage owned by a sorter.
#[derive(Debug)]
pub struct SortBuffers {
    /// [`SortInfo`]; the visible count lives at offset 0.
    pub info: wgpu::Buffer,
    /// [`DispatchIndirect`] sized by preprocess to the visible count.
    pub dispatch_indirect: wgpu::Buffer,
    pub ping_pong: [SortSlot; 2],
    /// Number of keys each slot holds.
    pub capacity: u32,
}

impl SortBuffers {
    pub const VISIBLE_COUNT_OFFSET: u64 = std::mem::offset_of!(SortInfo, keys_size) as u64;

    pub(crate) fn new(device: &wgpu::Device, capacity: u32) -> Self {
        use wgpu::util::DeviceExt;

        let info = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sort info"),
            contents: bytemuck::bytes_of(&SortInfo {
                keys_size: 0,
                padded_size: capacity,
                _pad: [0; 2],
            }),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
        });

        let dispatch_indirect = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sort dispatch indirect"),
            contents: bytemuck::bytes_of(&DispatchIndirect::EMPTY),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::INDIRECT
                | wgpu::BufferUsages::COPY_DST,
        });

        let key_bytes = u64::from(capacity) * std::mem::size_of::<u32>() as u64;
        let slot = |i: usize| {
            let buffer = |what: &str| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("sort {what} {i}")),
                    size: key_bytes,
                    usage: wgpu::BufferUsages::STORAGE
                        | wgpu::BufferUsages::COPY_SRC
                        | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            };
            SortSlot {
                keys: buffer("keys"),
                indices: buffer("indices"),
            }
        };

        Self {
            info,
            dispatch_indirect,
            ping_pong: [slot(0), slot(1)],
            capacity,
        }
    }

    /// Slot holding the sorted output once `Sorter::sort` has run.
    pub fn output(&self) -> &SortSlot {
        &self.ping_pong[0]
    }

    /// Zeroes the visible count and the indirect dispatch width.
    ///
    /// Recorded into `encoder`, so it is ordered with the rest of the frame.
    pub fn clear_scratch(&self, encoder: &mut wgpu::CommandEncoder) {
        let word = Some(std::mem::size_of::<u32>() as u64);
        encoder.clear_buffer(&self.info, Self::VISIBLE_COUNT_OFFSET, word);
        encoder.clear_buffer(&self.dispatch_indirect, 0, word);
    }
}

/// GPU key/index sorter used by the splat renderer.
pub trait Sorter {
    fn buffers(&self) -> &SortBuffers;

    /// Records the sort into `encoder`.
    ///
    /// Sorts the first `keys_size` entries of slot 0 by ascending key and
    /// leaves them in slot 0.
    fn sort(&self, encoder: &mut wgpu::CommandEncoder);
}
