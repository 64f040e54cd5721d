use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::schedule::workgroups_for;
use crate::render::BuildError;

use super::{SortBuffers, Sorter};

/// One compare-exchange stage of the network.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BitonicPass {
    /// Size of the bitonic sequences being merged.
    pub k: u32,
    /// Compare distance.
    pub j: u32,
}

/// Uniform block of one pass (16 bytes, bound with a dynamic offset).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PassParams {
    k: u32,
    j: u32,
    /// Non-zero on the first pass: entries past the visible count read as the
    /// maximum key.
    sanitize: u32,
    _pad: u32,
}

/// Passes of a bitonic network over `capacity` keys (a power of two).
pub fn bitonic_passes(capacity: u32) -> Vec<BitonicPass> {
    let mut passes = Vec::new();
    let mut k = 2;
    while k <= capacity {
        let mut j = k / 2;
        while j > 0 {
            passes.push(BitonicPass { k, j });
            j /= 2;
        }
        k *= 2;
    }
    passes
}

/// Out-of-place bitonic sort over the ping-pong slots.
///
/// Every pass reads one slot and writes the other, over the whole padded
/// capacity. With an odd number of passes the result ends in slot 1 and a
/// final indirect dispatch copies the visible prefix back into slot 0.
pub struct BitonicSorter {
    buffers: SortBuffers,

    sort_pipeline: wgpu::ComputePipeline,
    mirror_pipeline: wgpu::ComputePipeline,

    /// `[0]` reads slot 0 and writes slot 1, `[1]` the reverse.
    bind_groups: [wgpu::BindGroup; 2],
    _params: wgpu::Buffer,
    params_stride: u32,

    passes: Vec<BitonicPass>,
}

impl BitonicSorter {
    /// Sorter able to hold `num_points` keys.
    pub fn new(device: &wgpu::Device, num_points: u32) -> Result<Self, BuildError> {
        let capacity = num_points.max(1).checked_next_power_of_two().ok_or(
            BuildError::TooManyWorkgroups {
                what: "bitonic sort",
                groups: u32::MAX,
                limit: device.limits().max_compute_workgroups_per_dimension,
            },
        )?;
        Self::check_limits(device, capacity)?;

        let passes = bitonic_passes(capacity);
        let buffers = SortBuffers::new(device, capacity);

        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let params_stride = (std::mem::size_of::<PassParams>() as u32).next_multiple_of(alignment);

        let mut params_bytes = vec![0u8; params_stride as usize * passes.len().max(1)];
        for (i, pass) in passes.iter().enumerate() {
            let params = PassParams {
                k: pass.k,
                j: pass.j,
                sanitize: u32::from(i == 0),
                _pad: 0,
            };
            let at = i * params_stride as usize;
            params_bytes[at..at + std::mem::size_of::<PassParams>()]
                .copy_from_slice(bytemuck::bytes_of(&params));
        }

        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bitonic pass params"),
            contents: &params_bytes,
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bitonic sort shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/bitonic_sort.wgsl").into()),
        });

        let storage = |binding, read_only| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bitonic sort bgl"),
            entries: &[
                storage(0, true),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<PassParams>() as u64,
                        ),
                    },
                    count: None,
                },
                storage(2, true),
                storage(3, true),
                storage(4, false),
                storage(5, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("bitonic sort pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = |entry_point: &str| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(entry_point),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                cache: None,
            })
        };
        let sort_pipeline = pipeline("sort_pass");
        let mirror_pipeline = pipeline("mirror");

        let bind_group = |src: usize, dst: usize| {
            let (src, dst) = (&buffers.ping_pong[src], &buffers.ping_pong[dst]);
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("bitonic sort bind group"),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffers.info.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer: &params,
                            offset: 0,
                            size: wgpu::BufferSize::new(std::mem::size_of::<PassParams>() as u64),
                        }),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: src.keys.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: src.indices.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: dst.keys.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 5,
                        resource: dst.indices.as_entire_binding(),
                    },
                ],
            })
        };
        let bind_groups = [bind_group(0, 1), bind_group(1, 0)];

        log::debug!(
            "bitonic sorter: capacity {capacity}, {} passes{}",
            passes.len(),
            if passes.len() % 2 == 1 { " + mirror" } else { "" }
        );

        Ok(Self {
            buffers,
            sort_pipeline,
            mirror_pipeline,
            bind_groups,
            _params: params,
            params_stride,
            passes,
        })
    }

    fn check_limits(device: &wgpu::Device, capacity: u32) -> Result<(), BuildError> {
        let limits = device.limits();

        let size = u64::from(capacity) * std::mem::size_of::<u32>() as u64;
        let limit = u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);
        if size > limit {
            return Err(BuildError::BufferTooLarge {
                what: "sort keys",
                size,
                limit,
            });
        }

        let groups = workgroups_for(capacity);
        if groups > limits.max_compute_workgroups_per_dimension {
            return Err(BuildError::TooManyWorkgroups {
                what: "bitonic sort",
                groups,
                limit: limits.max_compute_workgroups_per_dimension,
            });
        }
        Ok(())
    }

    /// True when the network ends in slot 1 and needs the mirror pass.
    pub fn needs_mirror(&self) -> bool {
        self.passes.len() % 2 == 1
    }
}

impl Sorter for BitonicSorter {
    fn buffers(&self) -> &SortBuffers {
        &self.buffers
    }

    fn sort(&self, encoder: &mut wgpu::CommandEncoder) {
        let groups = workgroups_for(self.buffers.capacity);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("bitonic sort pass"),
            timestamp_writes: None,
        });

        pass.set_pipeline(&self.sort_pipeline);
        for i in 0..self.passes.len() {
            let offset = i as u32 * self.params_stride;
            pass.set_bind_group(0, &self.bind_groups[i % 2], &[offset]);
            pass.dispatch_workgroups(groups, 1, 1);
        }

        if self.needs_mirror() {
            pass.set_pipeline(&self.mirror_pipeline);
            pass.set_bind_group(0, &self.bind_groups[1], &[0]);
            pass.dispatch_workgroups_indirect(&self.buffers.dispatch_indirect, 0);
        }
    }
}
