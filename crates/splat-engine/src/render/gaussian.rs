use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::camera::CameraUniform;
use crate::render::schedule::{frame_schedule, workgroups_for, DrawIndirectArgs, FrameStage};
use crate::render::sort::{BitonicSorter, SortBuffers, Sorter};
use crate::render::{BuildError, FrameError, FrameGate, RenderCtx, RenderTarget};
use crate::scene::PointCloud;

/// Screen-space splat written by preprocess (48 bytes per point).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SplatRecord {
    pub center_extent: [f32; 4],
    pub conic_opacity: [f32; 4],
    pub color: [f32; 4],
}

/// Render-settings uniform (16 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct RenderSettings {
    pub gaussian_scaling: f32,
    pub sh_deg: u32,
    pub _pad: [u32; 2],
}

fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── layout helpers ────────────────────────────────────────────────────────

fn uniform_entry<T>(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

fn storage_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    read_only: bool,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffers: &[&wgpu::Buffer],
) -> wgpu::BindGroup {
    let entries: Vec<wgpu::BindGroupEntry<'_>> = buffers
        .iter()
        .enumerate()
        .map(|(i, buffer)| wgpu::BindGroupEntry {
            binding: i as u32,
            resource: buffer.as_entire_binding(),
        })
        .collect();

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &entries,
    })
}

/// Gaussian-splat renderer.
///
/// A frame is preprocess (compute), a GPU copy of the visible count into the
/// indirect draw arguments, the depth sort, and one indirect draw, all in the
/// caller's encoder. See [`frame_schedule`].
pub struct GaussianRenderer<S: Sorter = BitonicSorter> {
    num_points: u32,
    sh_degree: u32,

    preprocess_pipeline: wgpu::ComputePipeline,
    render_pipeline: wgpu::RenderPipeline,

    /// camera, point data, sorter scratch.
    preprocess_bind_groups: [wgpu::BindGroup; 3],
    /// camera, splats + sorted indices.
    render_bind_groups: [wgpu::BindGroup; 2],

    settings: wgpu::Buffer,
    indirect: wgpu::Buffer,

    scale: f32,
    scale_dirty: bool,

    sorter: S,
    gate: FrameGate,
}

impl GaussianRenderer<BitonicSorter> {
    /// Renderer with a bitonic sorter sized for `cloud`.
    pub fn with_bitonic(
        ctx: &RenderCtx<'_>,
        cloud: &PointCloud,
        camera: &wgpu::Buffer,
    ) -> Result<Self, BuildError> {
        let sorter = BitonicSorter::new(ctx.device, cloud.num_points())?;
        Self::new(ctx, cloud, camera, sorter)
    }
}

impl<S: Sorter> GaussianRenderer<S> {
    /// Builds pipelines and buffers for `cloud`, drawing to `ctx.surface_format`.
    ///
    /// `camera` is the uniform buffer returned by `Camera::attach`.
    pub fn new(
        ctx: &RenderCtx<'_>,
        cloud: &PointCloud,
        camera: &wgpu::Buffer,
        sorter: S,
    ) -> Result<Self, BuildError> {
        let device = ctx.device;
        let num_points = cloud.num_points();
        if num_points == 0 {
            return Err(BuildError::EmptyPointCloud);
        }
        Self::check_limits(device, num_points, sorter.buffers())?;

        // ── buffers ───────────────────────────────────────────────────────

        let splats = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("splats"),
            size: u64::from(num_points) * std::mem::size_of::<SplatRecord>() as u64,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });

        let scale = 1.0;
        let settings = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("render settings"),
            contents: bytemuck::bytes_of(&RenderSettings {
                gaussian_scaling: scale,
                sh_deg: cloud.sh_degree(),
                _pad: [0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let indirect = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("splat draw indirect"),
            contents: bytemuck::bytes_of(&DrawIndirectArgs::splats()),
            usage: wgpu::BufferUsages::INDIRECT
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        });

        // ── layouts ───────────────────────────────────────────────────────

        let compute = wgpu::ShaderStages::COMPUTE;
        let camera_bgl = |visibility| {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("splat camera bgl"),
                entries: &[uniform_entry::<CameraUniform>(0, visibility)],
            })
        };

        let preprocess_camera_bgl = camera_bgl(compute);
        let preprocess_points_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("preprocess points bgl"),
            entries: &[
                storage_entry(0, compute, true),
                uniform_entry::<RenderSettings>(1, compute),
                storage_entry(2, compute, true),
                storage_entry(3, compute, false),
            ],
        });
        let preprocess_sort_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("preprocess sort bgl"),
            entries: &[
                storage_entry(0, compute, false),
                storage_entry(1, compute, false),
                storage_entry(2, compute, false),
                storage_entry(3, compute, false),
            ],
        });

        let render_camera_bgl = camera_bgl(wgpu::ShaderStages::VERTEX_FRAGMENT);
        let render_splats_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("splat render bgl"),
            entries: &[
                storage_entry(0, wgpu::ShaderStages::VERTEX, true),
                storage_entry(1, wgpu::ShaderStages::VERTEX, true),
            ],
        });

        // ── pipelines ─────────────────────────────────────────────────────

        let preprocess_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("preprocess shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/preprocess.wgsl").into()),
        });
        let preprocess_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("preprocess pipeline layout"),
            bind_group_layouts: &[
                &preprocess_camera_bgl,
                &preprocess_points_bgl,
                &preprocess_sort_bgl,
            ],
            immediate_size: 0,
        });
        let preprocess_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("preprocess pipeline"),
            layout: Some(&preprocess_layout),
            module: &preprocess_shader,
            entry_point: Some("preprocess"),
            compilation_options: Default::default(),
            cache: None,
        });

        let render_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("splat shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/gaussian.wgsl").into()),
        });
        let render_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("splat pipeline layout"),
            bind_group_layouts: &[&render_camera_bgl, &render_splats_bgl],
            immediate_size: 0,
        });
        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("splat pipeline"),
            layout: Some(&render_layout),
            vertex: wgpu::VertexState {
                module: &render_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &render_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // ── bind groups ───────────────────────────────────────────────────

        let sort = sorter.buffers();
        let slot0 = sort.output();

        let preprocess_bind_groups = [
            bind_group(device, "preprocess camera", &preprocess_camera_bgl, &[camera]),
            bind_group(
                device,
                "preprocess points",
                &preprocess_points_bgl,
                &[cloud.gaussian_buffer(), &settings, cloud.sh_buffer(), &splats],
            ),
            bind_group(
                device,
                "preprocess sort",
                &preprocess_sort_bgl,
                &[&sort.info, &slot0.keys, &slot0.indices, &sort.dispatch_indirect],
            ),
        ];
        let render_bind_groups = [
            bind_group(device, "splat camera", &render_camera_bgl, &[camera]),
            bind_group(device, "splat data", &render_splats_bgl, &[&splats, &slot0.indices]),
        ];

        log::info!(
            "gaussian renderer ready: {num_points} points, sort capacity {}, target {:?}",
            sort.capacity,
            ctx.surface_format
        );

        Ok(Self {
            num_points,
            sh_degree: cloud.sh_degree(),
            preprocess_pipeline,
            render_pipeline,
            preprocess_bind_groups,
            render_bind_groups,
            settings,
            indirect,
            scale,
            scale_dirty: false,
            sorter,
            gate: FrameGate::new(),
        })
    }

    fn check_limits(
        device: &wgpu::Device,
        num_points: u32,
        sort: &SortBuffers,
    ) -> Result<(), BuildError> {
        let limits = device.limits();

        let size = u64::from(num_points) * std::mem::size_of::<SplatRecord>() as u64;
        let limit = u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);
        if size > limit {
            return Err(BuildError::BufferTooLarge {
                what: "splat buffer",
                size,
                limit,
            });
        }

        let groups = workgroups_for(num_points);
        if groups > limits.max_compute_workgroups_per_dimension {
            return Err(BuildError::TooManyWorkgroups {
                what: "preprocess",
                groups,
                limit: limits.max_compute_workgroups_per_dimension,
            });
        }

        if sort.capacity < num_points {
            return Err(BuildError::SorterTooSmall {
                capacity: sort.capacity,
                points: num_points,
            });
        }
        Ok(())
    }

    pub fn num_points(&self) -> u32 {
        self.num_points
    }

    /// Splat size multiplier; takes effect at the start of the next frame.
    pub fn set_scale(&mut self, scale: f32) {
        if scale.is_finite() && scale != self.scale {
            self.scale = scale;
            self.scale_dirty = true;
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn sorter(&self) -> &S {
        &self.sorter
    }

    /// Indirect draw arguments ([`DrawIndirectArgs`]).
    pub fn indirect_buffer(&self) -> &wgpu::Buffer {
        &self.indirect
    }

    /// Records one frame into `target`.
    ///
    /// Waits for the previous frame first if it is still executing. Submit the
    /// encoder, then call [`GaussianRenderer::frame_submitted`].
    pub fn frame(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
    ) -> Result<(), FrameError> {
        ctx.ensure_device()?;
        self.gate.wait(ctx.device)?;

        if self.scale_dirty {
            let settings = self.settings_uniform();
            ctx.queue.write_buffer(&self.settings, 0, bytemuck::bytes_of(&settings));
            log::debug!("splat scale set to {}", self.scale);
            self.scale_dirty = false;
        }

        for stage in frame_schedule(self.num_points) {
            self.record(stage, target);
        }
        Ok(())
    }

    /// Marks the frame just submitted as in flight.
    pub fn frame_submitted(&self, queue: &wgpu::Queue) {
        self.gate.frame_submitted(queue);
    }

    fn settings_uniform(&self) -> RenderSettings {
        RenderSettings {
            gaussian_scaling: self.scale,
            sh_deg: self.sh_degree,
            _pad: [0; 2],
        }
    }

    fn record(&self, stage: FrameStage, target: &mut RenderTarget<'_>) {
        let sort = self.sorter.buffers();
        match stage {
            FrameStage::ResetSortScratch => sort.clear_scratch(target.encoder),
            FrameStage::Preprocess { workgroups } => {
                let mut pass = target.encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("preprocess pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.preprocess_pipeline);
                for (i, group) in self.preprocess_bind_groups.iter().enumerate() {
                    pass.set_bind_group(i as u32, group, &[]);
                }
                pass.dispatch_workgroups(workgroups, 1, 1);
            }
            FrameStage::CopyVisibleCount => target.encoder.copy_buffer_to_buffer(
                &sort.info,
                SortBuffers::VISIBLE_COUNT_OFFSET,
                &self.indirect,
                DrawIndirectArgs::INSTANCE_COUNT_OFFSET,
                Some(std::mem::size_of::<u32>() as u64),
            ),
            FrameStage::Sort => self.sorter.sort(target.encoder),
            FrameStage::Render => {
                let mut pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("splat render pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target.color_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(target.clear),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });
                pass.set_pipeline(&self.render_pipeline);
                for (i, group) in self.render_bind_groups.iter().enumerate() {
                    pass.set_bind_group(i as u32, group, &[]);
                }
                pass.draw_indirect(&self.indirect, 0);
            }
        }
    }
}
