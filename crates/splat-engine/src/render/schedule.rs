use bytemuck::{Pod, Zeroable};

/// Threads per workgroup of every splat compute pass. Must match the
/// `WORKGROUP_SIZE` constants in the WGSL sources.
pub const WORKGROUP_SIZE: u32 = 256;

/// Vertices drawn per splat (two triangles).
pub const VERTICES_PER_SPLAT: u32 = 6;

/// Arguments of a non-indexed indirect draw, as consumed by `draw_indirect`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndirectArgs {
    pub vertex_count: u32,
    pub instance_count: u32,
    pub first_vertex: u32,
    pub first_instance: u32,
}

impl DrawIndirectArgs {
    /// Byte offset of `instance_count`, the copy destination of the visible count.
    pub const INSTANCE_COUNT_OFFSET: u64 =
        std::mem::offset_of!(DrawIndirectArgs, instance_count) as u64;

    /// Initial contents: one quad per instance, nothing visible yet.
    pub const fn splats() -> Self {
        Self {
            vertex_count: VERTICES_PER_SPLAT,
            instance_count: 0,
            first_vertex: 0,
            first_instance: 0,
        }
    }
}

/// One step of a splat frame, in submission order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameStage {
    /// Zero the sorter's visible count and indirect dispatch size.
    ResetSortScratch,
    /// Project, cull and key every point.
    Preprocess { workgroups: u32 },
    /// GPU copy of the visible count into the draw's instance count.
    CopyVisibleCount,
    /// Depth sort of the visible keys.
    Sort,
    /// Clear the target and issue the single indirect draw.
    Render,
}

/// Workgroups needed to cover `items` threads.
pub fn workgroups_for(items: u32) -> u32 {
    items.div_ceil(WORKGROUP_SIZE)
}

/// Stages recorded by one frame over `num_points` points.
pub fn frame_schedule(num_points: u32) -> [FrameStage; 5] {
    [
        FrameStage::ResetSortScratch,
        FrameStage::Preprocess {
            workgroups: workgroups_for(num_points),
        },
        FrameStage::CopyVisibleCount,
        FrameStage::Sort,
        FrameStage::Render,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(schedule: &[FrameStage], pred: impl Fn(&FrameStage) -> bool) -> usize {
        schedule.iter().position(pred).unwrap()
    }

    #[test]
    fn stages_are_strictly_ordered() {
        let s = frame_schedule(1000);
        let reset = position(&s, |st| *st == FrameStage::ResetSortScratch);
        let pre = position(&s, |st| matches!(st, FrameStage::Preprocess { .. }));
        let copy = position(&s, |st| *st == FrameStage::CopyVisibleCount);
        let sort = position(&s, |st| *st == FrameStage::Sort);
        let render = position(&s, |st| *st == FrameStage::Render);
        assert!(reset < pre && pre < copy && copy < sort && sort < render);
    }

    #[test]
    fn exactly_one_draw_fed_by_one_copy() {
        for n in [1, 255, 256, 257, 1_000_000] {
            let s = frame_schedule(n);
            assert_eq!(s.iter().filter(|st| **st == FrameStage::Render).count(), 1);
            assert_eq!(s.iter().filter(|st| **st == FrameStage::CopyVisibleCount).count(), 1);
        }
    }

    #[test]
    fn preprocess_covers_every_point() {
        let cases = [(1, 1), (256, 1), (257, 2), (512, 2), (1_000_000, 3907)];
        for (n, groups) in cases {
            assert_eq!(
                frame_schedule(n)[1],
                FrameStage::Preprocess { workgroups: groups },
                "n={n}"
            );
        }
    }

    #[test]
    fn indirect_args_layout() {
        assert_eq!(std::mem::size_of::<DrawIndirectArgs>(), 16);
        assert_eq!(DrawIndirectArgs::INSTANCE_COUNT_OFFSET, 4);
        let bytes = bytemuck::bytes_of(&DrawIndirectArgs::splats()).to_vec();
        assert_eq!(&bytes[0..4], &6u32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &0u32.to_ne_bytes());
    }

    #[test]
    fn shaders_agree_on_workgroup_size() {
        let decl = format!("const WORKGROUP_SIZE: u32 = {WORKGROUP_SIZE}u;");
        for (name, src) in [
            ("preprocess", include_str!("shaders/preprocess.wgsl")),
            ("bitonic_sort", include_str!("shaders/bitonic_sort.wgsl")),
        ] {
            assert!(src.contains(&decl), "{name}.wgsl does not declare {decl}");
        }
    }
}
