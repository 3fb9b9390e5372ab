//! Surface Presenter
//!
//! [`FrameSink`] over the window surface. Clear-only frames and terrain
//! frames share one render pass setup; they differ only in whether the
//! terrain draw is recorded.

use crate::camera::CameraPose;
use crate::render::field::TerrainFields;
use crate::render::gpu_context::GpuContext;
use crate::render::terrain_pipeline::TerrainRenderPipeline;
use crate::terrain::params::TerrainParameters;
use crate::terrain::scheduler::FrameSink;

/// Sky color behind the terrain.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.529,
    g: 0.808,
    b: 0.922,
    a: 1.0,
};

pub struct SurfaceFrameSink<'a> {
    gpu: &'a GpuContext,
    pipeline: &'a TerrainRenderPipeline,
}

impl<'a> SurfaceFrameSink<'a> {
    pub fn new(gpu: &'a GpuContext, pipeline: &'a TerrainRenderPipeline) -> Self {
        Self { gpu, pipeline }
    }

    fn present(
        &mut self,
        terrain: Option<(&CameraPose, &TerrainFields)>,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.gpu.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("terrain_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some((pose, fields)) = terrain {
                self.pipeline.draw(
                    &self.gpu.device,
                    &self.gpu.queue,
                    &mut pass,
                    pose,
                    self.gpu.dimensions(),
                    fields,
                );
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl FrameSink<TerrainFields> for SurfaceFrameSink<'_> {
    type Error = wgpu::SurfaceError;

    fn clear_only(&mut self) -> Result<(), Self::Error> {
        self.present(None)
    }

    fn draw_terrain(
        &mut self,
        pose: &CameraPose,
        _params: &TerrainParameters,
        fields: &TerrainFields,
    ) -> Result<(), Self::Error> {
        self.present(Some((pose, fields)))
    }
}
