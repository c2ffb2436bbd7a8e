//! egui overlay drawn on top of the scene

use common::GraphicsContext;
use winit::{event::WindowEvent, window::Window};

/// UI laid out for the next frame, waiting to be painted
struct PreparedUi {
    primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

pub struct Overlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    prepared: Option<PreparedUi>,
}

impl Overlay {
    pub fn new(ctx: &GraphicsContext) -> Self {
        let egui_ctx = egui::Context::default();
        let state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1);

        Self {
            ctx: egui_ctx,
            state,
            renderer,
            prepared: None,
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    pub fn prepare(&mut self, window: &Window, run_ui: impl FnMut(&egui::Context)) {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, run_ui);

        self.state.handle_platform_output(window, full_output.platform_output);
        let primitives = self.ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        self.prepared = Some(PreparedUi {
            primitives,
            textures_delta: full_output.textures_delta,
            pixels_per_point: full_output.pixels_per_point,
        });
    }

    /// Paint the prepared UI over `view`. Returns extra command buffers that
    /// must be submitted before `encoder`.
    pub fn paint(
        &mut self,
        ctx: &GraphicsContext,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> Vec<wgpu::CommandBuffer> {
        let Some(ui) = self.prepared.take() else {
            return Vec::new();
        };

        for (id, image_delta) in &ui.textures_delta.set {
            self.renderer.update_texture(&ctx.device, &ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [ctx.size.width, ctx.size.height],
            pixels_per_point: ui.pixels_per_point,
        };

        let commands = self.renderer.update_buffers(
            &ctx.device,
            &ctx.queue,
            encoder,
            &ui.primitives,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer.render(&mut render_pass, &ui.primitives, &screen_descriptor);
        }

        for id in &ui.textures_delta.free {
            self.renderer.free_texture(id);
        }

        commands
    }
}
