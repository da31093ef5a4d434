//! Application main loop

use crate::bridge::{host_path, AppMessage, BackendBridge};
use anyhow::Result;
use app_core::{
    AppConfig, Command, Effect, Event, Notification, NotificationCenter, SessionState,
};
use app_ui::{
    components::{ActionBar, Dialog, DialogResult, GuideDialog, ImageViewer, TagPicker, ToastStack, Toolbar},
    InputHandler, Renderer, Theme,
};
use crossbeam_channel::{Receiver, Sender};
use egui_wgpu::ScreenDescriptor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Main application state for the event loop
struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    egui_ctx: egui::Context,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,

    // UI Components
    tag_picker: TagPicker,
    image_viewer: ImageViewer,
    guide: GuideDialog,
    input_handler: InputHandler,
    theme: Theme,

    // Tagging state
    config: AppConfig,
    session: SessionState,
    notifications: NotificationCenter,

    // Backend
    bridge: Option<BackendBridge>,
    messages: Receiver<AppMessage>,
}

impl App {
    fn new(config: AppConfig, bridge: Option<BackendBridge>, messages: Receiver<AppMessage>) -> Self {
        let session = SessionState::new(&config);

        Self {
            window: None,
            renderer: None,
            egui_ctx: egui::Context::default(),
            egui_state: None,
            egui_renderer: None,

            tag_picker: TagPicker::new(),
            image_viewer: ImageViewer::new(),
            guide: GuideDialog::new(session.guide_open),
            input_handler: InputHandler::new(&config.keybindings),
            theme: Theme::by_name(&config.general.theme),

            notifications: NotificationCenter::new(Duration::from_millis(
                config.tagging.notification_ms,
            )),
            config,
            session,

            bridge,
            messages,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title("ImageTagger")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 860));

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        // Initialize renderer
        let renderer = pollster::block_on(Renderer::new(window.clone()))?;

        // Initialize egui
        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &renderer.device,
            renderer.config.format,
            None,
            1,
            false,
        );

        // Apply theme
        self.theme.apply(&self.egui_ctx);

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);

        Ok(())
    }

    /// Feed one event through the session and run its effects
    fn dispatch(&mut self, event: Event) {
        let rename_toggled = matches!(event, Event::ToggleRenameFiles);

        for effect in self.session.update(event) {
            match effect {
                Effect::Send(request) => self.send(request),
                Effect::Notify(notification) => self.notify(notification),
            }
        }

        if rename_toggled {
            self.remember_rename_choice();
        }
    }

    /// The rename toggle starts from the config, so keep the file in step
    fn remember_rename_choice(&mut self) {
        self.config.tagging.rename_files = self.session.rename_files;
        if let Err(e) = self.config.save() {
            tracing::warn!("Could not save rename preference: {}", e);
        }
    }

    fn send(&mut self, request: ipc_proto::BackendRequest) {
        let result = match &self.bridge {
            Some(bridge) => bridge.send(&request),
            None => Err(app_core::AppError::Bridge("not running".to_string())),
        };

        if let Err(e) = result {
            tracing::error!("Failed to send {}: {}", request.name(), e);
            self.notify(Notification::error(e.user_message()));
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification, Instant::now());
    }

    /// Apply everything the worker threads delivered since the last frame;
    /// returns whether anything arrived
    fn drain_messages(&mut self) -> bool {
        let mut received = false;
        while let Ok(message) = self.messages.try_recv() {
            received = true;
            match message {
                AppMessage::Backend(event) => self.dispatch(Event::Backend(event)),
                AppMessage::VocabularyLoaded(tags) => self.dispatch(Event::VocabularyLoaded(tags)),
                AppMessage::BackendExited(reason) => {
                    if self.bridge.take().is_some() {
                        tracing::error!("Backend host stopped: {}", reason);
                        self.notify(Notification::error(format!("Backend stopped: {}", reason)));
                    }
                }
            }
        }
        received
    }

    /// Decode the session's current image when it changed
    fn sync_image(&mut self) {
        let wanted = self.session.image.path.clone();
        if wanted.as_deref() == self.image_viewer.source() {
            return;
        }

        let Some(path) = wanted else {
            self.image_viewer.clear(None);
            return;
        };

        tracing::info!("Loading image: {}", path);

        match image::open(&path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let (width, height) = rgba.dimensions();
                let pixels = rgba.as_flat_samples();

                let color_image = egui::ColorImage::from_rgba_unmultiplied(
                    [width as usize, height as usize],
                    pixels.as_slice(),
                );

                let texture = self.egui_ctx.load_texture(
                    path.clone(),
                    color_image,
                    egui::TextureOptions::LINEAR,
                );

                self.image_viewer.set_image(path, texture, width, height);
            }
            Err(e) => {
                tracing::error!("Failed to load image {}: {}", path, e);
                self.notify(Notification::error(format!("Cannot display image: {}", e)));
                self.image_viewer.clear(Some(path));
            }
        }
    }

    fn render(&mut self) {
        let window = match &self.window {
            Some(w) => w.clone(),
            None => return,
        };

        // Get surface texture
        let output = {
            let Some(renderer) = &mut self.renderer else {
                return;
            };
            match renderer.get_current_texture() {
                Ok(output) => output,
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    renderer.handle_device_lost();
                    return;
                }
                Err(e) => {
                    tracing::error!("Surface error: {:?}", e);
                    return;
                }
            }
        };

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let raw_input = match &mut self.egui_state {
            Some(state) => state.take_egui_input(&window),
            None => return,
        };

        // Run egui; interactions are collected and applied afterwards
        let ctx = self.egui_ctx.clone();
        let mut events = Vec::new();
        let full_output = ctx.run(raw_input, |ctx| self.ui(ctx, &mut events));

        // Session changes and egui animations both need another frame
        let repaint = !events.is_empty()
            || full_output
                .viewport_output
                .get(&egui::ViewportId::ROOT)
                .is_some_and(|viewport| viewport.repaint_delay.is_zero());

        for event in events {
            self.dispatch(event);
        }

        if let Some(egui_state) = &mut self.egui_state {
            egui_state.handle_platform_output(&window, full_output.platform_output);
        }

        let clipped_primitives = ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let (Some(renderer), Some(egui_renderer)) = (&self.renderer, &mut self.egui_renderer) else {
            return;
        };

        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [renderer.size.0, renderer.size.1],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = renderer.device.create_command_encoder(
            &wgpu::CommandEncoderDescriptor { label: Some("egui encoder") }
        );

        // Update egui textures
        for (id, delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(&renderer.device, &renderer.queue, *id, delta);
        }

        egui_renderer.update_buffers(
            &renderer.device,
            &renderer.queue,
            &mut encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            // egui-wgpu wants a 'static pass; forget_lifetime keeps the encoder
            // locked until the pass is dropped
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui render pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: 0.1,
                                g: 0.1,
                                b: 0.1,
                                a: 1.0,
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            egui_renderer.render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        }

        // Free textures
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        renderer.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if repaint {
            window.request_redraw();
        }
    }

    fn ui(&mut self, ctx: &egui::Context, events: &mut Vec<Event>) {
        // Top panel - Toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            events.extend(Toolbar::ui(ui, &self.session));
        });

        // Bottom panel - Submit / skip
        egui::TopBottomPanel::bottom("action_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            if let Some(event) = ActionBar::ui(ui) {
                events.push(event);
            }
            ui.add_space(6.0);
        });

        // Main content: tag picker above the image
        egui::CentralPanel::default().show(ctx, |ui| {
            events.extend(self.tag_picker.ui(ui, &self.session, self.theme.accent));
            ui.separator();
            self.image_viewer.ui(ui);
        });

        // Overlays
        self.guide.open = self.session.guide_open;
        match self.guide.ui(ctx) {
            DialogResult::Ok(()) | DialogResult::Cancel => events.push(Event::CloseGuide),
            DialogResult::None => {}
        }

        ToastStack::ui(ctx, self.notifications.active(), &self.theme);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                tracing::error!("Failed to initialize window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::ModifiersChanged(modifiers) = &event {
            self.input_handler.update_modifiers(modifiers.state());
        }

        // Shortcuts are resolved before egui sees the key, so the search field
        // never receives Enter or the arrows and Space only types while it has focus
        if let WindowEvent::KeyboardInput { event: key_event, .. } = &event {
            if let Some(command) = self
                .input_handler
                .handle_key(key_event, self.session.input_focused)
            {
                let repeat_guarded = matches!(command, Command::Submit | Command::Skip);
                if !(key_event.repeat && repeat_guarded) {
                    self.dispatch(Event::Command(command));
                }

                // Escape still reaches egui so the search field gives up focus
                if command != Command::DismissOverlays {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                    return;
                }
            }
        }

        // Let egui handle the event first
        if let (Some(egui_state), Some(window)) = (&mut self.egui_state, &self.window) {
            let response = egui_state.on_window_event(window, &event);
            if response.consumed {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize((size.width, size.height));
                }
            }

            WindowEvent::RedrawRequested => {
                self.notifications.expire(Instant::now());
                self.sync_image();
                self.render();
                return;
            }

            _ => {}
        }

        // Request redraw
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let received = self.drain_messages();

        let shown = self.notifications.active().len();
        self.notifications.expire(now);
        let expired = self.notifications.active().len() != shown;

        if received || expired {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }

        let wait = wake_after(self.notifications.next_expiry(now));
        event_loop.set_control_flow(ControlFlow::WaitUntil(now + wait));
    }
}

/// Longest sleep between checks of the worker channel
const CHANNEL_POLL: Duration = Duration::from_millis(50);

/// Sleep until the next toast expires, but never past the next channel check
fn wake_after(next_expiry: Option<Duration>) -> Duration {
    next_expiry.map_or(CHANNEL_POLL, |expiry| expiry.min(CHANNEL_POLL))
}

/// Fetch the tag catalog off the UI thread; failure leaves the vocabulary empty
fn spawn_catalog_fetch(config: &AppConfig, messages: Sender<AppMessage>) {
    let catalog = config.catalog.clone();

    let spawned = std::thread::Builder::new()
        .name("catalog-fetch".to_string())
        .spawn(move || match app_core::fetch_tag_list(&catalog) {
            Ok(tags) => {
                let _ = messages.send(AppMessage::VocabularyLoaded(tags));
            }
            Err(e) => tracing::warn!("Tag catalog unavailable: {}", e),
        });

    if let Err(e) = spawned {
        tracing::warn!("Could not start catalog fetch: {}", e);
    }
}

/// Run the application
pub fn run(config: AppConfig) -> Result<()> {
    let (tx, rx) = crossbeam_channel::unbounded();

    let host = host_path(config.backend.host_path.as_deref());
    let bridge = match BackendBridge::spawn(&host, tx.clone()) {
        Ok(bridge) => Some(bridge),
        Err(e) => {
            tracing::error!("{}", e);
            None
        }
    };
    let bridge_failed = bridge.is_none();

    spawn_catalog_fetch(&config, tx);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, bridge, rx);
    if bridge_failed {
        app.notify(Notification::error(format!(
            "Backend unavailable: cannot start {}",
            host.display()
        )));
    }
    event_loop.run_app(&mut app)?;

    Ok(())
}
