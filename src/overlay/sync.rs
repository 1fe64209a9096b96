//! Overlay lifecycle controller
//!
//! Keeps the overlay surface in step with image loads, detection changes
//! and viewport resizes. Loads and detection changes schedule a debounced
//! redraw so layout can settle; resizes redraw immediately. At most one
//! redraw is pending at a time and every redraw measures the geometry from
//! the current state when it runs.

use crossbeam_channel::{select, Receiver};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::OverlaySettings;
use crate::overlay::events::{Subscription, ViewportEvent, ViewportEvents};
use crate::overlay::geometry::{compute_scale, LayoutConstraints};
use crate::overlay::legend::{render_legend, LegendEntry};
use crate::overlay::renderer::AnnotationRenderer;
use crate::overlay::surface::DrawSurface;
use crate::overlay::widgets::OverlayStyle;
use crate::risk::{risk_color, LabelStyle, RiskScorer};
use crate::shared::{OverlayCommand, OverlayPhase, OverlayState};
use crate::vision::Detection;

/// A cancellable redraw waiting for its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledRedraw {
    pub id: u64,
    pub due: Instant,
}

/// Drives one overlay surface
pub struct OverlayController<S: DrawSurface> {
    state: OverlayState,
    surface: S,
    style: OverlayStyle,
    layout: LayoutConstraints,
    label_style: LabelStyle,
    scorer: RiskScorer,
    debounce: Duration,
    pending: Option<ScheduledRedraw>,
    next_task_id: u64,
    subscription: Option<Subscription>,
    resizes: Option<Receiver<ViewportEvent>>,
}

impl<S: DrawSurface> OverlayController<S> {
    pub fn new(surface: S, settings: &OverlaySettings) -> Self {
        Self {
            state: OverlayState::new(settings.viewport()),
            surface,
            style: settings.style.clone(),
            layout: settings.layout,
            label_style: settings.label_style,
            scorer: RiskScorer::new(),
            debounce: settings.debounce(),
            pending: None,
            next_task_id: 0,
            subscription: None,
            resizes: None,
        }
    }

    /// Listen for resizes from `events` until disposal
    pub fn attach(&mut self, events: &ViewportEvents) {
        if self.state.is_disposed() {
            return;
        }
        let (subscription, rx) = events.subscribe();
        self.subscription = Some(subscription);
        self.resizes = Some(rx);
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn pending(&self) -> Option<ScheduledRedraw> {
        self.pending
    }

    /// The image finished loading
    pub fn on_image_loaded(&mut self, natural_width: u32, natural_height: u32, now: Instant) {
        if self.state.is_disposed() {
            return;
        }
        if natural_width == 0 || natural_height == 0 {
            warn!("Image reported an empty natural size; overlay stays unloaded");
            return;
        }

        info!("Image loaded ({}x{})", natural_width, natural_height);
        self.state.natural_size = (natural_width, natural_height);
        self.state.phase = OverlayPhase::Loaded;
        self.schedule_redraw(now);
    }

    /// Replace the detection list
    pub fn on_detections(&mut self, detections: Vec<Detection>, now: Instant) {
        if self.state.is_disposed() {
            return;
        }
        debug!("Detections updated ({} entries)", detections.len());
        self.state.detections = detections;
        if self.state.is_loaded() {
            self.schedule_redraw(now);
        }
    }

    /// The viewport changed size
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if self.state.is_disposed() {
            return;
        }
        self.state.viewport = (width, height);
        if self.state.is_loaded() {
            // The immediate redraw supersedes anything still waiting
            self.cancel_pending();
            self.redraw();
        }
    }

    /// Apply a command
    pub fn handle_command(&mut self, command: OverlayCommand, now: Instant) {
        match command {
            OverlayCommand::ImageLoaded { width, height } => self.on_image_loaded(width, height, now),
            OverlayCommand::SetDetections(detections) => self.on_detections(detections, now),
            OverlayCommand::Dispose => self.dispose(),
        }
    }

    /// Run the pending redraw if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(task) if task.due <= now => {
                self.pending = None;
                debug!("Debounced redraw {} fired", task.id);
                self.redraw();
                true
            }
            _ => false,
        }
    }

    /// Cancel the pending redraw and release the resize listener
    pub fn dispose(&mut self) {
        if self.state.is_disposed() {
            return;
        }
        self.cancel_pending();
        self.detach();
        self.state.phase = OverlayPhase::Disposed;
        info!("Overlay disposed after {} redraws", self.state.redraw_count);
    }

    /// Legend rows for the current detections
    pub fn legend(&self) -> Vec<LegendEntry> {
        let label_style = self.label_style;
        render_legend(
            &self.state.detections,
            &self.scorer,
            &risk_color,
            &|label: &str| label_style.apply(label),
        )
    }

    fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.resizes = None;
    }

    /// Process commands, resizes and the debounce deadline until the
    /// command channel closes with nothing pending, or until disposal.
    pub fn run(mut self, commands: Receiver<OverlayCommand>) -> Self {
        let mut commands_open = true;
        let resizes = self.resizes.clone();
        let mut resizes_open = resizes.is_some();

        loop {
            if self.state.is_disposed() || (!commands_open && self.pending.is_none()) {
                break;
            }

            let command_rx = if commands_open {
                commands.clone()
            } else {
                crossbeam_channel::never()
            };
            let resize_rx = match (&resizes, resizes_open) {
                (Some(rx), true) => rx.clone(),
                _ => crossbeam_channel::never(),
            };
            let timer = match self.pending {
                Some(task) => crossbeam_channel::at(task.due),
                None => crossbeam_channel::never(),
            };

            select! {
                recv(command_rx) -> msg => match msg {
                    Ok(command) => self.handle_command(command, Instant::now()),
                    Err(_) => {
                        debug!("Overlay command channel closed");
                        commands_open = false;
                    }
                },
                recv(resize_rx) -> msg => match msg {
                    Ok(event) => self.on_resize(event.width, event.height),
                    Err(_) => resizes_open = false,
                },
                recv(timer) -> _ => {
                    self.poll(Instant::now());
                }
            }
        }

        // Nothing drives this controller once the loop is gone
        self.detach();
        self
    }

    fn schedule_redraw(&mut self, now: Instant) {
        let task = ScheduledRedraw {
            id: self.next_task_id,
            due: now + self.debounce,
        };
        self.next_task_id += 1;
        if let Some(previous) = self.pending.replace(task) {
            debug!("Redraw {} superseded by {}", previous.id, task.id);
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            debug!("Redraw {} cancelled", task.id);
        }
    }

    fn redraw(&mut self) {
        if !self.state.is_loaded() {
            return;
        }

        let Some(geometry) = self.layout.measure(self.state.natural_size, self.state.viewport) else {
            debug!("Geometry not ready; skipping redraw");
            return;
        };
        let Some(scale) = compute_scale(&geometry) else {
            return;
        };

        let size = (geometry.displayed_width, geometry.displayed_height);
        if self.surface.dimensions() != size {
            self.surface.resize(size.0, size.1);
        }
        self.state.geometry = Some(geometry);

        let label_style = self.label_style;
        AnnotationRenderer::new(&self.style, self.scorer).render(
            &mut self.surface,
            &self.state.detections,
            scale,
            &risk_color,
            &|label: &str| label_style.apply(label),
        );
        self.state.redraw_count += 1;
        debug!(
            "Overlay redrawn at {}x{} (scale {:.3} x {:.3})",
            size.0, size.1, scale.scale_x, scale.scale_y
        );
    }
}
