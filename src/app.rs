//! Application Coordinator
//!
//! Runs an overlay controller on its own thread and hands out the command
//! channel and viewport event source that drive it.

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{unbounded, Sender};
use std::thread::JoinHandle;
use tracing::{debug, info};

use crate::config::OverlaySettings;
use crate::overlay::{DrawSurface, OverlayController, ViewportEvents};
use crate::shared::OverlayCommand;
use crate::vision::Detection;

/// Overlay viewer running in a background thread
pub struct OverlayViewer<S: DrawSurface + Send + 'static> {
    /// Channel to the controller thread
    commands: Option<Sender<OverlayCommand>>,
    /// Resize source the controller is subscribed to
    viewport: ViewportEvents,
    /// Controller thread, yields the controller back on exit
    handle: Option<JoinHandle<OverlayController<S>>>,
}

impl<S: DrawSurface + Send + 'static> OverlayViewer<S> {
    /// Start a controller drawing onto `surface`
    pub fn start(surface: S, settings: &OverlaySettings) -> Result<Self> {
        let viewport = ViewportEvents::new();
        let (tx, rx) = unbounded();

        let mut controller = OverlayController::new(surface, settings);
        controller.attach(&viewport);

        let handle = std::thread::Builder::new()
            .name("overlay-controller".into())
            .spawn(move || {
                info!("Overlay thread starting...");
                let controller = controller.run(rx);
                info!("Overlay thread exiting...");
                controller
            })
            .context("Failed to spawn overlay thread")?;

        Ok(Self {
            commands: Some(tx),
            viewport,
            handle: Some(handle),
        })
    }

    /// Viewport event source to feed resizes into
    #[cfg(test)]
    pub fn viewport(&self) -> &ViewportEvents {
        &self.viewport
    }

    /// Report the displayed image's natural size
    pub fn image_loaded(&self, width: u32, height: u32) {
        self.send(OverlayCommand::ImageLoaded { width, height });
    }

    /// Replace the detections shown on the overlay
    pub fn set_detections(&self, detections: Vec<Detection>) {
        self.send(OverlayCommand::SetDetections(detections));
    }

    /// Broadcast a viewport resize
    pub fn resize(&self, width: u32, height: u32) -> usize {
        self.viewport.emit_resize(width, height)
    }

    /// Ask the controller to stop drawing and release its listener
    #[cfg(test)]
    pub fn dispose(&self) {
        self.send(OverlayCommand::Dispose);
    }

    /// Close the command channel, let any pending redraw fire, and take
    /// the controller back
    pub fn finish(mut self) -> Result<OverlayController<S>> {
        self.commands.take();
        let handle = self
            .handle
            .take()
            .ok_or_else(|| anyhow!("Overlay thread already joined"))?;
        handle
            .join()
            .map_err(|_| anyhow!("Overlay thread panicked"))
    }

    fn send(&self, command: OverlayCommand) {
        if let Some(tx) = &self.commands {
            if tx.send(command).is_err() {
                debug!("Overlay thread gone, command dropped");
            }
        }
    }
}

impl<S: DrawSurface + Send + 'static> Drop for OverlayViewer<S> {
    fn drop(&mut self) {
        // Signal overlay to stop
        self.send(OverlayCommand::Dispose);
        self.commands.take();

        // Wait for overlay thread to finish
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
