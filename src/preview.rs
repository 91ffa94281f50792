//! Interactive preview: a worker thread that renders the most recently
//! requested frame and hands it to a callback.
//!
//! Seeks coalesce; when the UI scrubs faster than frames render, intermediate
//! requests are dropped and only the newest one is rendered (last seek wins).
//! Rendered frames are cached so revisiting a frame is instant.

use std::{
    collections::HashMap,
    sync::{
        Arc, Condvar, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread::JoinHandle,
};

use crate::{
    compositor::{Canvas, FrameRGBA, render_frame},
    core::FrameIndex,
    error::KinemaResult,
    scene::Scene,
};

const CACHE_CAPACITY: usize = 256;

struct Shared {
    /// Newest pending request, tagged with its seek generation.
    pending: Mutex<Option<(u64, FrameIndex)>>,
    wake: Condvar,
    stop: AtomicBool,
    generation: AtomicU64,
}

pub struct Previewer {
    shared: Arc<Shared>,
    num_frames: i64,
    worker: Option<JoinHandle<()>>,
}

impl Previewer {
    /// Start a preview worker over `scene`. `on_frame` runs on the worker
    /// thread for every delivered frame.
    pub fn spawn(
        scene: Arc<Scene>,
        canvas: Box<dyn Canvas>,
        on_frame: impl FnMut(FrameIndex, Arc<FrameRGBA>) + Send + 'static,
    ) -> KinemaResult<Self> {
        scene.validate()?;

        let shared = Arc::new(Shared {
            pending: Mutex::new(None),
            wake: Condvar::new(),
            stop: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        });

        let num_frames = scene.num_frames;
        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("kinema-preview".into())
            .spawn(move || worker_loop(worker_shared, scene, canvas, on_frame))
            .map_err(|e| {
                crate::error::KinemaError::backend(format!(
                    "failed to spawn preview thread: {e}"
                ))
            })?;

        Ok(Self {
            shared,
            num_frames,
            worker: Some(worker),
        })
    }

    /// Request a frame. Supersedes any not-yet-rendered previous request.
    /// Out-of-range requests clamp to the scene window.
    pub fn seek(&self, frame: FrameIndex) {
        let clamped = FrameIndex(frame.0.clamp(0, self.num_frames - 1));
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.shared.pending.lock().expect("preview lock poisoned") = Some((generation, clamped));
        self.shared.wake.notify_one();
    }
}

impl Drop for Previewer {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        self.shared.wake.notify_one();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(
    shared: Arc<Shared>,
    scene: Arc<Scene>,
    mut canvas: Box<dyn Canvas>,
    mut on_frame: impl FnMut(FrameIndex, Arc<FrameRGBA>),
) {
    let mut cache: HashMap<FrameIndex, Arc<FrameRGBA>> = HashMap::new();

    loop {
        let (generation, frame) = {
            let mut pending = shared.pending.lock().expect("preview lock poisoned");
            loop {
                if shared.stop.load(Ordering::SeqCst) {
                    return;
                }
                if let Some(req) = pending.take() {
                    break req;
                }
                pending = shared.wake.wait(pending).expect("preview lock poisoned");
            }
        };

        let rendered = match cache.get(&frame) {
            Some(hit) => Arc::clone(hit),
            None => match render_frame(&scene, frame, canvas.as_mut()) {
                Ok(pixels) => {
                    if cache.len() >= CACHE_CAPACITY {
                        cache.clear();
                    }
                    let pixels = Arc::new(pixels);
                    cache.insert(frame, Arc::clone(&pixels));
                    pixels
                }
                Err(e) => {
                    tracing::warn!(frame = frame.0, error = %e, "preview render failed");
                    continue;
                }
            },
        };

        // A newer seek may have landed while rendering; deliver only if this
        // request is still the latest.
        if shared.generation.load(Ordering::SeqCst) == generation {
            on_frame(frame, rendered);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{CanvasSize, Fps},
        ease::Ease,
        object::Object,
        raster::SoftwareCanvas,
    };
    use std::sync::mpsc;
    use std::time::Duration;

    fn test_scene() -> Arc<Scene> {
        let mut scene = Scene::new(
            CanvasSize::new(16, 16).unwrap(),
            Fps::new(30, 1).unwrap(),
            30,
        )
        .unwrap();
        scene.add(Object::circle(8.0, 8.0, 4.0).translate(4.0, 0.0, 0, 29, Ease::Linear));
        Arc::new(scene)
    }

    #[test]
    fn seek_delivers_the_requested_frame() {
        let scene = test_scene();
        let (tx, rx) = mpsc::channel();
        let preview = Previewer::spawn(
            Arc::clone(&scene),
            Box::new(SoftwareCanvas::new()),
            move |frame, _pixels| {
                let _ = tx.send(frame);
            },
        )
        .unwrap();

        preview.seek(FrameIndex(7));
        let got = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(got, FrameIndex(7));
    }

    #[test]
    fn out_of_range_seeks_clamp_to_scene_window() {
        let scene = test_scene();
        let (tx, rx) = mpsc::channel();
        let preview = Previewer::spawn(
            Arc::clone(&scene),
            Box::new(SoftwareCanvas::new()),
            move |frame, _pixels| {
                let _ = tx.send(frame);
            },
        )
        .unwrap();

        preview.seek(FrameIndex(1_000));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            FrameIndex(29)
        );

        preview.seek(FrameIndex(-5));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            FrameIndex(0)
        );
    }

    #[test]
    fn repeated_seeks_end_on_the_last_request() {
        let scene = test_scene();
        let (tx, rx) = mpsc::channel();
        let preview = Previewer::spawn(
            Arc::clone(&scene),
            Box::new(SoftwareCanvas::new()),
            move |frame, _pixels| {
                let _ = tx.send(frame);
            },
        )
        .unwrap();

        for f in 0..20 {
            preview.seek(FrameIndex(f));
        }

        // Intermediate frames may be dropped, but the final delivery must be
        // the last seek.
        let mut last = None;
        while let Ok(frame) = rx.recv_timeout(Duration::from_secs(5)) {
            last = Some(frame);
            if frame == FrameIndex(19) {
                break;
            }
        }
        assert_eq!(last, Some(FrameIndex(19)));
    }

    #[test]
    fn drop_stops_the_worker() {
        let scene = test_scene();
        let preview = Previewer::spawn(
            Arc::clone(&scene),
            Box::new(SoftwareCanvas::new()),
            |_, _| {},
        )
        .unwrap();
        preview.seek(FrameIndex(3));
        drop(preview); // must join without hanging
    }
}
