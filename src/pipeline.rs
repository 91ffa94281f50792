//! Export driver: renders a scene frame by frame and feeds an [`Encoder`].
//!
//! Frames are produced in chunks. Within a chunk rendering may fan out over a
//! rayon pool (each worker gets its own forked canvas), but encoder writes
//! are always sequential and in timeline order, so output is identical with
//! and without parallelism.

use rayon::prelude::*;

use crate::{
    compositor::{Canvas, FrameRGBA, render_frame},
    core::FrameIndex,
    encode::{EncodeConfig, Encoder, FfmpegEncoder},
    error::{KinemaError, KinemaResult},
    scene::Scene,
};

#[derive(Clone, Debug)]
pub struct Threading {
    pub parallel: bool,
    pub chunk_size: usize,
    pub threads: Option<usize>,
}

impl Default for Threading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub frames_total: u64,
}

/// Render every scene frame in order into `encoder`.
#[tracing::instrument(skip_all, fields(frames = scene.num_frames))]
pub fn export(
    scene: &Scene,
    canvas: &mut dyn Canvas,
    mut encoder: Box<dyn Encoder>,
    threading: &Threading,
) -> KinemaResult<ExportStats> {
    scene.validate()?;

    let chunk_size = threading.chunk_size.max(1) as i64;
    let pool = if threading.parallel {
        Some(build_thread_pool(threading.threads)?)
    } else {
        None
    };

    let mut chunk_start = 0i64;
    while chunk_start < scene.num_frames {
        let chunk_end = (chunk_start + chunk_size).min(scene.num_frames);
        tracing::debug!(chunk_start, chunk_end, "rendering chunk");

        let frames = match &pool {
            Some(pool) => render_chunk_parallel(scene, chunk_start..chunk_end, &*canvas, pool)?,
            None => {
                let mut out = Vec::with_capacity((chunk_end - chunk_start) as usize);
                for f in chunk_start..chunk_end {
                    out.push(render_frame(scene, FrameIndex(f), canvas)?);
                }
                out
            }
        };

        for frame in &frames {
            encoder.write_frame(frame)?;
        }
        chunk_start = chunk_end;
    }

    encoder.finish()?;
    let stats = ExportStats {
        frames_total: scene.num_frames as u64,
    };
    tracing::info!(frames = stats.frames_total, "export finished");
    Ok(stats)
}

/// Convenience wrapper: export the whole scene to an MP4 via system ffmpeg,
/// flattening alpha over `bg_rgba`.
pub fn export_to_mp4(
    scene: &Scene,
    canvas: &mut dyn Canvas,
    out_path: impl Into<std::path::PathBuf>,
    bg_rgba: [u8; 4],
    threading: &Threading,
) -> KinemaResult<ExportStats> {
    let cfg = EncodeConfig {
        width: scene.canvas.width,
        height: scene.canvas.height,
        fps: scene.fps,
        out_path: out_path.into(),
        overwrite: true,
    };
    let encoder = Box::new(FfmpegEncoder::new(cfg, bg_rgba)?);
    export(scene, canvas, encoder, threading)
}

fn render_chunk_parallel(
    scene: &Scene,
    range: std::ops::Range<i64>,
    canvas: &dyn Canvas,
    pool: &rayon::ThreadPool,
) -> KinemaResult<Vec<FrameRGBA>> {
    let indices: Vec<i64> = range.collect();
    let rendered: Vec<KinemaResult<FrameRGBA>> = pool.install(|| {
        indices
            .par_iter()
            .map_init(
                || canvas.fork(),
                |worker, &f| render_frame(scene, FrameIndex(f), worker.as_mut()),
            )
            .collect()
    });

    // collect() preserves input order, so frames come back in timeline order.
    rendered.into_iter().collect()
}

fn build_thread_pool(threads: Option<usize>) -> KinemaResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(KinemaError::config(
            "threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| KinemaError::backend(format!("failed to build rayon thread pool: {e}")))
}
