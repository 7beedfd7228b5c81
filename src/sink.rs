// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Where finished frames go.  The renderer only needs somewhere to get
//! a buffer from and somewhere to hand it back to; the file format is
//! the sink's business.

use buffer::FrameBuffer;
use color::to_rgb;
use error::RenderError;
use image::jpeg::JPEGEncoder;
use image::ColorType;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The storage side of the pipeline.  Shared by every frame worker, so
/// implementations must be `Sync`.
pub trait ImageSink: Sync {
    /// Produce a black `width` x `height` buffer.
    fn allocate(&self, width: usize, height: usize) -> Result<FrameBuffer, RenderError> {
        FrameBuffer::new(width, height)
    }

    /// Store a finished frame at `path`.
    fn persist(&self, buffer: &FrameBuffer, path: &Path) -> Result<(), RenderError>;

    /// Give the buffer back once it has been persisted.
    fn release(&self, buffer: FrameBuffer) {
        drop(buffer);
    }
}

/// The largest width or height a JPEG file can record.
pub const MAX_JPEG_SIDE: usize = 65_535;

/// Writes each frame as a baseline JPEG file.
#[derive(Copy, Clone, Debug)]
pub struct JpegSink {
    quality: u8,
}

impl JpegSink {
    /// A sink writing at the given JPEG quality, 1 to 100.
    pub fn with_quality(quality: u8) -> JpegSink {
        JpegSink {
            quality: quality.max(1).min(100),
        }
    }
}

impl Default for JpegSink {
    fn default() -> Self {
        JpegSink::with_quality(90)
    }
}

/// Flatten packed colors into the interleaved RGB bytes encoders want.
fn rgb_bytes(buffer: &FrameBuffer) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(buffer.pixels().len() * 3);
    for color in buffer.pixels() {
        bytes.extend_from_slice(&to_rgb(*color));
    }
    bytes
}

fn persist_error<E: ToString>(path: &Path, e: E) -> RenderError {
    RenderError::Persist {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Where a frame is written before it is moved to `path`.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Run `write` against a file next to `path`, and only rename it onto
/// `path` once everything has been written and flushed.  On any error
/// the partial file is removed, so `path` either holds a complete
/// frame or is left as it was.
fn write_atomically<F>(path: &Path, write: F) -> Result<(), RenderError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), RenderError>,
{
    let partial = partial_path(path);
    let result = File::create(&partial)
        .map_err(|e| persist_error(path, e))
        .and_then(|file| {
            let mut output = BufWriter::new(file);
            write(&mut output)?;
            output.flush().map_err(|e| persist_error(path, e))?;
            output.get_ref().sync_all().map_err(|e| persist_error(path, e))
        })
        .and_then(|_| fs::rename(&partial, path).map_err(|e| persist_error(path, e)));
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

impl ImageSink for JpegSink {
    fn persist(&self, buffer: &FrameBuffer, path: &Path) -> Result<(), RenderError> {
        if buffer.width() > MAX_JPEG_SIDE || buffer.height() > MAX_JPEG_SIDE {
            return Err(persist_error(
                path,
                format!(
                    "{}x{} is larger than JPEG allows ({} per side)",
                    buffer.width(),
                    buffer.height(),
                    MAX_JPEG_SIDE
                ),
            ));
        }
        let quality = self.quality;
        write_atomically(path, |output| {
            JPEGEncoder::new_with_quality(output, quality)
                .encode(
                    &rgb_bytes(buffer),
                    buffer.width() as u32,
                    buffer.height() as u32,
                    ColorType::RGB(8),
                )
                .map_err(|e| persist_error(path, e))
        })
    }
}

/// Keeps every persisted frame in memory, in the order they were
/// persisted.  Useful when the frames are going somewhere other than
/// the filesystem, and for checking what the renderer produced.
#[derive(Debug, Default)]
pub struct MemorySink {
    frames: Mutex<Vec<(PathBuf, FrameBuffer)>>,
}

impl MemorySink {
    /// An empty sink.
    pub fn new() -> MemorySink {
        MemorySink::default()
    }

    /// Everything persisted so far, sorted by path.
    pub fn into_frames(self) -> Vec<(PathBuf, FrameBuffer)> {
        let mut frames = match self.frames.into_inner() {
            Ok(frames) => frames,
            Err(poisoned) => poisoned.into_inner(),
        };
        frames.sort_by(|a, b| a.0.cmp(&b.0));
        frames
    }

    /// Number of frames persisted so far.
    pub fn len(&self) -> usize {
        self.frames.lock().map(|f| f.len()).unwrap_or(0)
    }

    /// True when nothing has been persisted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ImageSink for MemorySink {
    fn persist(&self, buffer: &FrameBuffer, path: &Path) -> Result<(), RenderError> {
        let mut frames = self
            .frames
            .lock()
            .map_err(|_| persist_error(path, "memory sink poisoned"))?;
        frames.push((path.to_path_buf(), buffer.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate tempfile;

    use super::*;
    use color::WHITE;
    use image;
    use image::Pixel;

    #[test]
    fn rgb_bytes_interleave_channels() {
        let mut fb = FrameBuffer::new(2, 1).unwrap();
        fb.set_pixel(0, 0, 0x01_0203);
        fb.set_pixel(1, 0, WHITE);
        assert_eq!(rgb_bytes(&fb), vec![1, 2, 3, 255, 255, 255]);
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(JpegSink::with_quality(0).quality, 1);
        assert_eq!(JpegSink::with_quality(250).quality, 100);
    }

    #[test]
    fn jpeg_sink_writes_a_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.jpg");
        let sink = JpegSink::default();
        let mut fb = sink.allocate(16, 8).unwrap();
        fb.set_all(WHITE);
        sink.persist(&fb, &path).unwrap();
        sink.release(fb);

        let decoded = image::open(&path).unwrap().to_rgb();
        assert_eq!(decoded.dimensions(), (16, 8));
        assert!(decoded.pixels().all(|p| p.channels()[0] > 240));
    }

    #[test]
    fn jpeg_sink_reports_unwritable_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.jpg");
        let fb = FrameBuffer::new(4, 4).unwrap();
        match JpegSink::default().persist(&fb, &path) {
            Err(RenderError::Persist { path: p, .. }) => assert!(p.ends_with("frame.jpg")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn jpeg_sink_leaves_no_partial_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.jpg");
        let fb = FrameBuffer::new(8, 8).unwrap();
        JpegSink::default().persist(&fb, &path).unwrap();
        assert!(path.is_file());
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn failed_write_leaves_nothing_at_the_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mandel0.jpg");
        let result = write_atomically(&path, |output| {
            output
                .write_all(&[0xFF, 0xD8, 0xFF, 0xE0])
                .and_then(|_| output.flush())
                .map_err(|e| persist_error(&path, e))?;
            Err(persist_error(&path, "No space left on device"))
        });
        match result {
            Err(RenderError::Persist { ref reason, .. }) => {
                assert_eq!(reason, "No space left on device")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!path.exists());
        assert!(!partial_path(&path).exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_write_keeps_an_earlier_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mandel0.jpg");
        fs::write(&path, b"earlier").unwrap();
        let result = write_atomically(&path, |_| Err(persist_error(&path, "encoder gave up")));
        assert!(result.is_err());
        assert_eq!(fs::read(&path).unwrap(), b"earlier");
    }

    #[test]
    fn oversized_frames_are_refused_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.jpg");
        let fb = FrameBuffer::new(MAX_JPEG_SIDE + 1, 1).unwrap();
        assert!(JpegSink::default().persist(&fb, &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn memory_sink_keeps_frames_sorted() {
        let sink = MemorySink::new();
        let fb = FrameBuffer::new(1, 1).unwrap();
        sink.persist(&fb, Path::new("b")).unwrap();
        sink.persist(&fb, Path::new("a")).unwrap();
        assert_eq!(sink.len(), 2);
        let frames = sink.into_frames();
        assert_eq!(frames[0].0, PathBuf::from("a"));
        assert_eq!(frames[1].0, PathBuf::from("b"));
    }
}
