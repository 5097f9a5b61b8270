//! Nullable camera: counts stream acquisitions and releases.

use campus_liveness::{CameraAccessError, CameraCapture, Frame};
use std::sync::{Arc, Mutex};

/// Stream handle issued by [`NullCamera`].
#[derive(Debug, PartialEq, Eq)]
pub struct NullStream(u32);

#[derive(Debug, Default)]
struct CameraLog {
    acquired: u32,
    released: u32,
    frames: u32,
    deny: Option<CameraAccessError>,
    blank: bool,
}

/// A camera that never touches a device.
///
/// Clones share state, so a test can hand one clone to an engine and keep
/// another to inspect how the stream was used.
#[derive(Clone, Debug, Default)]
pub struct NullCamera {
    log: Arc<Mutex<CameraLog>>,
}

impl NullCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// A camera whose every acquisition fails with `error`.
    pub fn denied(error: CameraAccessError) -> Self {
        let camera = Self::new();
        camera.set_denied(Some(error));
        camera
    }

    /// Make future acquisitions fail (`Some`) or succeed (`None`).
    pub fn set_denied(&self, error: Option<CameraAccessError>) {
        self.log.lock().unwrap().deny = error;
    }

    /// Make `capture_frame` return nothing, as a camera warming up would.
    pub fn set_blank(&self, blank: bool) {
        self.log.lock().unwrap().blank = blank;
    }

    pub fn acquired(&self) -> u32 {
        self.log.lock().unwrap().acquired
    }

    pub fn released(&self) -> u32 {
        self.log.lock().unwrap().released
    }

    pub fn frames_captured(&self) -> u32 {
        self.log.lock().unwrap().frames
    }

    /// Streams handed out and not yet given back.
    pub fn open_streams(&self) -> u32 {
        let log = self.log.lock().unwrap();
        log.acquired - log.released
    }
}

impl CameraCapture for NullCamera {
    type Stream = NullStream;

    fn acquire_stream(&mut self) -> Result<NullStream, CameraAccessError> {
        let mut log = self.log.lock().unwrap();
        if let Some(error) = &log.deny {
            return Err(error.clone());
        }
        log.acquired += 1;
        Ok(NullStream(log.acquired))
    }

    fn release_stream(&mut self, _stream: NullStream) {
        self.log.lock().unwrap().released += 1;
    }

    fn capture_frame(&mut self, stream: &NullStream) -> Option<Frame> {
        let mut log = self.log.lock().unwrap();
        if log.blank {
            return None;
        }
        log.frames += 1;
        Some(Frame::new(640, 480, stream.0.to_be_bytes().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_counters() {
        let camera = NullCamera::new();
        let mut handle = camera.clone();
        let stream = handle.acquire_stream().unwrap();
        assert!(handle.capture_frame(&stream).is_some());
        assert_eq!(camera.open_streams(), 1);
        handle.release_stream(stream);
        assert_eq!(camera.acquired(), 1);
        assert_eq!(camera.released(), 1);
        assert_eq!(camera.frames_captured(), 1);
    }

    #[test]
    fn denied_camera() {
        let mut camera = NullCamera::denied(CameraAccessError::PermissionDenied);
        assert_eq!(
            camera.acquire_stream(),
            Err(CameraAccessError::PermissionDenied)
        );
        camera.set_denied(None);
        assert!(camera.acquire_stream().is_ok());
    }
}
