//! Camera capture collaborator.
//!
//! The engine never talks to a device directly. A [`CameraCapture`] hands out a
//! stream, produces frames from it, and takes it back. The engine guarantees
//! every stream it acquires is released exactly once.

use crate::error::CameraAccessError;
use serde::{Deserialize, Serialize};

/// A single captured video frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Encoded image bytes (JPEG in the browser portal).
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }
}

/// Access to a camera device.
pub trait CameraCapture {
    /// Handle to an open media stream.
    type Stream;

    /// Open the camera. Fails when permission is denied or no device exists.
    fn acquire_stream(&mut self) -> Result<Self::Stream, CameraAccessError>;

    /// Stop every track of the stream and give the device back.
    fn release_stream(&mut self, stream: Self::Stream);

    /// Grab the current frame, if the stream has one ready.
    fn capture_frame(&mut self, stream: &Self::Stream) -> Option<Frame>;
}
