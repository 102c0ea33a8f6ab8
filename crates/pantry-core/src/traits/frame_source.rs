// # Frame Source Trait
//
// Defines the interface for camera collaborators that yield a still frame.
//
// ## Capture Model
//
// Capture is a one-shot synchronous snapshot request against a live source:
// one call, one JPEG frame. There is no stream and no subscription.
// Cancelling a capture from a UI is simply not calling `capture_frame()`;
// nothing in the upload/add pipeline runs until a frame exists.
//
// ## Implementations
//
// - HTTP snapshot (network cameras): `pantry-capture-http` crate

use async_trait::async_trait;

/// An in-memory JPEG payload captured from a camera source
///
/// Construction validates the JPEG start-of-image marker so that whatever
/// ends up in the blob store under an `images/*.jpg` key really is a JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegImage {
    bytes: Vec<u8>,
}

impl JpegImage {
    /// JPEG start-of-image marker
    const SOI: [u8; 2] = [0xFF, 0xD8];

    /// Build a payload from raw bytes, validating the JPEG marker
    ///
    /// # Returns
    ///
    /// - `Ok(JpegImage)`: The validated payload
    /// - `Err(Error::InvalidInput)`: The bytes are not a JPEG image
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, crate::Error> {
        if bytes.len() < 2 || bytes[..2] != Self::SOI {
            return Err(crate::Error::invalid_input(
                "payload is not a JPEG image (missing SOI marker)",
            ));
        }
        Ok(Self { bytes })
    }

    /// The raw JPEG bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty (never true for a validated image)
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Trait for frame source implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Collaborator Discipline
///
/// Frame sources are observers, not decision-makers:
///
/// - One snapshot request per `capture_frame()` call
/// - No retry logic; a failed capture surfaces as
///   [`Error::Capture`](crate::Error) and the caller decides
/// - No background tasks or polling loops
/// - No access to the document or blob stores (the engine owns the
///   upload/add pipeline)
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Capture one still frame from the source
    ///
    /// # Returns
    ///
    /// - `Ok(JpegImage)`: The captured frame
    /// - `Err(Error)`: If the source is unavailable or the payload is not
    ///   a JPEG
    async fn capture_frame(&self) -> Result<JpegImage, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}

/// Helper trait for constructing frame sources from configuration
pub trait FrameSourceFactory: Send + Sync {
    /// Create a FrameSource instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this source type
    ///
    /// # Returns
    ///
    /// A boxed FrameSource trait object
    fn create(
        &self,
        config: &crate::config::CaptureConfig,
    ) -> Result<Box<dyn FrameSource>, crate::Error>;
}
