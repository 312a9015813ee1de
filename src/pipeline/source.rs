// ============================================================================
// IMAGE SOURCE — decode a user file into the source surface
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use super::pixels::PixelBuffer;
use super::surface::Surfaces;
use super::{Publisher, Trigger};
use crate::{log_info, log_warn};

/// Error type for loading a user-supplied image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    Io(String),
    DecodeFailed(String),
    EmptyImage,
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageError::Io(e) => write!(f, "Could not read file: {}", e),
            ImageError::DecodeFailed(e) => write!(f, "Not a decodable image: {}", e),
            ImageError::EmptyImage => write!(f, "Image has no pixels"),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<std::io::Error> for ImageError {
    fn from(e: std::io::Error) -> Self {
        ImageError::Io(e.to_string())
    }
}

impl From<image::ImageError> for ImageError {
    fn from(e: image::ImageError) -> Self {
        ImageError::DecodeFailed(e.to_string())
    }
}

/// Where a file came from.  Both origins load identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageOrigin {
    Dropped,
    Picked,
    CommandLine,
}

/// One file offered by a drop or a picker selection.
#[derive(Clone, Debug)]
pub enum FileInput {
    Path(PathBuf),
    /// In-memory contents (drops that carry bytes instead of a path).
    Bytes { name: String, bytes: Arc<[u8]> },
}

impl FileInput {
    pub fn name(&self) -> String {
        match self {
            FileInput::Path(p) => p
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| p.display().to_string()),
            FileInput::Bytes { name, .. } => name.clone(),
        }
    }

    pub fn read(&self) -> Result<Vec<u8>, ImageError> {
        match self {
            FileInput::Path(p) => Ok(std::fs::read(p)?),
            FileInput::Bytes { bytes, .. } => Ok(bytes.to_vec()),
        }
    }
}

/// The currently loaded image.  Replaced wholesale on every accepted file.
#[derive(Clone, Debug)]
pub struct ImageSession {
    pub id: Uuid,
    pub name: String,
    pub origin: ImageOrigin,
    pub buffer: PixelBuffer,
}

impl ImageSession {
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }
}

/// Decodes files, owns the [`ImageSession`], and publishes
/// [`Trigger::ImageLoaded`] after each successful load.
#[derive(Default)]
pub struct ImageSource {
    session: Option<ImageSession>,
    publisher: Publisher,
}

impl ImageSource {
    pub fn subscribe(&mut self) -> std::sync::mpsc::Receiver<Trigger> {
        self.publisher.subscribe()
    }

    pub fn session(&self) -> Option<&ImageSession> {
        self.session.as_ref()
    }

    /// Decode `bytes` and make it the current image.
    ///
    /// On success both surfaces take the image's natural size, the source
    /// surface shows the image, and a trigger is published.  On failure the
    /// existing session and both surfaces are left exactly as they were.
    pub fn load(
        &mut self,
        origin: ImageOrigin,
        name: &str,
        bytes: &[u8],
        surfaces: &mut Surfaces,
    ) -> Result<&ImageSession, ImageError> {
        let buffer = decode(bytes)?;
        let (w, h) = buffer.dimensions();

        surfaces.resize_both(w, h);
        surfaces.source.paint(buffer.clone());

        let session = ImageSession {
            id: Uuid::new_v4(),
            name: name.to_string(),
            origin,
            buffer,
        };
        log_info!(
            "Loaded '{}' ({}x{}) from {:?} as session {}",
            session.name,
            w,
            h,
            origin,
            session.id
        );
        self.publisher.publish(Trigger::ImageLoaded);
        Ok(&*self.session.insert(session))
    }

    /// Load the first of several offered files; the rest are ignored.
    /// Returns `Ok(None)` for an empty offer.
    pub fn load_files(
        &mut self,
        origin: ImageOrigin,
        files: Vec<FileInput>,
        surfaces: &mut Surfaces,
    ) -> Result<Option<&ImageSession>, ImageError> {
        let mut files = files.into_iter();
        let Some(first) = files.next() else {
            return Ok(None);
        };
        let ignored = files.count();
        if ignored > 0 {
            log_warn!("{} extra file(s) ignored; only '{}' is loaded", ignored, first.name());
        }
        let bytes = first.read()?;
        self.load(origin, &first.name(), &bytes, surfaces).map(Some)
    }
}

/// Decode any supported encoding into an RGBA buffer at natural size.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    PixelBuffer::from_rgba_image(rgba).ok_or(ImageError::EmptyImage)
}
