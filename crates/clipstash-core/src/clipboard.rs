//! Port to the operating system clipboard.

use crate::{ClipstashError, Result};
use clipstash_types::{ClipboardSnapshot, ImageContent, ItemContent};
use image::{ImageFormat, RgbaImage};
use std::borrow::Cow;
use std::io::Cursor;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Read/write access to the system clipboard.
pub trait SystemClipboard: Send + Sync {
    /// Current clipboard content, or `None` when it holds nothing we capture.
    fn read(&self) -> Result<Option<ClipboardSnapshot>>;

    fn write(&self, content: &ItemContent) -> Result<()>;

    /// Replace the content on behalf of an outside producer.
    fn publish(&self, snapshot: ClipboardSnapshot) -> Result<()> {
        self.write(&snapshot.content)
    }
}

/// The real clipboard, through `arboard`.
///
/// Text is preferred when both are present. Images cross the OS boundary as
/// RGBA and are kept as PNG.
#[derive(Debug, Default)]
pub struct ArboardClipboard;

impl ArboardClipboard {
    pub fn new() -> Self {
        Self
    }

    fn open() -> Result<arboard::Clipboard> {
        arboard::Clipboard::new().map_err(access_error)
    }
}

impl SystemClipboard for ArboardClipboard {
    fn read(&self) -> Result<Option<ClipboardSnapshot>> {
        let mut cb = Self::open()?;

        match cb.get_text() {
            Ok(text) if !text.is_empty() => {
                return Ok(Some(ClipboardSnapshot::new(ItemContent::Text(text), None)));
            }
            Ok(_) | Err(arboard::Error::ContentNotAvailable) => {}
            Err(e) => return Err(access_error(e)),
        }

        match cb.get_image() {
            Ok(img) => {
                let (width, height) = (dimension(img.width)?, dimension(img.height)?);
                let png = encode_png(width, height, img.bytes.into_owned())?;
                Ok(Some(ClipboardSnapshot::new(
                    ItemContent::image(width, height, png),
                    None,
                )))
            }
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(access_error(e)),
        }
    }

    fn write(&self, content: &ItemContent) -> Result<()> {
        let mut cb = Self::open()?;
        match content {
            ItemContent::Text(text) => cb.set_text(text.as_str()).map_err(access_error),
            ItemContent::Image(image) => {
                let rgba = decode_png(image)?;
                let (width, height) = rgba.dimensions();
                cb.set_image(arboard::ImageData {
                    width: width as usize,
                    height: height as usize,
                    bytes: Cow::Owned(rgba.into_raw()),
                })
                .map_err(access_error)
            }
        }
    }
}

fn access_error(e: arboard::Error) -> ClipstashError {
    ClipstashError::ClipboardAccess(e.to_string())
}

fn dimension(value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| ClipstashError::InvalidContent(format!("image dimension {} too large", value)))
}

/// PNG-encode raw RGBA pixels.
pub(crate) fn encode_png(width: u32, height: u32, rgba: Vec<u8>) -> Result<Vec<u8>> {
    let buffer = RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        ClipstashError::InvalidContent(format!(
            "pixel data does not fit a {}x{} RGBA image",
            width, height
        ))
    })?;

    let mut png = Vec::new();
    buffer
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ClipstashError::InvalidContent(format!("PNG encoding failed: {}", e)))?;
    Ok(png)
}

pub(crate) fn decode_png(image: &ImageContent) -> Result<RgbaImage> {
    image::load_from_memory_with_format(&image.bytes, ImageFormat::Png)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|e| ClipstashError::InvalidContent(format!("not a PNG image: {}", e)))
}

#[derive(Debug, Default)]
struct MemoryState {
    current: Option<ClipboardSnapshot>,
    fail_writes: bool,
}

/// In-process clipboard, for headless runs fed over HTTP and for tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    state: Mutex<MemoryState>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, snapshot: ClipboardSnapshot) {
        self.state().current = Some(snapshot);
    }

    pub fn current(&self) -> Option<ItemContent> {
        self.state().current.as_ref().map(|s| s.content.clone())
    }

    /// Make subsequent writes fail with `ClipboardAccess`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }
}

impl SystemClipboard for MemoryClipboard {
    fn read(&self) -> Result<Option<ClipboardSnapshot>> {
        Ok(self.state().current.clone())
    }

    fn write(&self, content: &ItemContent) -> Result<()> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(ClipstashError::ClipboardAccess(
                "clipboard is not writable".to_string(),
            ));
        }
        state.current = Some(ClipboardSnapshot::new(content.clone(), None));
        Ok(())
    }

    /// Keeps the reported source app, which a real clipboard cannot hold.
    fn publish(&self, snapshot: ClipboardSnapshot) -> Result<()> {
        self.set(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_keeps_pixels_and_dimensions() {
        let rgba: Vec<u8> = (0..2 * 3 * 4).map(|b| b as u8).collect();
        let png = encode_png(2, 3, rgba.clone()).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let decoded = decode_png(&ImageContent {
            width: 2,
            height: 3,
            bytes: png,
        })
        .unwrap();
        assert_eq!(decoded.dimensions(), (2, 3));
        assert_eq!(decoded.into_raw(), rgba);
    }

    #[test]
    fn test_encode_rejects_short_pixel_data() {
        let err = encode_png(4, 4, vec![0; 10]).unwrap_err();
        assert!(matches!(err, ClipstashError::InvalidContent(_)));
    }

    #[test]
    fn test_decode_rejects_non_png() {
        let err = decode_png(&ImageContent {
            width: 1,
            height: 1,
            bytes: b"not an image".to_vec(),
        })
        .unwrap_err();
        assert!(matches!(err, ClipstashError::InvalidContent(_)));
    }

    #[test]
    fn test_memory_publish_keeps_source_app() {
        let clipboard = MemoryClipboard::new();
        clipboard
            .publish(ClipboardSnapshot::new(
                ItemContent::text("hi"),
                Some("Terminal".into()),
            ))
            .unwrap();

        let snapshot = clipboard.read().unwrap().unwrap();
        assert_eq!(snapshot.source_app.as_deref(), Some("Terminal"));
    }

    #[test]
    fn test_memory_write_failure_is_clipboard_access() {
        let clipboard = MemoryClipboard::new();
        clipboard.set_fail_writes(true);
        let err = clipboard.write(&ItemContent::text("x")).unwrap_err();
        assert!(matches!(err, ClipstashError::ClipboardAccess(_)));
        assert!(clipboard.current().is_none());
    }
}
