//! Icon artwork picker contracts and upload validation.

use std::{cell::RefCell, collections::VecDeque, future::Future, pin::Pin, rc::Rc};

use thiserror::Error;

/// Object-safe boxed future used by [`IconImagePicker`].
pub type IconImageFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A local file chosen by the user as icon artwork.
pub struct PickedIconImage {
    /// File name as reported by the host.
    pub file_name: String,
    /// MIME type as reported by the host (may be empty).
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// File contents as a `data:` URI; `None` when the file was too large to be read.
    pub data_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Reasons a picked file cannot become icon artwork.
pub enum IconImageError {
    /// The file exceeds the upload limit.
    #[error("Image too large. Please choose a file under {} KB.", .max_bytes / 1024)]
    TooLarge {
        /// Size of the rejected file.
        size_bytes: u64,
        /// Configured upload limit.
        max_bytes: u64,
    },
    /// The file is not an image.
    #[error("Please choose an image file.")]
    NotAnImage,
    /// The file could not be read.
    #[error("Could not read the selected image.")]
    Unreadable,
}

impl PickedIconImage {
    /// Checks the file against the upload rules and returns its data URI.
    ///
    /// # Errors
    ///
    /// Returns [`IconImageError`] when the file is oversized, not an image, or unread.
    pub fn validate(&self, max_bytes: u64) -> Result<&str, IconImageError> {
        if self.size_bytes > max_bytes {
            return Err(IconImageError::TooLarge {
                size_bytes: self.size_bytes,
                max_bytes,
            });
        }
        let is_image = self.mime_type.starts_with("image/")
            || self
                .data_url
                .as_deref()
                .is_some_and(|url| url.starts_with("data:image/"));
        if !is_image {
            return Err(IconImageError::NotAnImage);
        }
        self.data_url
            .as_deref()
            .filter(|url| url.starts_with("data:"))
            .ok_or(IconImageError::Unreadable)
    }
}

/// Host service that lets the user choose a local image file.
pub trait IconImagePicker {
    /// Prompts for one image. Files larger than `max_bytes` are returned without contents.
    ///
    /// Resolves to `Ok(None)` when the user picked nothing.
    fn pick_icon_image<'a>(
        &'a self,
        max_bytes: u64,
    ) -> IconImageFuture<'a, Result<Option<PickedIconImage>, String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Picker for hosts without file access; always picks nothing.
pub struct NoopIconImagePicker;

impl IconImagePicker for NoopIconImagePicker {
    fn pick_icon_image<'a>(
        &'a self,
        _max_bytes: u64,
    ) -> IconImageFuture<'a, Result<Option<PickedIconImage>, String>> {
        Box::pin(async { Ok(None) })
    }
}

#[derive(Debug, Clone, Default)]
/// Picker that hands out queued files in order, then picks nothing.
pub struct MemoryIconImagePicker {
    queued: Rc<RefCell<VecDeque<PickedIconImage>>>,
}

impl MemoryIconImagePicker {
    /// Queues a file for the next prompt.
    pub fn queue(&self, image: PickedIconImage) {
        self.queued.borrow_mut().push_back(image);
    }
}

impl IconImagePicker for MemoryIconImagePicker {
    fn pick_icon_image<'a>(
        &'a self,
        max_bytes: u64,
    ) -> IconImageFuture<'a, Result<Option<PickedIconImage>, String>> {
        Box::pin(async move {
            let picked = self.queued.borrow_mut().pop_front();
            Ok(picked.map(|mut image| {
                if image.size_bytes > max_bytes {
                    image.data_url = None;
                }
                image
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    fn png(size_bytes: u64) -> PickedIconImage {
        PickedIconImage {
            file_name: "logo.png".to_string(),
            mime_type: "image/png".to_string(),
            size_bytes,
            data_url: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
        }
    }

    #[test]
    fn validate_accepts_small_images() {
        assert_eq!(
            png(2048).validate(102_400),
            Ok("data:image/png;base64,iVBORw0KGgo=")
        );
    }

    #[test]
    fn validate_rejects_files_over_the_limit() {
        let err = png(102_401).validate(102_400).expect_err("too large");
        assert_eq!(
            err,
            IconImageError::TooLarge {
                size_bytes: 102_401,
                max_bytes: 102_400,
            }
        );
        assert_eq!(
            err.to_string(),
            "Image too large. Please choose a file under 100 KB."
        );
    }

    #[test]
    fn validate_rejects_non_images() {
        let text = PickedIconImage {
            file_name: "notes.txt".to_string(),
            mime_type: "text/plain".to_string(),
            size_bytes: 10,
            data_url: Some("data:text/plain;base64,aGk=".to_string()),
        };
        assert_eq!(text.validate(102_400), Err(IconImageError::NotAnImage));
    }

    #[test]
    fn memory_picker_strips_contents_of_oversized_files() {
        let picker = MemoryIconImagePicker::default();
        picker.queue(png(500_000));

        let picked = block_on(picker.pick_icon_image(102_400))
            .expect("pick")
            .expect("file");
        assert_eq!(picked.data_url, None);
        assert_eq!(block_on(picker.pick_icon_image(102_400)), Ok(None));
    }
}
