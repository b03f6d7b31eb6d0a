//! Embedded images. Items carry their image inline as a base64 `data:` URI.

use std::path::Path;

use base64::{engine::general_purpose, Engine as _};

use crate::app::{Result, SiteError};

pub fn data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
}

/// Read an image file into a data URI, picking the MIME type from the extension.
pub fn image_data_uri(path: &Path) -> Result<String> {
    let mime = mime_for(path)?;
    let bytes = std::fs::read(path)?;
    Ok(data_uri(&bytes, mime))
}

fn mime_for(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        "svg" => Ok("image/svg+xml"),
        _ => Err(SiteError::UnsupportedImage(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_data_uri_encoding() {
        assert_eq!(data_uri(b"hi", "image/png"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_image_file_to_data_uri() {
        let mut file = tempfile::Builder::new().suffix(".JPG").tempfile().unwrap();
        file.write_all(&[0xff, 0xd8, 0xff]).unwrap();

        let uri = image_data_uri(file.path()).unwrap();
        assert_eq!(uri, "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(matches!(
            image_data_uri(file.path()),
            Err(SiteError::UnsupportedImage(_))
        ));
    }
}
