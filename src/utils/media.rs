use crate::errors::BotError;

const MAX_ATTACHMENT_SIZE: usize = 20 * 1024 * 1024; // 20MB

/// MIME allow-list for inbound attachments. `false` marks a type the bot
/// recognizes but deliberately refuses (PDF support was pulled).
const ALLOWED_FILE_TYPES: &[(&str, bool)] = &[
    ("application/pdf", false),
    ("text/plain; charset=utf-8", true),
    ("image/jpeg", true),
    ("image/jpg", true),
    ("image/png", true),
    ("audio/mp3", true),
    ("audio/mp4", true),
    ("video/quicktime", true),
    ("video/mp4", true),
    ("video/mpeg", true),
    ("video/mov", true),
    ("video/avi", true),
    ("video/x-flv", true),
    ("video/mpg", true),
    ("video/webm", true),
    ("video/wmv", true),
    ("video/3gpp", true),
];

/// An attachment admitted by [`classify`], ready to hand to the backend.
/// Owns its bytes; dropping it releases the underlying resource.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

fn is_allowed(content_type: &str) -> bool {
    ALLOWED_FILE_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .is_some_and(|(_, allowed)| *allowed)
}

/// Gate an inbound attachment by MIME type and build its in-memory
/// representation.
///
/// Image types are decoded to verify the payload actually is what the header
/// claims; the decoded dimensions ride along for logging. Allow-listed
/// non-image types (text, audio, video) have no decode path yet and fail
/// closed.
pub fn classify(name: &str, content_type: &str, bytes: Vec<u8>) -> Result<Attachment, BotError> {
    if !is_allowed(content_type) {
        return Err(BotError::UnsupportedFileType(content_type.to_string()));
    }

    if bytes.is_empty() {
        return Err(BotError::FileProcessing("attachment is empty".to_string()));
    }
    if bytes.len() > MAX_ATTACHMENT_SIZE {
        return Err(BotError::FileProcessing(format!(
            "attachment too large: {} bytes (max {})",
            bytes.len(),
            MAX_ATTACHMENT_SIZE
        )));
    }

    match content_type {
        "image/jpeg" | "image/jpg" | "image/png" => {
            let decoded = image::load_from_memory(&bytes)
                .map_err(|e| BotError::FileProcessing(e.to_string()))?;
            Ok(Attachment {
                name: name.to_string(),
                mime: content_type.to_string(),
                width: decoded.width(),
                height: decoded.height(),
                bytes,
            })
        }
        other => Err(BotError::FileProcessing(format!(
            "no decoder implemented for {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn valid_png() -> Vec<u8> {
        let img = image::RgbaImage::new(2, 3);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn pdf_is_rejected_as_unsupported() {
        let result = classify("doc.pdf", "application/pdf", vec![1, 2, 3]);
        assert!(matches!(result, Err(BotError::UnsupportedFileType(_))));
    }

    #[test]
    fn unknown_type_is_rejected_as_unsupported() {
        let result = classify("x.bin", "application/octet-stream", vec![1, 2, 3]);
        assert!(matches!(result, Err(BotError::UnsupportedFileType(_))));
    }

    #[test]
    fn valid_png_is_admitted_with_dimensions() {
        let attachment = classify("pic.png", "image/png", valid_png()).unwrap();
        assert_eq!(attachment.mime, "image/png");
        assert_eq!(attachment.width, 2);
        assert_eq!(attachment.height, 3);
        assert!(!attachment.bytes.is_empty());
    }

    #[test]
    fn garbage_png_fails_processing() {
        let result = classify("pic.png", "image/png", b"definitely not a png".to_vec());
        assert!(matches!(result, Err(BotError::FileProcessing(_))));
    }

    #[test]
    fn empty_payload_fails_processing() {
        let result = classify("pic.png", "image/png", Vec::new());
        let err = result.unwrap_err();
        assert!(matches!(err, BotError::FileProcessing(_)));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn oversized_payload_fails_processing() {
        let big = vec![0u8; MAX_ATTACHMENT_SIZE + 1];
        let result = classify("pic.png", "image/png", big);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn admitted_audio_fails_closed_without_decoder() {
        let result = classify("clip.mp3", "audio/mp3", vec![0u8; 16]);
        let err = result.unwrap_err();
        assert!(matches!(err, BotError::FileProcessing(_)));
        assert!(err.to_string().contains("no decoder"));
    }

    #[test]
    fn admitted_video_fails_closed_without_decoder() {
        let result = classify("clip.mp4", "video/mp4", vec![0u8; 16]);
        assert!(matches!(result, Err(BotError::FileProcessing(_))));
    }
}
