//! Helpers for creative asset files attached to a plan.
//!
//! Uploaded creatives are matched to plan pieces by a code at the start of
//! the file name (`"A_verao_30s.mp4"` is piece `A`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::plan::rules::patterns::{FILENAME_CODE_SEPARATED, FILENAME_CODE_WORD};

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".webp", ".gif"];
const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".aac", ".m4a"];

/// Kind of creative asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    #[default]
    Video,
    Image,
    Audio,
    Html5,
}

impl PieceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::Video => "video",
            PieceKind::Image => "image",
            PieceKind::Audio => "audio",
            PieceKind::Html5 => "html5",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Piece code named by the leading letter of a file name, uppercased.
pub fn infer_piece_code_from_filename(filename: &str) -> Option<String> {
    let name = filename.trim();
    if name.is_empty() {
        return None;
    }

    FILENAME_CODE_WORD
        .captures(name)
        .or_else(|| FILENAME_CODE_SEPARATED.captures(name))
        .map(|caps| caps[1].to_uppercase())
}

/// Asset kind from the file extension. Unknown extensions are video.
pub fn infer_piece_kind_from_filename(filename: &str) -> PieceKind {
    let name = filename.trim().to_lowercase();

    if IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        PieceKind::Image
    } else if AUDIO_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        PieceKind::Audio
    } else {
        PieceKind::Video
    }
}

/// Duration in whole seconds from `ffprobe -print_format json -show_format`
/// output. `format.duration` may be a string or a number.
pub fn duration_from_probe(meta: &serde_json::Value) -> Option<u32> {
    let duration = meta.get("format")?.get("duration")?;
    let seconds = match duration {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        serde_json::Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    if !seconds.is_finite() {
        return None;
    }

    Some(seconds.round().clamp(0.0, f64::from(u32::MAX)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infer_piece_code() {
        assert_eq!(infer_piece_code_from_filename("A_verao_30s.mp4"), Some("A".to_string()));
        assert_eq!(infer_piece_code_from_filename("b - inverno.mov"), Some("B".to_string()));
        assert_eq!(infer_piece_code_from_filename(" c.mp4"), Some("C".to_string()));
        assert_eq!(infer_piece_code_from_filename("D-15s.wav"), Some("D".to_string()));
        assert_eq!(infer_piece_code_from_filename("Abertura.mp4"), None);
        assert_eq!(infer_piece_code_from_filename("30s_A.mp4"), None);
        assert_eq!(infer_piece_code_from_filename("   "), None);
    }

    #[test]
    fn test_infer_piece_kind() {
        assert_eq!(infer_piece_kind_from_filename("A.PNG"), PieceKind::Image);
        assert_eq!(infer_piece_kind_from_filename("banner.webp"), PieceKind::Image);
        assert_eq!(infer_piece_kind_from_filename("spot.m4a"), PieceKind::Audio);
        assert_eq!(infer_piece_kind_from_filename("spot.mp4"), PieceKind::Video);
        assert_eq!(infer_piece_kind_from_filename("sem_extensao"), PieceKind::Video);
        assert_eq!(PieceKind::Html5.to_string(), "html5");
    }

    #[test]
    fn test_duration_from_probe() {
        assert_eq!(duration_from_probe(&json!({"format": {"duration": "29.97"}})), Some(30));
        assert_eq!(duration_from_probe(&json!({"format": {"duration": 15.2}})), Some(15));
        assert_eq!(duration_from_probe(&json!({"format": {"duration": "-1"}})), Some(0));
        assert_eq!(duration_from_probe(&json!({"format": {"duration": "N/A"}})), None);
        assert_eq!(duration_from_probe(&json!({"format": {}})), None);
        assert_eq!(duration_from_probe(&json!({"streams": []})), None);
        assert_eq!(duration_from_probe(&json!({"format": {"duration": null}})), None);
    }
}
