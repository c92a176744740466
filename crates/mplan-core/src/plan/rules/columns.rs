//! Header synonyms for semantic column roles and piece table headers.
//!
//! All functions take text already passed through [`crate::text::normalize`].

use crate::models::plan::ColumnRole;

const MARKET_HEADERS: &[&str] = &["market", "praca", "mercado"];
const CHANNEL_HEADERS: &[&str] = &["channel", "canal"];

const PIECE_CODE_HEADERS: &[&str] = &["pc", "cod", "code"];
const PIECE_TITLE_NEEDLES: &[&str] = &["titulo", "title"];
const PIECE_SECONDS_HEADERS: &[&str] = &["sec", "secs", "seg", "segundos", "seconds"];

/// Header text naming the market column.
pub fn is_market_header(normalized: &str) -> bool {
    MARKET_HEADERS.contains(&normalized)
}

/// Header text naming the channel column.
pub fn is_channel_header(normalized: &str) -> bool {
    CHANNEL_HEADERS.contains(&normalized)
}

/// Map a normalized header cell to its column role.
///
/// Rules are tried in order and the first match wins. Unknown headers return
/// `None` and are then tried as literal dates by the detector.
pub fn role_for_header(h: &str) -> Option<ColumnRole> {
    let role = if matches!(h, "praca" | "market" | "mercado") || h.contains("praca") {
        ColumnRole::Market
    } else if matches!(h, "canal" | "channel") {
        ColumnRole::Channel
    } else if matches!(h, "programa" | "program") {
        ColumnRole::Program
    } else if matches!(h, "janela" | "property" | "segmentacao" | "segmentacao/posicionamento")
        || h.contains("janela")
    {
        ColumnRole::PropertyText
    } else if matches!(h, "formato" | "format") {
        ColumnRole::FormatText
    } else if matches!(h, "duracao" | "duracao(s)" | "duration" | "duration_sec")
        || h.contains("duracao")
    {
        ColumnRole::DurationSec
    } else if matches!(h, "external_ref" | "external ref" | "id" | "chave" | "linha_id")
        || h.contains("external")
    {
        ColumnRole::ExternalRef
    } else if matches!(h, "inicio" | "start" | "start_date" | "data_inicio") || h.contains("inicio")
    {
        ColumnRole::StartDate
    } else if matches!(h, "fim" | "end" | "end_date" | "data_fim") {
        ColumnRole::EndDate
    } else if matches!(h, "peca" | "pecas" | "criativo" | "creative") {
        ColumnRole::PieceCodes
    } else {
        return None;
    };

    Some(role)
}

/// Piece table code header ("PC", "Cod").
pub fn is_piece_code_header(normalized: &str) -> bool {
    PIECE_CODE_HEADERS.contains(&normalized)
}

/// Piece table title header ("Títulos").
pub fn is_piece_title_header(normalized: &str) -> bool {
    PIECE_TITLE_NEEDLES.iter().any(|n| normalized.contains(n))
}

/// Piece table duration header ("Seg", "Seconds").
pub fn is_piece_seconds_header(normalized: &str) -> bool {
    PIECE_SECONDS_HEADERS.contains(&normalized)
}
