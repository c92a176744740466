//! Media channel inference from sheet titles and section labels.

use crate::models::plan::{MediaChannel, MediaType};
use crate::text::normalize;

/// Ordered title rules; the first rule with a matching substring wins.
const CHANNEL_RULES: &[(&[&str], MediaChannel)] = &[
    (&["open tv", "tv aberta"], MediaChannel::TvAberta),
    (&["paytv", "pay tv"], MediaChannel::Paytv),
    (&["radio"], MediaChannel::Radio),
    (&["jornal"], MediaChannel::Jornal),
    (&["ooh"], MediaChannel::Ooh),
    (&["meta"], MediaChannel::Meta),
    (&["google"], MediaChannel::Google),
    (&["youtube"], MediaChannel::Youtube),
    (&["display"], MediaChannel::Display),
    (&["search"], MediaChannel::Search),
    (&["social", "digital"], MediaChannel::Social),
];

/// Labels that mark a section divider row rather than a market.
const SECTION_KEYWORDS: &[&str] = &[
    "pay tv",
    "paytv",
    "open tv",
    "tv aberta",
    "radio",
    "jornal",
    "ooh",
    "digital",
    "meta",
    "google",
    "youtube",
];

/// Infer media type and channel from a sheet title.
pub fn detect_media(sheet_title: &str) -> (MediaType, MediaChannel) {
    let title = normalize(sheet_title);
    let channel = CHANNEL_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| title.contains(n)))
        .map(|(_, channel)| *channel)
        .unwrap_or(MediaChannel::Other);

    (channel.media_type(), channel)
}

/// True when a market cell actually holds a section label like "TT PAY TV".
pub fn is_section_label(text: &str) -> bool {
    let normalized = normalize(text);
    !normalized.is_empty() && SECTION_KEYWORDS.iter().any(|k| normalized.contains(k))
}
