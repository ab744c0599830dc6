//! Extract metadata blocks from arbitrary markdown.

use crate::block::{self, MetadataBlock};

/// Every decodable block in `text`, in the order they appear.
///
/// Each opening marker is paired with the nearest closing marker after it.
/// When further opening markers sit between that marker and the payload
/// fence, the span starts at the last of them, so a marker quoted in prose
/// never claims the next block. Spans that fail to decode are skipped, and an opening marker with no
/// closing marker ends the scan. Neither aborts the call.
pub fn scan_all(text: &str) -> Vec<MetadataBlock> {
    let open = block::opening_prefix();
    let close = block::closing_marker();
    let fence = block::payload_fence();

    let mut blocks = Vec::new();
    let mut cursor = 0;
    while let Some(rel) = text[cursor..].find(&open) {
        let start = cursor + rel;
        let body_from = start + open.len();
        let Some(close_rel) = text[body_from..].find(&close) else {
            tracing::warn!(
                offset = start,
                "metadata block opening marker has no closing marker; ignoring"
            );
            break;
        };
        let end = body_from + close_rel + close.len();
        let head_end = text[body_from..end]
            .find(&fence)
            .map_or(end, |i| body_from + i);
        let start = match text[body_from..head_end].rfind(&open) {
            Some(i) => {
                tracing::debug!(offset = start, "skipping stray metadata block opening marker");
                body_from + i
            }
            None => start,
        };
        match block::try_decode(&text[start..end]) {
            Some(b) => blocks.push(b),
            None => tracing::debug!(offset = start, "skipping undecodable metadata block"),
        }
        cursor = end;
    }
    blocks
}

/// First block of `kind` in `text`.
pub fn find_first(text: &str, kind: &str) -> Option<MetadataBlock> {
    scan_all(text).into_iter().find(|b| b.kind == kind)
}

/// Last block of `kind` in `text`, for fields where the latest write wins.
pub fn find_last(text: &str, kind: &str) -> Option<MetadataBlock> {
    scan_all(text).into_iter().rev().find(|b| b.kind == kind)
}
