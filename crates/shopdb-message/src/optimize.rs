use shopdb_core::ContentSegment;

pub const PROSE_SEPARATOR: &str = "\n\n";

/// Merge maximal runs of same-kind segments: prose joined by a blank line,
/// item groups concatenated in order. Empty item groups are dropped first, so
/// the prose around them merges too.
///
/// Idempotent, and the order of segment kinds is kept.
pub fn optimize(segments: Vec<ContentSegment>) -> Vec<ContentSegment> {
    let mut optimized: Vec<ContentSegment> = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            ContentSegment::Prose(text) => {
                if let Some(ContentSegment::Prose(current)) = optimized.last_mut() {
                    current.push_str(PROSE_SEPARATOR);
                    current.push_str(&text);
                } else {
                    optimized.push(ContentSegment::Prose(text));
                }
            }
            ContentSegment::ItemGroup(ids) => {
                if ids.is_empty() { continue; }
                if let Some(ContentSegment::ItemGroup(current)) = optimized.last_mut() {
                    current.extend(ids);
                } else {
                    optimized.push(ContentSegment::ItemGroup(ids));
                }
            }
        }
    }
    optimized
}
