//! Document chunking for the ingest pipeline.

/// Split text into overlapping chunks of at most `size` characters.
///
/// Overlap carries trailing context from one chunk into the next so a fact
/// straddling a boundary still lands whole in at least one chunk. Splits
/// happen on char boundaries; an overlap >= size is clamped to size / 2 to
/// guarantee forward progress.
pub fn split_into_chunks(text: &str, size: usize, overlap: usize) -> Vec<String> {
    if size == 0 {
        return Vec::new();
    }
    let overlap = if overlap >= size { size / 2 } else { overlap };

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let step = size - overlap;
    let mut start = 0;

    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_into_chunks("hello world", 1000, 200);
        assert_eq!(chunks, vec!["hello world"]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(split_into_chunks("", 1000, 200).is_empty());
        assert!(split_into_chunks("   \n  ", 1000, 200).is_empty());
    }

    #[test]
    fn test_chunks_bounded_by_size() {
        let text = "a".repeat(2500);
        let chunks = split_into_chunks(&text, 1000, 200);
        assert!(chunks.iter().all(|c| c.chars().count() <= 1000));
        // 0..1000, 800..1800, 1600..2500
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_overlap_repeats_trailing_context() {
        let text: String = ('a'..='z').cycle().take(100).collect();
        let chunks = split_into_chunks(&text, 50, 10);
        assert!(chunks.len() >= 2);
        let first_tail: String = chunks[0].chars().skip(40).collect();
        let second_head: String = chunks[1].chars().take(10).collect();
        assert_eq!(first_tail, second_head);
    }

    #[test]
    fn test_degenerate_overlap_still_progresses() {
        let text = "x".repeat(300);
        let chunks = split_into_chunks(&text, 100, 100);
        assert!(!chunks.is_empty());
        assert!(chunks.len() < 300, "must not loop per character");
    }

    #[test]
    fn test_zero_size_yields_nothing() {
        assert!(split_into_chunks("text", 0, 0).is_empty());
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let text = "پویا توسعه‌دهنده است. ".repeat(40);
        let chunks = split_into_chunks(&text, 100, 20);
        assert!(!chunks.is_empty());
        // Would have panicked on a byte-index split; also verify bound.
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
    }
}
