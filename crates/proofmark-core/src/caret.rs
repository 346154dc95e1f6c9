//! Caret offset arithmetic.
//!
//! The DOM measures text in UTF-16 code units, so every offset in this module
//! is a UTF-16 offset into the region's plain text (the concatenation of its
//! visible text nodes in document order). The browser layer collects node
//! lengths and asks these helpers where an offset lands.

/// Where a plain-text offset lands among a sequence of text nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaretPosition {
    /// Index into the text node list.
    pub node_index: usize,
    /// UTF-16 offset within that node.
    pub offset_in_node: usize,
}

/// Locate `offset` among text nodes with the given UTF-16 lengths.
///
/// Picks the first node where the cumulative length reaches or exceeds
/// `offset`, so an offset on a node boundary lands at the end of the earlier
/// node. Offsets past the end clamp to the end of the last node. Returns
/// `None` when there are no nodes.
pub fn locate_offset(node_lengths: &[usize], offset: usize) -> Option<CaretPosition> {
    let mut accumulated = 0;
    for (node_index, &len) in node_lengths.iter().enumerate() {
        if accumulated + len >= offset {
            return Some(CaretPosition {
                node_index,
                offset_in_node: offset - accumulated,
            });
        }
        accumulated += len;
    }

    let node_index = node_lengths.len().checked_sub(1)?;
    Some(CaretPosition {
        node_index,
        offset_in_node: node_lengths[node_index],
    })
}

/// Clamp an offset to the content length.
pub fn clamp_offset(offset: usize, total_len: usize) -> usize {
    offset.min(total_len)
}

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Convert a byte offset in `s` to a UTF-16 offset.
///
/// `byte` must sit on a char boundary; anything past the end maps to the
/// full UTF-16 length.
pub fn utf16_offset_of_byte(s: &str, byte: usize) -> usize {
    if byte >= s.len() {
        return utf16_len(s);
    }
    utf16_len(&s[..byte])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_within_single_node() {
        assert_eq!(
            locate_offset(&[10], 4),
            Some(CaretPosition {
                node_index: 0,
                offset_in_node: 4
            })
        );
    }

    #[test]
    fn test_locate_boundary_prefers_earlier_node() {
        // "Helo" | " wrold"
        let pos = locate_offset(&[4, 6], 4).unwrap();
        assert_eq!(pos.node_index, 0);
        assert_eq!(pos.offset_in_node, 4);

        let pos = locate_offset(&[4, 6], 5).unwrap();
        assert_eq!(pos.node_index, 1);
        assert_eq!(pos.offset_in_node, 1);
    }

    #[test]
    fn test_locate_past_end_clamps() {
        let pos = locate_offset(&[4, 6], 99).unwrap();
        assert_eq!(pos.node_index, 1);
        assert_eq!(pos.offset_in_node, 6);
    }

    #[test]
    fn test_locate_no_nodes() {
        assert_eq!(locate_offset(&[], 0), None);
        assert_eq!(locate_offset(&[], 3), None);
    }

    #[test]
    fn test_locate_round_trips_every_offset() {
        let lengths = [3, 0, 5, 2];
        let total: usize = lengths.iter().sum();
        for offset in 0..=total {
            let pos = locate_offset(&lengths, offset).unwrap();
            let before: usize = lengths[..pos.node_index].iter().sum();
            assert_eq!(before + pos.offset_in_node, offset);
        }
    }

    #[test]
    fn test_utf16_offsets() {
        let s = "naïve 😀 x";
        assert_eq!(utf16_len(s), 10);
        let x = s.find('x').unwrap();
        assert_eq!(utf16_offset_of_byte(s, x), 9);
        assert_eq!(utf16_offset_of_byte(s, s.len() + 4), 10);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_offset(12, 10), 10);
        assert_eq!(clamp_offset(3, 10), 3);
    }
}
