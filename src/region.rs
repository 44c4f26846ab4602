use std::ops::{Index, Range};

/// A span of bytes within template text or generated render-script source,
/// used to point at the cause of an error.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub struct Region {
    /// Offset of the first byte.
    pub begin: usize,
    /// Offset one past the last byte.
    pub end: usize,
}

impl Region {
    #[inline]
    pub fn new(position: Range<usize>) -> Self {
        position.into()
    }

    /// Return an empty [`Region`] at the given offset, such as the end of a
    /// source that stopped too early.
    #[inline]
    pub fn at(offset: usize) -> Self {
        Self {
            begin: offset,
            end: offset,
        }
    }

    /// Return the text covered by the [`Region`], or an empty string when it
    /// does not fall on character boundaries of the source.
    pub fn literal<'source>(&self, source: &'source str) -> &'source str {
        source.get(self.begin..self.end).unwrap_or_default()
    }
}

impl Index<Region> for str {
    type Output = str;

    fn index(&self, region: Region) -> &Self::Output {
        &self[region.begin..region.end]
    }
}

impl From<Range<usize>> for Region {
    fn from(Range { start, end }: Range<usize>) -> Self {
        Self { begin: start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::Region;

    #[test]
    fn test_literal() {
        let source = "<%= name %>";
        let region = Region::new(4..8);

        assert_eq!(region.literal(source), "name");
        assert_eq!(&source[region], "name");
    }

    #[test]
    fn test_literal_outside_source() {
        assert_eq!(Region::new(7..15).literal("short"), "");
        assert_eq!(Region::at(5).literal("short"), "");
        assert_eq!(Region::new(1..3).literal("日本"), "");
    }
}
