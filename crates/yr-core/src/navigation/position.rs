use serde::{Deserialize, Serialize};

/// Offset between a page index and the media identifier used by the content
/// numbering (slide images are numbered from 1).
pub const MEDIA_ID_OFFSET: usize = 1;

/// Zero-based index of a slide in the presentation
pub type PageIndex = usize;

/// Navigation intent normalised from any gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards the next slide (+1)
    Forward,
    /// Towards the previous slide (-1)
    Backward,
}

impl Direction {
    /// Direction from the sign of a delta; zero has no direction
    pub fn from_sign(value: f32) -> Option<Self> {
        if value > 0.0 {
            Some(Direction::Forward)
        } else if value < 0.0 {
            Some(Direction::Backward)
        } else {
            None
        }
    }

    /// Signed unit step
    pub fn step(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    /// Apply this direction to `page`, returning `None` when the result leaves `[0, total)`
    pub fn apply(self, page: PageIndex, total: usize) -> Option<PageIndex> {
        let next = page as i64 + self.step();
        if next < 0 || next >= total as i64 {
            None
        } else {
            Some(next as PageIndex)
        }
    }
}

/// Identifier of a slide's primary media in the content numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(pub usize);

impl MediaId {
    /// Media identifier of the slide at `page`
    pub fn for_page(page: PageIndex) -> Self {
        MediaId(page + MEDIA_ID_OFFSET)
    }

    /// Page index whose media this is, if the id is inside the numbering
    pub fn page(self) -> Option<PageIndex> {
        self.0.checked_sub(MEDIA_ID_OFFSET)
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "media#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_apply_bounds() {
        assert_eq!(Direction::Forward.apply(0, 5), Some(1));
        assert_eq!(Direction::Forward.apply(4, 5), None);
        assert_eq!(Direction::Backward.apply(0, 5), None);
        assert_eq!(Direction::Backward.apply(3, 5), Some(2));
    }

    #[test]
    fn test_direction_from_sign() {
        assert_eq!(Direction::from_sign(40.0), Some(Direction::Forward));
        assert_eq!(Direction::from_sign(-0.5), Some(Direction::Backward));
        assert_eq!(Direction::from_sign(0.0), None);
    }

    #[test]
    fn test_media_id_mapping() {
        assert_eq!(MediaId::for_page(0), MediaId(1));
        assert_eq!(MediaId::for_page(23), MediaId(24));
        assert_eq!(MediaId(1).page(), Some(0));
        assert_eq!(MediaId(0).page(), None);
    }
}
