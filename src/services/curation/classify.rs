pub const DISLIKED_PREFIX: &str = "disliked_";
pub const QUEUE_SUFFIX: &str = " Queue";

/// How a playlist takes part in curation, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistKind<'a> {
    /// Holds tracks the user dislikes. Source of the disliked index, never pruned itself.
    Disliked,
    /// Holds candidate tracks for `base_name`.
    Queue { base_name: &'a str },
    Regular,
}

/// Classify a playlist by name. The disliked prefix wins over the queue suffix.
pub fn classify(playlist_name: &str) -> PlaylistKind<'_> {
    if playlist_name.starts_with(DISLIKED_PREFIX) {
        return PlaylistKind::Disliked;
    }

    match playlist_name.strip_suffix(QUEUE_SUFFIX) {
        Some(base_name) => PlaylistKind::Queue { base_name },
        None => PlaylistKind::Regular,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_disliked() {
        assert_eq!(classify("disliked_rock"), PlaylistKind::Disliked);
        assert_eq!(classify("disliked_"), PlaylistKind::Disliked);
    }

    #[test]
    fn test_classify_queue() {
        assert_eq!(
            classify("Favorites Queue"),
            PlaylistKind::Queue {
                base_name: "Favorites"
            }
        );
        // Only the trailing suffix is stripped
        assert_eq!(
            classify("Queue Queue"),
            PlaylistKind::Queue { base_name: "Queue" }
        );
    }

    #[test]
    fn test_classify_regular() {
        assert_eq!(classify("Favorites"), PlaylistKind::Regular);
        assert_eq!(classify("Favorites queue"), PlaylistKind::Regular);
        assert_eq!(classify("Queue of songs"), PlaylistKind::Regular);
        assert_eq!(classify("Disliked_rock"), PlaylistKind::Regular);
        assert_eq!(classify(""), PlaylistKind::Regular);
    }

    #[test]
    fn test_disliked_prefix_wins_over_queue_suffix() {
        assert_eq!(classify("disliked_pop Queue"), PlaylistKind::Disliked);
    }
}
