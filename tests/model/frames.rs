use adblock_sitekey::FrameTree;

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "http://page.example.com/";
    const FRAME: &str = "http://frame.example.com/embed.html";
    const IMAGE: &str = "http://cdn.example.com/ad.png";

    #[test]
    fn test_parents_are_root_first() {
        let frames = FrameTree::new();
        frames.record(FRAME, PAGE);
        frames.record(IMAGE, FRAME);

        assert_eq!(frames.parents_of(IMAGE).as_slice(), [PAGE, FRAME]);
        assert_eq!(frames.parents_of(FRAME).as_slice(), [PAGE]);
        assert!(frames.parents_of(PAGE).is_empty());
    }

    #[test]
    fn test_chain_with_ends_with_url() {
        let frames = FrameTree::new();
        frames.record(FRAME, PAGE);

        assert_eq!(frames.chain_with(FRAME).as_slice(), [PAGE, FRAME]);
        assert_eq!(frames.chain_with(PAGE).as_slice(), [PAGE]);
    }

    #[test]
    fn test_self_reference_is_ignored() {
        let frames = FrameTree::new();

        assert!(!frames.record(PAGE, PAGE));
        assert!(frames.is_empty());
    }

    #[test]
    fn test_referrer_loop_terminates() {
        let frames = FrameTree::new();
        frames.record(FRAME, PAGE);
        frames.record(PAGE, FRAME);

        let parents = frames.parents_of(IMAGE);
        assert!(parents.is_empty());
        assert_eq!(frames.parents_of(FRAME).as_slice(), [PAGE]);
    }

    #[test]
    fn test_clear() {
        let frames = FrameTree::new();
        frames.record(FRAME, PAGE);
        assert_eq!(frames.len(), 1);

        frames.clear();

        assert!(frames.is_empty());
        assert!(frames.parents_of(FRAME).is_empty());
    }
}
