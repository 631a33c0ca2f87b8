//! Remote image identifiers.

/// Build the vendor-side key for an image.
///
/// The components are joined with `-` in a fixed order and are not escaped,
/// so names are expected to have passed file name validation already.
///
/// ```
/// use fileshare::image::build_id;
///
/// assert_eq!(build_id("alice", 7, "cat"), "alice-7-cat");
/// ```
pub fn build_id(username: &str, folder_id: i64, file_name: &str) -> String {
    format!("{username}-{folder_id}-{file_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_id_joins_in_order() {
        assert_eq!(build_id("alice", 7, "cat"), "alice-7-cat");
        assert_eq!(build_id("bob", 120, "img01"), "bob-120-img01");
    }

    #[test]
    fn test_build_id_does_not_normalize() {
        assert_eq!(build_id("Alice", 1, "Cat Pic"), "Alice-1-Cat Pic");
        assert_eq!(build_id("", 0, ""), "-0-");
    }

    #[test]
    fn test_build_id_hyphenated_components_can_collide() {
        assert_eq!(build_id("a-1", 2, "x"), "a-1-2-x");
        assert_eq!(build_id("a", 1, "2-x"), "a-1-2-x");
    }
}
