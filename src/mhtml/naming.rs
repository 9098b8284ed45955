//! Group names derived from source file names.

use std::sync::LazyLock;

use regex::Regex;

/// `<prefix><chapter|volume|ch.|vol.> <number><suffix>`; the marker and
/// number are captured together so they move as written.
static CHAPTER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*?)\b((?:chapter|volume|ch\.|vol\.)\s*\d+(?:\.\d+)?)(.*)$")
        .expect("valid chapter regex")
});

const SEPARATORS: &[char] = &[' ', '-', '_', ':', '|', ',', '~'];

/// Strip a trailing `.mht`/`.mhtml` extension, case-insensitively.
pub fn strip_mhtml_extension(file_name: &str) -> &str {
    let lower = file_name.to_ascii_lowercase();
    for ext in [".mhtml", ".mht"] {
        if lower.ends_with(ext) {
            return &file_name[..file_name.len() - ext.len()];
        }
    }
    file_name
}

/// Build a group name from a source file name.
///
/// The MHTML extension is dropped and a chapter or volume marker, if
/// present, is moved to the front:
///
/// ```
/// use mhtzip::mhtml::group_name;
///
/// assert_eq!(group_name("My Manga Chapter 12.mhtml"), "Chapter 12 My Manga");
/// assert_eq!(group_name("Artbook.mht"), "Artbook");
/// ```
pub fn group_name(file_name: &str) -> String {
    let stem = strip_mhtml_extension(file_name);

    let Some(caps) = CHAPTER_MARKER.captures(stem) else {
        return stem.to_string();
    };

    let prefix = caps[1].trim_end_matches(SEPARATORS);
    let suffix = caps[3].trim_start_matches(SEPARATORS);
    let reordered = format!("{} {} {}", &caps[2], prefix, suffix);

    collapse_whitespace(&reordered)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_extensions() {
        assert_eq!(strip_mhtml_extension("a.MHTML"), "a");
        assert_eq!(strip_mhtml_extension("a.mht"), "a");
        assert_eq!(strip_mhtml_extension("a.html"), "a.html");
        assert_eq!(strip_mhtml_extension(".mht"), "");
    }

    #[test]
    fn moves_chapter_marker_to_front() {
        assert_eq!(group_name("My Manga Chapter 12"), "Chapter 12 My Manga");
        assert_eq!(group_name("My Manga - Chapter 12 - The End.mhtml"), "Chapter 12 My Manga The End");
        assert_eq!(group_name("Series ch.7.5 raw.mht"), "ch.7.5 Series raw");
        assert_eq!(group_name("Series Vol.3"), "Vol.3 Series");
        assert_eq!(group_name("Title Ch. 5"), "Ch. 5 Title");
        assert_eq!(group_name("Chapter 5"), "Chapter 5");
        assert_eq!(group_name("Big  Title   volume 02"), "volume 02 Big Title");
    }

    #[test]
    fn leaves_unmarked_names_alone() {
        assert_eq!(group_name("Gallery  Export.mhtml"), "Gallery  Export");
        assert_eq!(group_name("Chapterhouse"), "Chapterhouse");
        assert_eq!(group_name("Rich.5"), "Rich.5");
    }
}
