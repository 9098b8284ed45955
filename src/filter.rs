//! Selection of extracted images before archiving.
//!
//! Sits between extraction and archive building: drops images that are too
//! small or unwanted, optionally reverses page order, and gives the
//! survivors their final `001.<ext>` names.

use std::fmt;

use crate::mhtml::{Group, ImageAsset, page_file_name};
use crate::zip::{ArchiveEntry, ArchiveGroup};

/// Extensions accepted as loose image inputs.
pub const LOOSE_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Which images to keep and in which order.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Images smaller than this many bytes are dropped.
    pub min_size: usize,
    pub exclude_gifs: bool,
    /// Reverse page order after filtering.
    pub reverse: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooSmall { size: usize },
    GifExcluded,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TooSmall { size } => {
                write!(f, "Too Small ({}KB)", (*size as f64 / 1024.0).round() as u64)
            }
            RejectReason::GifExcluded => f.write_str("GIF Excluded"),
        }
    }
}

/// An image left out of the archive, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub sequence_index: usize,
    pub extension: String,
    pub reason: RejectReason,
}

/// A group ready for the archive plus what was filtered out of it.
#[derive(Debug, Clone)]
pub struct Selection {
    pub group: ArchiveGroup,
    pub rejected: Vec<Rejected>,
}

impl FilterOptions {
    fn reject_reason(&self, image: &ImageAsset) -> Option<RejectReason> {
        if image.size() < self.min_size {
            Some(RejectReason::TooSmall { size: image.size() })
        } else if self.exclude_gifs && image.extension == "gif" {
            Some(RejectReason::GifExcluded)
        } else {
            None
        }
    }
}

/// Filter, order and rename the images of `group`.
pub fn select(group: Group, options: &FilterOptions) -> Selection {
    let mut kept = Vec::with_capacity(group.images.len());
    let mut rejected = Vec::new();

    for image in group.images {
        match options.reject_reason(&image) {
            Some(reason) => rejected.push(Rejected {
                sequence_index: image.sequence_index,
                extension: image.extension,
                reason,
            }),
            None => kept.push(image),
        }
    }

    if options.reverse {
        kept.reverse();
    }

    let entries = kept
        .into_iter()
        .enumerate()
        .map(|(i, image)| ArchiveEntry::new(page_file_name(i, &image.extension), image.bytes))
        .collect();

    Selection {
        group: ArchiveGroup::new(group.name, entries),
        rejected,
    }
}

impl From<Group> for ArchiveGroup {
    /// Every image, in order, under its own page name.
    fn from(group: Group) -> Self {
        select(group, &FilterOptions::default()).group
    }
}

/// Whether `file_name` looks like a loose image input.
pub fn is_loose_image(file_name: &str) -> bool {
    loose_extension(file_name).is_some()
}

fn loose_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if !LOOSE_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    Some(if ext == "jpeg" { "jpg".to_string() } else { ext })
}

/// Gather standalone image files into one group named `Loose Images <ordinal>`.
///
/// Files are kept in the given order; names that are not image files are
/// ignored. Returns `None` when nothing is left.
pub fn loose_images(files: Vec<(String, Vec<u8>)>, ordinal: usize) -> Option<Group> {
    let images: Vec<ImageAsset> = files
        .into_iter()
        .filter_map(|(name, bytes)| Some((loose_extension(&name)?, bytes)))
        .enumerate()
        .map(|(sequence_index, (extension, bytes))| ImageAsset {
            sequence_index,
            extension,
            bytes,
        })
        .collect();

    if images.is_empty() {
        return None;
    }

    Some(Group {
        name: format!("Loose Images {}", ordinal),
        images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(index: usize, ext: &str, size: usize) -> ImageAsset {
        ImageAsset {
            sequence_index: index,
            extension: ext.to_string(),
            bytes: vec![index as u8; size],
        }
    }

    fn group() -> Group {
        Group {
            name: "Chapter 1 Test".into(),
            images: vec![
                image(0, "jpg", 5000),
                image(1, "gif", 4000),
                image(2, "png", 100),
                image(3, "jpg", 3000),
            ],
        }
    }

    fn names(selection: &Selection) -> Vec<&str> {
        selection
            .group
            .entries
            .iter()
            .map(|e| e.file_name.as_str())
            .collect()
    }

    #[test]
    fn default_keeps_everything_in_order() {
        let selection = select(group(), &FilterOptions::default());
        assert_eq!(names(&selection), vec!["001.jpg", "002.gif", "003.png", "004.jpg"]);
        assert!(selection.rejected.is_empty());
        assert_eq!(selection.group.name, "Chapter 1 Test");
    }

    #[test]
    fn filters_and_renumbers() {
        let options = FilterOptions {
            min_size: 1024,
            exclude_gifs: true,
            reverse: false,
        };
        let selection = select(group(), &options);
        assert_eq!(names(&selection), vec!["001.jpg", "002.jpg"]);
        assert_eq!(selection.group.entries[1].bytes[0], 3);

        let reasons: Vec<String> = selection.rejected.iter().map(|r| r.reason.to_string()).collect();
        assert_eq!(reasons, vec!["GIF Excluded", "Too Small (0KB)"]);
        assert_eq!(selection.rejected[1].sequence_index, 2);
    }

    #[test]
    fn reverse_applies_after_filtering() {
        let options = FilterOptions {
            min_size: 1024,
            exclude_gifs: false,
            reverse: true,
        };
        let selection = select(group(), &options);
        assert_eq!(names(&selection), vec!["001.jpg", "002.gif", "003.jpg"]);
        let firsts: Vec<u8> = selection.group.entries.iter().map(|e| e.bytes[0]).collect();
        assert_eq!(firsts, vec![3, 1, 0]);
    }

    #[test]
    fn group_converts_to_archive_group() {
        let archive_group: ArchiveGroup = group().into();
        assert_eq!(archive_group.entries.len(), 4);
        assert_eq!(archive_group.entries[3].file_name, "004.jpg");
    }

    #[test]
    fn loose_images_group() {
        let files = vec![
            ("b.JPEG".to_string(), vec![1u8; 20]),
            ("notes.txt".to_string(), vec![2u8; 20]),
            ("a.webp".to_string(), vec![3u8; 20]),
        ];
        let group = loose_images(files, 3).unwrap();
        assert_eq!(group.name, "Loose Images 3");
        let exts: Vec<&str> = group.images.iter().map(|i| i.extension.as_str()).collect();
        assert_eq!(exts, vec!["jpg", "webp"]);
        assert_eq!(group.images[1].sequence_index, 1);

        assert!(loose_images(vec![("x.gif".into(), vec![0])], 1).is_none());
        assert!(is_loose_image("scan.PNG"));
        assert!(!is_loose_image("chapter.mhtml"));
    }
}
