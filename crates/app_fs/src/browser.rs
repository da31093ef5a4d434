//! Image listing for a single folder

use crate::{FsError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions the tagger offers for tagging (lowercase)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// An image file found in a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub path: PathBuf,
    pub name: String,
    pub extension: String,
}

impl ImageEntry {
    fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_string();
        let extension = path.extension()?.to_string_lossy().to_lowercase();
        Some(Self { path, name, extension })
    }
}

/// Check if a file has a taggable image extension
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or(false)
}

/// List the images directly inside `dir` (no recursion), in natural order.
/// Hidden files and subdirectories are skipped.
pub fn list_images<P: AsRef<Path>>(dir: P) -> Result<Vec<ImageEntry>> {
    let dir = dir.as_ref();

    if !dir.exists() {
        return Err(FsError::NotFound(dir.display().to_string()));
    }

    if !dir.is_dir() {
        return Err(FsError::InvalidPath(format!("Not a directory: {}", dir.display())));
    }

    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        // Skip entries we can't stat
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file || !is_supported_image(&path) {
            continue;
        }

        if let Some(image) = ImageEntry::from_path(path) {
            if !is_hidden_file(&image.path, &image.name) {
                entries.push(image);
            }
        }
    }

    entries.sort_by(|a, b| natural_sort_key(&a.name).cmp(&natural_sort_key(&b.name)));

    tracing::debug!("Listed {} images in {:?}", entries.len(), dir);
    Ok(entries)
}

/// Count the images in `dir`; a missing directory counts as empty
pub fn count_images<P: AsRef<Path>>(dir: P) -> Result<usize> {
    match list_images(dir) {
        Ok(entries) => Ok(entries.len()),
        Err(FsError::NotFound(_)) => Ok(0),
        Err(e) => Err(e),
    }
}

/// Generate a natural sort key (handles numbers correctly)
/// "image2.jpg" < "image10.jpg"
fn natural_sort_key(s: &str) -> Vec<NaturalSortPart> {
    let mut parts = Vec::new();
    let mut current_num = String::new();
    let mut current_str = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            if !current_str.is_empty() {
                parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
                current_str.clear();
            }
            current_num.push(c);
        } else {
            if !current_num.is_empty() {
                parts.push(NaturalSortPart::number(&current_num));
                current_num.clear();
            }
            current_str.push(c);
        }
    }

    if !current_num.is_empty() {
        parts.push(NaturalSortPart::number(&current_num));
    }
    if !current_str.is_empty() {
        parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
    }

    parts
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NaturalSortPart {
    Num(u64),
    Str(String),
}

impl NaturalSortPart {
    /// Digit runs too long for u64 fall back to string comparison
    fn number(digits: &str) -> Self {
        digits
            .parse::<u64>()
            .map(NaturalSortPart::Num)
            .unwrap_or_else(|_| NaturalSortPart::Str(digits.to_string()))
    }
}

#[cfg(windows)]
fn is_hidden_file(path: &Path, _name: &str) -> bool {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    fs::metadata(path)
        .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn is_hidden_file(_path: &Path, name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_sort() {
        let mut names = vec!["image10.jpg", "image2.jpg", "image1.jpg", "image20.jpg"];
        names.sort_by(|a, b| natural_sort_key(a).cmp(&natural_sort_key(b)));
        assert_eq!(names, vec!["image1.jpg", "image2.jpg", "image10.jpg", "image20.jpg"]);
    }

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("test.jpg")));
        assert!(is_supported_image(Path::new("test.PNG")));
        assert!(is_supported_image(Path::new("test.WebP")));
        assert!(!is_supported_image(Path::new("test.txt")));
        assert!(!is_supported_image(Path::new("tags.json")));
        assert!(!is_supported_image(Path::new("noext")));
    }

    #[test]
    fn test_list_images_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b10.png", "b2.jpg", "notes.txt", ".hidden.png", "a.GIF"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("sub.png")).unwrap();

        let names: Vec<String> = list_images(dir.path())
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();

        #[cfg(not(windows))]
        assert_eq!(names, vec!["a.GIF", "b2.jpg", "b10.png"]);
        #[cfg(windows)]
        assert_eq!(names, vec![".hidden.png", "a.GIF", "b2.jpg", "b10.png"]);
    }

    #[test]
    fn test_count_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(count_images(dir.path().join("missing")).unwrap(), 0);
        assert!(list_images(dir.path().join("missing")).is_err());
    }
}
