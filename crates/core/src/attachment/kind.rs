//! File-type classification by extension.

use serde::Serialize;

/// Extensions rendered inline as images unless configured otherwise.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

/// Semantic category of an attached file.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Image,
    Pdf,
    Document,
    Spreadsheet,
    Archive,
    Generic,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Image => "image",
            FileCategory::Pdf => "pdf",
            FileCategory::Document => "document",
            FileCategory::Spreadsheet => "spreadsheet",
            FileCategory::Archive => "archive",
            FileCategory::Generic => "generic",
        }
    }
}

/// Lowercased text after the last `.`, or the whole name when there is none.
pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

fn classify_extension(ext: &str, is_image: bool) -> FileCategory {
    if is_image {
        return FileCategory::Image;
    }
    match ext {
        "pdf" => FileCategory::Pdf,
        "doc" | "docx" => FileCategory::Document,
        "xls" | "xlsx" => FileCategory::Spreadsheet,
        "zip" | "rar" | "7z" => FileCategory::Archive,
        _ => FileCategory::Generic,
    }
}

/// Classify with the default image extensions.
pub fn classify_file(filename: &str) -> FileCategory {
    let ext = file_extension(filename);
    classify_extension(&ext, DEFAULT_IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether the default image extensions include this file's extension.
pub fn is_image(filename: &str) -> bool {
    DEFAULT_IMAGE_EXTENSIONS.contains(&file_extension(filename).as_str())
}

/// Classifier with the image extension set taken from configuration.
#[derive(Debug, Clone)]
pub struct FileClassifier {
    image_extensions: Vec<String>,
}

impl Default for FileClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_EXTENSIONS.iter().copied())
    }
}

impl FileClassifier {
    pub fn new<I, S>(image_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            image_extensions: image_extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn is_image(&self, filename: &str) -> bool {
        let ext = file_extension(filename);
        self.image_extensions.iter().any(|e| *e == ext)
    }

    pub fn classify(&self, filename: &str) -> FileCategory {
        let ext = file_extension(filename);
        classify_extension(&ext, self.image_extensions.iter().any(|e| *e == ext))
    }
}
