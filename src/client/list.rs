use serde::Serialize;

use crate::models::File;

/// MIME types rendered as an inline image preview.
pub const IMAGE_PREVIEW_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/svg+xml"];

pub const MAX_NAME_LENGTH: usize = 150;

pub const EMPTY_LIST_HINT: &str = "Drop files anywhere. Or just click in the area above.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "src", rename_all = "snake_case")]
pub enum FileIcon {
    ImagePreview(String),
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRow {
    pub id: String,
    pub display_name: String,
    pub icon: FileIcon,
    pub version: i32,
}

impl From<&File> for FileRow {
    fn from(file: &File) -> Self {
        Self {
            id: file.id.clone(),
            display_name: truncate(&file.name),
            icon: icon_for(file),
            version: file.version,
        }
    }
}

pub fn icon_for(file: &File) -> FileIcon {
    if IMAGE_PREVIEW_TYPES.contains(&file.file_type.as_str()) {
        FileIcon::ImagePreview(file.url.clone())
    } else {
        FileIcon::Generic
    }
}

/// Cuts `value` to `MAX_NAME_LENGTH` characters and appends `...` when longer.
pub fn truncate(value: &str) -> String {
    if value.chars().count() > MAX_NAME_LENGTH {
        let mut output: String = value.chars().take(MAX_NAME_LENGTH).collect();
        output.push_str("...");
        output
    } else {
        value.to_string()
    }
}

pub fn rows(files: &[File]) -> Vec<FileRow> {
    files.iter().map(FileRow::from).collect()
}

/// Plain-text rendering of the list, one row per line.
pub fn render(files: &[File]) -> String {
    if files.is_empty() {
        return EMPTY_LIST_HINT.to_string();
    }

    rows(files)
        .iter()
        .map(|row| {
            let icon = match &row.icon {
                FileIcon::ImagePreview(_) => "[img]",
                FileIcon::Generic => "[file]",
            };
            format!("{} {}  v{}  {}", icon, row.display_name, row.version, row.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
