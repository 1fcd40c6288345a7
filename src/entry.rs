use std::path::Path;

use crate::explorer::path::RemotePath;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_directory: bool,
    /// Always `None` for directories.
    pub size_bytes: Option<u64>,
    pub modified_at: String,
}

impl DirectoryEntry {
    pub fn file(name: impl Into<String>, size: u64, modified_at: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
            size_bytes: Some(size),
            modified_at: modified_at.into(),
        }
    }

    pub fn directory(name: impl Into<String>, modified_at: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
            size_bytes: None,
            modified_at: modified_at.into(),
        }
    }

    pub fn kind(&self) -> FileKind {
        FileKind::classify(&self.name, self.is_directory)
    }
}

/// A search hit; unlike a listing row it may live in any descendant folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultEntry {
    pub entry: DirectoryEntry,
    pub full_path: RemotePath,
}

/// Autocomplete candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub name: String,
    pub is_directory: bool,
    pub full_path: RemotePath,
}

/// A listing together with the directory the server says it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub path: RemotePath,
    pub entries: Vec<DirectoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchOutcome {
    pub results: Vec<SearchResultEntry>,
    pub timed_out: bool,
    pub folders_visited: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Folder,
    Pdf,
    Spreadsheet,
    Document,
    Presentation,
    Image,
    Archive,
    Text,
    Other,
}

impl FileKind {
    pub fn classify(name: &str, is_directory: bool) -> Self {
        if is_directory {
            return FileKind::Folder;
        }

        let Some(extension) = Path::new(name).extension().and_then(|e| e.to_str()) else {
            return FileKind::Other;
        };

        match extension.to_lowercase().as_str() {
            "pdf" => FileKind::Pdf,
            "xlsx" | "xls" | "xlsm" | "xlsb" | "csv" => FileKind::Spreadsheet,
            "docx" | "doc" => FileKind::Document,
            "pptx" | "ppt" => FileKind::Presentation,
            "jpg" | "jpeg" | "png" | "gif" | "bmp" => FileKind::Image,
            "zip" | "rar" | "7z" | "tar" | "gz" => FileKind::Archive,
            "txt" | "log" | "md" => FileKind::Text,
            _ => FileKind::Other,
        }
    }

    /// Short tag used by the console listing.
    pub fn tag(self) -> &'static str {
        match self {
            FileKind::Folder => "DIR",
            FileKind::Pdf => "PDF",
            FileKind::Spreadsheet => "XLS",
            FileKind::Document => "DOC",
            FileKind::Presentation => "PPT",
            FileKind::Image => "IMG",
            FileKind::Archive => "ZIP",
            FileKind::Text => "TXT",
            FileKind::Other => "---",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_extension_case_insensitively() {
        assert_eq!(FileKind::classify("Informe.PDF", false), FileKind::Pdf);
        assert_eq!(FileKind::classify("maestra.xlsb", false), FileKind::Spreadsheet);
        assert_eq!(FileKind::classify("fotos.tar.gz", false), FileKind::Archive);
        assert_eq!(FileKind::classify("LEEME", false), FileKind::Other);
    }

    #[test]
    fn directories_are_folders_whatever_the_name() {
        assert_eq!(FileKind::classify("backup.zip", true), FileKind::Folder);
        assert_eq!(DirectoryEntry::directory("x.pdf", "").kind(), FileKind::Folder);
    }

    #[test]
    fn directories_carry_no_size() {
        assert_eq!(DirectoryEntry::directory("a", "2024-01-01").size_bytes, None);
        assert_eq!(DirectoryEntry::file("a.txt", 3, "").size_bytes, Some(3));
    }
}
