use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn, Level};

use crate::error::{ErgRsError, ImportExportError, Result};
use crate::models::WorkoutEntry;

pub mod csv;
pub mod json;
pub mod validation;

/// Trait for importing workout data from different file formats
pub trait ImportFormat {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Import workout entries from the file
    fn import_file(&self, file_path: &Path) -> Result<Vec<WorkoutEntry>>;

    /// Get the format name for this importer
    fn get_format_name(&self) -> &'static str;
}

/// Manager for coordinating the available import formats
pub struct ImportManager {
    importers: Vec<Box<dyn ImportFormat>>,
}

impl ImportManager {
    pub fn new() -> Self {
        let importers: Vec<Box<dyn ImportFormat>> = vec![
            Box::new(json::JsonImporter::new()),
            Box::new(csv::CsvImporter::new()),
        ];

        Self { importers }
    }

    /// Import a single file, picking the importer by extension
    pub fn import_file(&self, file_path: &Path) -> Result<Vec<WorkoutEntry>> {
        for importer in &self.importers {
            if importer.can_import(file_path) {
                info!(
                    path = %file_path.display(),
                    format = importer.get_format_name(),
                    "Importing workout file"
                );
                return importer.import_file(file_path);
            }
        }

        let format = file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("unknown")
            .to_string();
        Err(ImportExportError::UnsupportedFormat { format }.into())
    }

    /// Import every supported file in a directory
    ///
    /// Files that fail to import are reported and skipped.
    pub fn import_directory(
        &self,
        dir_path: &Path,
        show_progress: bool,
    ) -> Result<Vec<WorkoutEntry>> {
        let mut all_entries = Vec::new();
        let files = self.collect_importable_files(dir_path)?;

        if files.is_empty() {
            warn!(path = %dir_path.display(), "No importable files found");
            return Ok(all_entries);
        }

        let pb = if show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            let template =
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({msg})";
            if let Ok(style) = ProgressStyle::default_bar().template(template) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        for file_path in files {
            let file_name = file_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            pb.set_message(format!("Processing {}", file_name));

            match self.import_file(&file_path) {
                Ok(mut entries) => {
                    info!(file = %file_name, count = entries.len(), "Imported workouts");
                    all_entries.append(&mut entries);
                }
                Err(e) => {
                    if e.severity().to_tracing_level() == Level::WARN {
                        warn!(file = %file_name, error = %e, "Skipping workout file");
                    } else {
                        error!(file = %file_name, error = %e, "Failed to import file");
                    }
                    pb.println(format!(
                        "✗ Failed to import {}: {}",
                        file_name,
                        e.user_message()
                    ));
                }
            }

            pb.inc(1);
        }

        pb.finish_with_message("Import complete");
        Ok(all_entries)
    }

    /// Import a file or a whole directory
    pub fn import_path(&self, path: &Path, show_progress: bool) -> Result<Vec<WorkoutEntry>> {
        if path.is_dir() {
            self.import_directory(path, show_progress)
        } else {
            self.import_file(path)
        }
    }

    /// Collect the importable files of a directory, sorted by name
    fn collect_importable_files(&self, dir_path: &Path) -> Result<Vec<PathBuf>> {
        if !dir_path.is_dir() {
            return Err(ErgRsError::Validation(format!(
                "Path is not a directory: {}",
                dir_path.display()
            )));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir_path)? {
            let path = entry?.path();
            if path.is_file() && self.can_import_file(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    pub fn can_import_file(&self, file_path: &Path) -> bool {
        self.importers.iter().any(|importer| importer.can_import(file_path))
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension() {
        let manager = ImportManager::new();
        let result = manager.import_file(Path::new("session.fit"));
        assert!(matches!(
            result,
            Err(ErgRsError::ImportExport(ImportExportError::UnsupportedFormat { ref format }))
                if format == "fit"
        ));
    }

    #[test]
    fn test_can_import_file() {
        let manager = ImportManager::new();
        assert!(manager.can_import_file(Path::new("a.json")));
        assert!(manager.can_import_file(Path::new("2024-01-01-intervals.csv")));
        assert!(!manager.can_import_file(Path::new("notes.txt")));
    }

    #[test]
    fn test_import_directory_requires_directory() {
        let manager = ImportManager::new();
        assert!(manager
            .import_directory(Path::new("/definitely/not/here"), false)
            .is_err());
    }
}
