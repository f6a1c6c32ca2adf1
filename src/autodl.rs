use crate::config::FilterProfile;
use crate::models::Movie;
use crate::utils::error::{AppError, AppResult};
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only store over the autodl-irssi filter file. Every entry is a
/// `[filter <Name>]` block followed by the parameter lines of the profile;
/// existing blocks are never rewritten, reordered, or removed.
///
/// The file is opened, fully read or appended, and closed within a single
/// call. Runs are expected to be invoked serially; there is no file locking.
pub struct AutodlFile {
    path: PathBuf,
    profile: FilterProfile,
    marker: Regex,
}

impl AutodlFile {
    pub fn new(path: impl Into<PathBuf>, profile: FilterProfile) -> AppResult<Self> {
        let marker = Regex::new(r"(?i)^\[filter (.*?)\]$")
            .map_err(|e| AppError::System(format!("Invalid filter marker pattern: {}", e)))?;

        Ok(Self {
            path: path.into(),
            profile,
            marker,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an empty file at the target path if none exists. Parent
    /// directories are not created; a missing directory is an error the
    /// operator has to resolve.
    pub fn ensure_exists(&self) -> AppResult<()> {
        if self.path.exists() {
            return Ok(());
        }

        std::fs::File::create(&self.path).map_err(|e| {
            AppError::ConfigIo(format!(
                "Failed to create autodl file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }

    /// Parses the file line by line and returns one movie per filter marker,
    /// in file order. Marker matching is case-insensitive, the captured name
    /// is kept verbatim. Parameter lines below a marker are passed over.
    pub fn read_entries(&self) -> AppResult<Vec<Movie>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            AppError::ConfigIo(format!(
                "Failed to read autodl file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(content
            .lines()
            .filter_map(|line| self.marker.captures(line))
            .map(|captures| Movie::new(&captures[1]))
            .collect())
    }

    /// Appends a filter block for every movie not already present in the
    /// file and returns the movies actually written, in input order. When
    /// nothing is new the file is not opened for writing at all, so a no-op
    /// run leaves no observable trace. The whole batch is written with a
    /// single call; a failure mid-write aborts the run and the next run
    /// recomputes the remaining difference.
    pub fn append_entries(&self, movies: &[Movie]) -> AppResult<Vec<Movie>> {
        let existing = self.read_entries()?;
        let to_write: Vec<Movie> = movies
            .iter()
            .filter(|movie| !existing.contains(movie))
            .cloned()
            .collect();

        if to_write.is_empty() {
            return Ok(to_write);
        }

        let mut block = String::new();
        for movie in &to_write {
            self.push_filter_block(&mut block, movie);
        }

        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                AppError::ConfigIo(format!(
                    "Failed to open autodl file {} for appending: {}",
                    self.path.display(),
                    e
                ))
            })?;

        file.write_all(block.as_bytes()).map_err(|e| {
            AppError::ConfigIo(format!(
                "Failed to append to autodl file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(to_write)
    }

    fn push_filter_block(&self, block: &mut String, movie: &Movie) {
        block.push('\n');
        block.push_str(&format!("[filter {}]\n", movie.name));
        block.push_str(&format!("shows = {}\n", movie.name));
        block.push_str(&format!("match-categories = {}\n", self.profile.match_categories));
        block.push_str(&format!("match-sites = {}\n", self.profile.match_sites));
        block.push_str(&format!("min-size = {}\n", self.profile.min_size));
        block.push_str(&format!("max-size = {}\n", self.profile.max_size));
        block.push_str(&format!("resolutions = {}\n", self.profile.resolutions));
        block.push_str(&format!("upload-type = {}\n", self.profile.upload_type));
        block.push_str(&format!("upload-watch-dir = {}\n", self.profile.upload_watch_dir));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "autodl-sync-cfg-{}-{}.cfg",
            name,
            std::process::id()
        ))
    }

    fn store(path: &Path) -> AutodlFile {
        AutodlFile::new(path, FilterProfile::default()).unwrap()
    }

    #[test]
    fn test_ensure_exists_creates_empty_file() {
        let path = scratch_path("create");
        let _ = std::fs::remove_file(&path);

        let autodl = store(&path);
        autodl.ensure_exists().unwrap();

        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
        assert!(autodl.read_entries().unwrap().is_empty());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_ensure_exists_does_not_create_parent_dirs() {
        let path = std::env::temp_dir()
            .join(format!("autodl-sync-missing-dir-{}", std::process::id()))
            .join("autodl.cfg");

        let err = store(&path).ensure_exists().unwrap_err();
        assert!(matches!(err, AppError::ConfigIo(_)));
    }

    #[test]
    fn test_read_entries_matches_markers_case_insensitively() {
        let path = scratch_path("read");
        std::fs::write(
            &path,
            "\n[filter Rukh]\nshows = Rukh\nmatch-sites = ar\n\n[FILTER The Survivalist]\nshows = The Survivalist\n\n[Filter Bokeh]\n",
        )
        .unwrap();

        let entries = store(&path).read_entries().unwrap();
        assert_eq!(
            entries,
            vec![
                Movie::new("Rukh"),
                Movie::new("The Survivalist"),
                Movie::new("Bokeh"),
            ]
        );

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_parameter_lines_are_not_entries() {
        let path = scratch_path("params");
        std::fs::write(
            &path,
            "[filter Arrival]\nshows = Arrival\nupload-watch-dir = /filter not-an-entry\n",
        )
        .unwrap();

        let entries = store(&path).read_entries().unwrap();
        assert_eq!(entries, vec![Movie::new("Arrival")]);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_then_read_round_trips() {
        let path = scratch_path("roundtrip");
        let _ = std::fs::remove_file(&path);
        let autodl = store(&path);
        autodl.ensure_exists().unwrap();

        let movies = vec![Movie::new("Interstellar"), Movie::new("Arrival")];
        let written = autodl.append_entries(&movies).unwrap();
        assert_eq!(written, movies);
        assert_eq!(autodl.read_entries().unwrap(), movies);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n[filter Interstellar]\nshows = Interstellar\n"));
        assert!(content.contains("match-categories = MovieHD\n"));
        assert!(content.contains("upload-watch-dir = /\n"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_is_idempotent() {
        let path = scratch_path("idempotent");
        let _ = std::fs::remove_file(&path);
        let autodl = store(&path);
        autodl.ensure_exists().unwrap();

        let movies = vec![Movie::new("Interstellar"), Movie::new("Arrival")];
        autodl.append_entries(&movies).unwrap();
        let after_first = std::fs::read_to_string(&path).unwrap();

        let written = autodl.append_entries(&movies).unwrap();
        let after_second = std::fs::read_to_string(&path).unwrap();

        assert!(written.is_empty());
        assert_eq!(after_first, after_second);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_existing_entries_are_skipped_in_input_order() {
        let path = scratch_path("dedup");
        std::fs::write(&path, "\n[filter Rukh]\nshows = Rukh\n").unwrap();
        let autodl = store(&path);

        let written = autodl
            .append_entries(&[
                Movie::new("Interstellar"),
                Movie::new("Rukh"),
                Movie::new("Arrival"),
            ])
            .unwrap();

        assert_eq!(written, vec![Movie::new("Interstellar"), Movie::new("Arrival")]);
        assert_eq!(
            autodl.read_entries().unwrap(),
            vec![
                Movie::new("Rukh"),
                Movie::new("Interstellar"),
                Movie::new("Arrival"),
            ]
        );

        std::fs::remove_file(&path).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_noop_append_never_opens_file_for_writing() {
        use std::os::unix::fs::PermissionsExt;

        let path = scratch_path("noop");
        std::fs::write(&path, "\n[filter Rukh]\nshows = Rukh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o444)).unwrap();

        // A read-only file would fail the append open; an empty diff must
        // not get that far.
        let written = store(&path).append_entries(&[Movie::new("Rukh")]).unwrap();
        assert!(written.is_empty());

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_with_custom_profile() {
        let path = scratch_path("profile");
        let _ = std::fs::remove_file(&path);
        let profile = FilterProfile {
            match_categories: "Movie4K".to_string(),
            match_sites: "btn".to_string(),
            min_size: "4GB".to_string(),
            max_size: "40GB".to_string(),
            resolutions: "2160p".to_string(),
            upload_type: "watchdir".to_string(),
            upload_watch_dir: "/downloads/movies_watch/".to_string(),
        };
        let autodl = AutodlFile::new(&path, profile).unwrap();
        autodl.ensure_exists().unwrap();

        autodl.append_entries(&[Movie::new("Dune Part Three")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("match-categories = Movie4K\n"));
        assert!(content.contains("resolutions = 2160p\n"));
        assert!(content.contains("upload-watch-dir = /downloads/movies_watch/\n"));

        std::fs::remove_file(&path).unwrap();
    }
}
