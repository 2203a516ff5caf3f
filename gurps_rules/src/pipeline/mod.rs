//! File-backed entry points: database files in, shared database out

mod error;

pub use error::PipelineError;

use crate::character::{CharacterSnapshot, GurpsCharacter};
use crate::config::runtime::RuntimeConfig;
use crate::database::GurpsDatabase;
use crate::file_processor::{FileMetadata, FileProcessor};
use crate::log_info;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A loaded database plus what was read to build it
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub database: Arc<GurpsDatabase>,
    pub files: Vec<FileMetadata>,
    pub duration: Duration,
}

impl PipelineResult {
    pub fn total_lines(&self) -> usize {
        self.files.iter().map(|file| file.line_count).sum()
    }
}

/// Read every database file in order and load them as one database
pub fn load_database_files<P: AsRef<str>>(
    paths: &[P],
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    if paths.is_empty() {
        return Err(PipelineError::pipeline_error("no database files given"));
    }

    log_info!("Starting database load pipeline", "files" => paths.len());

    let processor = FileProcessor::from_preferences(&config.file_processor);
    let mut sources = Vec::with_capacity(paths.len());
    let mut files = Vec::with_capacity(paths.len());

    for path in paths {
        let result = processor.process_file(path.as_ref())?;
        files.push(result.metadata.clone());
        sources.push(result.into_source_text());
    }

    let database = GurpsDatabase::load(&sources, &config.loader)?;

    Ok(PipelineResult {
        database: Arc::new(database),
        files,
        duration: start_time.elapsed(),
    })
}

/// Read a saved character and rebuild it against `database`
pub fn load_character_file(
    path: &str,
    database: Arc<GurpsDatabase>,
    config: &RuntimeConfig,
) -> Result<GurpsCharacter, PipelineError> {
    let processor =
        FileProcessor::from_preferences(&config.file_processor).with_data_extension_required(false);
    let result = processor.process_file(path)?;

    let snapshot = CharacterSnapshot::from_json(&result.source)?;
    Ok(GurpsCharacter::from_snapshot(database, &snapshot)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::LoaderPreferences;
    use crate::database::ErrorKind;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    const CORE: &str = "\
# Core attributes
ST : 10 * level
DX : 20 * level
IQ : 20 * level
HT : 10 * level
Thrust = ST - 2
Swing = ST + 1
Basic Speed x4 = DX + HT
";

    const RACES: &str = "\
Human : 0 {
 ST += 10
 DX += 10
 IQ += 10
 HT += 10
}
Lift = ST*ST/5
Guns : DX E
";

    fn config() -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.loader = LoaderPreferences {
            core_attributes: crate::config::runtime::DEFAULT_CORE_ATTRIBUTES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            apply_presentation_tweaks: true,
        };
        config.file_processor.require_data_extension = false;
        config
    }

    #[test]
    fn test_files_load_into_one_database() {
        let dir = tempdir().unwrap();
        let core = dir.path().join("core.gurpenator_data");
        let races = dir.path().join("races.gurpenator_data");
        fs::write(&core, CORE).unwrap();
        fs::write(&races, RACES).unwrap();

        let paths = [core.to_str().unwrap(), races.to_str().unwrap()];
        let result = load_database_files(&paths, &config()).unwrap();

        assert_eq!(result.files.len(), 2);
        assert_eq!(result.database.len(), 10);
        assert_eq!(result.total_lines(), CORE.lines().count() + RACES.lines().count());

        let lift = result.database.get("Lift").unwrap();
        assert!(lift.location.path().ends_with("races.gurpenator_data"));
    }

    #[test]
    fn test_human_character_from_files() {
        let dir = tempdir().unwrap();
        let core = dir.path().join("core.txt");
        let races = dir.path().join("races.txt");
        let sheet = dir.path().join("conan.json");
        fs::write(&core, CORE).unwrap();
        fs::write(&races, RACES).unwrap();
        fs::write(
            &sheet,
            r#"{"name": "Conan", "purchases": {"Human": 1, "ST": 2, "Guns": 2}}"#,
        )
        .unwrap();

        let paths = [core.to_str().unwrap(), races.to_str().unwrap()];
        let result = load_database_files(&paths, &config()).unwrap();
        let character =
            load_character_file(sheet.to_str().unwrap(), result.database, &config()).unwrap();

        assert_eq!(character.name(), "Conan");
        assert_eq!(character.level("Lift").unwrap(), Some(28));
        assert_eq!(character.formatted("Thrust").unwrap(), "2d+2");
        assert_eq!(character.formatted("Basic Speed x4").unwrap(), "5");
        assert_eq!(character.level("Guns").unwrap(), Some(11));
    }

    #[test]
    fn test_error_location_names_the_file() {
        let dir = tempdir().unwrap();
        let core = dir.path().join("core.txt");
        let broken = dir.path().join("broken.txt");
        fs::write(&core, CORE).unwrap();
        fs::write(&broken, "Lift = ST *\n").unwrap();

        let paths = [core.to_str().unwrap(), broken.to_str().unwrap()];
        match load_database_files(&paths, &config()) {
            Err(PipelineError::DatabaseLoad(error)) => {
                assert_eq!(error.kind(), ErrorKind::FormulaSyntax);
                let location = error.location().unwrap();
                assert!(location.path().ends_with("broken.txt"));
                assert_eq!(location.line(), 1);
            }
            other => panic!("expected a load error, got {:?}", other.map(|r| r.files)),
        }
    }

    #[test]
    fn test_missing_file() {
        assert_matches!(
            load_database_files(&["does_not_exist.txt"], &config()),
            Err(PipelineError::FileProcessing(_))
        );
    }

    #[test]
    fn test_no_files() {
        let paths: [&str; 0] = [];
        assert_matches!(
            load_database_files(&paths, &config()),
            Err(PipelineError::Pipeline { .. })
        );
    }
}
