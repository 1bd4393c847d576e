//! CSV reports.
//!
//! Every report type is a serde row struct with a fixed file name. A [`ReportWriter`] owns one
//! open CSV file at `<directory>/<file_prefix><name>.csv` and appends rows to it.
use std::fs::{create_dir_all, File};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use csv::Writer;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::history::History;
use crate::random::RandomSource;
use crate::simulation::Simulation;
use crate::status::InfectionStatus;

pub trait Report: Serialize {
    /// File name of the report, without prefix or extension.
    const NAME: &'static str;
}

/// Where reports go and what happens to files that are already there.
#[derive(Clone, Debug, Default)]
pub struct ReportOptions {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub overwrite: bool,
}

impl ReportOptions {
    #[must_use]
    pub fn new() -> Self {
        ReportOptions::default()
    }

    pub fn directory(&mut self, directory: PathBuf) -> &mut Self {
        self.directory = directory;
        self
    }

    pub fn file_prefix(&mut self, file_prefix: String) -> &mut Self {
        self.file_prefix = file_prefix;
        self
    }

    pub fn overwrite(&mut self, overwrite: bool) -> &mut Self {
        self.overwrite = overwrite;
        self
    }

    /// Full path of the file the report `T` is written to.
    #[must_use]
    pub fn path_for<T: Report>(&self) -> PathBuf {
        self.directory
            .join(format!("{}{}.csv", self.file_prefix, T::NAME))
    }
}

// Creates the file and any missing parent directories. Refuses to replace an existing file
// unless `overwrite` is set.
fn generate_validate_filepath(path: &Path, overwrite: bool) -> Result<File, SimulationError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    if !overwrite && path.exists() {
        return Err(SimulationError::ReportError(format!(
            "{} already exists; use --force-overwrite to replace it",
            path.display()
        )));
    }
    Ok(File::create(path)?)
}

/// An open CSV file receiving rows of one report type.
pub struct ReportWriter<T: Report> {
    writer: Writer<File>,
    path: PathBuf,
    rows: usize,
    _report: PhantomData<fn(&T)>,
}

impl<T: Report> ReportWriter<T> {
    /// # Errors
    ///
    /// Returns `SimulationError::ReportError` if the file exists and `options.overwrite` is not
    /// set, or `SimulationError::IoError` if the file or its directory cannot be created.
    pub fn create(options: &ReportOptions) -> Result<Self, SimulationError> {
        let path = options.path_for::<T>();
        let file = generate_validate_filepath(&path, options.overwrite)?;
        Ok(ReportWriter {
            writer: Writer::from_writer(file),
            path,
            rows: 0,
            _report: PhantomData,
        })
    }

    /// Appends one row and flushes it to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be serialized or written.
    pub fn send(&mut self, row: &T) -> Result<(), SimulationError> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written so far, header excluded.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }
}

/// Status counts and transitions after one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: usize,
    pub susceptible: usize,
    pub infected: usize,
    pub immune: usize,
    pub deceased: usize,
    pub saturated: bool,
    pub new_infections: usize,
    pub recoveries: usize,
    pub deaths: usize,
}

impl Report for TickReport {
    const NAME: &'static str = "ticks";
}

impl TickReport {
    #[must_use]
    pub fn from_simulation<R: RandomSource>(simulation: &Simulation<R>) -> Self {
        let counts = simulation.counts();
        let tally = simulation.last_tally();
        TickReport {
            tick: simulation.tick(),
            susceptible: counts[InfectionStatus::Susceptible],
            infected: counts[InfectionStatus::Infected],
            immune: counts[InfectionStatus::Immune],
            deceased: counts[InfectionStatus::Deceased],
            saturated: simulation.is_saturated(),
            new_infections: tally.infections,
            recoveries: tally.recoveries,
            deaths: tally.deaths,
        }
    }
}

/// One history sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryReport {
    pub tick: usize,
    pub infected: usize,
}

impl Report for HistoryReport {
    const NAME: &'static str = "history";
}

/// Writes the whole history, seed sample included, and returns the path written.
///
/// # Errors
///
/// Returns an error if the report file cannot be created or written.
pub fn write_history(options: &ReportOptions, history: &History) -> Result<PathBuf, SimulationError> {
    let mut writer = ReportWriter::<HistoryReport>::create(options)?;
    for (tick, &infected) in history.samples().iter().enumerate() {
        writer.send(&HistoryReport { tick, infected })?;
    }
    Ok(writer.path().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::Parameters;
    use crate::random::SeededRandom;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Serialize, Deserialize)]
    struct SampleReport {
        id: u32,
        value: String,
    }

    impl Report for SampleReport {
        const NAME: &'static str = "sample";
    }

    fn options_in(directory: &Path) -> ReportOptions {
        let mut options = ReportOptions::new();
        options.directory(directory.to_path_buf());
        options
    }

    #[test]
    fn file_name_uses_prefix_and_name() {
        let mut options = ReportOptions::new();
        options
            .directory(PathBuf::from("out"))
            .file_prefix("run1_".to_string());
        assert_eq!(
            options.path_for::<SampleReport>(),
            PathBuf::from("out").join("run1_sample.csv")
        );
        assert_eq!(
            options.path_for::<HistoryReport>(),
            PathBuf::from("out").join("run1_history.csv")
        );
    }

    #[test]
    fn send_writes_rows_with_header() {
        let temp_dir = tempdir().unwrap();
        let options = options_in(temp_dir.path());
        let mut writer = ReportWriter::<SampleReport>::create(&options).unwrap();
        writer
            .send(&SampleReport {
                id: 1,
                value: "Value,1".to_string(),
            })
            .unwrap();
        writer
            .send(&SampleReport {
                id: 2,
                value: "Value\n2".to_string(),
            })
            .unwrap();
        assert_eq!(writer.rows(), 2);

        let mut reader = csv::Reader::from_path(writer.path()).unwrap();
        let records: Vec<SampleReport> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].value, "Value,1");
        assert_eq!(records[1].value, "Value\n2");
    }

    #[test]
    fn missing_directories_are_created() {
        let temp_dir = tempdir().unwrap();
        let options = options_in(&temp_dir.path().join("nested").join("deeper"));
        let writer = ReportWriter::<SampleReport>::create(&options).unwrap();
        assert!(writer.path().exists());
    }

    #[test]
    fn existing_files_are_kept_without_overwrite() {
        let temp_dir = tempdir().unwrap();
        let mut options = options_in(temp_dir.path());
        let path = options.path_for::<SampleReport>();
        fs::write(&path, "keep me").unwrap();

        let result = ReportWriter::<SampleReport>::create(&options);
        assert!(matches!(result, Err(SimulationError::ReportError(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");

        options.overwrite(true);
        let mut writer = ReportWriter::<SampleReport>::create(&options).unwrap();
        writer
            .send(&SampleReport {
                id: 7,
                value: "new".to_string(),
            })
            .unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("id,value"));
    }

    #[test]
    fn history_report_includes_the_seed_sample() {
        let temp_dir = tempdir().unwrap();
        let options = options_in(temp_dir.path());
        let mut history = History::seeded();
        history.record(4);
        history.record(6);

        let path = write_history(&options, &history).unwrap();
        let mut reader = csv::Reader::from_path(path).unwrap();
        let rows: Vec<HistoryReport> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(
            rows,
            vec![
                HistoryReport {
                    tick: 0,
                    infected: 0
                },
                HistoryReport {
                    tick: 1,
                    infected: 4
                },
                HistoryReport {
                    tick: 2,
                    infected: 6
                },
            ]
        );
    }

    #[test]
    fn tick_report_reflects_the_simulation() {
        let parameters = Parameters {
            population_size: 120,
            ..Parameters::default()
        };
        let mut simulation = Simulation::new(parameters, SeededRandom::new(17)).unwrap();
        simulation.step();
        let row = TickReport::from_simulation(&simulation);
        assert_eq!(row.tick, 1);
        assert_eq!(
            row.susceptible + row.infected + row.immune + row.deceased,
            120
        );
        assert_eq!(row.infected, simulation.history().latest());
        assert_eq!(row.saturated, simulation.is_saturated());
    }
}
