//! Timestep reporters: read-only observers the simulation calls once before the loop, once per
//! timestep (including timestep 0), and once after the loop.
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use csv::Writer;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::EpiabmError;
use crate::population::{CompartmentCounter, InfectionStatus, Population, Timestep};

pub trait TimestepReporter {
    fn setup(&mut self, population: &Population) -> Result<(), EpiabmError>;

    fn report(&mut self, population: &Population, timestep: Timestep) -> Result<(), EpiabmError>;

    fn teardown(&mut self) -> Result<(), EpiabmError> {
        Ok(())
    }
}

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist.
fn generate_validate_filepath(path: &Path) -> Result<File, EpiabmError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err(EpiabmError::ReportError(format!(
            "Report output files must be CSVs, got {}",
            path.display()
        ))),
    }
}

/// One row of the population compartment report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PopulationCompartmentRow {
    #[serde(rename = "timestep")]
    pub timestep: Timestep,
    pub susceptible: usize,
    pub exposed: usize,
    #[serde(rename = "InfectASympt")]
    pub infect_asympt: usize,
    #[serde(rename = "InfectMild")]
    pub infect_mild: usize,
    #[serde(rename = "InfectGP")]
    pub infect_gp: usize,
    #[serde(rename = "InfectHosp")]
    pub infect_hosp: usize,
    #[serde(rename = "InfectICU")]
    pub infect_icu: usize,
    #[serde(rename = "InfectICURecov")]
    pub infect_icu_recov: usize,
    pub recovered: usize,
    pub dead: usize,
}

impl PopulationCompartmentRow {
    pub fn new(timestep: Timestep, counter: &CompartmentCounter) -> Self {
        use InfectionStatus::*;

        PopulationCompartmentRow {
            timestep,
            susceptible: counter[Susceptible],
            exposed: counter[Exposed],
            infect_asympt: counter[InfectASympt],
            infect_mild: counter[InfectMild],
            infect_gp: counter[InfectGP],
            infect_hosp: counter[InfectHosp],
            infect_icu: counter[InfectICU],
            infect_icu_recov: counter[InfectICURecov],
            recovered: counter[Recovered],
            dead: counter[Dead],
        }
    }
}

/// One row of the cell compartment report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CellCompartmentRow {
    #[serde(rename = "timestep")]
    pub timestep: Timestep,
    #[serde(rename = "cell")]
    pub cell: usize,
    pub susceptible: usize,
    pub exposed: usize,
    #[serde(rename = "InfectASympt")]
    pub infect_asympt: usize,
    #[serde(rename = "InfectMild")]
    pub infect_mild: usize,
    #[serde(rename = "InfectGP")]
    pub infect_gp: usize,
    #[serde(rename = "InfectHosp")]
    pub infect_hosp: usize,
    #[serde(rename = "InfectICU")]
    pub infect_icu: usize,
    #[serde(rename = "InfectICURecov")]
    pub infect_icu_recov: usize,
    pub recovered: usize,
    pub dead: usize,
}

impl CellCompartmentRow {
    pub fn new(timestep: Timestep, cell: usize, counter: &CompartmentCounter) -> Self {
        let row = PopulationCompartmentRow::new(timestep, counter);
        CellCompartmentRow {
            timestep,
            cell,
            susceptible: row.susceptible,
            exposed: row.exposed,
            infect_asympt: row.infect_asympt,
            infect_mild: row.infect_mild,
            infect_gp: row.infect_gp,
            infect_hosp: row.infect_hosp,
            infect_icu: row.infect_icu,
            infect_icu_recov: row.infect_icu_recov,
            recovered: row.recovered,
            dead: row.dead,
        }
    }
}

// A CSV file that is opened on construction and closed by `close`. The header is written with the
// first row.
struct CsvOutput {
    path: PathBuf,
    writer: Option<Writer<File>>,
}

impl CsvOutput {
    fn create(path: &Path) -> Result<Self, EpiabmError> {
        let file = generate_validate_filepath(path)?;
        Ok(CsvOutput {
            path: path.to_path_buf(),
            writer: Some(Writer::from_writer(file)),
        })
    }

    fn write_row<T: Serialize>(&mut self, row: &T) -> Result<(), EpiabmError> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            EpiabmError::ReportError(format!("{} is already closed", self.path.display()))
        })?;
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), EpiabmError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            trace!("closed report {}", self.path.display());
        }
        Ok(())
    }
}

/// Writes one row per timestep with the number of people in each status across the whole
/// population.
pub struct PopulationCompartmentReporter {
    output: CsvOutput,
}

impl PopulationCompartmentReporter {
    /// Creates the output file, and any missing parent directories, at `path`. The path must end
    /// in `.csv`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, EpiabmError> {
        Ok(PopulationCompartmentReporter {
            output: CsvOutput::create(path.as_ref())?,
        })
    }
}

impl TimestepReporter for PopulationCompartmentReporter {
    fn setup(&mut self, population: &Population) -> Result<(), EpiabmError> {
        trace!(
            "population report for {} people at {}",
            population.total_people(),
            self.output.path.display()
        );
        Ok(())
    }

    fn report(&mut self, population: &Population, timestep: Timestep) -> Result<(), EpiabmError> {
        let counter = population.compartment_counter();
        self.output
            .write_row(&PopulationCompartmentRow::new(timestep, &counter))
    }

    fn teardown(&mut self) -> Result<(), EpiabmError> {
        self.output.close()
    }
}

/// Writes one row per cell per timestep with the number of the cell's people in each status.
pub struct CellCompartmentReporter {
    output: CsvOutput,
}

impl CellCompartmentReporter {
    /// Creates the output file, and any missing parent directories, at `path`. The path must end
    /// in `.csv`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, EpiabmError> {
        Ok(CellCompartmentReporter {
            output: CsvOutput::create(path.as_ref())?,
        })
    }
}

impl TimestepReporter for CellCompartmentReporter {
    fn setup(&mut self, population: &Population) -> Result<(), EpiabmError> {
        trace!(
            "cell report for {} cells at {}",
            population.cells().len(),
            self.output.path.display()
        );
        Ok(())
    }

    fn report(&mut self, population: &Population, timestep: Timestep) -> Result<(), EpiabmError> {
        for cell in population.cells() {
            let counter = cell.compartment_counter();
            self.output
                .write_row(&CellCompartmentRow::new(timestep, cell.index(), &counter))?;
        }
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), EpiabmError> {
        self.output.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::{PersonAddress, PopulationFactory};
    use strum::IntoEnumIterator;
    use tempfile::tempdir;

    fn population() -> Population {
        let mut population = PopulationFactory::make_population(2, 1, 6);
        population.initialize();
        population.update_person_status(PersonAddress::new(1, 0, 0), InfectionStatus::InfectGP, 1);
        population
    }

    fn read_rows(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let headers = reader.headers().unwrap().iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|record| record.unwrap().iter().map(String::from).collect())
            .collect();
        (headers, rows)
    }

    #[test]
    fn population_report() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("population.csv");
        let population = population();

        let mut reporter = PopulationCompartmentReporter::new(&path).unwrap();
        reporter.setup(&population).unwrap();
        reporter.report(&population, 0).unwrap();
        reporter.report(&population, 1).unwrap();
        reporter.teardown().unwrap();

        let (headers, rows) = read_rows(&path);
        assert_eq!(headers[0], "timestep");
        let statuses: Vec<&str> = InfectionStatus::iter().map(InfectionStatus::name).collect();
        assert_eq!(&headers[1..], statuses.as_slice());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "1");
        assert_eq!(rows[1][1], "5");

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let records: Vec<PopulationCompartmentRow> =
            reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(records[1].timestep, 1);
        assert_eq!(records[1].infect_gp, 1);
        assert_eq!(records[1].susceptible, 5);
        assert_eq!(
            records[0],
            PopulationCompartmentRow::new(0, &population.compartment_counter())
        );
    }

    #[test]
    fn cell_report() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("cells.csv");
        let population = population();

        let mut reporter = CellCompartmentReporter::new(&path).unwrap();
        reporter.setup(&population).unwrap();
        reporter.report(&population, 3).unwrap();
        reporter.teardown().unwrap();

        let (headers, rows) = read_rows(&path);
        assert_eq!(&headers[..3], &["timestep", "cell", "Susceptible"]);
        assert_eq!(headers.len(), 12);
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][..3], &["3", "0", "3"]);
        assert_eq!(&rows[1][..3], &["3", "1", "2"]);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let records: Vec<CellCompartmentRow> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(records[1].cell, 1);
        assert_eq!(records[1].infect_gp, 1);
        assert_eq!(records[0].infect_gp, 0);
    }

    #[test]
    fn creates_parent_directories() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("population.csv");
        PopulationCompartmentReporter::new(&path).unwrap();
        assert!(path.exists(), "CSV file should exist");
    }

    #[test]
    fn only_csvs_allowed() {
        let temp_dir = tempdir().unwrap();
        let result = CellCompartmentReporter::new(temp_dir.path().join("cells.tsv"));
        match result {
            Err(EpiabmError::ReportError(msg)) => assert!(msg.contains("must be CSVs")),
            _ => panic!("expected a report error"),
        }
    }

    #[test]
    fn report_after_teardown_fails() {
        let temp_dir = tempdir().unwrap();
        let population = population();
        let mut reporter =
            PopulationCompartmentReporter::new(temp_dir.path().join("population.csv")).unwrap();
        reporter.setup(&population).unwrap();
        reporter.teardown().unwrap();
        assert!(reporter.teardown().is_ok());
        assert!(matches!(
            reporter.report(&population, 1),
            Err(EpiabmError::ReportError(_))
        ));
    }
}
