use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use clap::{Args, Command, FromArgMatches as _};

use crate::error::SimulationError;
use crate::execution_stats::{
    log_execution_statistics, print_execution_statistics, ExecutionProfilingCollector,
};
use crate::log::{info, set_log_levels, warn};
use crate::parameters::{Parameters, Policy};
use crate::population::StatusCounts;
#[cfg(feature = "progress_bar")]
use crate::progress::TickProgress;
use crate::random::SeededRandom;
use crate::report::{write_history, ReportOptions, ReportWriter, TickReport};
use crate::simulation::{RunState, Simulation};
use crate::status::InfectionStatus;

/// Command line arguments of the `contagion` binary.
#[derive(Args, Debug)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path to a JSON parameters file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Optional directory for CSV reports
    #[arg(short, long, default_value = "")]
    pub output_dir: String,

    /// Prefix for report file names
    #[arg(long, default_value = "")]
    pub file_prefix: String,

    /// Replace report files that already exist
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Log levels, e.g. `info` or `warn,contagion::simulation=trace`
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Stop after this many ticks even if infected agents remain
    #[arg(short = 't', long, default_value = "10000")]
    pub max_ticks: usize,

    /// Do not print execution statistics at the end of the run
    #[arg(long)]
    pub no_stats: bool,

    /// Draw a tick progress bar
    #[arg(long)]
    pub progress: bool,

    /// Enable the isolation policy on top of the parameters file
    #[arg(long)]
    pub isolation: bool,
}

fn create_cli() -> Command {
    let cli = Command::new("contagion")
        .about("Agent-based simulation of proximity-driven epidemic spread")
        .version(env!("CARGO_PKG_VERSION"));
    BaseArgs::augment_args(cli)
}

/// Outcome of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: usize,
    pub counts: StatusCounts,
    /// False when the run hit the tick limit with infected agents left.
    pub finished: bool,
    /// Highest infected count and the tick it was reached at.
    pub peak: (usize, usize),
    /// Report files written, if an output directory was given.
    pub reports: Vec<PathBuf>,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} after {} ticks: {} susceptible, {} infected, {} immune, {} deceased",
            if self.finished { "finished" } else { "stopped" },
            self.ticks,
            self.counts[InfectionStatus::Susceptible],
            self.counts[InfectionStatus::Infected],
            self.counts[InfectionStatus::Immune],
            self.counts[InfectionStatus::Deceased],
        )
    }
}

/// Parses the process arguments and runs a simulation.
///
/// # Errors
/// Returns an error if argument parsing fails or the run fails (see [`run_with_base_args`]).
pub fn run_with_args() -> Result<RunSummary, Box<dyn std::error::Error>> {
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    Ok(run_with_base_args(args)?)
}

fn load_parameters(args: &BaseArgs) -> Result<Parameters, SimulationError> {
    let mut parameters = if args.config.is_empty() {
        Parameters::default()
    } else {
        info!("Loading parameters from: {}", args.config);
        Parameters::from_file(Path::new(&args.config))?
    };
    if args.isolation {
        parameters.policy.insert(Policy::Isolation);
    }
    Ok(parameters)
}

/// Runs one simulation as configured by `args`, writes the reports and prints the summary.
///
/// # Errors
///
/// Returns a `SimulationError` if the log levels or the parameters are invalid, or a report
/// cannot be written.
pub fn run_with_base_args(args: BaseArgs) -> Result<RunSummary, SimulationError> {
    if let Some(levels) = &args.log_level {
        set_log_levels(levels)?;
    }

    let parameters = load_parameters(&args)?;
    let population_size = parameters.population_size;
    let mut simulation = Simulation::new(parameters, SeededRandom::new(args.random_seed))?;

    let report_options = (!args.output_dir.is_empty()).then(|| {
        let mut options = ReportOptions::new();
        options
            .directory(PathBuf::from(&args.output_dir))
            .file_prefix(args.file_prefix.clone())
            .overwrite(args.force_overwrite);
        options
    });
    let mut tick_writer = report_options
        .as_ref()
        .map(ReportWriter::<TickReport>::create)
        .transpose()?;
    if let Some(writer) = tick_writer.as_mut() {
        writer.send(&TickReport::from_simulation(&simulation))?;
    }

    let mut collector = (!args.no_stats).then(ExecutionProfilingCollector::new);
    #[cfg(feature = "progress_bar")]
    let mut progress = args.progress.then(|| TickProgress::start(args.max_ticks));

    let mut ticks = 0;
    while ticks < args.max_ticks && simulation.step() == RunState::Running {
        ticks += 1;
        if let Some(writer) = tick_writer.as_mut() {
            writer.send(&TickReport::from_simulation(&simulation))?;
        }
        if let Some(collector) = collector.as_mut() {
            collector.refresh();
        }
        #[cfg(feature = "progress_bar")]
        if let Some(progress) = progress.as_mut() {
            progress.update(ticks);
        }
    }
    #[cfg(feature = "progress_bar")]
    if let Some(progress) = progress.as_mut() {
        progress.finish();
    }

    // A run that used up the tick limit on its last infection still counts as finished.
    let finished = simulation.is_finished() || simulation.counts().infected() == 0;
    if !finished {
        warn!(
            "Stopped at the tick limit of {} with {} agents still infected",
            args.max_ticks,
            simulation.counts().infected()
        );
    }

    let mut reports = Vec::new();
    if let Some(writer) = tick_writer {
        reports.push(writer.path().to_path_buf());
    }
    if let Some(options) = &report_options {
        reports.push(write_history(options, simulation.history())?);
    }

    let summary = RunSummary {
        ticks,
        counts: simulation.counts(),
        finished,
        peak: simulation.history().peak(),
        reports,
    };
    println!("{summary}");
    println!(
        "peak of {} infected at tick {}",
        summary.peak.1, summary.peak.0
    );

    if let Some(mut collector) = collector {
        let stats = collector.compute_final_statistics(population_size, ticks);
        print_execution_statistics(&stats);
        log_execution_statistics(&stats);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, NamedTempFile};

    fn parse_args(args: &[&str]) -> BaseArgs {
        let matches = create_cli()
            .try_get_matches_from(std::iter::once("contagion").chain(args.iter().copied()))
            .unwrap();
        BaseArgs::from_arg_matches(&matches).unwrap()
    }

    fn small_config() -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"{ "population_size": 60, "width": 200, "height": 150, "infection_duration": 20 }"#,
        )
        .unwrap();
        file
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let args = parse_args(&[]);
        assert_eq!(args.random_seed, 0);
        assert!(args.config.is_empty());
        assert!(args.output_dir.is_empty());
        assert!(!args.force_overwrite);
        assert_eq!(args.max_ticks, 10_000);
        assert!(args.log_level.is_none());
        assert!(!args.isolation);
    }

    #[test]
    fn short_flags_parse() {
        let args = parse_args(&["-r", "42", "-t", "5", "-f", "-o", "out", "--isolation"]);
        assert_eq!(args.random_seed, 42);
        assert_eq!(args.max_ticks, 5);
        assert!(args.force_overwrite);
        assert_eq!(args.output_dir, "out");
        assert!(args.isolation);
    }

    #[test]
    fn run_is_reproducible_from_the_seed() {
        let config = small_config();
        let path = config.path().to_str().unwrap();
        let first = run_with_base_args(parse_args(&["-c", path, "-r", "7", "--no-stats"])).unwrap();
        let second =
            run_with_base_args(parse_args(&["-c", path, "-r", "7", "--no-stats"])).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.counts.total(), 60);
        assert!(first.reports.is_empty());
    }

    #[test]
    fn tick_limit_stops_the_run() {
        let args = parse_args(&["-t", "3", "--no-stats"]);
        let summary = run_with_base_args(args).unwrap();
        assert_eq!(summary.ticks, 3);
        assert!(!summary.finished);
        assert!(summary.to_string().starts_with("stopped after 3 ticks: "));
    }

    #[test]
    fn last_infection_at_the_tick_limit_counts_as_finished() {
        let config = small_config();
        let path = config.path().to_str().unwrap();
        let full = run_with_base_args(parse_args(&["-c", path, "-r", "3", "--no-stats"])).unwrap();
        assert!(full.finished);

        let limit = full.ticks.to_string();
        let args = parse_args(&["-c", path, "-r", "3", "-t", &limit, "--no-stats"]);
        let limited = run_with_base_args(args).unwrap();
        assert!(limited.finished);
        assert_eq!(limited.ticks, full.ticks);
        assert_eq!(limited.counts, full.counts);
        assert!(limited.to_string().starts_with("finished after "));
    }

    #[test]
    fn isolation_flag_is_applied() {
        let args = parse_args(&["--isolation"]);
        let parameters = load_parameters(&args).unwrap();
        assert!(parameters.isolation());
    }

    #[test]
    fn reports_are_written_to_the_output_dir() {
        let config = small_config();
        let output = tempdir().unwrap();
        let args = parse_args(&[
            "-c",
            config.path().to_str().unwrap(),
            "-o",
            output.path().to_str().unwrap(),
            "--file-prefix",
            "run_",
            "--no-stats",
        ]);
        let summary = run_with_base_args(args).unwrap();
        assert!(summary.finished);

        let ticks_path = output.path().join("run_ticks.csv");
        let history_path = output.path().join("run_history.csv");
        assert_eq!(summary.reports, vec![ticks_path.clone(), history_path.clone()]);

        let mut reader = csv::Reader::from_path(&ticks_path).unwrap();
        let rows: Vec<TickReport> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(rows.len(), summary.ticks + 1);
        for row in &rows {
            assert_eq!(row.susceptible + row.infected + row.immune + row.deceased, 60);
        }
        assert_eq!(rows.last().unwrap().infected, 0);

        let history = fs::read_to_string(&history_path).unwrap();
        assert_eq!(history.lines().count(), summary.ticks + 2);
        assert_eq!(history.lines().nth(1), Some("0,0"));
    }

    #[test]
    fn existing_reports_need_force_overwrite() {
        let config = small_config();
        let output = tempdir().unwrap();
        let base = [
            "-c",
            config.path().to_str().unwrap(),
            "-o",
            output.path().to_str().unwrap(),
            "--no-stats",
        ];
        run_with_base_args(parse_args(&base)).unwrap();

        let result = run_with_base_args(parse_args(&base));
        assert!(matches!(result, Err(SimulationError::ReportError(_))));

        let forced: Vec<&str> = base.iter().copied().chain(["-f"]).collect();
        assert!(run_with_base_args(parse_args(&forced)).is_ok());
    }

    #[test]
    fn missing_config_is_an_io_error() {
        let args = parse_args(&["-c", "does/not/exist.json", "--no-stats"]);
        assert!(matches!(
            run_with_base_args(args),
            Err(SimulationError::IoError(_))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), r#"{ "fatality_rate": 150 }"#).unwrap();
        let args = parse_args(&["-c", file.path().to_str().unwrap(), "--no-stats"]);
        assert!(matches!(
            run_with_base_args(args),
            Err(SimulationError::InvalidParameters(_))
        ));
    }
}
