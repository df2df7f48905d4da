//! Simulator command lines.

use std::fmt;
use std::process::Command;
use std::str::FromStr;

use crate::case::{BenchmarkCase, RegressionCase, Role};
use crate::config::HarnessConfig;
use crate::error::HarnessError;

/// Processor affinity flags handed to the MPI launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affinity {
    #[default]
    None,
    /// Flags understood by older Open MPI releases.
    Legacy,
    Modern,
}

impl Affinity {
    pub fn launcher_flags(self) -> &'static [&'static str] {
        match self {
            Affinity::None => &[],
            Affinity::Legacy => &["-bycore", "-bind-to-core"],
            Affinity::Modern => &["-map-by", "core", "-bind-to", "core"],
        }
    }
}

impl FromStr for Affinity {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(Affinity::None),
            "o" => Ok(Affinity::Legacy),
            "n" => Ok(Affinity::Modern),
            other => Err(HarnessError::InvalidArgument(format!(
                "Invalid MPI flag specifier '{}'",
                other
            ))),
        }
    }
}

/// A fully resolved argv for one simulator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimCommand {
    argv: Vec<String>,
}

impl SimCommand {
    fn new(argv: Vec<String>) -> Self {
        debug_assert!(!argv.is_empty());
        Self { argv }
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(self.args());
        cmd
    }
}

impl fmt::Display for SimCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv.join(" "))
    }
}

/// Per-run options that are not part of the case itself.
#[derive(Debug, Clone, Default)]
pub struct RunFlags<'a> {
    pub affinity: Affinity,
    /// Leave out `-q` so the simulator prints its state for checking.
    pub capture: bool,
    pub extra_args: &'a [String],
}

/// Command line for one benchmark measurement.
///
/// Multi-process cases run the MPI simulator under the configured launcher.
pub fn benchmark_command(config: &HarnessConfig, case: &BenchmarkCase, flags: &RunFlags<'_>) -> SimCommand {
    let steps = case.step_count.to_string();
    let mut sim_args: Vec<String> = Vec::new();
    if !flags.capture {
        sim_args.push("-q".to_string());
    }
    sim_args.extend([
        "-g".to_string(),
        case.graph_file(&config.data_dir).display().to_string(),
        "-r".to_string(),
        case.rat_file(&config.data_dir).display().to_string(),
        "-u".to_string(),
        case.update_mode.to_string(),
        "-n".to_string(),
        steps.clone(),
        "-i".to_string(),
        steps,
    ]);
    sim_args.extend(flags.extra_args.iter().cloned());

    let mut argv = Vec::new();
    if case.process_count > 1 {
        argv.extend(config.mpi_launcher.iter().cloned());
        argv.extend(flags.affinity.launcher_flags().iter().map(|s| s.to_string()));
        argv.push("-np".to_string());
        argv.push(case.process_count.to_string());
        argv.push(config.mpi_simulator.display().to_string());
    } else {
        argv.push(config.simulator.display().to_string());
    }
    argv.extend(sim_args);
    SimCommand::new(argv)
}

/// Command line for one regression run.
///
/// The reference simulator is always run single-process with `-m d`.
pub fn regression_command(
    config: &HarnessConfig,
    case: &RegressionCase,
    role: Role,
    process_count: u32,
    extra_args: &[String],
) -> SimCommand {
    let mut argv = Vec::new();
    match role {
        Role::Reference => argv.push(config.reference_simulator.display().to_string()),
        Role::Test if process_count > 1 => {
            argv.extend(config.mpi_launcher.iter().cloned());
            argv.push("-np".to_string());
            argv.push(process_count.to_string());
            argv.push(config.mpi_simulator.display().to_string());
        }
        Role::Test => argv.push(config.simulator.display().to_string()),
    }
    argv.extend([
        "-g".to_string(),
        case.graph_file(&config.data_dir).display().to_string(),
        "-r".to_string(),
        case.rat_file(&config.data_dir).display().to_string(),
        "-u".to_string(),
        case.update_mode.to_string(),
        "-n".to_string(),
        case.step_count.to_string(),
        "-s".to_string(),
        case.seed.to_string(),
    ]);
    if role == Role::Reference {
        argv.push("-m".to_string());
        argv.push("d".to_string());
    }
    argv.extend(extra_args.iter().cloned());
    SimCommand::new(argv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{GraphType, RatType, UpdateMode, Workload};

    fn case(process_count: u32) -> BenchmarkCase {
        BenchmarkCase::new(
            Workload::new(32400, GraphType::Uniform, RatType::Uniform, 32),
            500,
            UpdateMode::Batch,
            process_count,
        )
    }

    #[test]
    fn single_process_benchmark() {
        let config = HarnessConfig::default();
        let cmd = benchmark_command(&config, &case(1), &RunFlags::default());
        assert_eq!(
            cmd.to_string(),
            "./crun -q -g ./data/g-u32400.gph -r ./data/r-32400-u32.rats -u b -n 500 -i 500"
        );
    }

    #[test]
    fn mpi_benchmark_with_affinity() {
        let config = HarnessConfig::default();
        let extra = vec!["-t".to_string()];
        let flags = RunFlags {
            affinity: Affinity::Modern,
            capture: false,
            extra_args: &extra,
        };
        let cmd = benchmark_command(&config, &case(12), &flags);
        assert_eq!(cmd.program(), "mpirun");
        assert_eq!(
            cmd.to_string(),
            "mpirun -map-by core -bind-to core -np 12 ./crun-mpi -q -g ./data/g-u32400.gph \
             -r ./data/r-32400-u32.rats -u b -n 500 -i 500 -t"
        );
    }

    #[test]
    fn capture_drops_quiet_flag() {
        let config = HarnessConfig::default();
        let flags = RunFlags {
            capture: true,
            ..Default::default()
        };
        let cmd = benchmark_command(&config, &case(1), &flags);
        assert!(!cmd.args().iter().any(|a| a == "-q"));
    }

    #[test]
    fn regression_commands() {
        let config = HarnessConfig::default();
        let case = RegressionCase::new(400, GraphType::Targeted, RatType::Distributed, 10, 11, UpdateMode::Batch, 22);

        let reference = regression_command(&config, &case, Role::Reference, 4, &[]);
        assert_eq!(
            reference.to_string(),
            "./grun.py -g ./data/g-t400.gph -r ./data/r-400-d10.rats -u b -n 11 -s 22 -m d"
        );

        let test = regression_command(&config, &case, Role::Test, 1, &[]);
        assert_eq!(
            test.to_string(),
            "./crun -g ./data/g-t400.gph -r ./data/r-400-d10.rats -u b -n 11 -s 22"
        );

        let mpi = regression_command(&config, &case, Role::Test, 4, &[]);
        assert!(mpi.to_string().starts_with("mpirun -np 4 ./crun-mpi -g"));
    }

    #[test]
    fn parse_affinity() {
        assert_eq!("x".parse::<Affinity>().unwrap(), Affinity::None);
        assert_eq!("o".parse::<Affinity>().unwrap().launcher_flags(), &["-bycore", "-bind-to-core"]);
        assert!("z".parse::<Affinity>().is_err());
    }
}
