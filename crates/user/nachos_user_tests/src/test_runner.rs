use std::{env, process, time::Instant};

use nachos_sim::{Kernel, KernelConfig, Usage};

use crate::programs;

#[derive(Debug)]
pub enum TestError {
    TestFailed,
}

pub struct TestEntry {
    pub name: &'static str,
    pub program: &'static str,
    pub args: &'static [&'static str],
    pub tags: &'static [&'static str],
}

impl TestEntry {
    fn run(&self, kernel: &Kernel) -> Result<(), TestError> {
        eprint!("{:-30} ", self.name);

        let start = Instant::now();

        let argv = [self.program]
            .into_iter()
            .chain(self.args.iter().copied())
            .collect::<Vec<_>>();
        let result = kernel.run(self.program, &argv);

        let elapsed = start.elapsed();
        let output = kernel.take_console_output();

        match result {
            Ok(status) if status.success() => {
                eprintln!(
                    "PASS [{:3}.{:03}s]",
                    elapsed.as_secs(),
                    elapsed.subsec_millis()
                );
                Ok(())
            }
            result => {
                eprintln!(
                    "FAIL [{:3}.{:03}s]",
                    elapsed.as_secs(),
                    elapsed.subsec_millis()
                );
                match result {
                    Ok(status) => eprintln!("  {}: {status}", self.program),
                    Err(e) => eprintln!("  {}: cannot run: {e}", self.program),
                }
                if !kernel.config().echo_console {
                    eprint!("{output}");
                }
                Err(TestError::TestFailed)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TestNameMatchType {
    Exact,
    Beginning,
}

impl TestNameMatchType {
    fn matches(self, test_name: &str, filter_name: &str) -> bool {
        match self {
            Self::Exact => test_name == filter_name,
            Self::Beginning => test_name.starts_with(filter_name),
        }
    }
}

#[derive(Debug)]
struct TestFilter {
    name: Option<String>,
    name_match_type: TestNameMatchType,
    tags: Vec<String>,
}

impl TestFilter {
    fn matches(&self, entry: &TestEntry) -> bool {
        if let Some(filter_name) = &self.name
            && !self.name_match_type.matches(entry.name, filter_name)
        {
            return false;
        }

        if !self.tags.is_empty() && !self.tags.iter().any(|t| entry.tags.contains(&t.as_str())) {
            return false;
        }

        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuous {
    Once,
    UntilFailure,
    Forever,
}

impl Continuous {
    fn judge_result<E>(self, result: Result<(), E>) -> Result<(), E> {
        match self {
            Self::Once | Self::UntilFailure => result,
            Self::Forever => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("help requested")]
    Help,
    #[error("missing argument for {0}")]
    MissingArgument(&'static str),
    #[error("invalid argument for {flag}: {value:?}")]
    InvalidNumber { flag: &'static str, value: String },
    #[error("unknown option {0:?}")]
    UnknownOption(String),
}

#[derive(Debug)]
pub struct TestParam {
    prog: String,
    filter: TestFilter,
    continuous: Continuous,
    config: KernelConfig,
}

const USAGE_ARGS: &str = "[-c] [-C] [-q] [-b] [-t tag] [-p procs] [-f files] [-h] [testname]";

impl TestParam {
    fn usage_and_exit(&self) -> ! {
        eprintln!("Usage: {} {USAGE_ARGS}", self.prog);
        process::exit(1);
    }

    fn help_and_exit(&self) -> ! {
        eprintln!("Usage: {} {USAGE_ARGS}", self.prog);
        eprintln!("    -c          Run tests continuously until a failure");
        eprintln!("    -C          Run tests continuously forever");
        eprintln!("    -q          Do not echo the output of test programs");
        eprintln!("    -b          Beginning matching test name");
        eprintln!("    -t          Run only tests with the given tags");
        eprintln!("    -p          Process slots of the simulated kernel");
        eprintln!("    -f          Open files per process of the simulated kernel");
        eprintln!("    -h          Print this help message");
        eprintln!("    testname    Run only the test with the given name");
        process::exit(1);
    }

    fn with_prog(prog: String) -> Self {
        Self {
            prog,
            filter: TestFilter {
                name: None,
                name_match_type: TestNameMatchType::Exact,
                tags: vec![],
            },
            continuous: Continuous::Once,
            config: KernelConfig::default().echo_console(true),
        }
    }

    /// Parses the command line of the current process, exiting on usage
    /// errors.
    #[must_use]
    pub fn parse() -> Self {
        let mut args = env::args();
        let prog = args.next().unwrap_or_else(|| "usertests".to_owned());
        match Self::parse_from(prog.clone(), args) {
            Ok(param) => param,
            Err(ParamError::Help) => Self::with_prog(prog).help_and_exit(),
            Err(e) => {
                eprintln!("{e}");
                Self::with_prog(prog).usage_and_exit()
            }
        }
    }

    /// Parses `args`, which do not include the program name.
    pub fn parse_from<I>(prog: String, args: I) -> Result<Self, ParamError>
    where
        I: IntoIterator<Item = String>,
    {
        fn number(flag: &'static str, value: Option<String>) -> Result<usize, ParamError> {
            let value = value.ok_or(ParamError::MissingArgument(flag))?;
            value
                .parse()
                .ok()
                .ok_or(ParamError::InvalidNumber { flag, value })
        }

        let mut args = args.into_iter();
        let mut param = Self::with_prog(prog);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-c" => param.continuous = Continuous::UntilFailure,
                "-C" => param.continuous = Continuous::Forever,
                "-q" => param.config.echo_console = false,
                "-b" => param.filter.name_match_type = TestNameMatchType::Beginning,
                "-t" => {
                    let tag = args.next().ok_or(ParamError::MissingArgument("-t"))?;
                    param.filter.tags.push(tag);
                }
                "-p" => param.config.max_processes = number("-p", args.next())?,
                "-f" => param.config.max_open_files = number("-f", args.next())?,
                "-h" => return Err(ParamError::Help),
                _ if !arg.starts_with('-') => param.filter.name = Some(arg),
                _ => return Err(ParamError::UnknownOption(arg)),
            }
        }

        Ok(param)
    }

    #[must_use]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Names of the tests this parameter set selects.
    #[must_use]
    pub fn selected<'a>(&self, tests: &'a [TestEntry]) -> Vec<&'a str> {
        tests
            .iter()
            .filter(|entry| self.filter.matches(entry))
            .map(|entry| entry.name)
            .collect()
    }

    fn run_tests(
        &self,
        kernel: &Kernel,
        run_count: &mut usize,
        tests: &[TestEntry],
    ) -> Result<(), TestError> {
        for entry in tests {
            if !self.filter.matches(entry) {
                continue;
            }

            *run_count += 1;

            if let Err(e) = self.continuous.judge_result(entry.run(kernel)) {
                eprintln!("SOME TESTS FAILED");
                return Err(e);
            }
        }

        Ok(())
    }

    fn sample_usage(kernel: &Kernel) -> Usage {
        eprint!("usage: ");
        let start = Instant::now();
        let usage = kernel.usage();
        let elapsed = start.elapsed();
        eprintln!(
            "{} processes, {} files [{:3}.{:03}s]",
            usage.processes,
            usage.files,
            elapsed.as_secs(),
            elapsed.subsec_millis()
        );
        usage
    }

    fn drive_tests(
        &self,
        kernel: &Kernel,
        run_count: &mut usize,
        tests: &[TestEntry],
    ) -> Result<(), TestError> {
        loop {
            let events = kernel.take_journal().len();
            log::debug!("dropped {events} journal events");
            let usage0 = Self::sample_usage(kernel);

            eprintln!("starting");

            self.continuous
                .judge_result(self.run_tests(kernel, run_count, tests))?;

            let usage1 = Self::sample_usage(kernel);

            if usage0 != usage1 {
                eprintln!(
                    "usage: FAIL -- leaked resources: {} processes, {} files (out of {}, {})",
                    usage1.processes, usage1.files, usage0.processes, usage0.files
                );
                return Err(TestError::TestFailed);
            }

            eprintln!("usage: PASS");

            if self.continuous == Continuous::Once {
                break;
            }
        }

        Ok(())
    }

    /// Boots a kernel with every program installed and runs the selected
    /// tests on it, then exits.
    pub fn run(&self, tests: &[TestEntry]) -> ! {
        if self.selected(tests).is_empty() {
            eprintln!("No tests matched the filter");
            process::exit(1);
        }

        let kernel = Kernel::new(self.config.clone());
        programs::install(&kernel);

        let mut run_count = 0;

        let start = Instant::now();
        let res = self.drive_tests(&kernel, &mut run_count, tests);
        let elapsed = start.elapsed();

        match res {
            Ok(()) if run_count > 0 => {
                eprintln!(
                    "{}: ALL TESTS PASSED [{:3}.{:03}s]",
                    self.prog,
                    elapsed.as_secs(),
                    elapsed.subsec_millis(),
                );
                process::exit(0);
            }
            Ok(()) | Err(TestError::TestFailed) => {
                eprintln!(
                    "{}: TEST FAILED [{:3}.{:03}s]",
                    self.prog,
                    elapsed.as_secs(),
                    elapsed.subsec_millis()
                );
                if run_count == 0 {
                    eprintln!("{}: no tests run", self.prog);
                }
                process::exit(1);
            }
        }
    }
}
