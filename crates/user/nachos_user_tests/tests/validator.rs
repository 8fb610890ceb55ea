use nachos_sim::{Kernel, KernelConfig, Process};
use nachos_syscall::{SyscallError, Syscalls};
use nachos_types::{
    fs::RawFd,
    process::{ExitStatus, ProcId},
};
use nachos_user_tests::{
    assert::{FAILURE, WRONG_RESULT},
    programs::{self, fibonacci, seqfib},
    record,
    validator::{self, RecordPair},
};

fn boot(config: KernelConfig) -> Kernel {
    let _ = env_logger::builder().is_test(true).try_init();
    let kernel = Kernel::new(config);
    programs::install(&kernel);
    kernel
}

/// Runs `argv[1]` rounds and exits with 0 if the result matches the
/// in-memory recurrence.
fn short_run(sys: &mut Process, argv: &[String]) -> ! {
    let rounds = argv[1].parse().unwrap();
    let pair = RecordPair::for_instance(77);
    match validator::run(sys, &pair, rounds) {
        Ok(c) if c == validator::expected_value(rounds) => sys.exit(0),
        Ok(_) => sys.exit(2),
        Err(v) => v.exit(sys),
    }
}

/// Leaves a seeded record pair behind without running any round.
fn seed_only(sys: &mut Process, _argv: &[String]) -> ! {
    let pair = RecordPair::for_instance(5);
    for (name, value) in [(&pair.file_a, 0), (&pair.file_b, 1)] {
        let fd = sys.creat(name).unwrap();
        sys.write(fd, &record::encode(value)).unwrap();
        sys.close(fd).unwrap();
    }
    sys.exit(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Damage {
    ShortRead,
    ShortWrite,
    Garbage,
    LostUpdate,
}

/// Passes every call through to the process, except that the `at`-th file
/// read or write (counted separately, from 1) is damaged.
struct Damaged<'a> {
    inner: &'a mut Process,
    damage: Damage,
    at: usize,
    reads: usize,
    writes: usize,
}

impl Syscalls for Damaged<'_> {
    fn program_name(&self) -> &str {
        self.inner.program_name()
    }

    fn exec(&mut self, program: &str, argv: &[&str]) -> Result<ProcId, SyscallError> {
        self.inner.exec(program, argv)
    }

    fn join(&mut self, pid: ProcId) -> Result<ExitStatus, SyscallError> {
        self.inner.join(pid)
    }

    fn exit(&mut self, status: i32) -> ! {
        self.inner.exit(status)
    }

    fn creat(&mut self, name: &str) -> Result<RawFd, SyscallError> {
        self.inner.creat(name)
    }

    fn open(&mut self, name: &str) -> Result<RawFd, SyscallError> {
        self.inner.open(name)
    }

    fn read(&mut self, fd: RawFd, buf: &mut [u8]) -> Result<usize, SyscallError> {
        if !fd.is_standard_stream() {
            self.reads += 1;
            if self.reads == self.at && self.damage == Damage::ShortRead {
                let len = buf.len() - 1;
                return self.inner.read(fd, &mut buf[..len]);
            }
        }
        self.inner.read(fd, buf)
    }

    fn write(&mut self, fd: RawFd, buf: &[u8]) -> Result<usize, SyscallError> {
        if !fd.is_standard_stream() {
            self.writes += 1;
            if self.writes == self.at {
                match self.damage {
                    Damage::ShortWrite => return self.inner.write(fd, &buf[..buf.len() / 2]),
                    Damage::Garbage => {
                        let mut garbage = [0; record::RECORD_WIDTH];
                        garbage[..3].copy_from_slice(b"1x2");
                        return self.inner.write(fd, &garbage);
                    }
                    Damage::LostUpdate => return self.inner.write(fd, &record::encode(0)),
                    Damage::ShortRead => {}
                }
            }
        }
        self.inner.write(fd, buf)
    }

    fn close(&mut self, fd: RawFd) -> Result<(), SyscallError> {
        self.inner.close(fd)
    }

    fn unlink(&mut self, name: &str) -> Result<(), SyscallError> {
        self.inner.unlink(name)
    }
}

/// `damaged_run <damage> <at>`: a default validator run with one damaged
/// file operation.
fn damaged_run(sys: &mut Process, argv: &[String]) -> ! {
    let damage = match argv[1].as_str() {
        "short_read" => Damage::ShortRead,
        "short_write" => Damage::ShortWrite,
        "garbage" => Damage::Garbage,
        "lost_update" => Damage::LostUpdate,
        other => panic!("unknown damage {other}"),
    };
    let at = argv[2].parse().unwrap();
    let pair = RecordPair::for_instance(31);
    let result = validator::validate(
        &mut Damaged {
            inner: sys,
            damage,
            at,
            reads: 0,
            writes: 0,
        },
        &pair,
    );
    match result {
        Ok(()) => sys.exit(0),
        Err(v) => v.exit(sys),
    }
}

#[test]
fn hundred_rounds_reach_pinned_value() {
    let kernel = boot(KernelConfig::default());
    assert_eq!(kernel.run(fibonacci::NAME, &[]), Ok(ExitStatus::new(0)));
    assert!(kernel.console_output().contains("--- PASS fibonacci 0"));
    assert_eq!(kernel.usage().files, 0);
}

#[test]
fn signature_becomes_exit_status() {
    let kernel = boot(KernelConfig::default());
    let status = kernel.run(fibonacci::NAME, &[fibonacci::NAME, "9", "4"]);
    assert_eq!(status, Ok(ExitStatus::new(9)));
    assert!(kernel.console_output().contains("--- PASS fibonacci 4"));
}

#[test]
fn missing_instance_is_rejected() {
    let kernel = boot(KernelConfig::default());
    let status = kernel.run(fibonacci::NAME, &[fibonacci::NAME, "9"]).unwrap();
    assert!(!status.success());
}

#[test]
fn record_files_hold_fixed_width_values() {
    let kernel = boot(KernelConfig::default());
    kernel.register("seed_only", seed_only);
    assert_eq!(kernel.run("seed_only", &[]), Ok(ExitStatus::new(0)));

    let pair = RecordPair::for_instance(5);
    let a = kernel.file_contents(&pair.file_a).unwrap();
    let b = kernel.file_contents(&pair.file_b).unwrap();
    assert_eq!(a.len(), record::RECORD_WIDTH);
    assert_eq!(record::decode(&a), Ok(0));
    assert_eq!(record::decode(&b), Ok(1));

    // A fresh run truncates the leftovers instead of appending to them.
    let status = kernel.run(fibonacci::NAME, &[fibonacci::NAME, "0", "5"]);
    assert_eq!(status, Ok(ExitStatus::new(0)));
    assert_eq!(kernel.usage().files, 0);
}

#[test]
fn round_trip_through_files_matches_recurrence() {
    let kernel = boot(KernelConfig::default());
    kernel.register("short_run", short_run);
    for rounds in ["0", "1", "2", "47", "100"] {
        let status = kernel.run("short_run", &["short_run", rounds]);
        assert_eq!(status, Ok(ExitStatus::new(0)), "{rounds} rounds");
    }
    assert_eq!(kernel.usage().files, 0);
}

#[test]
fn disjoint_instances_run_concurrently() {
    let kernel = boot(KernelConfig::default());
    let pids = (0..4)
        .map(|i| {
            let (signature, instance) = ((10 + i).to_string(), i.to_string());
            kernel
                .spawn(fibonacci::NAME, &[fibonacci::NAME, signature.as_str(), instance.as_str()])
                .unwrap()
        })
        .collect::<Vec<_>>();
    for (i, pid) in (10..).zip(pids) {
        assert_eq!(kernel.wait(pid), Ok(ExitStatus::new(i)));
    }
    assert_eq!(kernel.usage().files, 0);
}

#[test]
fn sequential_fibonacci_under_admission_control() {
    let kernel = boot(KernelConfig::default().max_processes(4));
    let status = kernel.run(seqfib::NAME, &[seqfib::NAME, "20", "7"]);
    assert_eq!(status, Ok(ExitStatus::new(0)));

    let output = kernel.console_output();
    assert_eq!(output.matches("--- PASS fibonacci").count(), 20);
    assert!(output.contains("--- PASS sequential fibonacci"), "{output}");
    assert_eq!(kernel.usage(), nachos_sim::Usage { processes: 0, files: 0 });
}

#[test]
fn undamaged_adapter_passes() {
    let kernel = boot(KernelConfig::default());
    kernel.register("damaged_run", damaged_run);
    for damage in ["short_read", "short_write", "garbage", "lost_update"] {
        let status = kernel.run("damaged_run", &["damaged_run", damage, "100000"]);
        assert_eq!(status, Ok(ExitStatus::new(0)), "{damage}");
    }
    assert_eq!(kernel.usage().files, 0);
}

#[test]
fn torn_io_is_fatal() {
    let kernel = boot(KernelConfig::default());
    kernel.register("damaged_run", damaged_run);
    let cases = [
        ("short_read", "short read from fb_temp_"),
        ("short_write", "short write to fb_temp_"),
        ("garbage", "record is not a number"),
    ];
    for (damage, message) in cases {
        let status = kernel.run("damaged_run", &["damaged_run", damage, "21"]);
        assert_eq!(status, Ok(ExitStatus::new(FAILURE)), "{damage}");
        let output = kernel.take_console_output();
        assert!(output.contains(message), "{damage}: {output}");
        assert_eq!(kernel.usage().files, 0, "{damage}");
    }
}

#[test]
fn lost_update_gives_wrong_result() {
    let kernel = boot(KernelConfig::default());
    kernel.register("damaged_run", damaged_run);
    let status = kernel
        .run("damaged_run", &["damaged_run", "lost_update", "21"])
        .unwrap();
    assert_eq!(status, ExitStatus::new(WRONG_RESULT));
    assert!(!status.is_abnormal());
    let output = kernel.take_console_output();
    assert!(output.contains("wrong 100-round result"), "{output}");
    assert_eq!(kernel.usage().files, 0);
}
