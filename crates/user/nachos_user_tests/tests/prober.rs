use nachos_sim::{Kernel, KernelConfig};
use nachos_types::process::ExitStatus;
use nachos_user_tests::{
    assert::{FAILURE, WRONG_RESULT},
    programs::{self, fdtest, multiprog},
    prober::DEFAULT_FILE,
};

fn boot(config: KernelConfig) -> Kernel {
    let _ = env_logger::builder().is_test(true).try_init();
    let kernel = Kernel::new(config);
    programs::install(&kernel);
    kernel
}

#[test]
fn single_probe_saturates_exactly() {
    let kernel = boot(KernelConfig::default());
    assert_eq!(kernel.run(fdtest::NAME, &[]), Ok(ExitStatus::new(0)));

    let output = kernel.console_output();
    assert!(output.contains("round 1 fds: 2\n"), "{output}");
    assert!(output.contains("round 15 fds: "), "{output}");
    assert!(output.contains("--- PASS test_fd"), "{output}");
    let fds = output
        .lines()
        .filter_map(|line| line.strip_prefix("round ")?.split_once(": "))
        .flat_map(|(_, fds)| fds.split(' '))
        .map(|fd| fd.parse::<usize>().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(fds.len(), (1..16).sum::<usize>());
    assert!(fds.iter().all(|&fd| fd >= 2), "{fds:?}");
    assert_eq!(kernel.file_contents(DEFAULT_FILE), None);
}

#[test]
fn single_probe_can_be_rerun() {
    let kernel = boot(KernelConfig::default());
    for _ in 0..3 {
        assert_eq!(kernel.run(fdtest::NAME, &[]), Ok(ExitStatus::new(0)));
    }
    assert_eq!(kernel.usage().files, 0);
}

#[test]
fn extra_descriptor_is_detected() {
    let kernel = boot(KernelConfig::default().max_open_files(17));
    assert_eq!(kernel.run(fdtest::NAME, &[]), Ok(ExitStatus::new(FAILURE)));
    assert!(kernel.console_output().contains("available fds exceed"));
    assert_eq!(kernel.usage().files, 0);
}

#[test]
fn early_exhaustion_is_detected() {
    let kernel = boot(KernelConfig::default().max_open_files(10));
    assert_eq!(kernel.run(fdtest::NAME, &[]), Ok(ExitStatus::new(FAILURE)));
    let output = kernel.console_output();
    assert!(output.contains("test_fd: round 10 fd[9] fails"), "{output}");
    assert_eq!(kernel.usage().files, 0);
}

#[test]
fn leftover_file_is_detected() {
    let kernel = boot(KernelConfig::default());
    kernel.install_file(DEFAULT_FILE, b"stale").unwrap();
    assert_eq!(kernel.run(fdtest::NAME, &[]), Ok(ExitStatus::new(FAILURE)));
    assert!(kernel.console_output().contains("check unlink"));
}

#[test]
fn multi_probe_exits_with_instance() {
    let kernel = boot(KernelConfig::default());
    let status = kernel.run(fdtest::NAME, &[fdtest::NAME, "3", "fdtest.3"]);
    assert_eq!(status, Ok(ExitStatus::new(3)));

    let output = kernel.console_output();
    assert!(output.contains("multiprogramming: 3"), "{output}");
    assert!(output.contains("--- PASS test_fd 3"), "{output}");
    // The parent owns the backing file.
    assert_eq!(kernel.file_contents("fdtest.3"), Some(vec![]));
}

#[test]
fn multi_probe_needs_a_file() {
    let kernel = boot(KernelConfig::default());
    let status = kernel.run(fdtest::NAME, &[fdtest::NAME, "3"]);
    assert_eq!(status, Ok(ExitStatus::new(WRONG_RESULT)));
}

#[test]
fn concurrent_probes() {
    let kernel = boot(KernelConfig::default());
    assert_eq!(kernel.run(multiprog::NAME, &[]), Ok(ExitStatus::new(0)));

    let output = kernel.console_output();
    for i in 0..multiprog::CHILDREN {
        assert!(output.contains(&format!("--- PASS test_fd {i}")), "{output}");
    }
    assert!(output.contains("--- PASS multiprogramming"), "{output}");
    assert_eq!(kernel.usage().files, 0);
}
