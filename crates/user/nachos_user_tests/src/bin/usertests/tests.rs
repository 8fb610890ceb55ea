use nachos_user_tests::{
    programs::{exectest, fdtest, fibonacci, multiprog, seqfib},
    test_runner::TestEntry,
};

macro_rules! quick {
    ($prog:ident $(, $arg:literal)*) => {
        TestEntry {
            name: stringify!($prog),
            program: $prog::NAME,
            args: &[$($arg),*],
            tags: &["quick", stringify!($prog)],
        }
    };
}

macro_rules! slow {
    ($prog:ident $(, $arg:literal)*) => {
        TestEntry {
            name: stringify!($prog),
            program: $prog::NAME,
            args: &[$($arg),*],
            tags: &["slow", stringify!($prog)],
        }
    };
}

pub const TESTS: &[TestEntry] = &[
    quick!(exectest),
    quick!(fdtest),
    quick!(fibonacci, "0", "0"),
    quick!(multiprog),
    slow!(seqfib),
];
