/// Prints a diagnostic line prefixed with the program name to the calling
/// process's standard output.
#[macro_export]
macro_rules! message {
    ($sys:expr, $($msg:tt)*) => {
        $crate::assert::print_message($sys, ::core::format_args!($($msg)*))
    };
}

/// Prints a line to the calling process's standard output as is.
#[macro_export]
macro_rules! report {
    ($sys:expr, $($msg:tt)*) => {
        $crate::assert::print_line($sys, ::core::format_args!($($msg)*))
    };
}

/// Returns a [`Violation`](crate::Violation) from the enclosing function
/// unless `cond` holds.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $code:expr, $($msg:tt)+) => {
        if !$cond {
            return Err($crate::Violation::new($code, ::std::format!($($msg)+)));
        }
    };
}

/// Returns a [`Violation`](crate::Violation) from the enclosing function.
#[macro_export]
macro_rules! bail {
    ($code:expr, $($msg:tt)+) => {
        return Err($crate::Violation::new($code, ::std::format!($($msg)+)))
    };
}
