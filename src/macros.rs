//! Status lines printed to the console: a right aligned, coloured title
//! followed by the message. Errors go to stderr, everything else to stdout.
use owo_colors::{Color, OwoColorize};

#[macro_export]
macro_rules! status {
    ($color:ty, $stderr:expr, $title:expr, $($arg:tt)*) => {{
        let title: &str = &$title;
        $crate::macros::print::<$color>(title, &format!($($arg)*), $stderr);
    }};
}

#[macro_export]
macro_rules! ok {
    ($title:expr, $($arg:tt)*) => {
        status!(owo_colors::colors::Green, false, $title, $($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($title:expr, $($arg:tt)*) => {
        status!(owo_colors::colors::Cyan, false, $title, $($arg)*)
    };
}

#[macro_export]
macro_rules! warning {
    ($title:expr, $($arg:tt)*) => {
        status!(owo_colors::colors::Yellow, false, $title, $($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($title:expr, $($arg:tt)*) => {
        status!(owo_colors::colors::Red, true, $title, $($arg)*)
    };
}

pub(crate) fn print<C: Color>(title: &str, msg: &str, stderr: bool) {
    let title = title.fg::<C>();
    if stderr {
        eprintln!("{:>12} {}", title.bold(), msg);
    } else {
        println!("{:>12} {}", title.bold(), msg);
    }
}
