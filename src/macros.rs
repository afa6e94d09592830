macro_rules! emit {
    ($out:expr, $($format:tt)*) => {
        writeln!($out, "\t{}", format!($($format)*))
    };
}

macro_rules! emitc {
    ($out:expr, $fmt:literal $(, $arg:expr)* ; $comment:expr) => {
        writeln!($out, "\t{:<20} ; {}", format!($fmt $(, $arg)*), $comment)
    };
}

macro_rules! com {
    ($out:expr, $($format:tt)*) => {
        writeln!($out, "\t;; {}", format!($($format)*))
    };
}

macro_rules! label {
    ($out:expr, $name:expr) => {
        writeln!($out, "{}:", $name)
    };
}
