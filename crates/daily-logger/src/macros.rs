//! Formatting macros for the process-wide default logger

/// Log at trace level through the default logger
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => {
        $crate::global::trace(::std::format_args!($($arg)+))
    };
}

/// Log at info level through the default logger
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::global::info(::std::format_args!($($arg)+))
    };
}

/// Log at warn level through the default logger
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::global::warn(::std::format_args!($($arg)+))
    };
}

/// Log at error level through the default logger
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::global::error(::std::format_args!($($arg)+))
    };
}

/// Log without a level tag through the default logger
#[macro_export]
macro_rules! log_print {
    ($($arg:tt)+) => {
        $crate::global::print(::std::format_args!($($arg)+))
    };
}

/// Log without a level tag through the default logger, adding a newline
#[macro_export]
macro_rules! log_println {
    () => {
        $crate::global::println(::std::format_args!(""))
    };
    ($($arg:tt)+) => {
        $crate::global::println(::std::format_args!($($arg)+))
    };
}
