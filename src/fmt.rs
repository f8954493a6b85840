//! Logging macros
//!
//! Log sites forward to `defmt` when the `defmt` feature is enabled. Host
//! unit tests have no global logger, so the arguments are only evaluated
//! by reference there.
#![allow(unused_macros)]

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(all(feature = "defmt", not(test)))]
            ::defmt::debug!($s $(, $x)*);
            #[cfg(not(all(feature = "defmt", not(test))))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(all(feature = "defmt", not(test)))]
            ::defmt::warn!($s $(, $x)*);
            #[cfg(not(all(feature = "defmt", not(test))))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(all(feature = "defmt", not(test)))]
            ::defmt::error!($s $(, $x)*);
            #[cfg(not(all(feature = "defmt", not(test))))]
            let _ = ($( & $x ),*);
        }
    };
}
