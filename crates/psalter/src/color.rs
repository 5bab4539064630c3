//! Colors for error messages
//!
//! Errors are colored with the [Colored crate](https://docs.rs/colored/latest/colored/)
//!     when the `color` Cargo feature is on, which it is by default.
//! Without the feature, the [`Colorize`] methods return the text unchanged,
//!     so the error rendering code is the same either way:
//!
//! ```
//! use psalter::color::Colorize;
//! println!["{}", "no definition".bold().bright_red()];
//! ```

#[cfg(feature = "color")]
pub type ColoredString = colored::ColoredString;

#[cfg(not(feature = "color"))]
pub type ColoredString = String;

macro_rules! colorize_impl {
    ( $( $method_name: ident, )+ ) => {
        /// Coloring methods on strings.
        pub trait Colorize {
            $(
                fn $method_name(self) -> ColoredString;
            )+
        }
        #[cfg(feature="color")]
        impl Colorize for ColoredString {
            $(
                fn $method_name(self) -> ColoredString {
                    colored::Colorize::$method_name(self)
                }
            )+
        }
        #[cfg(feature="color")]
        impl Colorize for &str {
            $(
                fn $method_name(self) -> ColoredString {
                    colored::Colorize::$method_name(self)
                }
            )+
        }
        // Plain strings; `String` covers chained calls.
        #[cfg(not(feature="color"))]
        impl Colorize for &str {
            $(
                fn $method_name(self) -> ColoredString {
                    self.to_string()
                }
            )+
        }
        #[cfg(not(feature="color"))]
        impl Colorize for String {
            $(
                fn $method_name(self) -> ColoredString {
                    self
                }
            )+
        }
    };
}

colorize_impl!(bold, bright_red, yellow,);
