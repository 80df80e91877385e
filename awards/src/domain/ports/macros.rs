//! Helper macro for generating domain port error enums.
//!
//! Besides snake_case constructors, the macro records which variants are
//! transient: the pipeline and dispatcher route retryable failures through
//! `is_transient` instead of matching every port's variants by hand.

macro_rules! define_port_error {
    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (@transient transient) => { true };
    (@transient) => { false };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $([$transient:ident])? $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field : $ty),* },
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant { $($field : $ty),* });
            )*

            /// True when the failure is transient and worth retrying with
            /// backoff.
            pub fn is_transient(&self) -> bool {
                match self {
                    $(
                        Self::$variant { .. } => define_port_error!(@transient $($transient)?),
                    )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum ExamplePortError {
            /// Transient infrastructure failure.
            Flaky { message: String } => [transient] "flaky: {message}",
            /// Permanent rejection.
            Rejected { message: String, code: u32 } => "rejected: {message} ({code})",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExamplePortError::flaky("socket closed");
        assert_eq!(err.to_string(), "flaky: socket closed");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = ExamplePortError::rejected("nope", 7_u32);
        assert_eq!(err.to_string(), "rejected: nope (7)");
    }

    #[test]
    fn transient_marker_drives_classification() {
        assert!(ExamplePortError::flaky("x").is_transient());
        assert!(!ExamplePortError::rejected("x", 1_u32).is_transient());
    }
}
