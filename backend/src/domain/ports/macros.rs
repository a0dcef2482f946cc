//! Helper macro for declaring port error enums.
//!
//! Every repository port fails in two infrastructure ways, so the macro
//! always emits `Connection { message }` and `Query { message }` variants
//! whose text is prefixed with the port's subject. Port-specific variants
//! follow in the body. Each variant gets a snake_case constructor whose
//! parameters accept anything convertible into the field type, so adapters
//! can write `CategoryRepositoryError::query("timeout")`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident for $subject:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            /// Repository connection could not be established.
            #[error("{} connection failed: {message}", $subject)]
            Connection { message: String },
            /// Query or mutation failed during execution.
            #[error("{} query failed: {message}", $subject)]
            Query { message: String },
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field : $ty),* },
            )*
        }

        impl $name {
            /// Construct the `Connection` variant.
            pub fn connection(message: impl Into<String>) -> Self {
                Self::Connection {
                    message: message.into(),
                }
            }

            /// Construct the `Query` variant.
            pub fn query(message: impl Into<String>) -> Self {
                Self::Query {
                    message: message.into(),
                }
            }

            $(
                ::paste::paste! {
                    #[doc = concat!("Construct the `", stringify!($variant), "` variant.")]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                        Self::$variant { $($field: $field.into()),* }
                    }
                }
            )*
        }
    };
}

pub(crate) use define_port_error;
