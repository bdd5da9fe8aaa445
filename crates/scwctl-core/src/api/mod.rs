//! Per-resource API clients
//!
//! Each submodule wraps one product API:
//!
//! - [`block`] - block storage volumes and snapshots (zoned)
//! - [`container`] - serverless container namespaces, containers and triggers (regioned)
//! - [`instance`] - compute servers and security groups (zoned)
//!
//! and ships the sweepers that empty that API for one locality or for all of
//! them.

/// Define a string-valued API enum
///
/// Every enum gets an `Unknown` variant holding the raw value, which is
/// where values added to the API after this SDK was written end up when
/// decoding. They serialize back unchanged.
macro_rules! api_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            Unknown(String),
            $( $(#[$vmeta])* $variant, )+
        }

        impl Default for $name {
            fn default() -> Self {
                $name::Unknown(String::new())
            }
        }

        impl $name {
            /// Every known value, `Unknown` excluded
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $name::Unknown(raw) => raw,
                    $( $name::$variant => $value, )+
                }
            }

            pub fn is_unknown(&self) -> bool {
                matches!(self, $name::Unknown(_))
            }

            /// Decode an API value, keeping anything unrecognised as `Unknown`
            pub fn from_api(value: &str) -> Self {
                match value {
                    $( $value => $name::$variant, )+
                    other => $name::Unknown(other.to_string()),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::ScwError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match $name::from_api(s) {
                    $name::Unknown(_) => Err($crate::error::ScwError::InvalidArgument(format!(
                        "invalid {} '{}', expected one of: {}",
                        stringify!($name),
                        s,
                        $name::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))),
                    known => Ok(known),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let value = <String as serde::Deserialize>::deserialize(deserializer)?;
                Ok($name::from_api(&value))
            }
        }
    };
}

pub(crate) use api_enum;

pub mod block;
pub mod container;
pub mod instance;

#[cfg(test)]
mod tests {
    api_enum! {
        pub enum Color {
            Red => "red",
            DarkBlue => "dark_blue",
        }
    }

    #[test]
    fn test_api_enum_round_trip_and_fallback() {
        assert_eq!(serde_json::to_string(&Color::DarkBlue).unwrap(), "\"dark_blue\"");
        let c: Color = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(c, Color::Red);
        let c: Color = serde_json::from_str("\"ultraviolet\"").unwrap();
        assert_eq!(c, Color::Unknown("ultraviolet".to_string()));
        assert!(c.is_unknown());
    }

    #[test]
    fn test_api_enum_unknown_value_survives_reencoding() {
        let c: Color = serde_json::from_str("\"ultraviolet\"").unwrap();
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"ultraviolet\"");
        assert_eq!(c.to_string(), "ultraviolet");
    }

    #[test]
    fn test_api_enum_from_str_is_strict() {
        assert_eq!("red".parse::<Color>().unwrap(), Color::Red);
        let err = "green".parse::<Color>().unwrap_err();
        assert!(err.to_string().contains("red, dark_blue"));
    }
}
