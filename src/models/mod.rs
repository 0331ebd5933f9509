//! Resource records as they are stored and serialized (camelCase JSON).

use uuid::Uuid;

/// Declares a closed set of string values with serde, `FromStr` and `Display`
/// implementations sharing one spelling per variant
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Comma separated list of accepted values
            pub fn expected() -> String {
                Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("must be one of: {}", Self::expected())),
                }
            }
        }
    };
}

pub mod alert;
pub mod order;
pub mod project;
pub mod reading;
pub mod station;
pub mod task;
pub mod user;

pub use alert::{AlertStatus, AlertType, SensorAlert};
pub use order::{Order, OrderStatus};
pub use project::{Project, ProjectStatus};
pub use reading::SensorReading;
pub use station::{StationStatus, WeatherStation};
pub use task::{Task, TaskPriority, TaskStatus};
pub use user::{Role, User, UserProfile};

/// Fresh string identifier such as `station-3f2a…`
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_prefixed_and_unique() {
        let a = new_id("station");
        let b = new_id("station");
        assert!(a.starts_with("station-"));
        assert_ne!(a, b);
    }

    #[test]
    fn enum_spelling_matches_wire_format() {
        assert_eq!(AlertType::AirQuality.as_str(), "airQuality");
        assert_eq!(serde_json::to_value(ProjectStatus::OnHold).unwrap(), "on_hold");
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!(
            "shipping".parse::<OrderStatus>().unwrap_err(),
            "must be one of: pending, processing, shipped, delivered, cancelled"
        );
    }
}
