use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Travel intent of a vehicle along its route.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, DbEnum, Serialize, Deserialize)]
#[db_enum(existing_type_path = "crate::schema::sql_types::DirectionType")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    #[default]
    Stopped,
    Forward,
    Reverse,
}

/// Operational phase of a vehicle.
///
/// IDLE is an explicit rest state (out of service at a depot or terminal)
/// and is never promoted to READY by terminal proximity alone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, DbEnum, Serialize, Deserialize)]
#[db_enum(existing_type_path = "crate::schema::sql_types::TripStatusType")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    #[default]
    Idle,
    Ready,
    OnTrip,
}

/// Storage tag for [`StopProgress`]. `AtStop` carries its order in the
/// separate `progress_order` column.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, DbEnum, Serialize, Deserialize)]
#[db_enum(existing_type_path = "crate::schema::sql_types::StopProgressKind")]
pub enum StopProgressKind {
    #[default]
    BeforeFirst,
    PastLast,
    AtStop,
}

/// How far along its route a vehicle has confirmed progress.
///
/// The sentinels bracket the route regardless of how many stops it has:
/// `BeforeFirst` is where a FORWARD traversal starts, `PastLast` where a
/// REVERSE traversal starts. Ordering is `BeforeFirst < At(n) < PastLast`
/// for any stop order `n` on the route.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StopProgress {
    #[default]
    BeforeFirst,
    PastLast,
    At(i32),
}

impl StopProgress {
    /// The sentinel a traversal in `direction` starts from.
    pub fn start_of(direction: Direction) -> Self {
        match direction {
            Direction::Reverse => StopProgress::PastLast,
            _ => StopProgress::BeforeFirst,
        }
    }

    /// Whether reaching a stop with `order` is monotonically consistent
    /// with the current direction: FORWARD only ever moves to higher
    /// orders, REVERSE only to lower ones.
    pub fn advances(&self, direction: Direction, order: i32) -> bool {
        match direction {
            Direction::Forward => match self {
                StopProgress::BeforeFirst => true,
                StopProgress::At(n) => order > *n,
                StopProgress::PastLast => false,
            },
            Direction::Reverse => match self {
                StopProgress::PastLast => true,
                StopProgress::At(n) => order < *n,
                StopProgress::BeforeFirst => false,
            },
            Direction::Stopped => false,
        }
    }

    pub fn kind(&self) -> StopProgressKind {
        match self {
            StopProgress::BeforeFirst => StopProgressKind::BeforeFirst,
            StopProgress::PastLast => StopProgressKind::PastLast,
            StopProgress::At(_) => StopProgressKind::AtStop,
        }
    }

    /// The confirmed stop order, if any. Sentinels have none.
    pub fn order(&self) -> Option<i32> {
        match self {
            StopProgress::At(n) => Some(*n),
            _ => None,
        }
    }

    /// Rebuild from the two persisted columns. An `AtStop` row missing its
    /// order is treated as the FORWARD start sentinel.
    pub fn from_columns(kind: StopProgressKind, order: Option<i32>) -> Self {
        match (kind, order) {
            (StopProgressKind::AtStop, Some(n)) => StopProgress::At(n),
            (StopProgressKind::PastLast, _) => StopProgress::PastLast,
            _ => StopProgress::BeforeFirst,
        }
    }
}

/// A fleet vehicle and its live state. Provisioning owns the identity
/// fields; the location processor owns everything from `latitude` through
/// `last_contact` and is the only writer of them.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::buses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Bus {
    pub id: Uuid,
    pub device_id: String,
    pub name: String,
    pub route_id: Option<Uuid>,
    pub api_key: String,
    pub is_active: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed_kmh: Option<f64>,
    pub direction: Direction,
    pub trip_status: TripStatus,
    pub progress_kind: StopProgressKind,
    pub progress_order: Option<i32>,
    pub last_contact: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bus {
    pub fn progress(&self) -> StopProgress {
        StopProgress::from_columns(self.progress_kind, self.progress_order)
    }
}
