use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Day of a weekly meeting. The ordinal (Monday = 0 .. Sunday = 6) is what
/// gets stored, serialized and compared everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Single-character Korean day token used by the registration site.
    pub fn from_korean(c: char) -> Option<Self> {
        match c {
            '월' => Some(DayOfWeek::Monday),
            '화' => Some(DayOfWeek::Tuesday),
            '수' => Some(DayOfWeek::Wednesday),
            '목' => Some(DayOfWeek::Thursday),
            '금' => Some(DayOfWeek::Friday),
            '토' => Some(DayOfWeek::Saturday),
            '일' => Some(DayOfWeek::Sunday),
            _ => None,
        }
    }

    pub fn korean(self) -> char {
        match self {
            DayOfWeek::Monday => '월',
            DayOfWeek::Tuesday => '화',
            DayOfWeek::Wednesday => '수',
            DayOfWeek::Thursday => '목',
            DayOfWeek::Friday => '금',
            DayOfWeek::Saturday => '토',
            DayOfWeek::Sunday => '일',
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.korean())
    }
}

impl Serialize for DayOfWeek {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.ordinal())
    }
}

impl<'de> Deserialize<'de> for DayOfWeek {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ordinal = i64::deserialize(deserializer)?;
        DayOfWeek::from_ordinal(ordinal).ok_or_else(|| {
            serde::de::Error::custom(format!("day ordinal out of range: {}", ordinal))
        })
    }
}
