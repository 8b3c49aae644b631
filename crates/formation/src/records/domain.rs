use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field map shared by request bodies and stored records.
pub type Fields = Map<String, Value>;

/// The three independent record collections exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Companies,
    Drafts,
    Submissions,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [Self::Companies, Self::Drafts, Self::Submissions];

    /// Singular, capitalised entity name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Companies => "Company",
            Self::Drafts => "Draft",
            Self::Submissions => "Submission",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Companies => "companies",
            Self::Drafts => "drafts",
            Self::Submissions => "submissions",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Companies => "/companies",
            Self::Drafts => "/drafts",
            Self::Submissions => "/submissions",
        }
    }

    pub fn not_found_message(self) -> String {
        format!("{} not found", self.label())
    }

    /// Whether single records can be fetched by id.
    pub fn supports_lookup(self) -> bool {
        matches!(self, Self::Companies | Self::Drafts)
    }

    /// Whether records can be updated or deleted after creation.
    pub fn is_mutable(self) -> bool {
        matches!(self, Self::Drafts)
    }

    /// Value of `status` stamped on creation, if the collection carries one.
    pub fn initial_status(self) -> Option<&'static str> {
        match self {
            Self::Companies => Some("submitted"),
            Self::Drafts => Some("draft"),
            Self::Submissions => None,
        }
    }
}

/// Numeric record identifier as parsed from a request path.
///
/// Digit runs that overflow `i64` are kept as the nearest `f64`, so they can
/// still match a stored id such as `1e20`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordId {
    Int(i64),
    Wide(f64),
}

impl RecordId {
    /// Lenient base-10 parse: leading whitespace and an optional sign are
    /// skipped, then the longest run of ASCII digits is taken. Trailing
    /// garbage is ignored (`"12abc"` is 12). No digits yields `None`.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let trimmed = raw.trim_start();
        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => ("-", &trimmed[1..]),
            Some(b'+') => ("", &trimmed[1..]),
            _ => ("", trimmed),
        };

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }

        let literal = format!("{sign}{}", &rest[..digits]);
        match literal.parse::<i64>() {
            Ok(value) => Some(Self::Int(value)),
            Err(_) => literal.parse::<f64>().ok().map(Self::Wide),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Wide(value) => value,
        }
    }
}


/// A stored record: an open JSON object with stamped system fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Fields);

impl Record {
    pub fn from_fields(fields: Fields) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub fn into_fields(self) -> Fields {
        self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Shallow merge: every field of `body` overwrites or extends `self`.
    /// Existing keys keep their position, new keys are appended.
    pub fn merge(&mut self, body: Fields) {
        for (field, value) in body {
            self.0.insert(field, value);
        }
    }

    /// True when the `id` field is a JSON number numerically equal to `id`.
    /// A string `"5"` does not match 5.
    pub fn has_id(&self, id: RecordId) -> bool {
        match self.0.get("id") {
            Some(Value::Number(number)) => match (id, number.as_i64()) {
                (RecordId::Int(want), Some(value)) => value == want,
                _ => number.as_f64() == Some(id.as_f64()),
            },
            _ => false,
        }
    }
}

/// Missing fields index to `null`, mirroring `serde_json::Value`.
impl std::ops::Index<&str> for Record {
    type Output = Value;

    fn index(&self, field: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.0.get(field).unwrap_or(&NULL)
    }
}
