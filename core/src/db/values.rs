use sea_orm::{
    sea_query::{ArrayType, Nullable, Value, ValueType, ValueTypeErr},
    ColumnType, QueryResult,
};
use serde::{Deserialize, Serialize};

/// Ordered set of tags, stored as a JSON array of strings.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringVec(pub Vec<String>);

impl StringVec {
    /// Trims every tag, drops empty ones and keeps the first occurrence of
    /// each (case-insensitive) tag.
    pub fn ordered_set<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.as_ref().trim();
            if tag.is_empty() {
                continue;
            }
            if out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                continue;
            }
            out.push(tag.to_string());
        }
        StringVec(out)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl From<Vec<String>> for StringVec {
    fn from(v: Vec<String>) -> Self {
        StringVec(v)
    }
}

impl std::convert::From<StringVec> for Value {
    fn from(source: StringVec) -> Self {
        let jarr: serde_json::Value = source.0.into();
        jarr.into()
    }
}

impl sea_orm::TryGetable for StringVec {
    fn try_get_by<I: sea_orm::ColIdx>(
        res: &QueryResult,
        idx: I,
    ) -> Result<Self, sea_orm::TryGetError> {
        <serde_json::Value as sea_orm::TryGetable>::try_get_by(res, idx).and_then(|v| {
            serde_json::from_value::<Vec<String>>(v)
                .map(StringVec)
                .map_err(|err| {
                    sea_orm::TryGetError::DbErr(sea_orm::DbErr::Type(err.to_string()))
                })
        })
    }
}

impl ValueType for StringVec {
    fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
        <serde_json::Value as ValueType>::try_from(v).and_then(|jarr| {
            serde_json::from_value::<Vec<String>>(jarr)
                .map(StringVec)
                .map_err(|_| ValueTypeErr)
        })
    }

    fn type_name() -> String {
        stringify!(StringVec).to_owned()
    }

    fn array_type() -> ArrayType {
        ArrayType::Json
    }

    fn column_type() -> ColumnType {
        ColumnType::Json
    }
}

impl Nullable for StringVec {
    fn null() -> Value {
        Value::Json(None)
    }
}
