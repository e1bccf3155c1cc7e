use serde::{Deserialize, Deserializer, Serializer};
use time::OffsetDateTime;

pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_i64(value.unix_timestamp())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = i64::deserialize(deserializer)?;

	OffsetDateTime::from_unix_timestamp(raw).map_err(serde::de::Error::custom)
}
