#[cfg(feature = "gen-tonic-messages")]
#[path = "proto/tonic"]
/// Message and client files in the `tonic`/`prost` generated layout.
pub mod tonic {
    /// Service stubs and clients
    #[path = ""]
    pub mod collector {
        #[cfg(feature = "logs")]
        #[path = ""]
        pub mod logs {
            #[path = "opentelemetry.proto.collector.logs.v1.rs"]
            pub mod v1;
        }

        #[cfg(feature = "metrics")]
        #[path = ""]
        pub mod metrics {
            #[path = "opentelemetry.proto.collector.metrics.v1.rs"]
            pub mod v1;
        }

        #[cfg(feature = "trace")]
        #[path = ""]
        pub mod trace {
            #[path = "opentelemetry.proto.collector.trace.v1.rs"]
            pub mod v1;
        }
    }

    /// Common types used across all signals
    #[path = ""]
    pub mod common {
        #[path = "opentelemetry.proto.common.v1.rs"]
        pub mod v1;
    }

    /// Generated types used in logging.
    #[cfg(feature = "logs")]
    #[path = ""]
    pub mod logs {
        #[path = "opentelemetry.proto.logs.v1.rs"]
        pub mod v1;
    }

    /// Generated types used in metrics.
    #[cfg(feature = "metrics")]
    #[path = ""]
    pub mod metrics {
        #[path = "opentelemetry.proto.metrics.v1.rs"]
        pub mod v1;
    }

    /// Generated types used in resources.
    #[path = ""]
    pub mod resource {
        #[path = "opentelemetry.proto.resource.v1.rs"]
        pub mod v1;
    }

    /// Generated types used in traces.
    #[cfg(feature = "trace")]
    #[path = ""]
    pub mod trace {
        #[path = "opentelemetry.proto.trace.v1.rs"]
        pub mod v1;
    }
}

#[cfg(feature = "with-serde")]
pub(crate) mod serializers {
    use serde::de::{self, Deserialize};
    use serde::{Deserializer, Serializer};

    // hex string <-> id bytes (OTLP/JSON encodes trace/span ids as
    // lowercase hex)
    pub fn serialize_to_hex_string<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&const_hex::encode(bytes))
    }

    pub fn deserialize_from_hex_string<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex: String = Deserialize::deserialize(deserializer)?;
        if hex.is_empty() {
            return Ok(Vec::new());
        }
        const_hex::decode(&hex).map_err(de::Error::custom)
    }

    // 64-bit integers are encoded as decimal strings in OTLP/JSON; accept
    // plain numbers on the way in as some encoders emit them
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum StringOrU64 {
        String(String),
        Number(u64),
    }

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum StringOrI64 {
        String(String),
        Number(i64),
    }

    pub fn serialize_u64_to_string<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize_string_to_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match StringOrU64::deserialize(deserializer)? {
            StringOrU64::String(s) => s.parse().map_err(de::Error::custom),
            StringOrU64::Number(n) => Ok(n),
        }
    }

    pub fn serialize_i64_to_string<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize_string_to_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match StringOrI64::deserialize(deserializer)? {
            StringOrI64::String(s) => s.parse().map_err(de::Error::custom),
            StringOrI64::Number(n) => Ok(n),
        }
    }

    pub fn serialize_vec_u64_to_string<S>(values: &[u64], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(values.iter().map(u64::to_string))
    }

    pub fn deserialize_vec_string_to_vec_u64<'de, D>(
        deserializer: D,
    ) -> Result<Vec<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values: Vec<StringOrU64> = Deserialize::deserialize(deserializer)?;
        values
            .into_iter()
            .map(|v| match v {
                StringOrU64::String(s) => s.parse().map_err(de::Error::custom),
                StringOrU64::Number(n) => Ok(n),
            })
            .collect()
    }

    // an unset span status must encode as an empty object, so its default
    // fields are skipped
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn is_zero_i32(value: &i32) -> bool {
        *value == 0
    }

    // bytes values are base64 in OTLP/JSON
    pub fn serialize_bytes_to_base64<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize_base64_to_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        let encoded: String = Deserialize::deserialize(deserializer)?;
        STANDARD.decode(&encoded).map_err(de::Error::custom)
    }
}
