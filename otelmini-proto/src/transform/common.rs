use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub(crate) fn to_nanos(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_nanos() as u64
}

#[cfg(feature = "gen-tonic-messages")]
pub mod tonic {
    use crate::proto::tonic::common::v1::{
        any_value, AnyValue, ArrayValue, InstrumentationScope, KeyValue, KeyValueList,
    };
    use otelmini::{Array, Key, Value};

    /// Wrapper type for `Vec<KeyValue>`
    #[derive(Default, Debug)]
    pub struct Attributes(pub ::std::vec::Vec<KeyValue>);

    impl From<Vec<otelmini::KeyValue>> for Attributes {
        fn from(kvs: Vec<otelmini::KeyValue>) -> Self {
            Attributes(
                kvs.into_iter()
                    .map(|api_kv| KeyValue {
                        key: api_kv.key.as_str().to_string(),
                        value: Some(api_kv.value.into()),
                    })
                    .collect(),
            )
        }
    }

    impl From<&[otelmini::KeyValue]> for Attributes {
        fn from(kvs: &[otelmini::KeyValue]) -> Self {
            kvs.to_vec().into()
        }
    }

    impl From<Value> for AnyValue {
        fn from(value: Value) -> Self {
            AnyValue {
                value: Some(match value {
                    Value::Bool(val) => any_value::Value::BoolValue(val),
                    Value::I64(val) => any_value::Value::IntValue(val),
                    Value::F64(val) => any_value::Value::DoubleValue(val),
                    Value::String(val) => any_value::Value::StringValue(val.to_string()),
                    Value::Bytes(val) => any_value::Value::BytesValue(val),
                    Value::Array(array) => any_value::Value::ArrayValue(match array {
                        Array::Bool(vals) => array_into_proto(vals),
                        Array::I64(vals) => array_into_proto(vals),
                        Array::F64(vals) => array_into_proto(vals),
                        Array::String(vals) => array_into_proto(
                            vals.into_iter().map(String::from).collect::<Vec<_>>(),
                        ),
                    }),
                    Value::Map(map) => {
                        // sorted for deterministic wire output
                        let mut entries: Vec<(Key, Value)> = map.into_iter().collect();
                        entries.sort_by(|a, b| a.0.cmp(&b.0));
                        any_value::Value::KvlistValue(KeyValueList {
                            values: entries
                                .into_iter()
                                .map(|(k, v)| KeyValue {
                                    key: k.as_str().to_string(),
                                    value: Some(v.into()),
                                })
                                .collect(),
                        })
                    }
                }),
            }
        }
    }

    fn array_into_proto<T>(vals: Vec<T>) -> ArrayValue
    where
        Value: From<T>,
    {
        let values = vals
            .into_iter()
            .map(|val| AnyValue::from(Value::from(val)))
            .collect();
        ArrayValue { values }
    }

    impl From<&otelmini::InstrumentationScope> for InstrumentationScope {
        fn from(scope: &otelmini::InstrumentationScope) -> Self {
            InstrumentationScope {
                name: scope.name().to_string(),
                version: scope.version().unwrap_or_default().to_string(),
                attributes: Attributes::from(
                    scope.attributes().cloned().collect::<Vec<_>>(),
                )
                .0,
                dropped_attributes_count: 0,
            }
        }
    }

    impl From<&otelmini::Resource> for crate::proto::tonic::resource::v1::Resource {
        fn from(resource: &otelmini::Resource) -> Self {
            crate::proto::tonic::resource::v1::Resource {
                attributes: resource_attributes(resource).0,
                dropped_attributes_count: 0,
            }
        }
    }

    pub(crate) fn resource_attributes(resource: &otelmini::Resource) -> Attributes {
        resource
            .iter()
            .map(|(k, v)| otelmini::KeyValue {
                key: k.clone(),
                value: v.clone(),
            })
            .collect::<Vec<_>>()
            .into()
    }
}
