#[cfg(all(feature = "with-serde", feature = "gen-tonic-messages"))]
mod json_serde {
    use otelmini_proto::tonic::common::v1::any_value::Value;
    use otelmini_proto::tonic::common::v1::{AnyValue, ArrayValue, InstrumentationScope, KeyValue};
    #[cfg(feature = "trace")]
    use otelmini_proto::tonic::collector::trace::v1::ExportTraceServiceRequest;
    #[cfg(feature = "metrics")]
    use otelmini_proto::tonic::metrics::v1::{
        metric::Data, number_data_point::Value as MetricValue, Metric, NumberDataPoint,
    };
    use otelmini_proto::tonic::resource::v1::Resource;
    #[cfg(feature = "trace")]
    use otelmini_proto::tonic::trace::v1::{ResourceSpans, ScopeSpans, Span, Status};

    #[cfg(feature = "trace")]
    fn example_request() -> ExportTraceServiceRequest {
        ExportTraceServiceRequest {
            resource_spans: vec![ResourceSpans {
                resource: Some(Resource {
                    attributes: vec![KeyValue {
                        key: String::from("service.name"),
                        value: Some(AnyValue {
                            value: Some(Value::StringValue(String::from("my.service"))),
                        }),
                    }],
                    dropped_attributes_count: 0,
                }),
                scope_spans: vec![ScopeSpans {
                    scope: Some(InstrumentationScope {
                        name: String::from("my.library"),
                        version: String::from("1.0.0"),
                        attributes: vec![],
                        dropped_attributes_count: 0,
                    }),
                    spans: vec![Span {
                        trace_id: const_hex::decode("5b8efff798038103d269b633813fc60c").unwrap(),
                        span_id: const_hex::decode("eee19b7ec3c1b174").unwrap(),
                        trace_state: String::new(),
                        parent_span_id: const_hex::decode("eee19b7ec3c1b173").unwrap(),
                        flags: 0,
                        name: String::from("I'm a server span"),
                        kind: 2,
                        start_time_unix_nano: 1544712660000000000,
                        end_time_unix_nano: 1544712661000000000,
                        attributes: vec![],
                        dropped_attributes_count: 0,
                        events: vec![],
                        dropped_events_count: 0,
                        links: vec![],
                        dropped_links_count: 0,
                        status: Some(Status::default()),
                    }],
                    schema_url: String::new(),
                }],
                schema_url: String::new(),
            }],
        }
    }

    #[cfg(feature = "trace")]
    #[test]
    fn span_request_encodes_canonical_json() {
        let json = serde_json::to_value(example_request()).unwrap();
        let span = &json["resourceSpans"][0]["scopeSpans"][0]["spans"][0];

        // 32/16 char lowercase hex ids
        assert_eq!(span["traceId"], "5b8efff798038103d269b633813fc60c");
        assert_eq!(span["spanId"], "eee19b7ec3c1b174");
        assert_eq!(span["parentSpanId"], "eee19b7ec3c1b173");
        // nanosecond timestamps as decimal strings
        assert_eq!(span["startTimeUnixNano"], "1544712660000000000");
        assert_eq!(span["endTimeUnixNano"], "1544712661000000000");
        // span kind as the proto enum integer
        assert_eq!(span["kind"], 2);
        // an unset status encodes as an empty object
        assert_eq!(span["status"], serde_json::json!({}));

        let resource_attr = &json["resourceSpans"][0]["resource"]["attributes"][0];
        assert_eq!(resource_attr["key"], "service.name");
        assert_eq!(resource_attr["value"]["stringValue"], "my.service");
    }

    #[cfg(feature = "trace")]
    #[test]
    fn span_request_round_trips() {
        let request = example_request();
        let json = serde_json::to_string(&request).unwrap();
        let decoded: ExportTraceServiceRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request, decoded);
    }

    #[test]
    fn any_value_variants() {
        let cases = [
            (
                AnyValue {
                    value: Some(Value::BoolValue(true)),
                },
                serde_json::json!({"boolValue": true}),
            ),
            (
                AnyValue {
                    value: Some(Value::StringValue("x".into())),
                },
                serde_json::json!({"stringValue": "x"}),
            ),
            (
                AnyValue {
                    value: Some(Value::IntValue(1337)),
                },
                serde_json::json!({"intValue": "1337"}),
            ),
            (
                AnyValue {
                    value: Some(Value::DoubleValue(1.5)),
                },
                serde_json::json!({"doubleValue": 1.5}),
            ),
            (
                AnyValue {
                    value: Some(Value::BytesValue(vec![0x68, 0x69])),
                },
                serde_json::json!({"bytesValue": "aGk="}),
            ),
            (
                AnyValue {
                    value: Some(Value::ArrayValue(ArrayValue {
                        values: vec![AnyValue {
                            value: Some(Value::IntValue(7)),
                        }],
                    })),
                },
                serde_json::json!({"arrayValue": {"values": [{"intValue": "7"}]}}),
            ),
        ];
        for (value, expected) in cases {
            assert_eq!(serde_json::to_value(&value).unwrap(), expected);
            let decoded: AnyValue = serde_json::from_value(expected).unwrap();
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn int_value_decodes_from_number_or_string() {
        let from_string: AnyValue = serde_json::from_str(r#"{"intValue":"123"}"#).unwrap();
        let from_number: AnyValue = serde_json::from_str(r#"{"intValue":123}"#).unwrap();
        assert_eq!(from_string, from_number);
        assert_eq!(from_string.value, Some(Value::IntValue(123)));
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn number_data_point_as_int_and_as_double() {
        let point = NumberDataPoint {
            attributes: vec![],
            start_time_unix_nano: 1,
            time_unix_nano: 2,
            flags: 0,
            value: Some(MetricValue::AsInt(10)),
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["asInt"], "10");
        assert_eq!(json["startTimeUnixNano"], "1");

        let point = NumberDataPoint {
            value: Some(MetricValue::AsDouble(45.5)),
            ..point
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["asDouble"], 45.5);

        let decoded: NumberDataPoint = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.value, Some(MetricValue::AsDouble(45.5)));
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metric_data_oneof_flattens() {
        let metric = Metric {
            name: "requests".into(),
            description: String::new(),
            unit: String::new(),
            data: Some(Data::Sum(otelmini_proto::tonic::metrics::v1::Sum {
                data_points: vec![],
                aggregation_temporality: 2,
                is_monotonic: true,
            })),
        };
        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["sum"]["aggregationTemporality"], 2);
        assert_eq!(json["sum"]["isMonotonic"], true);

        let decoded: Metric = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, metric);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn histogram_bucket_counts_encode_as_strings() {
        let point = otelmini_proto::tonic::metrics::v1::HistogramDataPoint {
            attributes: vec![],
            start_time_unix_nano: 0,
            time_unix_nano: 0,
            count: 5,
            sum: Some(270.0),
            bucket_counts: vec![1, 2, 1, 1],
            explicit_bounds: vec![10.0, 50.0, 100.0],
            flags: 0,
            min: Some(5.0),
            max: Some(150.0),
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["count"], "5");
        assert_eq!(json["bucketCounts"], serde_json::json!(["1", "2", "1", "1"]));
        assert_eq!(json["explicitBounds"], serde_json::json!([10.0, 50.0, 100.0]));

        let decoded: otelmini_proto::tonic::metrics::v1::HistogramDataPoint =
            serde_json::from_value(json).unwrap();
        assert_eq!(decoded, point);
    }

    #[cfg(feature = "logs")]
    #[test]
    fn log_record_round_trips() {
        use otelmini_proto::tonic::logs::v1::LogRecord;
        let record = LogRecord {
            time_unix_nano: 1234567890,
            observed_time_unix_nano: 1234567891,
            severity_number: 9,
            severity_text: "INFO".into(),
            body: Some(AnyValue {
                value: Some(Value::StringValue("hello".into())),
            }),
            attributes: vec![],
            dropped_attributes_count: 0,
            flags: 1,
            trace_id: const_hex::decode("5b8efff798038103d269b633813fc60c").unwrap(),
            span_id: const_hex::decode("eee19b7ec3c1b174").unwrap(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["timeUnixNano"], "1234567890");
        assert_eq!(json["severityNumber"], 9);
        assert_eq!(json["traceId"], "5b8efff798038103d269b633813fc60c");

        let decoded: LogRecord = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, record);
    }
}
