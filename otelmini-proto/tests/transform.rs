#[cfg(all(feature = "trace", feature = "gen-tonic-messages"))]
mod trace_transform {
    use std::time::SystemTime;

    use otelmini::trace::{
        SpanContext, SpanData, SpanId, SpanKind, Status, TraceFlags, TraceId, TraceState,
    };
    use otelmini::{InstrumentationScope, KeyValue, Resource};
    use otelmini_proto::transform::trace::tonic::group_spans_by_resource_and_scope;

    fn span_data(name: &'static str, resource: Resource, scope: InstrumentationScope) -> SpanData {
        SpanData {
            span_context: SpanContext::new(
                TraceId::from_u128(0x1234),
                SpanId::from_u64(0x5678),
                TraceFlags::SAMPLED,
                false,
                TraceState::default(),
            ),
            parent_span_id: SpanId::INVALID,
            span_kind: SpanKind::Client,
            name: name.into(),
            start_time: SystemTime::UNIX_EPOCH,
            end_time: SystemTime::UNIX_EPOCH,
            attributes: vec![KeyValue::new("k", "v")],
            events: vec![],
            links: vec![],
            status: Status::Unset,
            resource,
            scope,
        }
    }

    #[test]
    fn groups_by_resource_then_scope() {
        let resource_a = Resource::builder_empty().with_service_name("a").build();
        let resource_b = Resource::builder_empty().with_service_name("b").build();
        let scope_x = InstrumentationScope::builder("x").build();
        let scope_y = InstrumentationScope::builder("y").build();

        let spans = vec![
            span_data("s1", resource_a.clone(), scope_x.clone()),
            span_data("s2", resource_a.clone(), scope_y.clone()),
            span_data("s3", resource_b.clone(), scope_x.clone()),
            span_data("s4", resource_a.clone(), scope_x.clone()),
        ];

        let grouped = group_spans_by_resource_and_scope(spans);
        assert_eq!(grouped.len(), 2);

        let total_spans: usize = grouped
            .iter()
            .flat_map(|rs| rs.scope_spans.iter())
            .map(|ss| ss.spans.len())
            .sum();
        assert_eq!(total_spans, 4);

        let resource_a_group = grouped
            .iter()
            .find(|rs| {
                rs.resource
                    .as_ref()
                    .unwrap()
                    .attributes
                    .iter()
                    .any(|kv| kv.key == "service.name")
                    && rs.scope_spans.len() == 2
            })
            .expect("resource a has two scope groups");

        let scope_x_group = resource_a_group
            .scope_spans
            .iter()
            .find(|ss| ss.scope.as_ref().unwrap().name == "x")
            .unwrap();
        // insertion order within the group
        let names: Vec<&str> = scope_x_group.spans.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["s1", "s4"]);
    }

    #[test]
    fn unset_status_still_encodes() {
        let span = span_data(
            "s",
            Resource::empty(),
            InstrumentationScope::builder("lib").build(),
        );
        let grouped = group_spans_by_resource_and_scope(vec![span]);
        let proto_span = &grouped[0].scope_spans[0].spans[0];
        let status = proto_span.status.as_ref().expect("status present");
        assert_eq!(status.code, 0);
        assert!(status.message.is_empty());
    }

    #[test]
    fn ids_convert_to_big_endian_bytes() {
        let span = span_data(
            "s",
            Resource::empty(),
            InstrumentationScope::builder("lib").build(),
        );
        let grouped = group_spans_by_resource_and_scope(vec![span]);
        let proto_span = &grouped[0].scope_spans[0].spans[0];
        assert_eq!(proto_span.trace_id.len(), 16);
        assert_eq!(proto_span.span_id.len(), 8);
        assert_eq!(const_hex::encode(&proto_span.span_id), "0000000000005678");
        // root spans have an empty parent id
        assert!(proto_span.parent_span_id.is_empty());
    }
}

#[cfg(all(feature = "metrics", feature = "gen-tonic-messages"))]
mod metrics_transform {
    use std::time::SystemTime;

    use otelmini::metrics::data::{
        AggregatedMetrics, Metric, MetricData, ResourceMetrics, ScopeMetrics, Sum, SumDataPoint,
    };
    use otelmini::metrics::Temporality;
    use otelmini::{InstrumentationScope, Resource};
    use otelmini_proto::tonic::metrics::v1::number_data_point::Value;
    use otelmini_proto::tonic::metrics::v1::MetricsData;

    fn resource_metrics(data: AggregatedMetrics) -> ResourceMetrics {
        ResourceMetrics {
            resource: Resource::empty(),
            scope_metrics: vec![ScopeMetrics {
                scope: InstrumentationScope::builder("meter").build(),
                metrics: vec![Metric {
                    name: "m".into(),
                    description: "".into(),
                    unit: "".into(),
                    data,
                }],
            }],
        }
    }

    fn sum_point<T>(value: T) -> SumDataPoint<T> {
        SumDataPoint {
            attributes: vec![],
            start_time: SystemTime::UNIX_EPOCH,
            time: SystemTime::UNIX_EPOCH,
            value,
        }
    }

    fn first_point_value(rm: &ResourceMetrics) -> Value {
        let proto: MetricsData = rm.into();
        let metric = &proto.resource_metrics[0].scope_metrics[0].metrics[0];
        match metric.data.as_ref().unwrap() {
            otelmini_proto::tonic::metrics::v1::metric::Data::Sum(sum) => {
                sum.data_points[0].value.unwrap()
            }
            other => panic!("expected sum, got {other:?}"),
        }
    }

    #[test]
    fn integral_valued_f64_encodes_as_int() {
        let rm = resource_metrics(AggregatedMetrics::F64(MetricData::Sum(Sum {
            data_points: vec![sum_point(45.0f64)],
            temporality: Temporality::Cumulative,
            is_monotonic: true,
        })));
        assert_eq!(first_point_value(&rm), Value::AsInt(45));
    }

    #[test]
    fn fractional_f64_encodes_as_double() {
        let rm = resource_metrics(AggregatedMetrics::F64(MetricData::Sum(Sum {
            data_points: vec![sum_point(45.5f64)],
            temporality: Temporality::Cumulative,
            is_monotonic: true,
        })));
        assert_eq!(first_point_value(&rm), Value::AsDouble(45.5));
    }

    #[test]
    fn u64_encodes_as_int_with_cumulative_temporality() {
        let rm = resource_metrics(AggregatedMetrics::U64(MetricData::Sum(Sum {
            data_points: vec![sum_point(7u64)],
            temporality: Temporality::Cumulative,
            is_monotonic: true,
        })));
        let proto: MetricsData = (&rm).into();
        let metric = &proto.resource_metrics[0].scope_metrics[0].metrics[0];
        let otelmini_proto::tonic::metrics::v1::metric::Data::Sum(sum) =
            metric.data.as_ref().unwrap()
        else {
            panic!("expected sum");
        };
        // CUMULATIVE encodes as the enum integer 2
        assert_eq!(sum.aggregation_temporality, 2);
        assert_eq!(sum.data_points[0].value, Some(Value::AsInt(7)));
    }
}
