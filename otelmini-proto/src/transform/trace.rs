#[cfg(feature = "gen-tonic-messages")]
pub mod tonic {
    use std::collections::HashMap;

    use crate::proto::tonic::resource::v1::Resource;
    use crate::proto::tonic::trace::v1::{span, status, ResourceSpans, ScopeSpans, Span, Status};
    use crate::transform::common::{to_nanos, tonic::Attributes};
    use otelmini::trace::{Event, Link, SpanData, SpanId, SpanKind, Status as SdkStatus};
    use otelmini::{InstrumentationScope, Resource as SdkResource};

    impl From<SpanKind> for span::SpanKind {
        fn from(span_kind: SpanKind) -> Self {
            match span_kind {
                SpanKind::Client => span::SpanKind::Client,
                SpanKind::Consumer => span::SpanKind::Consumer,
                SpanKind::Internal => span::SpanKind::Internal,
                SpanKind::Producer => span::SpanKind::Producer,
                SpanKind::Server => span::SpanKind::Server,
            }
        }
    }

    impl From<&SdkStatus> for status::StatusCode {
        fn from(status: &SdkStatus) -> Self {
            match status {
                SdkStatus::Ok => status::StatusCode::Ok,
                SdkStatus::Unset => status::StatusCode::Unset,
                SdkStatus::Error { .. } => status::StatusCode::Error,
            }
        }
    }

    impl From<Event> for span::Event {
        fn from(event: Event) -> Self {
            span::Event {
                time_unix_nano: to_nanos(event.timestamp),
                name: event.name.into(),
                attributes: Attributes::from(event.attributes).0,
                dropped_attributes_count: 0,
            }
        }
    }

    impl From<Link> for span::Link {
        fn from(link: Link) -> Self {
            span::Link {
                trace_id: link.span_context.trace_id().to_bytes().to_vec(),
                span_id: link.span_context.span_id().to_bytes().to_vec(),
                trace_state: link.span_context.trace_state().header().to_string(),
                attributes: Attributes::from(link.attributes).0,
                dropped_attributes_count: 0,
                flags: link.span_context.trace_flags().to_u8() as u32,
            }
        }
    }

    impl From<SpanData> for Span {
        fn from(source_span: SpanData) -> Self {
            let span_kind: span::SpanKind = source_span.span_kind.into();
            Span {
                trace_id: source_span.span_context.trace_id().to_bytes().to_vec(),
                span_id: source_span.span_context.span_id().to_bytes().to_vec(),
                trace_state: source_span.span_context.trace_state().header().to_string(),
                parent_span_id: if source_span.parent_span_id != SpanId::INVALID {
                    source_span.parent_span_id.to_bytes().to_vec()
                } else {
                    vec![]
                },
                flags: source_span.span_context.trace_flags().to_u8() as u32,
                name: source_span.name.into(),
                kind: span_kind as i32,
                start_time_unix_nano: to_nanos(source_span.start_time),
                end_time_unix_nano: to_nanos(source_span.end_time),
                attributes: Attributes::from(source_span.attributes).0,
                dropped_attributes_count: 0,
                events: source_span.events.into_iter().map(Into::into).collect(),
                dropped_events_count: 0,
                links: source_span.links.into_iter().map(Into::into).collect(),
                dropped_links_count: 0,
                // an unset status still encodes, as an empty object
                status: Some(Status {
                    code: status::StatusCode::from(&source_span.status).into(),
                    message: match source_span.status {
                        SdkStatus::Error { description } => description.into(),
                        _ => Default::default(),
                    },
                }),
            }
        }
    }

    /// Group finished spans by identical resource, then by identical scope,
    /// into the `resourceSpans[].scopeSpans[].spans[]` wire layout. Span
    /// order within a group is the input order.
    pub fn group_spans_by_resource_and_scope(spans: Vec<SpanData>) -> Vec<ResourceSpans> {
        let mut grouped: Vec<(SdkResource, Vec<(InstrumentationScope, Vec<SpanData>)>)> =
            Vec::new();
        let mut resource_index: HashMap<SdkResource, usize> = HashMap::new();

        for span in spans {
            let resource = span.resource.clone();
            let index = *resource_index.entry(resource.clone()).or_insert_with(|| {
                grouped.push((resource, Vec::new()));
                grouped.len() - 1
            });
            let scopes = &mut grouped[index].1;
            match scopes.iter_mut().find(|(scope, _)| *scope == span.scope) {
                Some((_, scope_spans)) => scope_spans.push(span),
                None => scopes.push((span.scope.clone(), vec![span])),
            }
        }

        grouped
            .into_iter()
            .map(|(resource, scopes)| ResourceSpans {
                resource: Some(Resource::from(&resource)),
                schema_url: resource.schema_url().unwrap_or_default().to_string(),
                scope_spans: scopes
                    .into_iter()
                    .map(|(scope, scope_spans)| ScopeSpans {
                        schema_url: scope.schema_url().unwrap_or_default().to_string(),
                        scope: Some((&scope).into()),
                        spans: scope_spans.into_iter().map(Into::into).collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}
