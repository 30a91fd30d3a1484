#[cfg(feature = "gen-tonic-messages")]
pub mod tonic {
    use std::collections::HashMap;

    use crate::proto::tonic::logs::v1::{LogRecord, ResourceLogs, ScopeLogs};
    use crate::proto::tonic::resource::v1::Resource;
    use crate::transform::common::{to_nanos, tonic::Attributes};
    use otelmini::logs::SdkLogRecord;
    use otelmini::{InstrumentationScope, Resource as SdkResource};

    impl From<&SdkLogRecord> for LogRecord {
        fn from(record: &SdkLogRecord) -> Self {
            #[cfg(feature = "trace")]
            let (trace_id, span_id, flags) = match &record.trace_context {
                Some(ctx) => (
                    ctx.trace_id().to_bytes().to_vec(),
                    ctx.span_id().to_bytes().to_vec(),
                    ctx.trace_flags().to_u8() as u32,
                ),
                None => (vec![], vec![], 0),
            };
            #[cfg(not(feature = "trace"))]
            let (trace_id, span_id, flags) = (vec![], vec![], 0);

            LogRecord {
                time_unix_nano: record.timestamp.map(to_nanos).unwrap_or_default(),
                observed_time_unix_nano: record
                    .observed_timestamp
                    .map(to_nanos)
                    .unwrap_or_default(),
                severity_number: record
                    .severity_number
                    .map(|severity| severity as i32)
                    .unwrap_or_default(),
                severity_text: record
                    .severity_text
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                body: record.body.clone().map(Into::into),
                attributes: Attributes::from(
                    record
                        .attributes
                        .iter()
                        .cloned()
                        .map(|(key, value)| otelmini::KeyValue { key, value })
                        .collect::<Vec<_>>(),
                )
                .0,
                dropped_attributes_count: 0,
                flags,
                trace_id,
                span_id,
            }
        }
    }

    /// Group emitted records by identical resource, then by identical scope,
    /// into the `resourceLogs[].scopeLogs[].logRecords[]` wire layout.
    pub fn group_logs_by_resource_and_scope(records: Vec<SdkLogRecord>) -> Vec<ResourceLogs> {
        let mut grouped: Vec<(SdkResource, Vec<(InstrumentationScope, Vec<SdkLogRecord>)>)> =
            Vec::new();
        let mut resource_index: HashMap<SdkResource, usize> = HashMap::new();

        for record in records {
            let resource = record.resource().cloned().unwrap_or_else(SdkResource::empty);
            let scope = record
                .scope()
                .cloned()
                .unwrap_or_default();
            let index = *resource_index.entry(resource.clone()).or_insert_with(|| {
                grouped.push((resource, Vec::new()));
                grouped.len() - 1
            });
            let scopes = &mut grouped[index].1;
            match scopes.iter_mut().find(|(existing, _)| *existing == scope) {
                Some((_, scope_records)) => scope_records.push(record),
                None => scopes.push((scope, vec![record])),
            }
        }

        grouped
            .into_iter()
            .map(|(resource, scopes)| ResourceLogs {
                resource: Some(Resource::from(&resource)),
                schema_url: resource.schema_url().unwrap_or_default().to_string(),
                scope_logs: scopes
                    .into_iter()
                    .map(|(scope, scope_records)| ScopeLogs {
                        schema_url: scope.schema_url().unwrap_or_default().to_string(),
                        scope: Some((&scope).into()),
                        log_records: scope_records.iter().map(Into::into).collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}
