//! CSV export of analytics events
//!
//! Each requested column maps to a header (`column_header`) and a cell
//! (`accessor`). Columns without a dedicated accessor fall back to the
//! raw event field of the same name; absent values become empty cells.
//! Columns that share a header occupy one CSV column, filled by the last
//! of them.

use std::pin::Pin;

use bytes::Bytes;
use csv::WriterBuilder;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, error, info};

use super::countries::country_name;
use crate::errors::{LinkhubError, Result};
use crate::storage::{AnalyticsEvent, ROOT_KEY};
use crate::utils::capitalize;

/// Split `columns`, trimming entries and keeping the first of any duplicate
pub fn parse_columns(raw: Option<&str>) -> Result<Vec<String>> {
    let mut columns: Vec<String> = Vec::new();
    for column in raw.unwrap_or_default().split(',') {
        let column = column.trim();
        if !column.is_empty() && !columns.iter().any(|c| c == column) {
            columns.push(column.to_string());
        }
    }
    if columns.is_empty() {
        return Err(LinkhubError::validation(
            "`columns` is required, e.g. columns=timestamp,link,country.",
        ));
    }
    Ok(columns)
}

pub fn column_header(column: &str) -> String {
    match column {
        "trigger" => "Event".to_string(),
        "os" => "OS".to_string(),
        "timestamp" => "Date".to_string(),
        "invoiceId" => "Invoice ID".to_string(),
        "amount" => "Sales Amount".to_string(),
        other => capitalize(other),
    }
}

fn accessor(column: &str, row: &AnalyticsEvent) -> Option<String> {
    match column {
        "trigger" => Some(if row.qr { "QR scan" } else { "Link click" }.to_string()),
        "event" => row.event_name.clone(),
        "link" => Some(if row.key == ROOT_KEY {
            row.domain.clone()
        } else {
            format!("{}/{}", row.domain, row.key)
        }),
        "country" => row
            .country
            .as_deref()
            .map(|code| country_name(code).unwrap_or(code).to_string()),
        "customer" => row.customer_name.as_deref().map(|name| match row.customer_email {
            Some(ref email) => format!("{} <{}>", name, email),
            None => name.to_string(),
        }),
        "invoiceId" => row.invoice_id.clone(),
        "amount" => row
            .amount
            .map(|cents| format!("${:.2}", cents as f64 / 100.0)),
        _ => None,
    }
}

fn raw_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Maps events to CSV records for a fixed column list
#[derive(Debug, Clone)]
pub struct ExportColumns {
    /// (header, source column), one entry per distinct header
    slots: Vec<(String, String)>,
}

impl ExportColumns {
    pub fn new(columns: Vec<String>) -> Self {
        let mut slots: Vec<(String, String)> = Vec::with_capacity(columns.len());
        for column in columns {
            let header = column_header(&column);
            match slots.iter_mut().find(|(h, _)| *h == header) {
                Some(slot) => slot.1 = column,
                None => slots.push((header, column)),
            }
        }
        Self { slots }
    }

    pub fn headers(&self) -> Vec<String> {
        self.slots.iter().map(|(header, _)| header.clone()).collect()
    }

    pub fn record(&self, row: &AnalyticsEvent) -> Vec<String> {
        // Serialized lazily; most exports only use accessor columns
        let mut raw: Option<Value> = None;
        self.slots
            .iter()
            .map(|(_, column)| {
                accessor(column, row).unwrap_or_else(|| {
                    let value = raw.get_or_insert_with(|| {
                        serde_json::to_value(row).unwrap_or(Value::Null)
                    });
                    raw_value(value.get(column))
                })
            })
            .collect()
    }
}

fn write_records(records: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(vec![]);
    for record in records {
        writer.write_record(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| LinkhubError::serialization(e.error().to_string()))
}

pub type EventBatches =
    Pin<Box<dyn Stream<Item = std::result::Result<Vec<AnalyticsEvent>, LinkhubError>> + Send>>;

/// Stream the header row followed by one CSV chunk per batch
///
/// Rows are rendered on the blocking pool.
pub fn create_csv_stream(
    batches: EventBatches,
    columns: ExportColumns,
) -> impl Stream<Item = std::result::Result<Bytes, actix_web::Error>> {
    use futures_util::stream;

    let header = write_records(&[columns.headers()])
        .map(Bytes::from)
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()));

    let body = stream::unfold(
        (batches, columns, 0usize, false),
        |(mut batches, columns, mut count, failed)| async move {
            if failed {
                return None;
            }
            match batches.next().await {
                Some(Ok(batch)) => {
                    let batch_len = batch.len();
                    let mapper = columns.clone();
                    let rendered = tokio::task::spawn_blocking(move || {
                        let records: Vec<Vec<String>> =
                            batch.iter().map(|row| mapper.record(row)).collect();
                        write_records(&records)
                    })
                    .await;

                    match rendered {
                        Ok(Ok(chunk)) => {
                            count += batch_len;
                            debug!("Export stream: sent {} rows (total: {})", batch_len, count);
                            Some((Ok(Bytes::from(chunk)), (batches, columns, count, false)))
                        }
                        Ok(Err(e)) => {
                            error!("Failed to render CSV batch: {}", e);
                            Some((
                                Err(actix_web::error::ErrorInternalServerError(
                                    "CSV generation error",
                                )),
                                (batches, columns, count, true),
                            ))
                        }
                        Err(e) => {
                            error!("Blocking task panicked: {}", e);
                            Some((
                                Err(actix_web::error::ErrorInternalServerError("CSV task failed")),
                                (batches, columns, count, true),
                            ))
                        }
                    }
                }
                Some(Err(e)) => {
                    error!("Export stream database error after {} rows: {}", count, e);
                    Some((
                        Err(actix_web::error::ErrorInternalServerError(
                            "Failed to read events",
                        )),
                        (batches, columns, count, true),
                    ))
                }
                None => {
                    info!("Export stream completed: {} rows", count);
                    None
                }
            }
        },
    );

    stream::once(async move { header }).chain(body)
}
