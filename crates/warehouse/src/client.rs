//! BigQuery v2 client.

use crate::schema::{infer_schema, result_cell, to_ndjson, ResultField};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use sheetbridge_core::{BridgeConfig, BridgeError, BridgeResult};
use sheetbridge_http::{Authenticator, GoogleHttp, Method, RelatedBody, Url};
use sheetbridge_sheet::{CellValue, Sheet};
use std::time::Duration;

const NDJSON_MEDIA_TYPE: &str = "application/octet-stream";

/// A finished load job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadJob {
    pub job_id: String,
    pub location: Option<String>,
    /// Rows written, when the API reports it.
    pub output_rows: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorProto {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    state: String,
    #[serde(default)]
    error_result: Option<ErrorProto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadStatistics {
    #[serde(default)]
    output_rows: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct JobStatistics {
    #[serde(default)]
    load: Option<LoadStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Job {
    job_reference: JobReference,
    status: JobStatus,
    #[serde(default)]
    statistics: Option<JobStatistics>,
}

#[derive(Debug, Deserialize)]
struct TableSchema {
    #[serde(default)]
    fields: Vec<ResultField>,
}

#[derive(Debug, Deserialize)]
struct TableCell {
    #[serde(default)]
    v: JsonValue,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default)]
    f: Vec<TableCell>,
}

/// `jobs.query` and `jobs.getQueryResults` share this shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    job_reference: JobReference,
    #[serde(default)]
    job_complete: bool,
    #[serde(default)]
    schema: Option<TableSchema>,
    #[serde(default)]
    rows: Vec<TableRow>,
    #[serde(default)]
    page_token: Option<String>,
}

/// Client for BigQuery.
#[derive(Debug, Clone)]
pub struct WarehouseClient {
    http: GoogleHttp,
    poll_interval: Duration,
}

impl WarehouseClient {
    /// Create a BigQuery client from an authenticator and configuration.
    pub fn new(auth: Authenticator, config: &BridgeConfig) -> BridgeResult<Self> {
        Ok(Self {
            http: GoogleHttp::new("bigquery", &config.endpoints.bigquery, auth)?,
            poll_interval: config.job_poll_interval(),
        })
    }

    /// Replace `project.dataset.table` with the contents of `sheet`.
    ///
    /// An existing table is dropped first, then an empty table is created
    /// and the rows are bulk-loaded with a schema inferred from the cells.
    /// Waits for the load job to finish.
    pub async fn load(
        &self,
        project_id: &str,
        dataset_id: &str,
        table_name: &str,
        sheet: &Sheet,
    ) -> BridgeResult<LoadJob> {
        let token = self.http.token().await?;
        let table_url = self.http.url(&[
            "bigquery", "v2", "projects", project_id, "datasets", dataset_id, "tables",
            table_name,
        ]);

        match self
            .http
            .send(self.http.request(Method::GET, table_url.clone(), &token))
            .await
        {
            Ok(_) => {
                self.http
                    .send(self.http.request(Method::DELETE, table_url, &token))
                    .await?;
                tracing::info!("Table {table_name} already exists, dropped it");
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("Table {table_name} does not exist yet");
            }
            Err(e) => return Err(e),
        }

        let schema = infer_schema(sheet);
        let table_ref = json!({
            "projectId": project_id,
            "datasetId": dataset_id,
            "tableId": table_name,
        });

        let create_url = self.http.url(&[
            "bigquery", "v2", "projects", project_id, "datasets", dataset_id, "tables",
        ]);
        self.http
            .send(
                self.http
                    .request(Method::POST, create_url, &token)
                    .json(&json!({ "tableReference": table_ref, "schema": { "fields": schema } })),
            )
            .await?;
        tracing::debug!("Created table {project_id}.{dataset_id}.{table_name}");

        let metadata = json!({
            "configuration": {
                "load": {
                    "destinationTable": table_ref,
                    "sourceFormat": "NEWLINE_DELIMITED_JSON",
                    "writeDisposition": "WRITE_TRUNCATE",
                    "schema": { "fields": schema },
                }
            }
        });
        let body = RelatedBody::new(&metadata, NDJSON_MEDIA_TYPE, &to_ndjson(sheet, &schema)?)?;

        let mut upload_url = self
            .http
            .url(&["upload", "bigquery", "v2", "projects", project_id, "jobs"]);
        upload_url
            .query_pairs_mut()
            .append_pair("uploadType", "multipart");
        let request = self
            .http
            .request(Method::POST, upload_url, &token)
            .header("Content-Type", body.content_type())
            .body(body.into_bytes());
        let job: Job = self.http.send_json(request).await?;

        let job = self.wait_for_job(project_id, job, &token).await?;
        if let Some(error) = job.status.error_result {
            let message = match error.reason {
                Some(reason) => format!("{reason}: {}", error.message),
                None => error.message,
            };
            return Err(BridgeError::LoadFailed {
                job_id: job.job_reference.job_id,
                message,
            });
        }

        let output_rows = job
            .statistics
            .and_then(|s| s.load)
            .and_then(|l| l.output_rows)
            .and_then(|n| n.parse().ok());
        tracing::info!(
            "Loaded {} row(s) into {project_id}.{dataset_id}.{table_name} (job {})",
            output_rows.unwrap_or(sheet.row_count() as u64),
            job.job_reference.job_id
        );

        Ok(LoadJob {
            job_id: job.job_reference.job_id,
            location: job.job_reference.location,
            output_rows,
        })
    }

    /// Run a standard-SQL query and collect every result row.
    pub async fn query(&self, query_text: &str, project_id: &str) -> BridgeResult<Sheet> {
        let token = self.http.token().await?;
        let url = self
            .http
            .url(&["bigquery", "v2", "projects", project_id, "queries"]);
        let mut response: QueryResponse = self
            .http
            .send_json(self.http.request(Method::POST, url, &token).json(&json!({
                "query": query_text,
                "useLegacySql": false,
            })))
            .await?;

        let job = response.job_reference.clone();
        let mut fields: Vec<ResultField> = Vec::new();
        let mut rows: Vec<Vec<CellValue>> = Vec::new();

        loop {
            if response.job_complete {
                if let Some(schema) = response.schema.take() {
                    fields = schema.fields;
                }
                rows.extend(response.rows.drain(..).map(|row| typed_row(&fields, row)));
            }

            let page_token = match (response.job_complete, response.page_token.take()) {
                (true, None) => break,
                (true, Some(token)) => Some(token),
                (false, _) => {
                    tokio::time::sleep(self.poll_interval).await;
                    None
                }
            };

            let url = self.results_url(project_id, &job, page_token.as_deref());
            response = self
                .http
                .send_json(self.http.request(Method::GET, url, &token))
                .await?;
        }

        let mut sheet = Sheet::new(fields.into_iter().map(|f| f.name).collect());
        for row in rows {
            sheet.push_row(row)?;
        }
        tracing::debug!(
            "Query job {} returned {} row(s)",
            job.job_id,
            sheet.row_count()
        );
        Ok(sheet)
    }

    async fn wait_for_job(&self, project_id: &str, mut job: Job, token: &str) -> BridgeResult<Job> {
        while job.status.state != "DONE" {
            tracing::debug!(
                "Job {} is {}, waiting",
                job.job_reference.job_id,
                job.status.state
            );
            tokio::time::sleep(self.poll_interval).await;

            let mut url = self.http.url(&[
                "bigquery",
                "v2",
                "projects",
                project_id,
                "jobs",
                &job.job_reference.job_id,
            ]);
            if let Some(location) = &job.job_reference.location {
                url.query_pairs_mut().append_pair("location", location);
            }
            job = self
                .http
                .send_json(self.http.request(Method::GET, url, token))
                .await?;
        }
        Ok(job)
    }

    fn results_url(&self, project_id: &str, job: &JobReference, page_token: Option<&str>) -> Url {
        let mut url = self.http.url(&[
            "bigquery",
            "v2",
            "projects",
            project_id,
            "queries",
            &job.job_id,
        ]);
        {
            let mut query = url.query_pairs_mut();
            if let Some(location) = &job.location {
                query.append_pair("location", location);
            }
            if let Some(page_token) = page_token {
                query.append_pair("pageToken", page_token);
            }
        }
        // an empty query string would leave a dangling '?'
        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }
}

/// Type a result row by the schema; missing trailing cells become `Null`.
fn typed_row(fields: &[ResultField], row: TableRow) -> Vec<CellValue> {
    let mut cells = row.f.into_iter();
    fields
        .iter()
        .map(|field| match cells.next() {
            Some(cell) => result_cell(field, &cell.v),
            None => CellValue::Null,
        })
        .collect()
}
