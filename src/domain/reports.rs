//! Reports helpers.
//!
//! A report is produced asynchronously: request it, poll the request until
//! it settles, then download the generated report.
//!
//! ```rust,ignore
//! use mws_api::domain::reports::{self, ReportPolling};
//! use mws_api::CallOptions;
//!
//! let options = CallOptions::new().set("ReportType", "_GET_MERCHANT_LISTINGS_DATA_");
//! let rows = reports::request_and_download_report(&dispatcher, &options, &ReportPolling::default()).await?;
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde_json::Value;

use super::{as_list, text, unexpected};
use crate::dispatch::{Dispatcher, ExecConfig, MwsError};
use crate::marshal::CallOptions;

/// Processing state of a report request.
///
/// ```rust
/// use mws_api::domain::reports::ReportProcessingStatus;
///
/// let status: ReportProcessingStatus = "_DONE_NO_DATA_".parse().unwrap();
/// assert_eq!(status, ReportProcessingStatus::DoneNoData);
/// assert!(status.is_settled());
/// assert!(!ReportProcessingStatus::InProgress.is_settled());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportProcessingStatus {
    /// `_SUBMITTED_`: accepted, not started.
    Submitted,
    /// `_IN_PROGRESS_`: the report is being generated.
    InProgress,
    /// `_CANCELLED_`: no report will be generated.
    Cancelled,
    /// `_DONE_`: a report is ready to download.
    Done,
    /// `_DONE_NO_DATA_`: finished, nothing matched.
    DoneNoData,
}

impl ReportProcessingStatus {
    /// Returns the wire value, e.g. `_DONE_`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "_SUBMITTED_",
            Self::InProgress => "_IN_PROGRESS_",
            Self::Cancelled => "_CANCELLED_",
            Self::Done => "_DONE_",
            Self::DoneNoData => "_DONE_NO_DATA_",
        }
    }

    /// Returns `true` once the request will not change again.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Submitted | Self::InProgress)
    }
}

impl fmt::Display for ReportProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportProcessingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "_SUBMITTED_" => Ok(Self::Submitted),
            "_IN_PROGRESS_" => Ok(Self::InProgress),
            "_CANCELLED_" => Ok(Self::Cancelled),
            "_DONE_" => Ok(Self::Done),
            "_DONE_NO_DATA_" => Ok(Self::DoneNoData),
            other => Err(format!("unknown report processing status {other:?}")),
        }
    }
}

/// Status of one report request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRequestStatus {
    /// The `ReportRequestId` that was looked up.
    pub request_id: String,
    /// Current processing state.
    pub status: ReportProcessingStatus,
    /// Present once the report is `_DONE_`.
    pub generated_report_id: Option<String>,
}

/// How [`request_and_download_report`] waits for a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportPolling {
    /// Delay between status checks.
    pub interval: Duration,
    /// Gives up after this many status checks; `None` polls until settled.
    pub max_attempts: Option<u32>,
}

impl ReportPolling {
    /// Polls every `interval` until the request settles.
    #[must_use]
    pub const fn every(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// Sets [`max_attempts`](Self::max_attempts).
    #[must_use]
    pub const fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
}

impl Default for ReportPolling {
    fn default() -> Self {
        Self::every(Duration::from_secs(30))
    }
}

/// Requests a report and returns its `ReportRequestId`.
///
/// # Errors
///
/// Returns [`MwsError::UnexpectedResponse`] when the response carries no
/// request id, or any error raised by the call.
pub async fn request_report(
    dispatcher: &Dispatcher,
    options: &CallOptions,
) -> Result<String, MwsError> {
    let result = dispatcher.call("RequestReport", options).await?;
    result
        .get("ReportRequestInfo")
        .and_then(|info| text(info, "ReportRequestId"))
        .ok_or_else(|| unexpected("RequestReport", "no ReportRequestId in response"))
}

/// Looks up the status of one report request.
///
/// # Errors
///
/// Returns [`MwsError::UnexpectedResponse`] when no entry in the response
/// carries `request_id` or its status is unknown.
pub async fn report_request_status(
    dispatcher: &Dispatcher,
    request_id: &str,
) -> Result<ReportRequestStatus, MwsError> {
    const OPERATION: &str = "GetReportRequestList";

    let result = dispatcher
        .call(
            OPERATION,
            &CallOptions::new().set("ReportRequestIdList", vec![request_id]),
        )
        .await?;
    let infos = as_list(result.get("ReportRequestInfo"));
    let info = infos
        .iter()
        .find(|info| text(info, "ReportRequestId").as_deref() == Some(request_id))
        .ok_or_else(|| unexpected(OPERATION, format!("no ReportRequestInfo for {request_id}")))?;

    let status = text(info, "ReportProcessingStatus")
        .ok_or_else(|| unexpected(OPERATION, "no ReportProcessingStatus"))?
        .parse::<ReportProcessingStatus>()
        .map_err(|message| unexpected(OPERATION, message))?;

    Ok(ReportRequestStatus {
        request_id: request_id.to_string(),
        status,
        generated_report_id: text(info, "GeneratedReportId"),
    })
}

/// Finds the report generated for `request_id` through `GetReportList`.
async fn generated_report_id(dispatcher: &Dispatcher, request_id: &str) -> Result<String, MwsError> {
    const OPERATION: &str = "GetReportList";

    let result = dispatcher
        .call(
            OPERATION,
            &CallOptions::new().set("ReportRequestIdList", vec![request_id]),
        )
        .await?;
    as_list(result.get("ReportInfo"))
        .iter()
        .find_map(|info| text(info, "ReportId"))
        .ok_or_else(|| unexpected(OPERATION, format!("no report generated for {request_id}")))
}

/// Downloads a generated report.
///
/// Tab-separated reports come back as an array of row objects keyed by the
/// header line, even when there is a single row.
///
/// # Errors
///
/// Returns any [`MwsError`] raised by the call.
pub async fn get_report(dispatcher: &Dispatcher, report_id: &str) -> Result<Value, MwsError> {
    dispatcher
        .call_operation(
            "GetReport",
            &CallOptions::new().set("ReportId", report_id),
            &ExecConfig::new().no_flatten(true),
        )
        .await
}

/// Requests a report, polls until it settles and downloads it.
///
/// A `_DONE_NO_DATA_` request yields an empty array.
///
/// # Errors
///
/// - [`MwsError::RequestCancelled`] when the request is cancelled
/// - [`MwsError::UnexpectedResponse`] when a response lacks the expected
///   fields or polling runs out of attempts
/// - any error raised by the underlying calls
pub async fn request_and_download_report(
    dispatcher: &Dispatcher,
    options: &CallOptions,
    polling: &ReportPolling,
) -> Result<Value, MwsError> {
    let request_id = request_report(dispatcher, options).await?;
    tracing::info!("Report request {} submitted", request_id);

    let mut attempts = 0;
    loop {
        let status = report_request_status(dispatcher, &request_id).await?;
        attempts += 1;

        match status.status {
            ReportProcessingStatus::Done => {
                let report_id = match status.generated_report_id {
                    Some(id) => id,
                    None => generated_report_id(dispatcher, &request_id).await?,
                };
                tracing::info!("Report request {} done, downloading {}", request_id, report_id);
                return get_report(dispatcher, &report_id).await;
            }
            ReportProcessingStatus::DoneNoData => {
                tracing::info!("Report request {} finished with no data", request_id);
                return Ok(Value::Array(Vec::new()));
            }
            ReportProcessingStatus::Cancelled => {
                return Err(MwsError::RequestCancelled { request_id });
            }
            ReportProcessingStatus::Submitted | ReportProcessingStatus::InProgress => {
                if polling.max_attempts.is_some_and(|max| attempts >= max) {
                    return Err(unexpected(
                        "GetReportRequestList",
                        format!(
                            "report request {request_id} still {} after {attempts} checks",
                            status.status
                        ),
                    ));
                }
                tracing::debug!(
                    "Report request {} is {}, checking again in {:?}",
                    request_id,
                    status.status,
                    polling.interval
                );
                tokio::time::sleep(polling.interval).await;
            }
        }
    }
}
