//! Invocation handlers. Each takes the raw event payload and always returns a
//! response document; failures are reported in the document, not raised.

use serde_json::{json, Value};
use tracing::{error, info};

use geovision_core::{GeoError, GeoResult};
use geovision_events::{normalize, AnalyzeRequest, ApiRequest, ApiResponse};
use geovision_pipeline::{CaptionOrchestrator, RoomAnalyzer, UploadNotifier};

/// Caption every image referenced by a (possibly relayed) storage event.
pub async fn handle_caption(orchestrator: &CaptionOrchestrator, event: &Value) -> Value {
    let report = orchestrator.run_batch(normalize(event)).await;
    json!({
        "statusCode": 200,
        "body": json!({
            "message": "OK",
            "processed": report.processed.len(),
            "failed": report.failed.len(),
        })
        .to_string(),
    })
}

/// Analyze the folder named in an HTTP proxy request.
pub async fn handle_analyze(analyzer: &RoomAnalyzer, event: &Value) -> ApiResponse {
    match analyze(analyzer, event).await {
        Ok(body) => ApiResponse::ok(&body),
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Room analysis failed");
            ApiResponse::from_error(&e)
        }
    }
}

async fn analyze(analyzer: &RoomAnalyzer, event: &Value) -> GeoResult<Value> {
    let request: ApiRequest = serde_json::from_value(event.clone())
        .map_err(|e| GeoError::MalformedInput(format!("Invalid request: {e}")))?;
    let folder = AnalyzeRequest::folder_from(&request)?;
    info!(%folder, "Analyzing room");
    let analysis = analyzer.analyze(&folder).await?;
    Ok(serde_json::to_value(analysis)?)
}

/// Republish uploaded images to the configured topic.
pub async fn handle_notify(notifier: &UploadNotifier, event: &Value) -> Value {
    let report = notifier.notify(event).await;
    info!(
        published = report.published,
        skipped = report.skipped,
        failed = report.failed,
        "Upload notifications sent"
    );
    json!({
        "statusCode": 200,
        "body": json!({
            "status": "success",
            "published": report.published,
            "skipped": report.skipped,
            "failed": report.failed,
        })
        .to_string(),
    })
}
