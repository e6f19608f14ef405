//! BOM Upload Handlers
//!
//! Parse a single uploaded BOM, or compare an uploaded master against
//! uploaded targets.

use axum::{
    body::Bytes,
    extract::{multipart::Field, Multipart, State},
    response::Json,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use bomdiff_models::BatchReport;
use bomdiff_utils::{
    validate_target_count, BatchComparator, BomDiffError, BomDiffResult, BomFormat, BomLoader, LoadedBom, TargetInput,
};

use crate::error::ApiResult;
use crate::AppState;

pub const MASTER_FIELD: &str = "master";
pub const TARGET_FIELD: &str = "target";

/// Uploaded document, not yet parsed
struct Upload {
    document: String,
    format: Option<BomFormat>,
    data: Bytes,
}

async fn read_upload(field: Field<'_>, fallback_name: &str) -> BomDiffResult<Upload> {
    let document = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| fallback_name.to_string());

    // The extension is more reliable than the client's content type
    let format = BomFormat::from_extension(Path::new(&document))
        .or_else(|| field.content_type().and_then(BomFormat::from_content_type));

    let data = field
        .bytes()
        .await
        .map_err(|e| BomDiffError::validation("file", format!("Failed to read file data: {}", e)))?;

    Ok(Upload { document, format, data })
}

/// Parse an upload on a blocking task
async fn load_upload(loader: Arc<BomLoader>, upload: Upload) -> BomDiffResult<LoadedBom> {
    tokio::task::spawn_blocking(move || loader.load_bytes(&upload.document, &upload.data, upload.format))
        .await
        .map_err(|e| BomDiffError::internal(format!("Parsing task failed: {}", e)))?
}

fn multipart_error(e: impl std::fmt::Display) -> BomDiffError {
    BomDiffError::validation("multipart", format!("Failed to read upload: {}", e))
}

/// Parse and normalize one BOM document
///
/// POST /api/v1/bom/parse
pub async fn parse_bom(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<LoadedBom>> {
    let field = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
        .ok_or_else(|| BomDiffError::validation("file", "No file provided"))?;

    let upload = read_upload(field, "upload").await?;
    let loaded = load_upload(Arc::clone(&state.loader), upload).await?;

    Ok(Json(loaded))
}

/// Compare a master BOM against one or more target BOMs
///
/// POST /api/v1/bom/compare
pub async fn compare_boms(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<BatchReport>> {
    let mut master = None;
    let mut targets = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(MASTER_FIELD) => {
                if master.is_some() {
                    return Err(BomDiffError::validation(MASTER_FIELD, "Exactly one master BOM is allowed").into());
                }
                master = Some(read_upload(field, "master").await?);
            }
            Some(TARGET_FIELD) => {
                let fallback = format!("target-{}", targets.len() + 1);
                targets.push(read_upload(field, &fallback).await?);
            }
            other => {
                let name = other.unwrap_or("<unnamed>");
                return Err(BomDiffError::validation(name, "Unexpected form field, use 'master' or 'target'").into());
            }
        }
    }

    let master = master.ok_or_else(|| BomDiffError::validation(MASTER_FIELD, "A master BOM is required"))?;
    validate_target_count(targets.len(), state.config.comparison.max_targets as usize)?;

    let master_source = master.document.clone();
    let master_items = load_upload(Arc::clone(&state.loader), master).await?.items;
    debug!(master = %master_source, items = master_items.len(), "Master BOM loaded");

    let mut inputs = Vec::with_capacity(targets.len());
    for upload in targets {
        let source = upload.document.clone();
        let items = load_upload(Arc::clone(&state.loader), upload)
            .await
            .map(|loaded| loaded.items);
        inputs.push(TargetInput::new(source, items));
    }

    let report = BatchComparator::new().run(&master_source, master_items, inputs).await;
    info!(
        report_id = %report.id,
        compared = report.compared_count(),
        failed = report.failed_count(),
        "Comparison request completed"
    );

    Ok(Json(report))
}
