//! CSV 上传与清空接口

use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, Result as ActixResult, web};
use futures_util::StreamExt;
use tracing::{error, info};

use crate::services::IngestService;

use super::error_code::ErrorCode;
use super::helpers::{api_result, error_response};
use super::types::IngestSummary;

/// 上传文件的 multipart 字段名
const FILE_FIELD: &str = "file";

struct CsvUpload {
    file_name: String,
    data: Vec<u8>,
}

/// 读取 multipart 中的 `file` 字段（带大小限制），失败时直接给出错误响应
async fn read_csv_upload(mut payload: Multipart) -> Result<CsvUpload, HttpResponse> {
    let max_bytes = crate::config::get_config().ingest.max_upload_bytes;
    let mut upload: Option<CsvUpload> = None;

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(f) => f,
            Err(e) => {
                error!("Failed to parse multipart field: {}", e);
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::InvalidMultipartData,
                    &format!("Invalid multipart data: {}", e),
                ));
            }
        };

        if field.name() != Some(FILE_FIELD) {
            // 忽略其他字段，但需要读完
            while field.next().await.is_some() {}
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("upload.csv")
            .to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(bytes) => {
                    if data.len() + bytes.len() > max_bytes {
                        return Err(error_response(
                            StatusCode::PAYLOAD_TOO_LARGE,
                            ErrorCode::FileTooLarge,
                            &format!("File size exceeds maximum of {} bytes", max_bytes),
                        ));
                    }
                    data.extend_from_slice(&bytes);
                }
                Err(e) => {
                    error!("Failed to read file chunk: {}", e);
                    return Err(error_response(
                        StatusCode::BAD_REQUEST,
                        ErrorCode::FileReadError,
                        &format!("Failed to read file: {}", e),
                    ));
                }
            }
        }
        upload = Some(CsvUpload { file_name, data });
    }

    upload.ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::CsvFileMissing,
            "No CSV file provided in multipart field 'file'",
        )
    })
}

/// POST /views
pub async fn upload_views(
    payload: Multipart,
    ingest_service: web::Data<Arc<IngestService>>,
) -> ActixResult<impl Responder> {
    let upload = match read_csv_upload(payload).await {
        Ok(upload) => upload,
        Err(response) => return Ok(response),
    };
    info!(
        "API: views upload '{}' ({} bytes)",
        upload.file_name,
        upload.data.len()
    );

    let result = ingest_service
        .ingest_views(upload.data.as_slice(), &upload.file_name)
        .await
        .map(|count| IngestSummary {
            file: upload.file_name.clone(),
            count,
        });
    Ok(api_result(result))
}

/// POST /actions
pub async fn upload_actions(
    payload: Multipart,
    ingest_service: web::Data<Arc<IngestService>>,
) -> ActixResult<impl Responder> {
    let upload = match read_csv_upload(payload).await {
        Ok(upload) => upload,
        Err(response) => return Ok(response),
    };
    info!(
        "API: actions upload '{}' ({} bytes)",
        upload.file_name,
        upload.data.len()
    );

    let result = ingest_service
        .ingest_actions(upload.data.as_slice(), &upload.file_name)
        .await
        .map(|count| IngestSummary {
            file: upload.file_name.clone(),
            count,
        });
    Ok(api_result(result))
}

/// DELETE /data
pub async fn clear_data(
    ingest_service: web::Data<Arc<IngestService>>,
) -> ActixResult<impl Responder> {
    info!("API: clear all data");
    Ok(api_result(ingest_service.clear_all().await))
}
