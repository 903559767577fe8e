//! 统计查询接口
//!
//! 日期解析失败返回 400 / InvalidDateFormat，interval 非法返回 400 / InvalidInterval；
//! 查询本身的失败由 `api_result` 映射。

use std::str::FromStr;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, Result as ActixResult, web};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::analytics::Granularity;
use crate::errors::{Result, StatsError};
use crate::services::AnalyticsService;

use super::error_code::ErrorCode;
use super::helpers::{api_result, error_response};
use super::types::{CountByMmDmaQuery, CountBySiteIdQuery, CtrQuery, DateRangeQuery, IntervalQuery};

fn parse_interval(interval: Option<&str>) -> Result<Granularity> {
    match interval {
        None | Some("") => Ok(Granularity::default()),
        Some(s) => Granularity::from_str(s).map_err(|_| {
            StatsError::validation(format!(
                "Invalid interval '{}'. Supported: minute, hour, day",
                s
            ))
        }),
    }
}

fn bad_param(code: ErrorCode, err: StatsError) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, code, &err.message())
}

fn parse_dates(from: &str, to: &str) -> std::result::Result<(NaiveDate, NaiveDate), HttpResponse> {
    let from = AnalyticsService::parse_date(from)
        .map_err(|e| bad_param(ErrorCode::InvalidDateFormat, e))?;
    let to =
        AnalyticsService::parse_date(to).map_err(|e| bad_param(ErrorCode::InvalidDateFormat, e))?;
    Ok((from, to))
}

fn parse_datetimes(
    start: &str,
    end: &str,
) -> std::result::Result<(NaiveDateTime, NaiveDateTime), HttpResponse> {
    let start = AnalyticsService::parse_datetime(start)
        .map_err(|e| bad_param(ErrorCode::InvalidDateFormat, e))?;
    let end = AnalyticsService::parse_datetime(end)
        .map_err(|e| bad_param(ErrorCode::InvalidDateFormat, e))?;
    Ok((start, end))
}

/// GET /views/countByMmDma
pub async fn count_by_mm_dma(
    query: web::Query<CountByMmDmaQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    info!("API: countByMmDma {:?}", query);
    let (from, to) = match parse_dates(&query.date_from, &query.date_to) {
        Ok(range) => range,
        Err(resp) => return Ok(resp),
    };
    Ok(api_result(service.count_by_region(from, to, query.mm_dma).await))
}

/// GET /views/countBySiteId
pub async fn count_by_site_id(
    query: web::Query<CountBySiteIdQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    info!("API: countBySiteId {:?}", query);
    let (from, to) = match parse_dates(&query.date_from, &query.date_to) {
        Ok(range) => range,
        Err(resp) => return Ok(resp),
    };
    Ok(api_result(service.count_by_site(from, to, &query.site_id).await))
}

/// GET /views/perMmDma
pub async fn views_per_mm_dma(
    query: web::Query<DateRangeQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    let (from, to) = match parse_dates(&query.date_from, &query.date_to) {
        Ok(range) => range,
        Err(resp) => return Ok(resp),
    };
    Ok(api_result(service.views_per_region(from, to).await))
}

/// GET /views/perSiteId
pub async fn views_per_site_id(
    query: web::Query<DateRangeQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    let (from, to) = match parse_dates(&query.date_from, &query.date_to) {
        Ok(range) => range,
        Err(resp) => return Ok(resp),
    };
    Ok(api_result(service.views_per_site(from, to).await))
}

/// GET /views/ctrByMmDma
pub async fn ctr_by_mm_dma(
    query: web::Query<CtrQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    info!("API: ctrByMmDma {:?}", query);
    let (start, end) = match parse_datetimes(&query.start, &query.end) {
        Ok(range) => range,
        Err(resp) => return Ok(resp),
    };
    Ok(api_result(
        service.ctr_by_region(start, end, query.tag.as_deref()).await,
    ))
}

/// GET /views/ctrBySiteId
pub async fn ctr_by_site_id(
    query: web::Query<CtrQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    info!("API: ctrBySiteId {:?}", query);
    let (start, end) = match parse_datetimes(&query.start, &query.end) {
        Ok(range) => range,
        Err(resp) => return Ok(resp),
    };
    Ok(api_result(
        service.ctr_by_site(start, end, query.tag.as_deref()).await,
    ))
}

/// GET /views/ctr
pub async fn ctr_by_interval(
    query: web::Query<IntervalQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    info!("API: ctr {:?}", query);
    let granularity = match parse_interval(query.interval.as_deref()) {
        Ok(g) => g,
        Err(e) => return Ok(bad_param(ErrorCode::InvalidInterval, e)),
    };
    let (start, end) = match parse_datetimes(&query.start, &query.end) {
        Ok(range) => range,
        Err(resp) => return Ok(resp),
    };
    Ok(api_result(
        service
            .ctr_by_interval(start, end, granularity, query.tag.as_deref())
            .await,
    ))
}

/// GET /views/evpm
pub async fn evpm_by_interval(
    query: web::Query<IntervalQuery>,
    service: web::Data<Arc<AnalyticsService>>,
) -> ActixResult<impl Responder> {
    info!("API: evpm {:?}", query);
    let granularity = match parse_interval(query.interval.as_deref()) {
        Ok(g) => g,
        Err(e) => return Ok(bad_param(ErrorCode::InvalidInterval, e)),
    };
    let (start, end) = match parse_datetimes(&query.start, &query.end) {
        Ok(range) => range,
        Err(resp) => return Ok(resp),
    };
    Ok(api_result(
        service
            .evpm_by_interval(start, end, granularity, query.tag.as_deref())
            .await,
    ))
}
