//! 统计 API 路由配置

use actix_web::web;

use super::analytics::{
    count_by_mm_dma, count_by_site_id, ctr_by_interval, ctr_by_mm_dma, ctr_by_site_id,
    evpm_by_interval, views_per_mm_dma, views_per_site_id,
};
use super::upload::{clear_data, upload_actions, upload_views};

/// 展示相关路由 `/views`
///
/// 包含：
/// - POST /views - 上传展示 CSV
/// - GET /views/countByMmDma, /views/countBySiteId - 每日展示数
/// - GET /views/perMmDma, /views/perSiteId - 各维度展示总数
/// - GET /views/ctrByMmDma, /views/ctrBySiteId - 按维度的 CTR
/// - GET /views/ctr, /views/evpm - 按时间桶的 CTR / EvPM
pub fn views_routes() -> actix_web::Scope {
    web::scope("/views")
        .route("", web::post().to(upload_views))
        .route("/countByMmDma", web::get().to(count_by_mm_dma))
        .route("/countBySiteId", web::get().to(count_by_site_id))
        .route("/perMmDma", web::get().to(views_per_mm_dma))
        .route("/perSiteId", web::get().to(views_per_site_id))
        .route("/ctrByMmDma", web::get().to(ctr_by_mm_dma))
        .route("/ctrBySiteId", web::get().to(ctr_by_site_id))
        .route("/ctr", web::get().to(ctr_by_interval))
        .route("/evpm", web::get().to(evpm_by_interval))
}

/// 行为上传路由 `/actions`
pub fn actions_routes() -> actix_web::Scope {
    web::scope("/actions").route("", web::post().to(upload_actions))
}

/// 数据管理路由 `/data`
pub fn data_routes() -> actix_web::Scope {
    web::scope("/data").route("", web::delete().to(clear_data))
}
