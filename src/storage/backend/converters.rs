use crate::storage::models::{Action, View};
use migration::entities::{action, view};

/// 将 Sea-ORM Model 转换为 View
pub fn model_to_view(model: view::Model) -> View {
    View {
        id: model.id,
        observed_at: model.observed_at,
        fc_imp_chk: model.fc_imp_chk,
        fc_time_chk: model.fc_time_chk,
        utmtr: model.utmtr,
        region: model.region,
        os_name: model.os_name,
        model: model.model,
        hardware: model.hardware,
        site_id: model.site_id,
    }
}

/// 将 View 转换为 ActiveModel（用于 upsert）
pub fn view_to_active_model(view: &View) -> view::ActiveModel {
    use sea_orm::ActiveValue::*;

    view::ActiveModel {
        id: Set(view.id.clone()),
        observed_at: Set(view.observed_at),
        fc_imp_chk: Set(view.fc_imp_chk),
        fc_time_chk: Set(view.fc_time_chk),
        utmtr: Set(view.utmtr),
        region: Set(view.region),
        os_name: Set(view.os_name.clone()),
        model: Set(view.model.clone()),
        hardware: Set(view.hardware.clone()),
        site_id: Set(view.site_id.clone()),
    }
}

/// 将 Action 转换为 ActiveModel；主键由数据库生成
pub fn action_to_active_model(action: &Action) -> action::ActiveModel {
    use sea_orm::ActiveValue::*;

    action::ActiveModel {
        id: NotSet,
        view_id: Set(action.view_id.clone()),
        tag: Set(action.tag.clone()),
        count: Set(action.count),
    }
}

pub fn model_to_action(model: action::Model) -> Action {
    Action {
        view_id: model.view_id,
        tag: model.tag,
        count: model.count,
    }
}
