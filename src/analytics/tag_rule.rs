//! 行为标签匹配规则
//!
//! 两种指标的规则不对称，按原样保留：
//!
//! | 规则 | 未指定 tag | 指定 tag `t` |
//! |------|-----------|--------------|
//! | CTR  | `tag = 'fclick'` 或 tag 不以 `v` 开头 | `tag = t` 或 `tag = 'v' + t` |
//! | EvPM | 全部行为 | `tag = t` 或 `tag = 'v' + t` |
//!
//! 前缀比较区分大小写。

use sea_orm::{ColumnTrait, Condition, ExprTrait, sea_query::Expr};

use migration::entities::action;

const CLICK_TAG: &str = "fclick";
const VIEW_PREFIX: char = 'v';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagRule {
    Ctr(Option<String>),
    Evpm(Option<String>),
}

fn non_empty(tag: Option<&str>) -> Option<String> {
    tag.filter(|t| !t.is_empty()).map(str::to_string)
}

impl TagRule {
    /// 空字符串视为未指定
    pub fn ctr(tag: Option<&str>) -> Self {
        TagRule::Ctr(non_empty(tag))
    }

    /// 空字符串视为未指定
    pub fn evpm(tag: Option<&str>) -> Self {
        TagRule::Evpm(non_empty(tag))
    }

    /// 作为 `views LEFT JOIN actions` 的附加 ON 条件；`None` 表示不加限制
    pub fn join_condition(&self) -> Option<Condition> {
        match self {
            TagRule::Ctr(None) => Some(
                Condition::any()
                    .add(action::Column::Tag.eq(CLICK_TAG))
                    .add(
                        Expr::cust("SUBSTR(actions.tag, 1, 1)")
                            .ne(Expr::val(VIEW_PREFIX.to_string())),
                    ),
            ),
            TagRule::Ctr(Some(wanted)) | TagRule::Evpm(Some(wanted)) => Some(
                Condition::any()
                    .add(action::Column::Tag.eq(wanted.as_str()))
                    .add(action::Column::Tag.eq(format!("{}{}", VIEW_PREFIX, wanted))),
            ),
            TagRule::Evpm(None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Query, SqliteQueryBuilder};

    fn where_sql(rule: &TagRule) -> String {
        let mut query = Query::select();
        query.column(action::Column::ViewId).from(action::Entity);
        if let Some(cond) = rule.join_condition() {
            query.cond_where(cond);
        }
        query.to_string(SqliteQueryBuilder)
    }

    #[test]
    fn test_ctr_without_tag() {
        let sql = where_sql(&TagRule::ctr(None));
        assert!(sql.contains(r#""tag" = 'fclick'"#), "{sql}");
        assert!(sql.contains("SUBSTR(actions.tag, 1, 1) <> 'v'"), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
    }

    #[test]
    fn test_ctr_with_tag_accepts_view_variant() {
        let sql = where_sql(&TagRule::ctr(Some("fclick")));
        assert!(sql.contains(r#""tag" = 'fclick'"#), "{sql}");
        assert!(sql.contains(r#""tag" = 'vfclick'"#), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
        assert!(!sql.contains("SUBSTR"), "{sql}");
    }

    #[test]
    fn test_evpm_without_tag_has_no_condition() {
        assert!(TagRule::evpm(None).join_condition().is_none());
        assert!(!where_sql(&TagRule::evpm(None)).contains("WHERE"));
    }

    #[test]
    fn test_evpm_with_tag() {
        let sql = where_sql(&TagRule::evpm(Some("registration")));
        assert!(sql.contains(r#""tag" = 'registration'"#), "{sql}");
        assert!(sql.contains(r#""tag" = 'vregistration'"#), "{sql}");
        assert!(!sql.contains("fclick"), "{sql}");
    }

    #[test]
    fn test_empty_tag_is_unspecified() {
        assert_eq!(TagRule::ctr(Some("")), TagRule::Ctr(None));
        assert_eq!(TagRule::evpm(Some("")), TagRule::Evpm(None));
        assert_eq!(
            where_sql(&TagRule::ctr(Some(""))),
            where_sql(&TagRule::ctr(None))
        );
    }
}
