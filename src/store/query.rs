//! Filtering, ordering and pagination for translation pages.
//!
//! Two query modes share one engine: per-column filters combined with AND,
//! or a single free-text term matched with OR across the text columns.

use std::collections::BTreeMap;

use sea_orm::sea_query::{Alias, Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use serde::Serialize;

use crate::db::entities::{file, translation};
use crate::error::{Result, ServerError};

/// Columns that accept a filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterColumn {
    Id,
    Filename,
    Key,
    EnglishText,
    TempHungarian,
    FinalHungarian,
    IsTranslated,
}

impl FilterColumn {
    pub const ALL: [FilterColumn; 7] = [
        FilterColumn::Id,
        FilterColumn::Filename,
        FilterColumn::Key,
        FilterColumn::EnglishText,
        FilterColumn::TempHungarian,
        FilterColumn::FinalHungarian,
        FilterColumn::IsTranslated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterColumn::Id => "id",
            FilterColumn::Filename => "filename",
            FilterColumn::Key => "key",
            FilterColumn::EnglishText => "english_text",
            FilterColumn::TempHungarian => "temp_hungarian",
            FilterColumn::FinalHungarian => "final_hungarian",
            FilterColumn::IsTranslated => "is_translated",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

pub type ColumnFilters = BTreeMap<FilterColumn, String>;

/// How rows are matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    /// Every non-empty filter must match
    Columns(ColumnFilters),
    /// Term must match at least one of the searchable text columns
    Search(String),
}

impl Default for QueryMode {
    fn default() -> Self {
        QueryMode::Columns(ColumnFilters::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

/// Largest value SQLite accepts for LIMIT / OFFSET
const SQL_MAX: u64 = i64::MAX as u64;

impl PageRequest {
    pub fn new(page: u64, page_size: u64) -> Result<Self> {
        if page == 0 {
            return Err(ServerError::InvalidRequest("page must be at least 1".into()));
        }
        if page_size == 0 {
            return Err(ServerError::InvalidRequest("pageSize must be positive".into()));
        }
        Ok(Self {
            page,
            page_size: page_size.min(SQL_MAX),
        })
    }

    /// Rows to skip, or `None` when the page starts past anything SQLite can
    /// address
    pub fn offset(&self) -> Option<u64> {
        (self.page - 1)
            .checked_mul(self.page_size)
            .filter(|offset| *offset <= SQL_MAX)
    }
}

/// A translation unit joined with its file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct TranslationRow {
    pub id: i32,
    pub file_id: i32,
    pub filename: Option<String>,
    pub line_number: i32,
    pub line_type: String,
    pub key: Option<String>,
    pub english_text: String,
    pub temp_hungarian: Option<String>,
    pub final_hungarian: Option<String>,
    pub is_translated: bool,
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub data: Vec<TranslationRow>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

pub fn total_pages(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size)
}

/// Count matching rows and load one page of them in source-file order
pub async fn fetch_page(
    db: &DatabaseConnection,
    request: &PageRequest,
    mode: &QueryMode,
) -> std::result::Result<Page, DbErr> {
    let select = matching_rows(mode);
    let total = select.clone().count(db).await?;

    let data = match request.offset() {
        Some(offset) if offset < total => {
            select
                .order_by_asc(translation::Column::FileId)
                .order_by_asc(translation::Column::LineNumber)
                .order_by_asc(translation::Column::Id)
                .offset(offset)
                .limit(request.page_size)
                .into_model::<TranslationRow>()
                .all(db)
                .await?
        }
        _ => Vec::new(),
    };

    Ok(Page {
        data,
        total,
        page: request.page,
        page_size: request.page_size,
        total_pages: total_pages(total, request.page_size),
    })
}

fn matching_rows(mode: &QueryMode) -> Select<translation::Entity> {
    translation::Entity::find()
        .select_only()
        .columns([
            translation::Column::Id,
            translation::Column::FileId,
            translation::Column::LineNumber,
            translation::Column::LineType,
            translation::Column::Key,
            translation::Column::EnglishText,
            translation::Column::TempHungarian,
            translation::Column::FinalHungarian,
            translation::Column::IsTranslated,
            translation::Column::CreatedAt,
            translation::Column::ModifiedAt,
        ])
        .column(file::Column::Filename)
        .join(JoinType::LeftJoin, translation::Relation::File.def())
        .filter(build_condition(mode))
}

pub(crate) fn build_condition(mode: &QueryMode) -> Condition {
    match mode {
        QueryMode::Columns(filters) => filters
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .filter_map(|(column, value)| column_filter(*column, value))
            .fold(Condition::all(), |cond, expr| cond.add(expr)),
        QueryMode::Search(term) if term.is_empty() => Condition::all(),
        QueryMode::Search(term) => [
            text_column(translation::Column::EnglishText),
            text_column(translation::Column::TempHungarian),
            text_column(translation::Column::FinalHungarian),
            filename_column(),
            text_column(translation::Column::Key),
        ]
        .into_iter()
        .fold(Condition::any(), |cond, column| cond.add(contains(column, term))),
    }
}

fn column_filter(column: FilterColumn, value: &str) -> Option<SimpleExpr> {
    let expr = match column {
        FilterColumn::IsTranslated => match value {
            "true" => translation::Column::IsTranslated.eq(true),
            "false" => translation::Column::IsTranslated.eq(false),
            _ => return None,
        },
        FilterColumn::Id => {
            let id_text = Func::cast_as(
                Expr::col((translation::Entity, translation::Column::Id)),
                Alias::new("TEXT"),
            );
            contains(id_text.into(), value)
        }
        FilterColumn::Filename => contains(filename_column(), value),
        FilterColumn::Key => contains(text_column(translation::Column::Key), value),
        FilterColumn::EnglishText => contains(text_column(translation::Column::EnglishText), value),
        FilterColumn::TempHungarian => {
            contains(text_column(translation::Column::TempHungarian), value)
        }
        FilterColumn::FinalHungarian => {
            contains(text_column(translation::Column::FinalHungarian), value)
        }
    };
    Some(expr)
}

fn text_column(column: translation::Column) -> SimpleExpr {
    Expr::col((translation::Entity, column)).into()
}

fn filename_column() -> SimpleExpr {
    Expr::col((file::Entity, file::Column::Filename)).into()
}

/// Case-insensitive substring match. SQLite's LOWER() only folds ASCII, so the
/// needle is folded the same way.
fn contains(column: SimpleExpr, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_ascii_lowercase()));
    Expr::expr(Func::lower(column)).like(LikeExpr::new(pattern).escape('\\'))
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_column_names() {
        for column in FilterColumn::ALL {
            assert_eq!(FilterColumn::parse(column.as_str()), Some(column));
        }
        assert_eq!(FilterColumn::parse("line_type"), None);
        assert_eq!(FilterColumn::parse("page"), None);
    }

    #[test]
    fn test_page_request_validation() {
        assert!(PageRequest::new(0, 50).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert_eq!(PageRequest::new(1, 50).unwrap().offset(), Some(0));
        assert_eq!(PageRequest::new(3, 20).unwrap().offset(), Some(40));
        assert_eq!(PageRequest::new(u64::MAX / 2, 50).unwrap().offset(), None);
        assert_eq!(PageRequest::new(2, i64::MAX as u64).unwrap().offset(), Some(i64::MAX as u64));
        assert_eq!(PageRequest::new(3, i64::MAX as u64).unwrap().offset(), None);
        assert_eq!(PageRequest::new(1, u64::MAX).unwrap().page_size, i64::MAX as u64);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 50), 0);
        assert_eq!(total_pages(2, 2), 1);
        assert_eq!(total_pages(3, 2), 2);
        assert_eq!(total_pages(101, 50), 3);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("C:\\path"), "C:\\\\path");
        assert_eq!(escape_like("plain"), "plain");
    }
}
