//! CSV 解析
//!
//! 第一行总是表头并被跳过。每条数据行必须恰好包含预期数量的字段，
//! 字段不做 trim，数字按十进制严格解析，时间按 `OBSERVED_AT_FORMAT` 定宽解析。
//! 非 UTF-8 字节按替换字符宽松解码，不会让整批失败。
//! 迭代器是惰性的：调用方可以逐行消费，也可以用 `parse_*` 一次性收集，
//! 任何一行出错都会让整批失败。

use std::borrow::Cow;
use std::io::Read;

use chrono::NaiveDateTime;
use csv::{ByteRecord, ByteRecordsIntoIter, ReaderBuilder};

use crate::errors::{Result, StatsError};
use crate::storage::models::View;

/// 展示文件每行字段数
pub const VIEW_FIELDS: usize = 10;
/// 行为文件每行字段数
pub const ACTION_FIELDS: usize = 2;
/// `observed_at` 字段格式
pub const OBSERVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// 展示文件列顺序
const COL_OBSERVED_AT: usize = 0;
const COL_VIEW_ID: usize = 1;
const COL_FC_IMP_CHK: usize = 2;
const COL_FC_TIME_CHK: usize = 3;
const COL_UTMTR: usize = 4;
const COL_REGION: usize = 5;
const COL_OS_NAME: usize = 6;
const COL_MODEL: usize = 7;
const COL_HARDWARE: usize = 8;
const COL_SITE_ID: usize = 9;

/// 一行未聚合的行为记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRow {
    pub line: u64,
    pub view_id: String,
    pub tag: String,
}

fn csv_reader<R: Read>(source: R) -> csv::Reader<R> {
    // flexible: 字段数由我们自己校验，以便报告行号和实际数量
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source)
}

fn field(record: &ByteRecord, index: usize) -> Cow<'_, str> {
    String::from_utf8_lossy(&record[index])
}

fn line_of(record: &ByteRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

fn check_arity(record: &ByteRecord, expected: usize) -> Result<u64> {
    let line = line_of(record);
    if record.len() != expected {
        return Err(StatsError::malformed_row(line, expected, record.len()));
    }
    Ok(line)
}

fn parse_int(record: &ByteRecord, index: usize, column: &'static str, line: u64) -> Result<i32> {
    let raw = field(record, index);
    raw.parse::<i32>()
        .map_err(|e| StatsError::invalid_field(line, column, raw.as_ref(), e))
}

/// chrono 的 `%m`/`%d`/`%H` 等接受一位数，回写比对以保证定宽
fn parse_observed_at(raw: &str, line: u64) -> Result<NaiveDateTime> {
    let ts = NaiveDateTime::parse_from_str(raw, OBSERVED_AT_FORMAT)
        .map_err(|e| StatsError::invalid_field(line, "observed_at", raw, e))?;
    if ts.format(OBSERVED_AT_FORMAT).to_string() != raw {
        return Err(StatsError::invalid_field(
            line,
            "observed_at",
            raw,
            "expected zero-padded yyyy-MM-dd HH:mm:ss",
        ));
    }
    Ok(ts)
}

fn parse_view(record: &ByteRecord) -> Result<View> {
    let line = check_arity(record, VIEW_FIELDS)?;
    let observed_at = parse_observed_at(&field(record, COL_OBSERVED_AT), line)?;

    Ok(View {
        id: field(record, COL_VIEW_ID).into_owned(),
        observed_at,
        fc_imp_chk: parse_int(record, COL_FC_IMP_CHK, "fc_imp_chk", line)?,
        fc_time_chk: parse_int(record, COL_FC_TIME_CHK, "fc_time_chk", line)?,
        utmtr: parse_int(record, COL_UTMTR, "utmtr", line)?,
        region: parse_int(record, COL_REGION, "region", line)?,
        os_name: field(record, COL_OS_NAME).into_owned(),
        model: field(record, COL_MODEL).into_owned(),
        hardware: field(record, COL_HARDWARE).into_owned(),
        site_id: field(record, COL_SITE_ID).into_owned(),
    })
}

fn parse_action(record: &ByteRecord) -> Result<ActionRow> {
    let line = check_arity(record, ACTION_FIELDS)?;
    Ok(ActionRow {
        line,
        view_id: field(record, 0).into_owned(),
        tag: field(record, 1).into_owned(),
    })
}

/// 展示记录迭代器
pub struct ViewRecords<R> {
    rows: ByteRecordsIntoIter<R>,
}

impl<R: Read> Iterator for ViewRecords<R> {
    type Item = Result<View>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.rows.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        Some(parse_view(&record))
    }
}

/// 行为记录迭代器
pub struct ActionRecords<R> {
    rows: ByteRecordsIntoIter<R>,
}

impl<R: Read> Iterator for ActionRecords<R> {
    type Item = Result<ActionRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.rows.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        Some(parse_action(&record))
    }
}

pub fn view_records<R: Read>(source: R) -> ViewRecords<R> {
    ViewRecords {
        rows: csv_reader(source).into_byte_records(),
    }
}

pub fn action_records<R: Read>(source: R) -> ActionRecords<R> {
    ActionRecords {
        rows: csv_reader(source).into_byte_records(),
    }
}

/// 解析整个展示文件，遇到第一处错误即返回
pub fn parse_views<R: Read>(source: R) -> Result<Vec<View>> {
    view_records(source).collect()
}

/// 解析整个行为文件，遇到第一处错误即返回
pub fn parse_actions<R: Read>(source: R) -> Result<Vec<ActionRow>> {
    action_records(source).collect()
}
