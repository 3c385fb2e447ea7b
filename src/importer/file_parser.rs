// ==========================================
// G4IT 设备清单 - 表格文件读写实现
// ==========================================
// 支持: CSV (.csv) 读写 / Excel (.xlsx) 只读
// CSV: 分隔符自动识别（, ; \t |），去除 UTF-8 BOM
// Excel: 读取第一个工作表；日期单元格输出为 YYYY-MM-DD 文本
// 公共: 表头 TRIM；完全空白的行跳过；缺失单元格补空值
// ==========================================

use crate::domain::table::{CellValue, Row, Table};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_handler_trait::TableFile;
use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info, warn};

/// 自动识别的候选分隔符（并列时按此顺序优先）
pub const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

const UTF8_BOM: char = '\u{feff}';

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ImportError::FileNotFound(path.display().to_string()))
    }
}

fn ensure_extension(path: &Path, expected: &str) -> ImportResult<()> {
    let ext = extension_of(path);
    if ext == expected {
        Ok(())
    } else {
        Err(ImportError::UnsupportedFormat(if ext.is_empty() {
            path.display().to_string()
        } else {
            format!(".{}", ext)
        }))
    }
}

/// 表头清洗：TRIM，空表头命名为 "Unnamed: <位置>"
fn clean_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let headers: Vec<String> = raw
        .enumerate()
        .map(|(idx, h)| {
            let trimmed = h.trim();
            if trimmed.is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                trimmed.to_string()
            }
        })
        .collect();

    let table = Table::new(headers);
    let duplicates = table.duplicate_columns();
    if !duplicates.is_empty() {
        warn!(columns = ?duplicates, "表头存在重复列名，后出现的列覆盖先出现的列");
    }
    table.columns
}

/// 按表头组装一行；返回 None 表示整行空白
fn build_row(headers: &[String], values: impl Iterator<Item = CellValue>) -> Option<Row> {
    let mut values = values;
    let row: Row = headers
        .iter()
        .map(|header| (header.clone(), values.next().unwrap_or_default()))
        .collect();

    if row.values().all(CellValue::is_empty) {
        None
    } else {
        Some(row)
    }
}

/// 根据表头行识别分隔符（忽略引号内的字符）
pub fn sniff_delimiter(header_line: &str) -> u8 {
    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    let mut in_quotes = false;

    for byte in header_line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(idx) = DELIMITER_CANDIDATES.iter().position(|&c| c == byte) {
            counts[idx] += 1;
        }
    }

    let mut best = 0;
    for idx in 1..counts.len() {
        if counts[idx] > counts[best] {
            best = idx;
        }
    }
    DELIMITER_CANDIDATES[best]
}

/// 文件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Csv,
    Xlsx,
}

/// 上传文件预检：存在、扩展名受支持、内容非空且可打开
pub fn check_file(path: &Path) -> ImportResult<FileKind> {
    ensure_exists(path)?;
    match extension_of(path).as_str() {
        "csv" => {
            let headers = CsvHandler::new().get_headers(path)?;
            if headers.is_empty() {
                return Err(ImportError::EmptyFile(path.display().to_string()));
            }
            Ok(FileKind::Csv)
        }
        "xlsx" => {
            let workbook: Xlsx<_> = open_workbook(path)?;
            if workbook.sheet_names().is_empty() {
                return Err(ImportError::EmptyFile(path.display().to_string()));
            }
            Ok(FileKind::Xlsx)
        }
        "" => Err(ImportError::UnsupportedFormat(path.display().to_string())),
        ext => Err(ImportError::UnsupportedFormat(format!(".{}", ext))),
    }
}

// ==========================================
// CSV Handler 实现
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvHandler {
    /// None: 自动识别
    delimiter: Option<u8>,
}

impl CsvHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(delimiter: Option<u8>) -> Self {
        Self { delimiter }
    }

    fn read_source(&self, path: &Path) -> ImportResult<String> {
        ensure_exists(path)?;
        ensure_extension(path, "csv")?;

        let bytes = std::fs::read(path)?;
        let content = String::from_utf8(bytes)
            .map_err(|e| ImportError::CsvParseError(format!("encodage UTF-8 invalide: {}", e)))?;
        Ok(content
            .strip_prefix(UTF8_BOM)
            .map(str::to_string)
            .unwrap_or(content))
    }

    fn delimiter_for(&self, content: &str) -> u8 {
        self.delimiter.unwrap_or_else(|| {
            let header_line = content.lines().next().unwrap_or("");
            let sniffed = sniff_delimiter(header_line);
            debug!(delimiter = %(sniffed as char).escape_default(), "CSV 分隔符自动识别");
            sniffed
        })
    }

    fn reader<'a>(&self, content: &'a str) -> csv::Reader<&'a [u8]> {
        ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter_for(content))
            .flexible(true) // 允许行长度不一致
            .from_reader(content.as_bytes())
    }

    fn writer_delimiter(&self) -> u8 {
        self.delimiter.unwrap_or(b',')
    }

    /// 追加一行（文件为空或不存在时先写表头）
    pub fn append_row(&self, path: &Path, columns: &[String], row: &Row) -> ImportResult<()> {
        ensure_extension(path, "csv")?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ImportError::FileWriteError(format!("{}: {}", path.display(), e)))?;
        let is_empty = file
            .metadata()
            .map_err(|e| ImportError::FileWriteError(e.to_string()))?
            .len()
            == 0;

        let mut writer = WriterBuilder::new()
            .delimiter(self.writer_delimiter())
            .from_writer(file);
        if is_empty {
            writer
                .write_record(columns)
                .map_err(|e| ImportError::FileWriteError(e.to_string()))?;
        }
        writer
            .write_record(
                columns
                    .iter()
                    .map(|c| row.get(c).map(CellValue::as_text).unwrap_or_default()),
            )
            .map_err(|e| ImportError::FileWriteError(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| ImportError::FileWriteError(e.to_string()))
    }
}

impl TableFile for CsvHandler {
    fn load(&self, path: &Path) -> ImportResult<Table> {
        let content = self.read_source(path)?;
        let mut reader = self.reader(&content);

        // 读取表头
        let headers = clean_headers(reader.headers()?.iter().map(str::to_string));
        let mut table = Table::new(headers);

        // 读取所有行
        let mut skipped = 0usize;
        for result in reader.records() {
            let record = result?;
            match build_row(&table.columns, record.iter().map(CellValue::from_raw)) {
                Some(row) => table.push_row(row),
                None => skipped += 1, // 跳过完全空白的行
            }
        }

        info!(
            path = %path.display(),
            rows = table.len(),
            columns = table.columns.len(),
            skipped_blank = skipped,
            "CSV 文件读取完成"
        );
        Ok(table)
    }

    fn save(&self, table: &Table, path: &Path) -> ImportResult<()> {
        ensure_extension(path, "csv")?;

        let mut writer = WriterBuilder::new()
            .delimiter(self.writer_delimiter())
            .from_path(path)
            .map_err(|e| ImportError::FileWriteError(format!("{}: {}", path.display(), e)))?;

        writer
            .write_record(&table.columns)
            .map_err(|e| ImportError::FileWriteError(e.to_string()))?;
        for row in &table.rows {
            let values = table.ordered_values(row);
            writer
                .write_record(values.iter().map(CellValue::as_text))
                .map_err(|e| ImportError::FileWriteError(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| ImportError::FileWriteError(e.to_string()))?;

        info!(path = %path.display(), rows = table.len(), "CSV 文件写出完成");
        Ok(())
    }

    fn get_headers(&self, path: &Path) -> ImportResult<Vec<String>> {
        let content = self.read_source(path)?;
        let mut reader = self.reader(&content);
        Ok(clean_headers(reader.headers()?.iter().map(str::to_string)))
    }
}

// ==========================================
// Excel Handler 实现
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelHandler;

impl ExcelHandler {
    fn first_sheet_rows(&self, path: &Path) -> ImportResult<Vec<Vec<Data>>> {
        ensure_exists(path)?;
        ensure_extension(path, "xlsx")?;

        // 打开 Excel 文件
        let mut workbook: Xlsx<_> = open_workbook(path)?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("aucune feuille de calcul".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        debug!(sheet = %sheet_name, "读取 Excel 工作表");
        Ok(range.rows().map(|r| r.to_vec()).collect())
    }
}

/// Excel 单元格 → CellValue
pub fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::from_raw(s),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
            Some(date) => CellValue::Text(date.format("%Y-%m-%d").to_string()),
            None => CellValue::from_raw(&cell.to_string()),
        },
        other => CellValue::from_raw(&other.to_string()),
    }
}

impl TableFile for ExcelHandler {
    fn load(&self, path: &Path) -> ImportResult<Table> {
        let rows = self.first_sheet_rows(path)?;
        let mut rows = rows.into_iter();

        // 空工作表 → 空表（由校验报告"无数据"）
        let Some(header_row) = rows.next() else {
            info!(path = %path.display(), "Excel 工作表为空");
            return Ok(Table::default());
        };

        let headers = clean_headers(header_row.iter().map(|cell| cell.to_string()));
        let mut table = Table::new(headers);

        let mut skipped = 0usize;
        for data_row in rows {
            match build_row(&table.columns, data_row.iter().map(cell_to_value)) {
                Some(row) => table.push_row(row),
                None => skipped += 1,
            }
        }

        info!(
            path = %path.display(),
            rows = table.len(),
            columns = table.columns.len(),
            skipped_blank = skipped,
            "Excel 文件读取完成"
        );
        Ok(table)
    }

    fn save(&self, _table: &Table, path: &Path) -> ImportResult<()> {
        Err(ImportError::UnsupportedFormat(format!(
            "{} (écriture .xlsx non prise en charge, utiliser .csv)",
            path.display()
        )))
    }

    fn get_headers(&self, path: &Path) -> ImportResult<Vec<String>> {
        let rows = self.first_sheet_rows(path)?;
        Ok(rows
            .first()
            .map(|header_row| clean_headers(header_row.iter().map(|cell| cell.to_string())))
            .unwrap_or_default())
    }
}

// ==========================================
// 通用文件处理器（根据扩展名自动选择）
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct UniversalFileHandler {
    csv: CsvHandler,
    excel: ExcelHandler,
}

impl UniversalFileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_csv_delimiter(delimiter: Option<u8>) -> Self {
        Self {
            csv: CsvHandler::with_delimiter(delimiter),
            excel: ExcelHandler,
        }
    }

    pub fn csv(&self) -> &CsvHandler {
        &self.csv
    }

    /// 按扩展名选择处理器
    pub fn handler_for(&self, path: &Path) -> ImportResult<&dyn TableFile> {
        match extension_of(path).as_str() {
            "csv" => Ok(&self.csv),
            "xlsx" => Ok(&self.excel),
            "" => Err(ImportError::UnsupportedFormat(path.display().to_string())),
            ext => Err(ImportError::UnsupportedFormat(format!(".{}", ext))),
        }
    }
}

impl TableFile for UniversalFileHandler {
    fn load(&self, path: &Path) -> ImportResult<Table> {
        self.handler_for(path)?.load(path)
    }

    fn save(&self, table: &Table, path: &Path) -> ImportResult<()> {
        self.handler_for(path)?.save(table, path)
    }

    fn get_headers(&self, path: &Path) -> ImportResult<Vec<String>> {
        self.handler_for(path)?.get_headers(path)
    }
}

/// 读取 .csv / .xlsx 文件（分隔符自动识别）
pub fn read_table<P: AsRef<Path>>(path: P) -> ImportResult<Table> {
    UniversalFileHandler::new().load(path.as_ref())
}

/// 写出表格（仅 .csv）
pub fn write_table<P: AsRef<Path>>(table: &Table, path: P) -> ImportResult<()> {
    UniversalFileHandler::new().save(table, path.as_ref())
}
