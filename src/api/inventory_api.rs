// ==========================================
// G4IT 设备清单 - 清单 API
// ==========================================
// 职责: 面向请求层封装 "读文件 → 引擎操作 → 写文件"
// 红线: 引擎操作为纯函数；本层只负责文件读写与参数检查
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ProcessingConfigReader;
use crate::domain::mapping::ColumnMapping;
use crate::domain::report::{ConsolidatedRecord, DateCheckReport, DateFixReport, ValidationReport};
use crate::domain::schema::{ColumnSpec, Schema};
use crate::engine::{
    apply_mapping, consolidate, consolidated_to_table, fix_dates, get_schema, scan_dates,
    validate, validate_headers, InventoryPipeline, PipelineOptions, PipelineOutcome,
};
use crate::importer::{check_file, export_file_name, FileKind, TableFile, UniversalFileHandler};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// 列定义响应（供前端生成表单）
#[derive(Debug, Clone, Serialize)]
pub struct SchemaResponse {
    pub columns: Vec<ColumnSpec>,
    pub required_columns: Vec<String>,
    pub optional_columns: Vec<String>,
}

/// 日期修复响应
#[derive(Debug, Clone, Serialize)]
pub struct DateFixResponse {
    pub report: DateFixReport,
    /// 修复后文件路径
    pub output: PathBuf,
}

/// 列映射响应
#[derive(Debug, Clone, Serialize)]
pub struct MappingResponse {
    pub columns: Vec<String>,
    pub rows: usize,
    pub output: PathBuf,
}

/// 合并响应
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationResponse {
    pub group_by: Vec<String>,
    pub total_rows: usize,
    pub records: Vec<ConsolidatedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// 导出响应
#[derive(Debug, Clone, Serialize)]
pub struct ExportResponse {
    pub path: PathBuf,
    pub rows: usize,
}

/// 清单 API
pub struct InventoryApi {
    files: UniversalFileHandler,
    schema: &'static Schema,
}

impl Default for InventoryApi {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryApi {
    /// 创建新的 InventoryApi 实例（CSV 分隔符自动识别）
    pub fn new() -> Self {
        Self {
            files: UniversalFileHandler::new(),
            schema: get_schema(),
        }
    }

    /// 按配置创建（读取 CSV 分隔符）
    pub fn from_config<C: ProcessingConfigReader + ?Sized>(config: &C) -> ApiResult<Self> {
        Ok(Self {
            files: UniversalFileHandler::with_csv_delimiter(config.get_csv_delimiter()?),
            schema: get_schema(),
        })
    }

    pub fn schema(&self) -> SchemaResponse {
        SchemaResponse {
            columns: self.schema.columns().to_vec(),
            required_columns: self.schema.required_columns(),
            optional_columns: self.schema.optional_columns(),
        }
    }

    /// 上传文件预检
    pub fn check_file(&self, path: &Path) -> ApiResult<FileKind> {
        Ok(check_file(path)?)
    }

    /// 表头检测（仅比对必填列）
    #[instrument(skip(self))]
    pub fn detect_headers(&self, path: &Path) -> ApiResult<ValidationReport> {
        let headers = self.files.get_headers(path)?;
        Ok(validate_headers(&headers, self.schema))
    }

    /// 完整校验
    #[instrument(skip(self))]
    pub fn validate_file(&self, path: &Path) -> ApiResult<ValidationReport> {
        let table = self.files.load(path)?;
        Ok(validate(&table, self.schema))
    }

    /// 日期列诊断
    pub fn check_dates(&self, path: &Path, column: &str) -> ApiResult<DateCheckReport> {
        let column = require_name("colonne de date", column)?;
        let table = self.files.load(path)?;
        Ok(scan_dates(&table, column)?)
    }

    /// 修复日期列并写出（output 为 None 时覆盖输入文件）
    #[instrument(skip(self))]
    pub fn fix_dates_file(
        &self,
        input: &Path,
        column: &str,
        output: Option<&Path>,
    ) -> ApiResult<DateFixResponse> {
        let column = require_name("colonne de date", column)?;
        let output = output.unwrap_or(input).to_path_buf();

        let mut table = self.files.load(input)?;
        let report = fix_dates(&mut table, column)?;
        self.files.save(&table, &output)?;

        info!(output = %output.display(), corrections = report.corrections_applied(), "日期修复文件已写出");
        Ok(DateFixResponse { report, output })
    }

    /// 应用列映射并写出
    #[instrument(skip(self, mapping))]
    pub fn map_file(
        &self,
        input: &Path,
        mapping: &ColumnMapping,
        output: &Path,
    ) -> ApiResult<MappingResponse> {
        if mapping.is_empty() {
            return Err(ApiError::InvalidInput("mapping de colonnes vide".to_string()));
        }
        let table = self.files.load(input)?;
        let mapped = apply_mapping(&table, mapping)?;
        self.files.save(&mapped, output)?;

        Ok(MappingResponse {
            columns: mapped.columns,
            rows: mapped.rows.len(),
            output: output.to_path_buf(),
        })
    }

    /// 合并设备（output 非空时写出合并表）
    #[instrument(skip(self))]
    pub fn consolidate_file(
        &self,
        input: &Path,
        group_by: &[String],
        output: Option<&Path>,
    ) -> ApiResult<ConsolidationResponse> {
        if group_by.is_empty() {
            return Err(ApiError::InvalidInput(
                "au moins un champ de regroupement est requis".to_string(),
            ));
        }
        let table = self.files.load(input)?;
        let records = consolidate(&table, group_by)?;

        if let Some(path) = output {
            let out = consolidated_to_table(&records, group_by, &table.columns);
            self.files.save(&out, path)?;
        }

        Ok(ConsolidationResponse {
            group_by: group_by.to_vec(),
            total_rows: table.len(),
            records,
            output: output.map(Path::to_path_buf),
        })
    }

    /// 执行完整流水线；output 写出处理后的表，consolidated_output 写出合并表
    #[instrument(skip(self, options))]
    pub fn run_pipeline(
        &self,
        input: &Path,
        options: PipelineOptions,
        output: Option<&Path>,
        consolidated_output: Option<&Path>,
    ) -> ApiResult<PipelineOutcome> {
        let group_by = options.group_by.clone();
        let table = self.files.load(input)?;
        let outcome = InventoryPipeline::new(self.schema, options).run(table)?;

        if let Some(path) = output {
            self.files.save(&outcome.table, path)?;
        }
        if let (Some(path), Some(group_by)) = (consolidated_output, group_by.as_deref()) {
            if let Some(table) = outcome.consolidated_table(group_by) {
                self.files.save(&table, path)?;
            }
        }
        Ok(outcome)
    }

    /// 导出为 {base}_NumEcoEval_{date}.csv
    pub fn export(
        &self,
        input: &Path,
        out_dir: &Path,
        base: Option<&str>,
        date: NaiveDate,
    ) -> ApiResult<ExportResponse> {
        let base = base
            .map(str::to_string)
            .or_else(|| {
                input
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_default();

        let table = self.files.load(input)?;
        let path = out_dir.join(export_file_name(&base, date));
        self.files.save(&table, &path)?;

        Ok(ExportResponse {
            path,
            rows: table.len(),
        })
    }
}

fn require_name<'a>(what: &str, value: &'a str) -> ApiResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::InvalidInput(format!("{} manquante", what)))
    } else {
        Ok(trimmed)
    }
}
