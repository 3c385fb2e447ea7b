// ==========================================
// G4IT 设备清单 - 处理流水线
// ==========================================
// 流程: 映射 → 校验 → 日期修复 → 取值标准化 → 合并
// 红线: 结构性错误立即中止并返回错误；单元格问题进入各步骤报告
// 说明: 校验在日期修复之前执行（修复输出 MM-DD-YYYY，不符合 date 类型）
// ==========================================

use crate::config::{ConfigResult, ProcessingConfigReader};
use crate::domain::mapping::ColumnMapping;
use crate::domain::report::{
    ConsolidatedRecord, DateFixReport, StandardizeReport, ValidationReport,
};
use crate::domain::schema::Schema;
use crate::domain::table::Table;
use crate::engine::column_mapper::apply_mapping;
use crate::engine::consolidation::{consolidate, consolidated_to_table};
use crate::engine::date_repair::fix_invalid_dates;
use crate::engine::error::EngineResult;
use crate::engine::table_validator::validate;
use crate::engine::value_standardizer::standardize_values;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, instrument};

// ==========================================
// PipelineOptions - 流水线选项
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// 先行应用的列映射
    pub mapping: Option<ColumnMapping>,
    /// 需要修复的日期列（表中不存在的列跳过）
    pub date_columns: Vec<String>,
    /// 是否执行 statut/type 标准化
    pub standardize: bool,
    /// 合并分组字段（None 表示不合并）
    pub group_by: Option<Vec<String>>,
    /// 校验不通过时停止后续步骤
    pub stop_on_invalid: bool,
}

impl PipelineOptions {
    /// 从配置读取默认选项（合并默认关闭）
    pub fn from_config<C: ProcessingConfigReader + ?Sized>(config: &C) -> ConfigResult<Self> {
        Ok(Self {
            mapping: None,
            date_columns: config.get_date_columns()?,
            standardize: config.get_standardize_values()?,
            group_by: None,
            stop_on_invalid: false,
        })
    }
}

// ==========================================
// PipelineOutcome - 流水线结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    /// 处理后的表（映射/修复/标准化之后）
    #[serde(skip)]
    pub table: Table,
    pub validation: ValidationReport,
    pub date_fixes: Vec<DateFixReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standardization: Option<StandardizeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consolidated: Option<Vec<ConsolidatedRecord>>,
    /// 因校验失败提前停止
    pub stopped_early: bool,
    pub elapsed_ms: u128,
}

impl PipelineOutcome {
    /// 合并结果的表格形式
    pub fn consolidated_table(&self, group_by: &[String]) -> Option<Table> {
        self.consolidated
            .as_ref()
            .map(|records| consolidated_to_table(records, group_by, &self.table.columns))
    }
}

// ==========================================
// InventoryPipeline
// ==========================================
pub struct InventoryPipeline<'a> {
    schema: &'a Schema,
    options: PipelineOptions,
}

impl<'a> InventoryPipeline<'a> {
    pub fn new(schema: &'a Schema, options: PipelineOptions) -> Self {
        Self { schema, options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// 执行流水线
    ///
    /// # 错误
    /// - InvalidMapping: 映射无效
    /// - ColumnNotFound: 日期列在部分行缺失
    /// - MissingField: 分组字段不存在
    #[instrument(skip_all, fields(rows = table.len()))]
    pub fn run(&self, table: Table) -> EngineResult<PipelineOutcome> {
        let start = Instant::now();
        let mut table = table;

        // === 步骤 1: 列映射 ===
        if let Some(mapping) = &self.options.mapping {
            debug!("步骤 1: 列映射");
            table = apply_mapping(&table, mapping)?;
        }

        // === 步骤 2: 校验 ===
        debug!("步骤 2: 表格校验");
        let validation = validate(&table, self.schema);

        if self.options.stop_on_invalid && !validation.is_valid {
            info!(errors = validation.error_count(), "校验未通过，流水线停止");
            return Ok(PipelineOutcome {
                table,
                validation,
                date_fixes: Vec::new(),
                standardization: None,
                consolidated: None,
                stopped_early: true,
                elapsed_ms: start.elapsed().as_millis(),
            });
        }

        // === 步骤 3: 日期修复 ===
        debug!("步骤 3: 日期修复");
        let mut date_fixes = Vec::new();
        for column in &self.options.date_columns {
            if !table.has_column(column) {
                debug!(column = %column, "日期列不存在，跳过");
                continue;
            }
            // 只修复校验失败的行；合法 ISO 日期首段为年份，会被误判为日月颠倒
            let invalid_rows: HashSet<usize> = validation
                .type_errors
                .iter()
                .filter(|e| &e.column == column)
                .map(|e| e.row)
                .collect();
            if invalid_rows.is_empty() {
                debug!(column = %column, "日期列校验通过，跳过修复");
                continue;
            }
            date_fixes.push(fix_invalid_dates(&mut table, column, &invalid_rows)?);
        }

        // === 步骤 4: 取值标准化 ===
        let standardization = if self.options.standardize {
            debug!("步骤 4: 取值标准化");
            Some(standardize_values(&mut table))
        } else {
            None
        };

        // === 步骤 5: 合并 ===
        let consolidated = match &self.options.group_by {
            Some(group_by) => {
                debug!("步骤 5: 设备合并");
                Some(consolidate(&table, group_by)?)
            }
            None => None,
        };

        let elapsed_ms = start.elapsed().as_millis();
        info!(
            is_valid = validation.is_valid,
            date_columns = date_fixes.len(),
            groups = consolidated.as_ref().map_or(0, Vec::len),
            elapsed_ms = elapsed_ms,
            "流水线完成"
        );

        Ok(PipelineOutcome {
            table,
            validation,
            date_fixes,
            standardization,
            consolidated,
            stopped_early: false,
            elapsed_ms,
        })
    }
}
