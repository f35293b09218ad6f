// ==========================================
// 动力电池供应链账本 - 原材料种子数据导入
// ==========================================
// 输入: CSV（表头: materialID,supplierID,name,quantity,status,verified）
// - materialID 可空，空时生成 MATERIAL-<uuid>
// - status: NEW / RECYCLED（缺省 NEW）
// - verified: true / VERIFIED 视为已认证
// 单行失败记入 rejected，不中断整体导入
// ==========================================

use crate::domain::types::MaterialOrigin;
use crate::engine::extraction::new_material_id;
use crate::engine::inventory::MaterialInventory;
use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// 单行拒绝原因
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub row: usize,
    pub reason: String,
}

/// 导入汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub imported: usize,
    pub verified: usize,
    pub rejected: Vec<RejectedRow>,
}

/// 解析后的一行
#[derive(Debug, Clone, PartialEq)]
struct SeedRow {
    material_id: String,
    supplier_id: String,
    name: String,
    quantity: u64,
    origin: MaterialOrigin,
    verified: bool,
}

pub struct MaterialSeedImporter {
    inventory: Arc<MaterialInventory>,
}

impl MaterialSeedImporter {
    pub fn new(inventory: Arc<MaterialInventory>) -> Self {
        Self { inventory }
    }

    /// 从 CSV 文件导入
    pub fn import_file(&self, path: &Path) -> ImportResult<ImportSummary> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => {}
            other => {
                return Err(ImportError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ))
            }
        }

        let file = File::open(path)?;
        let summary = self.import_reader(file)?;
        info!(
            path = %path.display(),
            imported = summary.imported,
            rejected = summary.rejected.len(),
            "原材料种子数据导入完成"
        );
        Ok(summary)
    }

    /// 从任意 CSV 输入导入
    pub fn import_reader<R: Read>(&self, input: R) -> ImportResult<ImportSummary> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let mut summary = ImportSummary::default();

        for (idx, result) in reader.records().enumerate() {
            // 表头为第 1 行
            let row_no = idx + 2;
            summary.total_rows += 1;

            let record = result?;
            let fields: HashMap<&str, &str> = headers
                .iter()
                .map(String::as_str)
                .zip(record.iter())
                .collect();

            let row = match parse_row(row_no, &fields) {
                Ok(row) => row,
                Err(e) => {
                    warn!(row = row_no, error = %e, "种子数据行被拒绝");
                    summary.rejected.push(RejectedRow {
                        row: row_no,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match self.apply_row(row_no, &row) {
                Ok(()) => {
                    summary.imported += 1;
                    if row.verified {
                        summary.verified += 1;
                    }
                }
                Err(e) => {
                    warn!(row = row_no, error = %e, "种子数据写入失败");
                    summary.rejected.push(RejectedRow {
                        row: row_no,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(summary)
    }

    fn apply_row(&self, row_no: usize, row: &SeedRow) -> ImportResult<()> {
        self.inventory
            .register_lot(
                &row.material_id,
                &row.supplier_id,
                &row.name,
                row.quantity,
                row.origin,
            )
            .map_err(|source| ImportError::Engine { row: row_no, source })?;

        if row.verified {
            self.inventory
                .verify_material(&row.material_id)
                .map_err(|source| ImportError::Engine { row: row_no, source })?;
        }
        Ok(())
    }
}

fn required<'a>(row: usize, fields: &HashMap<&str, &'a str>, name: &str) -> ImportResult<&'a str> {
    match fields.get(name) {
        Some(v) if !v.is_empty() => Ok(*v),
        _ => Err(ImportError::MissingField {
            row,
            field: name.to_string(),
        }),
    }
}

fn parse_row(row: usize, fields: &HashMap<&str, &str>) -> ImportResult<SeedRow> {
    let material_id = match fields.get("materialID") {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => new_material_id(),
    };
    let supplier_id = required(row, fields, "supplierID")?.to_string();
    let name = required(row, fields, "name")?.to_string();

    let raw_qty = required(row, fields, "quantity")?;
    let quantity = raw_qty
        .parse::<u64>()
        .map_err(|e| ImportError::TypeConversionError {
            row,
            field: "quantity".to_string(),
            message: format!("{} ({})", e, raw_qty),
        })?;

    let origin = match fields.get("status").map(|s| s.to_ascii_uppercase()) {
        None => MaterialOrigin::New,
        Some(s) if s.is_empty() || s == "NEW" => MaterialOrigin::New,
        Some(s) if s == "RECYCLED" => MaterialOrigin::Recycled,
        Some(other) => {
            return Err(ImportError::TypeConversionError {
                row,
                field: "status".to_string(),
                message: format!("未知来源: {}", other),
            })
        }
    };

    let verified = fields
        .get("verified")
        .map(|v| matches!(v.to_ascii_uppercase().as_str(), "TRUE" | "VERIFIED" | "1" | "Y"))
        .unwrap_or(false);

    Ok(SeedRow {
        material_id,
        supplier_id,
        name,
        quantity,
        origin,
        verified,
    })
}
