// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

use crate::domain::models::record::ResultSet;

/// 写出错误类型
#[derive(Error, Debug)]
pub enum WriteError {
    /// IO错误
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// CSV编码错误
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// 将结果集原子地写为CSV文件
///
/// 先写入同目录下的临时文件，全部写完并刷盘后再重命名到
/// 最终路径。写入中途的崩溃不会在最终路径留下半成品文件。
///
/// # 参数
///
/// * `result_set` - 排序去重后的结果集
/// * `path` - 最终输出路径
///
/// # 返回值
///
/// * `Ok(())` - 文件已完整落盘
/// * `Err(WriteError)` - 写入或重命名失败
pub fn write_csv(result_set: &ResultSet, path: &Path) -> Result<(), WriteError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    // The temp file must live in the target directory so the final
    // rename stays on one filesystem and remains atomic
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file());
        writer.write_record(result_set.fields())?;
        for record in result_set.records() {
            writer.write_record(&record.values)?;
        }
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| WriteError::Io(e.error))?;

    info!(
        rows = result_set.len(),
        path = %path.display(),
        "CSV output written"
    );
    Ok(())
}
