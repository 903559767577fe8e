//! Import views / actions from CSV files

use colored::Colorize;
use std::path::Path;

use crate::ingest::IngestKind;
use crate::interfaces::cli::CliError;
use crate::services::IngestService;

/// 整个文件读入内存后再交给解析器，与 HTTP 上传路径一致
async fn read_csv(file_path: &str) -> Result<Vec<u8>, CliError> {
    if !Path::new(file_path).exists() {
        return Err(CliError::CommandError(format!(
            "File not found: {}",
            file_path
        )));
    }
    tokio::fs::read(file_path).await.map_err(|e| {
        CliError::CommandError(format!("Failed to read '{}': {}", file_path, e))
    })
}

/// 导入 CSV 文件，返回服务层给出的计数
pub async fn import_file(
    service: &IngestService,
    kind: IngestKind,
    file_path: String,
) -> Result<usize, CliError> {
    let content = read_csv(&file_path).await?;
    println!(
        "{} {} file {}",
        "Importing".bold().blue(),
        kind,
        file_path.cyan()
    );

    let count = match kind {
        IngestKind::Views => service.ingest_views(content.as_slice(), &file_path).await,
        IngestKind::Actions => service.ingest_actions(content.as_slice(), &file_path).await,
    }?;

    let unit = match kind {
        IngestKind::Views => "view rows",
        IngestKind::Actions => "distinct actions",
    };
    println!(
        "{} Imported {} {}",
        "✓".bold().green(),
        count.to_string().green(),
        unit
    );
    Ok(count)
}
