//! Model inspection command

use anyhow::Result;
use colored::Colorize;
use survey_lib::ModelInfo;

use crate::client::ApiClient;
use crate::output::{format_bytes, format_timestamp, OutputFormat};

/// Show the model the server has loaded
pub async fn show_model(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let info: ModelInfo = client.get("api/v1/model").await?;

    match format {
        OutputFormat::Json => crate::output::print_json(&info)?,
        OutputFormat::Table => {
            println!("{}", "Loaded Model".bold());
            println!("{}", "=".repeat(50));
            println!("Version:        {}", info.version.cyan());
            println!("Format:         {:?}", info.format);
            println!("Schema:         {}", info.schema_version);
            println!("Path:           {}", info.path.display());
            println!("Size:           {}", format_bytes(info.size_bytes as u64));
            println!("Checksum:       {}", info.checksum);
            println!("Loaded at:      {}", format_timestamp(info.loaded_at));
        }
    }

    Ok(())
}
