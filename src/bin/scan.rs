// SatyaCheck scan CLI
// Analyzes text, a link or a file and prints the result as pretty JSON

use anyhow::Context;
use satyacheck::models::{AnalysisRequest, ScanRecord};
use satyacheck::services::analysis::AnalysisEngine;

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn mime_from_extension(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || has_flag(&args, "--help") {
        eprintln!(
            "Usage:\n  scan <text> [--out <json_path>]\n  scan --url <http(s)://...> [--out <json_path>]\n  scan --file <path> [--out <json_path>]\n\nOptions:\n  --out <json_path>   also write a scan record to this path\n\nEnvironment:\n  GEMINI_API_KEY / HF_API_KEY    provider credentials\n  OLLAMA_URL                     enables the local model gateway\n  SATYACHECK_DISABLE_FILE_LOG=1  console-only logging"
        );
        return Ok(());
    }

    satyacheck::init_logging();

    let out_path = parse_arg_value(&args, "--out");
    let engine = AnalysisEngine::from_env();

    let (request, input_label) = if let Some(url) = parse_arg_value(&args, "--url") {
        (AnalysisRequest::link(url.clone()), url)
    } else if let Some(path) = parse_arg_value(&args, "--file") {
        let bytes =
            std::fs::read(&path).with_context(|| format!("read file failed: {}", path))?;
        let file_name = std::path::Path::new(&path)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "input.bin".to_string());
        let mime = mime_from_extension(&file_name);
        (AnalysisRequest::file(bytes, mime, file_name), path)
    } else {
        let text = args[1].clone();
        if text.starts_with("--") {
            anyhow::bail!("no input given; pass text, --url or --file (see --help)");
        }
        (AnalysisRequest::text(text.clone()), text)
    };

    let result = engine.analyze(&request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(out_path) = out_path {
        let record = ScanRecord::new(request.kind_label(), &input_label, result);
        let json = serde_json::to_string_pretty(&record)?;
        std::fs::write(&out_path, json)
            .with_context(|| format!("write out failed: {}", out_path))?;
        eprintln!("Wrote scan record: {}", out_path);
    }

    Ok(())
}
