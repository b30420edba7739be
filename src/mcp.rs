//! logo-smart MCP (Model Context Protocol) server
//!
//! This is a standalone MCP server binary that exposes the logo pipeline
//! through the Model Context Protocol, so assistants can clean up signature
//! logos and ask for their display size.

use logo_smart::{
    box_for_aspect_ratio, enhance_postprocess_with, mime_from_path, process_file, LogoConfig,
};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// MCP Request structure
#[derive(Debug, serde::Deserialize)]
struct McpRequest {
    #[serde(default)]
    #[allow(dead_code)]
    jsonrpc: String,
    #[serde(flatten)]
    kind: RequestKind,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "method")]
enum RequestKind {
    #[serde(rename = "initialize")]
    Initialize {
        id: Value,
        #[serde(default)]
        params: Value,
    },
    #[serde(rename = "tools/list")]
    ToolsList { id: Value },
    #[serde(rename = "tools/call")]
    ToolsCall { id: Value, params: ToolCallParams },
}

#[derive(Debug, serde::Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// MCP Response structure
#[derive(Debug, serde::Serialize)]
struct McpResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

#[derive(Debug, serde::Serialize)]
struct McpError {
    code: i32,
    message: String,
}

impl McpResponse {
    fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(McpError {
                code,
                message: message.into(),
            }),
        }
    }

    fn text(id: Value, text: String) -> Self {
        Self::ok(id, json!({ "content": [{ "type": "text", "text": text }] }))
    }
}

struct LogoSmartMcpServer {
    config: LogoConfig,
}

impl LogoSmartMcpServer {
    fn handle_initialize(&self, _params: Value, id: Value) -> McpResponse {
        McpResponse::ok(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "serverInfo": {
                    "name": "logo-smart",
                    "version": env!("CARGO_PKG_VERSION")
                },
                "capabilities": {
                    "tools": {
                        "listChanged": false
                    }
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Value) -> McpResponse {
        McpResponse::ok(
            id,
            json!({
                "tools": [
                    {
                        "name": "analyze_logo",
                        "description": "Classify a logo's background (alpha, solid, complex, badge, SVG), remove solid backgrounds, trim, place it on a padded white canvas and return the display box for email signatures.",
                        "inputSchema": {
                            "type": "object",
                            "properties": {
                                "input_path": {
                                    "type": "string",
                                    "description": "Path to the logo (PNG, JPEG, WebP or SVG)"
                                },
                                "output_path": {
                                    "type": "string",
                                    "description": "Path where the processed PNG will be saved"
                                }
                            },
                            "required": ["input_path", "output_path"]
                        }
                    },
                    {
                        "name": "postprocess_enhanced",
                        "description": "Post-process an AI-enhanced logo: force a transparent background, add a 4px white outline that follows the silhouette, and trim.",
                        "inputSchema": {
                            "type": "object",
                            "properties": {
                                "input_path": {
                                    "type": "string",
                                    "description": "Path to the enhanced image"
                                },
                                "output_path": {
                                    "type": "string",
                                    "description": "Path where the final PNG will be saved"
                                },
                                "stroke_px": {
                                    "type": "integer",
                                    "description": "Outline width in pixels (default: 4)",
                                    "minimum": 0,
                                    "maximum": 32,
                                    "default": 4
                                }
                            },
                            "required": ["input_path", "output_path"]
                        }
                    },
                    {
                        "name": "logo_box",
                        "description": "Display width and height for a logo with the given aspect ratio (width / height).",
                        "inputSchema": {
                            "type": "object",
                            "properties": {
                                "ratio": {
                                    "type": "number",
                                    "description": "Aspect ratio of the trimmed logo",
                                    "exclusiveMinimum": 0
                                }
                            },
                            "required": ["ratio"]
                        }
                    }
                ]
            }),
        )
    }

    fn handle_tools_call(&self, params: ToolCallParams, id: Value) -> McpResponse {
        let args = if let Value::Object(map) = params.arguments {
            map
        } else {
            return McpResponse::err(id, -32602, "Invalid arguments: expected object");
        };

        match params.name.as_str() {
            "analyze_logo" => {
                let input_path = args.get("input_path").and_then(|v| v.as_str());
                let output_path = args.get("output_path").and_then(|v| v.as_str());
                let (Some(input), Some(output)) = (input_path, output_path) else {
                    return McpResponse::err(
                        id,
                        -32602,
                        "Missing required parameters: input_path and output_path",
                    );
                };

                match process_file(Path::new(input), Path::new(output), &self.config) {
                    Ok(result) => {
                        let summary = serde_json::to_string(&result.summary()).unwrap_or_default();
                        McpResponse::text(id, format!("Processed {} to {}: {}", input, output, summary))
                    }
                    Err(e) => McpResponse::err(id, -32000, format!("Processing failed: {:#}", e)),
                }
            }
            "postprocess_enhanced" => {
                let input_path = args.get("input_path").and_then(|v| v.as_str());
                let output_path = args.get("output_path").and_then(|v| v.as_str());
                let (Some(input), Some(output)) = (input_path, output_path) else {
                    return McpResponse::err(
                        id,
                        -32602,
                        "Missing required parameters: input_path and output_path",
                    );
                };
                let mut config = self.config.clone();
                if let Some(stroke) = args.get("stroke_px").and_then(|v| v.as_u64()) {
                    config.outline.stroke_px = stroke.min(32) as u32;
                }

                match postprocess_file(Path::new(input), Path::new(output), &config) {
                    Ok(text) => McpResponse::text(id, text),
                    Err(e) => McpResponse::err(id, -32000, format!("Post-processing failed: {:#}", e)),
                }
            }
            "logo_box" => match args.get("ratio").and_then(|v| v.as_f64()) {
                Some(ratio) if ratio.is_finite() && ratio > 0.0 => {
                    let logo_box = box_for_aspect_ratio(ratio);
                    McpResponse::text(id, json!({ "w": logo_box.w, "h": logo_box.h }).to_string())
                }
                _ => McpResponse::err(id, -32602, "ratio must be a positive number"),
            },
            _ => McpResponse::err(id, -32601, format!("Unknown tool: {}", params.name)),
        }
    }

    fn run(&self) {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut stdout_lock = stdout.lock();

        for line in stdin.lock().lines() {
            let Ok(json_str) = line else { break };
            let req = match serde_json::from_str::<McpRequest>(&json_str) {
                Ok(req) => req,
                Err(e) => {
                    // notifications and unknown methods carry no response
                    debug!(error = %e, "ignoring message");
                    continue;
                }
            };

            let response = match req.kind {
                RequestKind::Initialize { id, params } => self.handle_initialize(params, id),
                RequestKind::ToolsList { id } => self.handle_tools_list(id),
                RequestKind::ToolsCall { id, params } => self.handle_tools_call(params, id),
            };

            match serde_json::to_string(&response) {
                Ok(response_json) => {
                    writeln!(stdout_lock, "{}", response_json).ok();
                    stdout_lock.flush().ok();
                }
                Err(e) => warn!(error = %e, "failed to serialize response"),
            }
        }
    }
}

fn postprocess_file(input: &Path, output: &Path, config: &LogoConfig) -> anyhow::Result<String> {
    if mime_from_path(input) == Some("image/svg+xml") {
        anyhow::bail!("enhanced logos must be raster images");
    }
    let bytes = std::fs::read(input)?;
    let enhanced = enhance_postprocess_with(&bytes, config)?;
    std::fs::write(output, enhanced.to_png()?)?;
    Ok(format!(
        "Enhanced logo written to {}: {}x{} box, aspect ratio {:.3}",
        output.display(),
        enhanced.logo_box.w,
        enhanced.logo_box.h,
        enhanced.trimmed_aspect_ratio
    ))
}

fn main() {
    // stdout carries the protocol
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "logo_smart=warn".into()))
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(io::stderr))
        .init();

    let server = LogoSmartMcpServer {
        config: LogoConfig::default(),
    };
    server.run();
}
