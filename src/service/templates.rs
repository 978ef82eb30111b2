//! Text rendered into generated projects and tool replies.

use std::path::Path;

use crate::error::Result;
use crate::types::{ClientConfig, McpServerEntry};

/// `main.py` for a FastMCP server with a single echo tool.
pub fn render_main_py(description: &str) -> String {
    format!(
        r#"from mcp.server.fastmcp import FastMCP

mcp = FastMCP({name})

@mcp.tool()
def example_tool(input_text: str) -> str:
    """An example tool that echoes back the input text"""
    return f"You said: {{input_text}}"

if __name__ == "__main__":
    mcp.run(transport="stdio")
"#,
        name = python_string(description)
    )
}

/// Quote `value` as a Python string literal.
fn python_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `README.md` with run instructions and client wiring.
pub fn render_readme(name: &str, description: &str, abs_dir: &Path) -> Result<String> {
    let config = ClientConfig::for_project(name, abs_dir).to_pretty_json()?;
    let cursor = McpServerEntry::for_directory(abs_dir);

    Ok(format!(
        r#"# {name}

{description}

## Running the Server

1. Activate the virtual environment:
   ```bash
   # On macOS/Linux:
   source .venv/bin/activate

   # On Windows:
   .venv\Scripts\activate
   ```

2. Start the MCP server:
   ```bash
   uv run main.py
   ```

## Connecting to Claude Desktop

1. Edit `~/Library/Application Support/Claude/claude_desktop_config.json`:

```json
{config}
```

2. Restart Claude Desktop

## Connecting to Cursor AI IDE

1. Open Cursor > Preferences > Cursor settings
2. Go to MCP
3. Click "Add new global mcp server"
4. Configure with the following:
   - Command: {command}
   - Arguments: {args}
"#,
        command = cursor.command,
        args = cursor.args_line(),
    ))
}

/// Final message returned by `create_mcp_server`.
pub fn render_report(name: &str, dir: &Path, abs_dir: &Path, log: &[String]) -> String {
    let entries: String = log.iter().map(|entry| format!("- {}\n", entry)).collect();

    format!(
        r#"
MCP Server created successfully!

Project: {name}
Location: {abs}

To run your server:
1. cd {dir}
2. source .venv/bin/activate  # On Windows: .venv\Scripts\activate
3. uv run main.py

Setup log:
{entries}
"#,
        abs = abs_dir.display(),
        dir = dir.display(),
    )
}

/// Reply for `client_config`: the JSON fragment plus Cursor settings.
pub fn render_client_config(name: &str, abs_dir: &Path) -> Result<String> {
    let config = ClientConfig::for_project(name, abs_dir).to_pretty_json()?;
    let cursor = McpServerEntry::for_directory(abs_dir);

    Ok(format!(
        "Claude Desktop (claude_desktop_config.json):\n{config}\n\nCursor:\n- Command: {}\n- Arguments: {}\n",
        cursor.command,
        cursor.args_line()
    ))
}
