//! Init command implementation
//!
//! Scaffolds a new TaskTrack project: `tasktrack.toml`, a `.env` holding a
//! freshly generated signing secret, and the `data/` directory.

use super::report::{Mark, Reporter};
use crate::auth::jwt::generate_secret;
use std::fs;
use std::path::Path;

/// Result of the init operation
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (tasktrack.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: std::path::PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, report: &Reporter) -> InitResult {
    report.title(&format!("TaskTrack v{} init", env!("CARGO_PKG_VERSION")));

    let base_path = &config.path;

    let config_path = base_path.join("tasktrack.toml");
    if config_path.exists() && !config.force {
        report.emit(Mark::Warn, "tasktrack.toml already exists");
        report.emit(Mark::Note, "pass --force to overwrite it");
        return InitResult::AlreadyExists;
    }

    let data_dir = base_path.join("data");
    if data_dir.exists() {
        report.emit(Mark::Skipped, "data/ (exists)");
    } else if let Err(e) = fs::create_dir_all(&data_dir) {
        report.emit(Mark::Failed, format!("data/: {}", e));
        return InitResult::Error(e.to_string());
    } else {
        report.emit(Mark::Done, "data/");
    }

    let toml_content = generate_tasktrack_toml(&config);
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        report.emit(Mark::Failed, format!("tasktrack.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    report.emit(Mark::Done, "tasktrack.toml");

    // An existing .env keeps its secret unless --force: rotating it would
    // invalidate every token already handed out.
    let env_path = base_path.join(".env");
    if env_path.exists() && !config.force {
        report.emit(Mark::Skipped, ".env (keeping existing secret)");
    } else {
        let env_content = generate_env(&generate_secret());
        if let Err(e) = write_file(&env_path, &env_content, config.force) {
            report.emit(Mark::Failed, format!(".env: {}", e));
            return InitResult::Error(e.to_string());
        }
        report.emit(Mark::Done, ".env (new JWT_SECRET)");
    }

    let gitignore_path = base_path.join(".gitignore");
    if !gitignore_path.exists() {
        match write_file(&gitignore_path, &generate_gitignore(), false) {
            Ok(()) => report.emit(Mark::Done, ".gitignore"),
            Err(e) => report.emit(Mark::Warn, format!(".gitignore: {}", e)),
        }
    }

    report.title("Next steps");
    report.emit(Mark::Note, "start the server with `tasktrack-server`");
    report.emit(
        Mark::Note,
        format!("it listens on http://{}:{}", config.host, config.port),
    );

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_tasktrack_toml(config: &InitConfig) -> String {
    format!(
        r#"# TaskTrack Configuration
# =======================
# Generated by: tasktrack-server init
#
# REQUIRED: Set this environment variable before starting (see .env):
#   - JWT_SECRET: Token signing secret (min 32 characters)

# =============================================================================
# Server Configuration
# =============================================================================
[server]
host = "{host}"
port = {port}
log_level = "info"

# =============================================================================
# Authentication Configuration
# =============================================================================
[auth]
jwt_secret_env = "JWT_SECRET"
# 5 hours
token_ttl_secs = 18000

# =============================================================================
# Database Configuration
# =============================================================================
[database]
# Use ":memory:" for an ephemeral database
url = "./data/tasktrack.db"
"#,
        host = config.host,
        port = config.port,
    )
}

fn generate_env(secret: &str) -> String {
    format!(
        r#"# TaskTrack Environment Variables
# ===============================
# Generated by: tasktrack-server init

# REQUIRED: Token signing secret (minimum 32 characters)
# Regenerate with: tasktrack-server secret
JWT_SECRET={secret}

# Optional: Logging level (trace, debug, info, warn, error)
RUST_LOG=info,tasktrack=debug
"#
    )
}

fn generate_gitignore() -> String {
    r#"# TaskTrack Generated Files
/data/
*.db
*.db-journal

# Environment
.env
.env.local
.env.*.local

# Rust
/target/

# IDE
.idea/
.vscode/
*.swp

# OS
.DS_Store
Thumbs.db
"#
    .to_string()
}
