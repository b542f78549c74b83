//! 日志初始化
//!
//! 控制台输出始终开启；`LOG_DIR` 指向已存在的目录时改为按天滚动的文件输出
//! (`action-server.YYYY-MM-DD`)。`security` target 默认保留 info 级别。

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 设置时优先于 `log_level`。重复调用无副作用。
pub fn init_logger(log_level: &str, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let dir = log_dir.map(Path::new).filter(|p| p.is_dir());
    let installed = match dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "action-server");
            builder.with_ansi(false).with_writer(appender).try_init()
        }
        None => builder.try_init(),
    };

    if installed.is_ok() && log_dir.is_some() && dir.is_none() {
        tracing::warn!(log_dir = ?log_dir, "Log directory does not exist, logging to stdout");
    }
}

fn default_directives(level: &str) -> String {
    format!("action_server={level},tower_http={level},security=info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        let directives = default_directives("debug");
        assert!(directives.starts_with("action_server=debug"));
        assert!(EnvFilter::try_new(directives).is_ok());
    }
}
