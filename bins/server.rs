use tracing::{error, info};
use uuid::Uuid;

fn main() -> std::process::ExitCode {
    // 先加载配置（.env -> config.toml -> 环境变量），失败时日志尚未初始化，直接输出到 stderr
    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("invalid configuration: {e:#}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let level = common::utils::logging::resolve_level(&cfg.env, cfg.log_level.as_deref());
    common::utils::logging::init_logging_json(level);
    info!(service = "server", event = "logger_init", env = %cfg.env, level, "tracing subscriber initialized");

    // 基础服务上下文（不含敏感信息）
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    // Panic 钩子：请求内的 panic 由 CatchPanicLayer 恢复并记录，这里只记录其余的
    std::panic::set_hook(Box::new(move |info| {
        if server::routes::in_request_scope() {
            return;
        }
        error!(
            service = "server",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "server",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "server service starting"
    );

    // 收到 Ctrl+C / SIGTERM 后停止接收新连接，等待进行中的请求完成
    rt.block_on(async move {
        match server::run(cfg, server::startup::shutdown_signal()).await {
            Ok(()) => {
                info!(service = "server", event = "stop", %service_id, pid, "server stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "server", event = "run_failed", error = %e, "server::run returned error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
