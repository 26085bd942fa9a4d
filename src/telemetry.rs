use tracing_subscriber::{fmt, EnvFilter};

/// 전역 tracing 구독자를 설치합니다.
///
/// `RUST_LOG`가 있으면 그 필터를, 없으면 `info`(`verbose`면 `debug`)를 사용합니다.
/// 이미 설치되어 있으면 아무것도 하지 않습니다.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
