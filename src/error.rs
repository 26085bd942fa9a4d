use std::path::PathBuf;

use thiserror::Error;

/// 라이브러리 전체에서 사용하는 `Result` 타입 별칭입니다.
pub type Result<T> = std::result::Result<T, Error>;

/// 설정 로딩부터 프레임 처리까지 발생할 수 있는 에러 분류입니다.
///
/// - 설정 관련 에러(`ConfigNotFound`, `ConfigParse`, `ConfigInvalid`)는 시작 시점에
///   프레임을 건드리기 전에 호출부로 전달됩니다.
/// - `SourceUnavailable`은 재시도 없이 치명적입니다.
/// - `FrameAcquisition`은 스트림 도중 읽기 실패로, 루프를 정상 종료시킵니다.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config file {path:?} could not be read")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config {origin} is not a valid parameter file: {source}")]
    ConfigParse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config field `{field}`: {reason}")]
    ConfigInvalid { field: &'static str, reason: String },

    #[error("blur kernel size must be a positive odd number, got {0}")]
    InvalidKernelSize(i32),

    #[error("cannot open frame source {0:?}")]
    SourceUnavailable(String),

    #[error("failed to read frame: {0}")]
    FrameAcquisition(String),

    #[error("display failure: {0}")]
    Display(String),

    #[error("vision operation failed: {0}")]
    Vision(String),

    #[cfg(feature = "opencv")]
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}
