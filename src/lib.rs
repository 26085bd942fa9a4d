//! 설정 파일로 파라미터를 읽고, 캐니 엣지 + 확률적 허프 변환으로 직선을 검출해
//! 원본 영상 위에 그려 보여주는 도구입니다. 이미지, 동영상 파일, 웹캠을 지원하며
//! 동영상/웹캠 모드에서는 트랙바로 임계값을 실시간으로 조절할 수 있습니다.

pub mod config;
pub mod driver;
pub mod error;
pub mod pipeline;
pub mod telemetry;
pub mod vision;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, SourceType, ValidConfig, DEFAULT_CONFIG_PATH};
pub use driver::{DriverOptions, DriverState, RunSummary, StopReason, StreamDriver};
pub use error::{Error, Result};
pub use pipeline::{Detection, FramePipeline, TuningState};
pub use vision::{HoughParams, LineSegment, Vision};
