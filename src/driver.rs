//! 프레임 소스에서 영상을 읽어 파이프라인에 넣고 결과를 화면에 보여주는 루프입니다.
//!
//! 상태 전이:
//! - `Init` → 소스 열기 성공 시 `Running`, 실패 시 `Failed(SourceUnavailable)`
//! - `Running` → 스트림 끝, 읽기 에러, 종료 키 입력 시 `Stopped`
//! - `Stopped` / `Failed` → 종료. 소스와 디스플레이는 어느 경로든 정확히 한 번 해제됩니다.
//!
//! 프레임 읽기에는 타임아웃이 없습니다. 소스가 멈추면 루프도 멈춥니다.

use std::ops::{Deref, DerefMut};

use tracing::{debug, error, info, warn};

use crate::config::{InputConfig, SourceType, ValidConfig};
use crate::error::{Error, Result};
use crate::pipeline::{FramePipeline, TuningState};
use crate::vision::Vision;

/// `poll_key`가 돌려주는 키 코드
pub type Key = i32;

/// ESC, 'q'
pub const EXIT_KEYS: [Key; 2] = [27, b'q' as Key];

/// 루프가 끝날 때 반드시 반납해야 하는 자원 (카메라/파일 핸들, 윈도우)
pub trait Release {
    fn release(&mut self) -> Result<()>;
}

impl<T: Release + ?Sized> Release for &mut T {
    fn release(&mut self) -> Result<()> {
        (**self).release()
    }
}

/// 스코프를 벗어날 때 `release`를 호출하는 가드
pub struct Released<T: Release> {
    inner: T,
}

impl<T: Release> Released<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: Release> Deref for Released<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: Release> DerefMut for Released<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: Release> Drop for Released<T> {
    fn drop(&mut self) {
        if let Err(err) = self.inner.release() {
            warn!(%err, "failed to release resource");
        }
    }
}

/// 이미지, 동영상 파일, 카메라 등 프레임 공급원
pub trait FrameSource: Release {
    type Frame;

    /// 다음 프레임을 읽습니다. 스트림이 끝나면 `Ok(None)`, 읽기 실패는 `Err`.
    fn read(&mut self) -> Result<Option<Self::Frame>>;
}

/// 결과 표시와 실시간 파라미터 입력(트랙바)을 담당하는 화면
pub trait Display: Release {
    type Frame;
    type Image;

    fn show(&mut self, frame: &Self::Frame) -> Result<()>;

    /// 엣지 맵을 별도 창에 표시합니다.
    fn show_edges(&mut self, _edges: &Self::Image) -> Result<()> {
        Ok(())
    }

    /// 현재 트랙바 위치를 읽어옵니다.
    fn tuning(&mut self, initial: &TuningState) -> Result<TuningState>;

    /// 최대 `wait_ms`만큼 키 입력을 기다립니다. `None`이면 입력이 올 때까지 기다립니다.
    fn poll_key(&mut self, wait_ms: Option<u32>) -> Result<Option<Key>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndOfStream,
    /// 스트림 도중 읽기 실패. 루프는 정상 종료되지만 호출부는 실패로 보고합니다.
    ReadError(String),
    UserExit,
    SingleImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    SourceUnavailable,
    Display,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverState {
    Init,
    Running,
    Stopped(StopReason),
    Failed(Failure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// 엣지 맵을 "Edges" 창에 함께 표시
    pub show_edges: bool,
    /// 동영상/웹캠 모드에서 프레임마다 키 입력을 기다리는 시간 (ms)
    pub poll_ms: u32,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            show_edges: false,
            poll_ms: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames_read: usize,
    pub frames_annotated: usize,
    pub frames_failed: usize,
    pub segments: usize,
    pub stop: StopReason,
}

#[derive(Default)]
struct Counters {
    frames_read: usize,
    frames_annotated: usize,
    frames_failed: usize,
    segments: usize,
}

/// 획득-처리-표시 루프를 소유하는 드라이버입니다.
///
/// 디스플레이는 `run`이 끝날 때 해제되므로 드라이버 하나는 한 번만 실행합니다.
pub struct StreamDriver<V, D> {
    config: ValidConfig,
    pipeline: FramePipeline<V>,
    display: D,
    options: DriverOptions,
    state: DriverState,
}

impl<V, D> StreamDriver<V, D>
where
    V: Vision,
    D: Display<Frame = V::Frame, Image = V::Image>,
{
    pub fn new(config: ValidConfig, vision: V, display: D, options: DriverOptions) -> Self {
        let pipeline = FramePipeline::new(vision, &config);
        Self {
            config,
            pipeline,
            display,
            options,
            state: DriverState::Init,
        }
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn pipeline(&self) -> &FramePipeline<V> {
        &self.pipeline
    }

    /// 소스를 열고 루프를 끝까지 실행합니다.
    ///
    /// # 인자
    /// * `open` - 설정의 입력 정보로 프레임 소스를 여는 함수
    ///
    /// # 반환
    /// * 정상 종료 시 처리 통계와 종료 이유
    ///
    /// # 에러
    /// * 소스를 열 수 없으면 `SourceUnavailable` (파이프라인은 호출되지 않음)
    /// * 화면 표시/입력이 실패하면 해당 에러
    pub fn run<S, F>(&mut self, open: F) -> Result<RunSummary>
    where
        S: FrameSource<Frame = V::Frame>,
        F: FnOnce(&InputConfig) -> Result<S>,
    {
        let Self {
            config,
            pipeline,
            display,
            options,
            state,
        } = self;
        *state = DriverState::Init;
        let mut display = Released::new(display);

        let source = match open(&config.input) {
            Ok(source) => source,
            Err(err) => {
                let err = source_unavailable(&config.input, err);
                error!(%err, "cannot start stream");
                *state = DriverState::Failed(Failure::SourceUnavailable);
                return Err(err);
            }
        };
        let mut source = Released::new(source);
        *state = DriverState::Running;
        info!(
            source = ?config.input.source_type,
            path = %config.input.path,
            "stream started"
        );

        let mut counters = Counters::default();
        let result = drive(
            config,
            pipeline,
            &mut **display,
            &mut *source,
            options,
            &mut counters,
        );
        drop(source);

        match result {
            Ok(stop) => {
                info!(
                    frames = counters.frames_read,
                    failed = counters.frames_failed,
                    reason = ?stop,
                    "stream stopped"
                );
                *state = DriverState::Stopped(stop.clone());
                Ok(RunSummary {
                    frames_read: counters.frames_read,
                    frames_annotated: counters.frames_annotated,
                    frames_failed: counters.frames_failed,
                    segments: counters.segments,
                    stop,
                })
            }
            Err(err) => {
                error!(%err, frames = counters.frames_read, "display failed");
                *state = DriverState::Failed(Failure::Display);
                Err(err)
            }
        }
    }
}

/// `Running` 상태의 루프 본체. 디스플레이 에러만 호출부로 전파합니다.
fn drive<V, D, S>(
    config: &ValidConfig,
    pipeline: &FramePipeline<V>,
    display: &mut D,
    source: &mut S,
    options: &DriverOptions,
    counters: &mut Counters,
) -> Result<StopReason>
where
    V: Vision,
    D: Display<Frame = V::Frame, Image = V::Image>,
    S: FrameSource<Frame = V::Frame>,
{
    let single_image = config.input.source_type == SourceType::Image;
    let initial = config.tuning();

    loop {
        let mut frame = match source.read() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(StopReason::EndOfStream),
            Err(err) => {
                warn!(%err, "frame acquisition failed, stopping stream");
                return Ok(StopReason::ReadError(err.to_string()));
            }
        };
        counters.frames_read += 1;

        // 단일 이미지는 트랙바 없이 설정값을 그대로 사용
        let tuning = if single_image {
            initial
        } else {
            display.tuning(&initial)?
        };

        match pipeline.process(&mut frame, &tuning, config.canny.blur_kernel) {
            Ok(detection) => {
                counters.frames_annotated += 1;
                counters.segments += detection.lines.len();
                display.show(&frame)?;
                if options.show_edges {
                    display.show_edges(&detection.edges)?;
                }
            }
            Err(err) => {
                counters.frames_failed += 1;
                warn!(frame = counters.frames_read, %err, "skipping frame");
            }
        }

        if single_image {
            if counters.frames_annotated > 0 {
                display.poll_key(None)?;
            }
            return Ok(StopReason::SingleImage);
        }

        if let Some(key) = display.poll_key(Some(options.poll_ms))? {
            debug!(key, "key pressed");
            if EXIT_KEYS.contains(&key) {
                return Ok(StopReason::UserExit);
            }
        }
    }
}

fn source_unavailable(input: &InputConfig, err: Error) -> Error {
    match err {
        Error::SourceUnavailable(_) => err,
        other => {
            let target = match input.source_type {
                SourceType::Webcam => format!("camera #{}", input.device),
                _ => input.path.clone(),
            };
            Error::SourceUnavailable(format!("{target}: {other}"))
        }
    }
}
